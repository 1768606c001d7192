//! Single-pass conversion of a convergence log into a [`Dataset`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{HistoryError, Result};
use crate::grammar::{self, LineEvent};
use crate::history::{Chapter, Dataset, SampleKind};
use crate::options::{ParseOptions, RhsScope};

/// Parses `path` with default options.
pub fn parse(path: impl AsRef<Path>) -> Result<Dataset> {
    LogParser::default().parse_path(path)
}

/// Parses in-memory log text with default options.
pub fn parse_str(text: &str) -> Result<Dataset> {
    LogParser::default().parse_str(text)
}

/// Reads convergence logs line by line.
#[derive(Clone, Debug, Default)]
pub struct LogParser {
    options: ParseOptions,
}

impl LogParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parses the log stored at `path`. The file is closed before returning.
    pub fn parse_path(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| HistoryError::io(path, source))?;
        let dataset = self
            .scan(BufReader::new(file).lines(), path)
            .map_err(|err| err.in_file(path))?
            .with_source(path);
        log::info!(
            "parsed {} chapters from `{}`",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parses any buffered reader holding log text.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<Dataset> {
        self.scan(reader.lines(), Path::new("<reader>"))
    }

    pub fn parse_str(&self, text: &str) -> Result<Dataset> {
        self.scan(text.lines().map(|line| Ok(line.to_string())), Path::new("<memory>"))
    }

    fn scan<I>(&self, lines: I, origin: &Path) -> Result<Dataset>
    where
        I: Iterator<Item = std::io::Result<String>>,
    {
        let mut state = ScanState::new(self.options.rhs_scope);
        for (index, line) in lines.enumerate() {
            let line = line.map_err(|source| HistoryError::io(origin, source))?;
            for event in grammar::classify(index + 1, &line)? {
                state.apply(index + 1, event)?;
            }
        }
        Ok(state.finish())
    }
}

/// Where samples currently go.
#[derive(Debug)]
enum Cursor {
    /// No delimiter since the start of the file.
    Closed,
    /// A chapter is being filled and not yet part of the dataset.
    Open(Chapter),
    /// The last dataset chapter was finalised and still receives trailing samples.
    Finalized,
}

#[derive(Debug)]
struct ScanState {
    dataset: Dataset,
    cursor: Cursor,
    rhs: Option<f64>,
    rhs_scope: RhsScope,
}

impl ScanState {
    fn new(rhs_scope: RhsScope) -> Self {
        Self {
            dataset: Dataset::new(),
            cursor: Cursor::Closed,
            rhs: None,
            rhs_scope,
        }
    }

    fn apply(&mut self, line: usize, event: LineEvent) -> Result<()> {
        match event {
            LineEvent::Delimiter => {
                if let Cursor::Open(dropped) = &self.cursor {
                    log::debug!(
                        "line {line}: dropping chapter opened on line {} without `{}`",
                        dropped.opened_at(),
                        grammar::TERMINATOR
                    );
                }
                self.cursor = Cursor::Open(Chapter::open(line));
                if self.rhs_scope == RhsScope::PerChapter {
                    self.rhs = None;
                }
            }
            LineEvent::Relative(value) => {
                self.current(line, grammar::RELATIVE)?
                    .push(SampleKind::Relative, value);
            }
            LineEvent::Rhs(value) => self.rhs = Some(value),
            LineEvent::Reach { residual } => {
                let rhs = self.rhs.ok_or(HistoryError::MissingRhs { line })?;
                self.current(line, grammar::REACH)?
                    .push(SampleKind::ResidualRatio, residual / rhs);
            }
            LineEvent::Terminator => {
                match std::mem::replace(&mut self.cursor, Cursor::Finalized) {
                    Cursor::Open(chapter) => {
                        log::debug!(
                            "line {line}: chapter {} complete with {} samples",
                            self.dataset.len(),
                            chapter.len()
                        );
                        self.dataset.push(chapter);
                    }
                    Cursor::Finalized => {
                        // Repeated terminator: the finalised chapter is emitted again.
                        let repeated = self
                            .dataset
                            .chapters()
                            .last()
                            .cloned()
                            .ok_or(HistoryError::NoOpenChapter {
                                line,
                                marker: grammar::TERMINATOR,
                            })?;
                        log::debug!(
                            "line {line}: repeated `{}` duplicates chapter {}",
                            grammar::TERMINATOR,
                            self.dataset.len() - 1
                        );
                        self.dataset.push(repeated);
                    }
                    Cursor::Closed => {
                        self.cursor = Cursor::Closed;
                        return Err(HistoryError::NoOpenChapter {
                            line,
                            marker: grammar::TERMINATOR,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn current(&mut self, line: usize, marker: &'static str) -> Result<&mut Chapter> {
        let chapter = match &mut self.cursor {
            Cursor::Open(chapter) => Some(chapter),
            Cursor::Finalized => self.dataset.last_mut(),
            Cursor::Closed => None,
        };
        chapter.ok_or(HistoryError::NoOpenChapter { line, marker })
    }

    fn finish(self) -> Dataset {
        if let Cursor::Open(dropped) = &self.cursor {
            log::debug!(
                "end of log: dropping chapter opened on line {} without `{}`",
                dropped.opened_at(),
                grammar::TERMINATOR
            );
        }
        self.dataset
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn minimal_reach_log_yields_ratio() {
        let text = "=====\nrhs=2.0,\nstep Reach residual=4.0 and stop\nhomoCoeffZ=1\n";
        let dataset = parse_str(text).unwrap();
        assert_eq!(dataset.to_vecs(), vec![vec![1.0, 2.0]]);
        assert_eq!(
            dataset.chapters()[0].samples()[1].kind,
            SampleKind::ResidualRatio
        );
    }

    #[test]
    fn ratio_divides_residual_by_rhs() {
        let text = "=====\nrhs=8.0,\nReach residual=2.0 and\nhomoCoeffZ\n";
        let dataset = parse_str(text).unwrap();
        assert_relative_eq!(dataset.chapters()[0].last_value(), 0.25);
    }

    #[test]
    fn relative_and_ratio_samples_interleave_in_file_order() {
        let text = "\
=====
relative=0.5??
rhs=10.0,
Reach residual=2.0 and
relative=0.1??
homoCoeffZ
";
        let dataset = parse_str(text).unwrap();
        let chapter = &dataset.chapters()[0];
        let kinds: Vec<_> = chapter.samples().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SampleKind::Initial,
                SampleKind::Relative,
                SampleKind::ResidualRatio,
                SampleKind::Relative
            ]
        );
        assert_eq!(chapter.to_vec(), vec![1.0, 0.5, 0.2, 0.1]);
    }

    #[test]
    fn unterminated_chapter_is_dropped() {
        let text = "\
=====
relative=0.9?
=====
relative=0.3?
homoCoeffZ
=====
relative=0.7?
";
        let dataset = parse_str(text).unwrap();
        assert_eq!(dataset.to_vecs(), vec![vec![1.0, 0.3]]);
        assert_eq!(dataset.chapters()[0].opened_at(), 3);
    }

    #[test]
    fn reach_without_rhs_fails() {
        let err = parse_str("=====\nReach residual=1.0 and\nhomoCoeffZ\n").unwrap_err();
        assert!(matches!(err, HistoryError::MissingRhs { line: 2 }));
    }

    #[test]
    fn reach_without_any_rhs_fails_under_global_scope() {
        let parser = LogParser::new(ParseOptions::default().with_rhs_scope(RhsScope::Global));
        let text = "=====\nrelative=0.5?\nhomoCoeffZ\n=====\nReach residual=1.0 and\nhomoCoeffZ\n";
        let err = parser.parse_str(text).unwrap_err();
        assert!(matches!(err, HistoryError::MissingRhs { line: 5 }));
    }

    #[test]
    fn rhs_resets_per_chapter_by_default() {
        let text = "\
=====
rhs=2.0,
Reach residual=1.0 and
homoCoeffZ
=====
Reach residual=1.0 and
homoCoeffZ
";
        let err = parse_str(text).unwrap_err();
        assert!(matches!(err, HistoryError::MissingRhs { line: 6 }));

        let parser = LogParser::new(ParseOptions::default().with_rhs_scope(RhsScope::Global));
        let dataset = parser.parse_str(text).unwrap();
        assert_eq!(dataset.to_vecs(), vec![vec![1.0, 0.5], vec![1.0, 0.5]]);
    }

    #[test]
    fn samples_before_first_delimiter_fail() {
        let err = parse_str("relative=0.5?\n=====\n").unwrap_err();
        assert!(matches!(
            err,
            HistoryError::NoOpenChapter {
                line: 1,
                marker: grammar::RELATIVE
            }
        ));

        let err = parse_str("homoCoeffZ\n").unwrap_err();
        assert!(matches!(err, HistoryError::NoOpenChapter { line: 1, .. }));
    }

    #[test]
    fn trailing_samples_join_the_finalised_chapter() {
        let text = "=====\nrelative=0.5?\nhomoCoeffZ\nrelative=0.25?\n";
        let dataset = parse_str(text).unwrap();
        assert_eq!(dataset.to_vecs(), vec![vec![1.0, 0.5, 0.25]]);

    }

    #[test]
    fn every_terminator_emits_a_chapter() {
        let text = "=====\nrelative=0.5?\nhomoCoeffZ\nhomoCoeffZ\n";
        let dataset = parse_str(text).unwrap();
        let terminators = text.lines().filter(|l| l.contains(grammar::TERMINATOR)).count();
        assert_eq!(dataset.len(), terminators);
        assert_eq!(dataset.to_vecs(), vec![vec![1.0, 0.5], vec![1.0, 0.5]]);
    }

    #[test]
    fn lines_without_markers_are_ignored() {
        let text = "solver: ssor\n=====\nassembling\nhomoCoeffZ\ndone\n";
        let dataset = parse_str(text).unwrap();
        assert_eq!(dataset.to_vecs(), vec![vec![1.0]]);
    }

    #[test]
    fn reader_and_str_agree() {
        let text = "=====\nrelative=0.5??\r\nhomoCoeffZ\r\n";
        let from_reader = LogParser::default()
            .parse_reader(std::io::Cursor::new(text))
            .unwrap();
        assert_eq!(from_reader, parse_str(text).unwrap());
    }
}
