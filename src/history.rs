//! Convergence history containers: samples, chapters and datasets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where a sample value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleKind {
    /// The normalised starting residual that opens every chapter.
    Initial,
    /// Relative residual reported by the solver itself.
    Relative,
    /// `residual / rhs` computed from raw norms.
    ResidualRatio,
}

/// One point of a convergence trajectory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub kind: SampleKind,
    pub value: f64,
}

/// One solver run's convergence trajectory.
///
/// A chapter always starts with an [`Initial`](SampleKind::Initial) sample of `1.0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    samples: Vec<Sample>,
    opened_at: usize,
}

impl Chapter {
    /// Value every chapter starts from.
    pub const INITIAL: f64 = 1.0;

    /// Opens a chapter whose delimiter sits on line `opened_at` (1-based).
    pub fn open(opened_at: usize) -> Self {
        Self {
            samples: vec![Sample {
                kind: SampleKind::Initial,
                value: Self::INITIAL,
            }],
            opened_at,
        }
    }

    /// Appends a sample at the end of the trajectory.
    pub fn push(&mut self, kind: SampleKind, value: f64) {
        self.samples.push(Sample { kind, value });
    }

    /// Line of the delimiter that opened this chapter.
    pub fn opened_at(&self) -> usize {
        self.opened_at
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Iterates over the plain values in file order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|sample| sample.value)
    }

    /// Collects the plain values into a vector.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values().collect()
    }

    /// Number of samples, including the initial one.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always `false`: a chapter holds at least its initial sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Last recorded value.
    pub fn last_value(&self) -> f64 {
        self.samples
            .last()
            .map(|sample| sample.value)
            .unwrap_or(Self::INITIAL)
    }

    /// `(iteration, value)` pairs, the shape consumed by the plotting layer.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values()
            .enumerate()
            .map(|(iteration, value)| (iteration as f64, value))
    }
}

/// Ordered collection of chapters parsed from one log file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    chapters: Vec<Chapter>,
    source: Option<PathBuf>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the file the dataset was read from.
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub(crate) fn push(&mut self, chapter: Chapter) {
        self.chapters.push(chapter);
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Chapter> {
        self.chapters.last_mut()
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn get(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chapter> {
        self.chapters.iter()
    }

    /// Plain nested values, one vector per chapter.
    pub fn to_vecs(&self) -> Vec<Vec<f64>> {
        self.chapters.iter().map(Chapter::to_vec).collect()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Chapter;
    type IntoIter = std::slice::Iter<'a, Chapter>;

    fn into_iter(self) -> Self::IntoIter {
        self.chapters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opened_chapter_starts_at_one() {
        let chapter = Chapter::open(3);
        assert_eq!(chapter.to_vec(), vec![1.0]);
        assert_eq!(chapter.samples()[0].kind, SampleKind::Initial);
        assert_eq!(chapter.opened_at(), 3);
        assert!(!chapter.is_empty());
    }

    #[test]
    fn points_enumerate_iterations() {
        let mut chapter = Chapter::open(1);
        chapter.push(SampleKind::Relative, 0.5);
        chapter.push(SampleKind::ResidualRatio, 0.25);
        let points: Vec<_> = chapter.points().collect();
        assert_eq!(points, vec![(0.0, 1.0), (1.0, 0.5), (2.0, 0.25)]);
        assert_eq!(chapter.last_value(), 0.25);
    }

    #[test]
    fn dataset_keeps_insertion_order() {
        let mut dataset = Dataset::new().with_source("reports/a.log");
        let mut first = Chapter::open(1);
        first.push(SampleKind::Relative, 0.1);
        dataset.push(first);
        dataset.push(Chapter::open(5));

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.to_vecs(), vec![vec![1.0, 0.1], vec![1.0]]);
        assert_eq!(dataset.source(), Some(Path::new("reports/a.log")));
        assert_eq!(dataset.iter().map(Chapter::opened_at).collect::<Vec<_>>(), vec![1, 5]);
    }
}
