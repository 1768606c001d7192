//! Configuration structures for parsing and figure generation.
//!
//! All defaults are the fixed inputs and outputs of the packed-balls study; the binary
//! uses them unchanged.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::layout::GridLayout;

/// Lifetime of the last `rhs=` value seen by the parser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RhsScope {
    /// Forget the value at every chapter delimiter, so each chapter must log its own.
    #[default]
    PerChapter,
    /// Keep the value for the whole file; a chapter may reuse its predecessor's `rhs`.
    Global,
}

/// Controls how log lines are turned into chapters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    pub rhs_scope: RhsScope,
}

impl ParseOptions {
    /// Override the scope of `rhs=` values.
    pub fn with_rhs_scope(mut self, rhs_scope: RhsScope) -> Self {
        self.rhs_scope = rhs_scope;
        self
    }
}

/// One solver's log and the label it gets in the legend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverSeries {
    pub label: String,
    pub log_path: PathBuf,
}

impl SolverSeries {
    pub fn new(label: impl Into<String>, log_path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            log_path: log_path.into(),
        }
    }
}

/// Aggregated configuration of the read-parse-plot-save run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FigureOptions {
    /// Solvers in legend order.
    pub solvers: Vec<SolverSeries>,
    /// Grid the chapters are arranged in.
    pub layout: GridLayout,
    /// Destination of the rendered figure. Always written as SVG, whatever the extension;
    /// the default is the `.svg` counterpart of the study's PDF path.
    pub output: PathBuf,
    /// Figure size in pixels.
    pub size: (u32, u32),
    /// Settings forwarded to the log parser.
    pub parse: ParseOptions,
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self {
            solvers: vec![
                SolverSeries::new("FCT", "reports/balls-packed-fct.log"),
                SolverSeries::new("SSOR (ω=0.5)", "reports/balls-packed-ssor-0-5.log"),
                SolverSeries::new("SSOR (ω=1.0)", "reports/balls-packed-ssor-1-0.log"),
                SolverSeries::new("SSOR (ω=1.5)", "reports/balls-packed-ssor-1-5.log"),
                SolverSeries::new("ICC", "reports/balls-packed-icc.log"),
            ],
            layout: GridLayout::default(),
            output: PathBuf::from("figs/balls-packed-convergence-history.svg"),
            // A4 width at 150 dpi, three quarters as tall.
            size: (1240, 930),
            parse: ParseOptions::default(),
        }
    }
}

impl FigureOptions {
    /// Replace the solver list while preserving other defaults.
    pub fn with_solvers(mut self, solvers: Vec<SolverSeries>) -> Self {
        self.solvers = solvers;
        self
    }

    pub fn with_layout(mut self, layout: GridLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Redirect the rendered figure.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Set the figure size in pixels; each side is at least 1.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width.max(1), height.max(1));
        self
    }

    pub fn with_rhs_scope(mut self, rhs_scope: RhsScope) -> Self {
        self.parse = self.parse.with_rhs_scope(rhs_scope);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_packed_balls_study() {
        let options = FigureOptions::default();
        let labels: Vec<_> = options.solvers.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            ["FCT", "SSOR (ω=0.5)", "SSOR (ω=1.0)", "SSOR (ω=1.5)", "ICC"]
        );
        assert_eq!(
            options.solvers[4].log_path,
            PathBuf::from("reports/balls-packed-icc.log")
        );
        assert_eq!(options.layout.panel_count(), 12);
        assert_eq!(
            options.output,
            PathBuf::from("figs/balls-packed-convergence-history.svg")
        );
        assert_eq!(options.parse.rhs_scope, RhsScope::PerChapter);
    }

    #[test]
    fn builders_override_single_fields() {
        let options = FigureOptions::default()
            .with_output("out/fig.svg")
            .with_size(0, 300)
            .with_rhs_scope(RhsScope::Global);
        assert_eq!(options.output, PathBuf::from("out/fig.svg"));
        assert_eq!(options.size, (1, 300));
        assert_eq!(options.parse.rhs_scope, RhsScope::Global);
        assert_eq!(options.solvers.len(), 5);
    }
}
