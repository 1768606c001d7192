//! Convergence histories of iterative solvers, parsed from simulation logs and plotted.
//!
//! The crate reads the text logs written by the FCT, SSOR and ICC solver runs and turns
//! each run into a normalised residual trajectory. It offers tools to
//!
//! - describe trajectories (`history` module),
//! - split log lines into typed events (`grammar` module),
//! - build datasets in a single pass over a log (`parser` module),
//! - key chapters by configuration and contrast (`layout` module), and
//! - render a grid of log-scale plots with a shared legend (`plot` module).
//!
//! # Quick start
//!
//! ```no_run
//! use convhist::{FigureOptions, LogParser, ParseOptions, RhsScope};
//!
//! // Parse a single log, keeping `rhs=` values across chapters.
//! let parser = LogParser::new(ParseOptions::default().with_rhs_scope(RhsScope::Global));
//! let dataset = parser.parse_path("reports/balls-packed-icc.log").expect("readable log");
//! println!("{} chapters", dataset.len());
//!
//! // Or produce the full comparison figure.
//! let options = FigureOptions::default().with_output("figs/history.svg");
//! convhist::run(&options).expect("figure rendered");
//! ```

use std::path::PathBuf;

pub mod error;
pub mod grammar;
pub mod history;
pub mod layout;
pub mod options;
pub mod parser;
pub mod plot;

pub use error::{HistoryError, Result};
pub use history::{Chapter, Dataset, Sample, SampleKind};
pub use layout::{ChapterKey, GridLayout};
pub use options::{FigureOptions, ParseOptions, RhsScope, SolverSeries};
pub use parser::{parse, LogParser};

/// Parses every solver log named in `options` and renders the comparison figure.
///
/// Returns the path of the written figure. Any unreadable or malformed log aborts the
/// run before anything is drawn.
pub fn run(options: &FigureOptions) -> Result<PathBuf> {
    let parser = LogParser::new(options.parse);
    let mut series = Vec::with_capacity(options.solvers.len());
    for solver in &options.solvers {
        let dataset = parser.parse_path(&solver.log_path)?;
        series.push((solver.label.clone(), dataset));
    }

    plot::render(&series, &options.layout, &options.output, options.size)?;
    Ok(options.output.clone())
}
