//! Line grammar of solver convergence logs.
//!
//! Every recognised line carries one or more markers. Each marker owns a field whose
//! boundaries are explicit:
//!
//! | marker       | field                                         | event            |
//! |--------------|-----------------------------------------------|------------------|
//! | `=====`      | none                                          | [`Delimiter`]    |
//! | `relative=`  | numeric literal right after the marker        | [`Relative`]     |
//! | `rhs=`       | text up to the next `,` (no comma, no event)  | [`Rhs`]          |
//! | `Reach`      | `residual=` text up to the next ` and`        | [`Reach`]        |
//! | `homoCoeffZ` | none                                          | [`Terminator`]   |
//!
//! Markers are checked in the order of the table and each match emits one event, so a
//! single line may yield several events.
//!
//! [`Delimiter`]: LineEvent::Delimiter
//! [`Relative`]: LineEvent::Relative
//! [`Rhs`]: LineEvent::Rhs
//! [`Reach`]: LineEvent::Reach
//! [`Terminator`]: LineEvent::Terminator

use crate::error::{HistoryError, Result};

pub const DELIMITER: &str = "=====";
pub const RELATIVE: &str = "relative=";
pub const RHS: &str = "rhs=";
pub const RHS_END: &str = ",";
pub const REACH: &str = "Reach";
pub const RESIDUAL: &str = "residual=";
pub const RESIDUAL_END: &str = " and";
pub const TERMINATOR: &str = "homoCoeffZ";

/// Longest excerpt of offending text kept in error messages.
const EXCERPT_LEN: usize = 32;

/// Something a single log line tells the parser.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineEvent {
    /// A new chapter starts.
    Delimiter,
    /// Solver-reported relative residual.
    Relative(f64),
    /// Right-hand-side norm used to normalise subsequent residuals.
    Rhs(f64),
    /// Raw residual norm reached by the solver.
    Reach { residual: f64 },
    /// The open chapter is complete.
    Terminator,
}

/// Classifies one line into its events, in marker order.
///
/// `line_no` is only used to label errors.
pub fn classify(line_no: usize, line: &str) -> Result<Vec<LineEvent>> {
    let mut events = Vec::new();

    if line.contains(DELIMITER) {
        events.push(LineEvent::Delimiter);
    }

    if let Some(tail) = after(line, RELATIVE) {
        let (value, _) = scan_number(tail).ok_or_else(|| invalid(line_no, RELATIVE, tail))?;
        events.push(LineEvent::Relative(value));
    }

    if let Some(tail) = after(line, RHS) {
        if let Some(end) = tail.find(RHS_END) {
            events.push(LineEvent::Rhs(parse_exact(line_no, RHS, &tail[..end])?));
        }
    }

    if line.contains(REACH) {
        let tail = after(line, RESIDUAL).ok_or(HistoryError::MissingField {
            line: line_no,
            field: RESIDUAL,
        })?;
        let end = tail.find(RESIDUAL_END).ok_or(HistoryError::MissingField {
            line: line_no,
            field: RESIDUAL_END,
        })?;
        let residual = parse_exact(line_no, RESIDUAL, &tail[..end])?;
        events.push(LineEvent::Reach { residual });
    }

    if line.contains(TERMINATOR) {
        events.push(LineEvent::Terminator);
    }

    Ok(events)
}

/// Scans a floating-point literal at the start of `text`.
///
/// Accepts an optional sign, a mantissa with at least one digit and an optional
/// exponent, or one of the words `inf`, `infinity` and `nan` in any case. Returns the
/// value and the number of bytes consumed; trailing text is left alone.
pub fn scan_number(text: &str) -> Option<(f64, usize)> {
    let bytes = text.as_bytes();
    let digits = |from: usize| {
        bytes
            .get(from..)
            .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    for word in ["infinity", "inf", "nan"] {
        let candidate = text.get(end..end + word.len());
        if candidate.is_some_and(|candidate| candidate.eq_ignore_ascii_case(word)) {
            let len = end + word.len();
            return text[..len].parse().ok().map(|value| (value, len));
        }
    }

    let integer = digits(end);
    end += integer;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits(end + 1);
        if integer + fraction > 0 {
            end += 1 + fraction;
        }
    }
    if integer + fraction == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let exponent_digits = digits(exponent);
        if exponent_digits > 0 {
            end = exponent + exponent_digits;
        }
    }

    text[..end].parse().ok().map(|value| (value, end))
}

/// Text following the first occurrence of `marker`.
fn after<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    line.find(marker).map(|begin| &line[begin + marker.len()..])
}

/// Parses a delimited field that must consist of exactly one number.
fn parse_exact(line_no: usize, field: &'static str, text: &str) -> Result<f64> {
    text.trim()
        .parse()
        .map_err(|_| invalid(line_no, field, text))
}

fn invalid(line_no: usize, field: &'static str, text: &str) -> HistoryError {
    HistoryError::InvalidNumber {
        line: line_no,
        field,
        text: text.trim().chars().take(EXCERPT_LEN).collect(),
    }
}
