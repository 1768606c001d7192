//! Grid of log-scale convergence plots with one shared legend.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{HistoryError, Result};
use crate::history::{Chapter, Dataset};
use crate::layout::GridLayout;

/// Height of the legend strip above the grid.
const LEGEND_HEIGHT: u32 = 44;
/// Horizontal room reserved for one legend entry.
const LEGEND_ENTRY_WIDTH: i32 = 150;
const FONT: &str = "sans-serif";

/// Line colours, cycled in series order.
const SERIES_COLORS: [RGBColor; 5] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
];

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// One solver's chapter inside a panel.
struct PanelEntry<'a> {
    /// Position of the solver in the legend, which fixes its colour.
    index: usize,
    label: &'a str,
    chapter: &'a Chapter,
}

fn series_color(index: usize) -> RGBColor {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

/// Renders every `(label, dataset)` pair into an SVG grid at `output`.
///
/// Row `i` holds configuration `i`, column `j` contrast `j`. Each panel overlays the
/// matching chapter of every dataset. Datasets must cover the whole layout.
pub fn render(
    series: &[(String, Dataset)],
    layout: &GridLayout,
    output: &Path,
    size: (u32, u32),
) -> Result<()> {
    for (label, dataset) in series {
        layout.require(dataset, label)?;
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| HistoryError::io(parent, source))?;
    }

    let root = SVGBackend::new(output, size).into_drawing_area();
    root.fill(&WHITE).map_err(HistoryError::render)?;
    let (legend_area, grid_area) = root.split_vertically(LEGEND_HEIGHT);

    let labels: Vec<&str> = series.iter().map(|(label, _)| label.as_str()).collect();
    draw_legend(&legend_area, &labels)?;

    let (rows, cols) = layout.shape();
    let panels = grid_area.split_evenly((rows, cols));
    for (row, configuration) in layout.configurations().iter().enumerate() {
        for (col, contrast) in layout.contrasts().iter().enumerate() {
            let entries: Vec<PanelEntry<'_>> = series
                .iter()
                .enumerate()
                .filter_map(|(index, (label, dataset))| {
                    layout
                        .chapter(dataset, row, col)
                        .map(|chapter| PanelEntry {
                            index,
                            label: label.as_str(),
                            chapter,
                        })
                })
                .collect();
            let title = format!("config-{configuration}, κ_inc={contrast}");
            draw_panel(&panels[row * cols + col], &title, &entries, col == 0)?;
        }
    }

    root.present().map_err(HistoryError::render)?;
    log::info!("rendered {rows}x{cols} panels to `{}`", output.display());
    Ok(())
}

fn draw_legend(area: &Area<'_>, labels: &[&str]) -> Result<()> {
    let (width, height) = area.dim_in_pixel();
    let (width, height) = (width as i32, height as i32);
    let total = LEGEND_ENTRY_WIDTH * labels.len() as i32;
    let mut x = ((width - total) / 2).max(8);
    let y = height / 2;

    area.draw(&Rectangle::new(
        [(x - 8, 6), (x + total, height - 6)],
        BLACK.mix(0.6).stroke_width(1),
    ))
    .map_err(HistoryError::render)?;

    for (index, label) in labels.iter().enumerate() {
        let color = series_color(index);
        area.draw(&PathElement::new(
            vec![(x, y), (x + 28, y)],
            color.stroke_width(2),
        ))
        .map_err(HistoryError::render)?;
        area.draw(&Text::new(
            label.to_string(),
            (x + 34, y - 7),
            (FONT, 14).into_font(),
        ))
        .map_err(HistoryError::render)?;
        x += LEGEND_ENTRY_WIDTH;
    }
    Ok(())
}

fn draw_panel(
    area: &Area<'_>,
    title: &str,
    entries: &[PanelEntry<'_>],
    y_labels: bool,
) -> Result<()> {
    let chapters: Vec<&Chapter> = entries.iter().map(|entry| entry.chapter).collect();
    let (y_lo, y_hi) = value_bounds(&chapters);
    let x_hi = chapters
        .iter()
        .map(|chapter| chapter.len().saturating_sub(1))
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 14))
        .margin(6)
        .x_label_area_size(24)
        .y_label_area_size(if y_labels { 52 } else { 8 })
        .build_cartesian_2d(0f64..x_hi, (y_lo..y_hi).log_scale())
        .map_err(HistoryError::render)?;

    let scientific = |value: &f64| format!("{value:.0e}");
    let blank = |_: &f64| String::new();
    let y_formatter: &dyn Fn(&f64) -> String = if y_labels { &scientific } else { &blank };
    let x_formatter = |value: &f64| format!("{value:.0}");

    chart
        .configure_mesh()
        .x_labels(5)
        .y_labels(6)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(y_formatter)
        .draw()
        .map_err(HistoryError::render)?;

    for entry in entries {
        let points: Vec<(f64, f64)> = entry
            .chapter
            .points()
            .filter(|(_, value)| value.is_finite() && *value > 0.0)
            .collect();
        if points.len() < entry.chapter.len() {
            log::warn!(
                "{}",
                skipped_samples_warning(title, entry.label, entry.chapter.len() - points.len())
            );
        }
        let style = series_color(entry.index).stroke_width(2);
        chart
            .draw_series(LineSeries::new(points, style))
            .map_err(HistoryError::render)?;
    }
    Ok(())
}

fn skipped_samples_warning(title: &str, label: &str, skipped: usize) -> String {
    format!("{title}: skipping {skipped} samples of `{label}` that cannot be drawn on a log axis")
}

/// Log-axis bounds enclosing every positive finite sample, padded slightly.
fn value_bounds(chapters: &[&Chapter]) -> (f64, f64) {
    let (lo, hi) = chapters
        .iter()
        .flat_map(|chapter| chapter.values())
        .filter(|value| value.is_finite() && *value > 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), value| {
            (lo.min(value), hi.max(value))
        });
    if lo > hi {
        return (0.1, 10.0);
    }
    if lo == hi {
        return (lo / 10.0, hi * 10.0);
    }
    (lo / 1.5, hi * 1.5)
}
