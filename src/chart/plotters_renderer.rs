use crate::chart::{ChartRenderer, ChartSpec};
use crate::config::{DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH};
use crate::model::ChartError;
use chrono::{DateTime, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const MARKER_RADIUS: i32 = 3;
const MARKER_ALPHA: f64 = 0.6;

/// Draws the chart to an image file. `.svg` paths get vector output, anything
/// else a bitmap.
pub struct PlottersRenderer {
    path: PathBuf,
    size: (u32, u32),
}

impl PlottersRenderer {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            size: (DEFAULT_CHART_WIDTH, DEFAULT_CHART_HEIGHT),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    fn is_svg(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render(&mut self, chart: &ChartSpec) -> Result<(), ChartError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        if self.is_svg() {
            draw(SVGBackend::new(&self.path, self.size).into_drawing_area(), chart)?;
        } else {
            draw(BitMapBackend::new(&self.path, self.size).into_drawing_area(), chart)?;
        }

        info!("Chart written to {}", self.path.display());
        Ok(())
    }
}

fn backend_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Backend(e.to_string())
}

fn draw<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, spec: &ChartSpec) -> Result<(), ChartError> {
    root.fill(&WHITE).map_err(backend_err)?;

    let (y_min, y_max) = spec.price_bounds();
    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(spec.window.start..spec.window.end, y_min..y_max)
        .map_err(backend_err)?;

    let time_label = |t: &DateTime<Utc>| t.format("%H:%M:%S").to_string();
    chart
        .configure_mesh()
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .x_label_formatter(&time_label)
        .draw()
        .map_err(backend_err)?;

    chart
        .draw_series(LineSeries::new(spec.price_line.iter().copied(), BLACK.stroke_width(1)))
        .map_err(backend_err)?
        .label("Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    let green = GREEN.mix(MARKER_ALPHA);
    chart
        .draw_series(
            spec.positive_si
                .iter()
                .map(|&p| Circle::new(p, MARKER_RADIUS, green.filled())),
        )
        .map_err(backend_err)?
        .label("Positive SI")
        .legend(move |(x, y)| Circle::new((x + 10, y), MARKER_RADIUS, green.filled()));

    let red = RED.mix(MARKER_ALPHA);
    chart
        .draw_series(
            spec.negative_si
                .iter()
                .map(|&p| Circle::new(p, MARKER_RADIUS, red.filled())),
        )
        .map_err(backend_err)?
        .label("Negative SI")
        .legend(move |(x, y)| Circle::new((x + 10, y), MARKER_RADIUS, red.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(backend_err)?;

    root.present().map_err(backend_err)?;
    Ok(())
}
