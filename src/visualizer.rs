// src/visualizer.rs
use crate::forecast::ForecastSeries;
use crate::i18n::{Language, UiText};
use crate::types::SeriesPoint;
use anyhow::{Context, Result};
use eframe::egui;
use egui::Color32;
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints, Points};
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const VALUE_COLOR: Color32 = Color32::from_rgb(0, 0, 255);
const MIN_COLOR: Color32 = Color32::from_rgb(0, 255, 255);
const MAX_COLOR: Color32 = Color32::from_rgb(255, 165, 0);
const OUTLIER_COLOR: Color32 = Color32::from_rgb(255, 0, 0);

const PNG_SIZE: (u32, u32) = (900, 600);

/// What a rendering surface needs: the series, the outliers for the selected
/// bearing, and the captions.
pub struct PlotModel<'a> {
    pub series: &'a ForecastSeries,
    pub outliers: &'a [SeriesPoint],
    pub title: &'a str,
    pub subtitle: Option<String>,
}

fn xy(points: &[SeriesPoint], f: impl Fn(&SeriesPoint) -> f64) -> Vec<[f64; 2]> {
    points.iter().map(|p| [f64::from(p.index), f(p)]).collect()
}

/// Draws the value line, both band lines and the outlier markers.
pub fn draw_forecast(ui: &mut egui::Ui, model: &PlotModel<'_>, lang: Language) {
    ui.vertical_centered(|ui| {
        ui.heading(model.title);
        if let Some(sub) = &model.subtitle {
            ui.label(sub.as_str());
        }
    });

    let points = model.series.points();
    Plot::new("forecast_plot")
        .legend(Legend::default())
        .x_axis_label(lang.text(UiText::AxisTime))
        .y_axis_label(lang.text(UiText::AxisVibration))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::new(xy(points, |p| p.value)))
                    .name(lang.text(UiText::Forecast))
                    .color(VALUE_COLOR)
                    .width(2.0),
            );
            plot_ui.line(
                Line::new(PlotPoints::new(xy(points, |p| p.lower_bound)))
                    .name(lang.text(UiText::ForecastMin))
                    .color(MIN_COLOR)
                    .style(LineStyle::dashed_loose()),
            );
            plot_ui.line(
                Line::new(PlotPoints::new(xy(points, |p| p.upper_bound)))
                    .name(lang.text(UiText::ForecastMax))
                    .color(MAX_COLOR)
                    .style(LineStyle::dashed_loose()),
            );
            if !model.outliers.is_empty() {
                plot_ui.points(
                    Points::new(PlotPoints::new(xy(model.outliers, |p| p.value)))
                        .name(lang.text(UiText::Outliers))
                        .color(OUTLIER_COLOR)
                        .radius(5.0),
                );
            }
        });
}

fn rgb(c: Color32) -> RGBColor {
    RGBColor(c.r(), c.g(), c.b())
}

/// Renders the same figure into an RGB buffer of `size`.
pub fn render_forecast_rgb(model: &PlotModel<'_>, lang: Language, size: (u32, u32)) -> Result<Vec<u8>> {
    let (w, h) = size;
    let mut buf = vec![0u8; (w * h * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        root.fill(&WHITE)?;

        let points = model.series.points();
        let x_max = points.last().map(|p| f64::from(p.index)).unwrap_or(1.0);
        let (y_lo, y_hi) = model.series.y_range().unwrap_or((0.0, 1.0));
        let margin = ((y_hi - y_lo) * 0.05).max(0.5);

        let caption = match &model.subtitle {
            Some(sub) => format!("{} ({sub})", model.title),
            None => model.title.to_owned(),
        };
        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0.5f64..x_max + 0.5, (y_lo - margin)..(y_hi + margin))?;

        chart
            .configure_mesh()
            .x_desc(lang.text(UiText::AxisTime))
            .y_desc(lang.text(UiText::AxisVibration))
            .draw()?;

        let lines: [(UiText, Color32, fn(&SeriesPoint) -> f64); 3] = [
            (UiText::Forecast, VALUE_COLOR, |p| p.value),
            (UiText::ForecastMin, MIN_COLOR, |p| p.lower_bound),
            (UiText::ForecastMax, MAX_COLOR, |p| p.upper_bound),
        ];
        for (label, color, f) in lines {
            let color = rgb(color);
            chart
                .draw_series(LineSeries::new(
                    points.iter().map(|p| (f64::from(p.index), f(p))),
                    color.stroke_width(2),
                ))?
                .label(lang.text(label))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        if !model.outliers.is_empty() {
            let red = rgb(OUTLIER_COLOR);
            chart
                .draw_series(
                    model
                        .outliers
                        .iter()
                        .map(|p| Circle::new((f64::from(p.index), p.value), 5, red.filled())),
                )?
                .label(lang.text(UiText::Outliers))
                .legend(move |(x, y)| Circle::new((x + 10, y), 4, red.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;
        root.present()?;
    }
    Ok(buf)
}

/// Writes the figure as `reports/forecast_<unix ts>.png` and returns the path.
pub fn export_forecast_png(model: &PlotModel<'_>, lang: Language, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let ts = SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let path = dir.join(format!("forecast_{ts}.png"));

    let (w, h) = PNG_SIZE;
    let buf = render_forecast_rgb(model, lang, PNG_SIZE)?;
    let img = image::RgbImage::from_raw(w, h, buf).context("plot buffer has the wrong size")?;
    img.save(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("plot exported to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xy_uses_index_as_x() {
        let series = ForecastSeries::ramp(3, 1.0);
        assert_eq!(
            xy(series.points(), |p| p.upper_bound),
            vec![[1.0, 2.0], [2.0, 3.0], [3.0, 4.0]]
        );
    }
}
