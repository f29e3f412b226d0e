//! Pie-chart rendering for the `/graph` command.
//!
//! The router only depends on the bytes-in-bytes-out contract; the
//! production implementation draws an ECharts pie via charming's SSR
//! renderer and returns SVG bytes.

use anyhow::{Context, Result};
use charming::{
    Chart, ImageRenderer,
    component::{Legend, Title},
    datatype::DataPointItem,
    series::Pie,
};

/// Turns a category→value breakdown into image bytes.
pub trait ChartRenderer {
    fn render(&self, title: &str, by_category: &[(String, f64)]) -> Result<Vec<u8>>;
}

pub struct PieChartRenderer {
    width: u32,
    height: u32,
}

impl Default for PieChartRenderer {
    fn default() -> Self {
        Self {
            width: 720,
            height: 540,
        }
    }
}

impl ChartRenderer for PieChartRenderer {
    fn render(&self, title: &str, by_category: &[(String, f64)]) -> Result<Vec<u8>> {
        let data: Vec<DataPointItem> = by_category
            .iter()
            .map(|(name, value)| DataPointItem::new(*value).name(name))
            .collect();

        let chart = Chart::new()
            .title(Title::new().text(title).left("center"))
            .legend(Legend::new().bottom("0"))
            .series(Pie::new().radius("60%").data(data));

        let mut renderer = ImageRenderer::new(self.width, self.height);
        let svg = renderer.render(&chart).context("rendering pie chart")?;
        Ok(svg.into_bytes())
    }
}
