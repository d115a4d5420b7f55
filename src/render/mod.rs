pub mod gnuplot;
pub mod index;

use crate::config::Layout;
use crate::error::{GraphLogError, Result};
use crate::series::SeriesMap;
use chrono::Local;
use gnuplot::Gnuplot;
use index::Chart;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Renders one chart per device, then the index page.
pub struct Renderer {
    layout: Layout,
    gnuplot: Gnuplot,
}

impl Renderer {
    pub fn new(layout: Layout, program: impl Into<String>) -> Self {
        let gnuplot = Gnuplot::new(
            program,
            layout.data_file.clone(),
            layout.script_file.clone(),
        );
        Self { layout, gnuplot }
    }

    /// Creates the image directory; an existing one is fine.
    pub fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.layout.graphs_dir)
            .map_err(|e| GraphLogError::io(&self.layout.graphs_dir, e))
    }

    /// Charts every renderable device in turn and returns what was charted.
    pub fn render_charts(&self, series: &SeriesMap) -> Result<Vec<Chart>> {
        let mut charts = Vec::new();
        let mut stems = HashSet::new();
        for (device, points) in series.renderable() {
            let stem = unique_stem(device, &mut stems);
            self.gnuplot.prepare(&self.layout.graphs_dir, points)?;

            // Spawn errors and non-zero exits are not inspected; gnuplot
            // reports them on its own output.
            let _ = self.gnuplot.plot(device, &stem);

            charts.push(Chart {
                device: device.to_string(),
                stem,
            });
        }
        debug!(
            skipped = series.len() - charts.len(),
            "devices with too few points to chart"
        );
        Ok(charts)
    }

    pub fn render(&self, series: &SeriesMap) -> Result<Vec<Chart>> {
        self.prepare()?;
        let charts = self.render_charts(series)?;
        index::write_index(&self.layout.index_file, &charts, Local::now())?;
        info!(
            charts = charts.len(),
            index = %self.layout.index_file.display(),
            "wrote index"
        );
        Ok(charts)
    }
}

/// File-name-safe form of a device name, used for the image and its link.
pub fn file_stem(device: &str) -> String {
    device
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `file_stem`, suffixed `_2`, `_3`, ... when another device already took it.
fn unique_stem(device: &str, taken: &mut HashSet<String>) -> String {
    let base = file_stem(device);
    let mut stem = base.clone();
    let mut n = 1;
    while taken.contains(&stem) {
        n += 1;
        stem = format!("{}_{}", base, n);
    }
    if n > 1 {
        warn!(device, stem = %stem, "image name already in use, renamed");
    }
    taken.insert(stem.clone());
    stem
}
