use crate::error::{GraphLogError, Result};
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const THUMB_WIDTH: u32 = 200;

/// A chart produced for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    pub device: String,
    pub stem: String,
}

impl Chart {
    pub fn image_href(&self) -> String {
        format!("graphs/{}.png", self.stem)
    }
}

/// Writes the index page linking every chart, sorted by device name.
pub fn write_index(path: &Path, charts: &[Chart], generated_at: DateTime<Local>) -> Result<()> {
    let file = File::create(path).map_err(|e| GraphLogError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(render(charts, generated_at).as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| GraphLogError::io(path, e))
}

pub fn render(charts: &[Chart], generated_at: DateTime<Local>) -> String {
    let stamp = generated_at.format("%Y-%m-%d %H:%M:%S");
    let mut sorted: Vec<&Chart> = charts.iter().collect();
    sorted.sort_by(|a, b| a.device.cmp(&b.device));

    let mut html = String::new();
    html.push_str(&format!(
        "<html><head><title>HomeSeer Graphs generated at {}</title></head>\n",
        stamp
    ));
    html.push_str("<body><font face=\"arial\">\n");
    html.push_str(&format!(
        "<p>HomeSeer Device Graphs generated at {}</p>\n",
        stamp
    ));
    for chart in sorted {
        let href = escape_html(&chart.image_href());
        html.push_str(&format!(
            "<br><a href=\"{0}\"><img src=\"{0}\" width=\"{1}\"> {2}</a>\n",
            href,
            THUMB_WIDTH,
            escape_html(&chart.device)
        ));
    }
    html.push_str("</font></body></html>\n");
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
