use crate::config::{CHART_COLOR, CHART_HEIGHT, CHART_WIDTH, TIME_FORMAT};
use crate::error::{GraphLogError, Result};
use crate::record::ValuePoint;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::info;

/// Drives an external gnuplot through a pair of transient files.
///
/// Both files are overwritten on every call, so plots must run one at a time.
pub struct Gnuplot {
    program: String,
    data_file: PathBuf,
    script_file: PathBuf,
}

impl Gnuplot {
    pub fn new(program: impl Into<String>, data_file: PathBuf, script_file: PathBuf) -> Self {
        Self {
            program: program.into(),
            data_file,
            script_file,
        }
    }

    /// Writes the transient files for one device.
    pub fn prepare(&self, graphs_dir: &Path, points: &[ValuePoint]) -> Result<()> {
        write_script(&self.script_file, graphs_dir, &self.data_file)?;
        write_data(&self.data_file, points)
    }

    /// Runs gnuplot synchronously. Output goes straight to our stdout/stderr.
    pub fn plot(&self, title: &str, stem: &str) -> io::Result<ExitStatus> {
        let options = options(title, stem);
        info!(
            "{} -e '{}' {}",
            self.program,
            options,
            self.script_file.display()
        );
        Command::new(&self.program)
            .arg("-e")
            .arg(&options)
            .arg(&self.script_file)
            .status()
    }
}

/// Inline `-e` option string: chart title and output image name.
pub fn options(title: &str, stem: &str) -> String {
    format!(
        "set title \"{}\"; graphname=\"{}.png\"",
        quote(title),
        quote(stem)
    )
}

pub fn script(graphs_dir: &Path, data_file: &Path) -> String {
    let mut s = String::with_capacity(512);
    s.push_str(&format!(
        "set terminal png size {},{}\n",
        CHART_WIDTH, CHART_HEIGHT
    ));
    s.push_str(&format!("cd \"{}\"\n", quote(&graphs_dir.to_string_lossy())));
    s.push_str("set xdata time\n");
    s.push_str(&format!("set timefmt \"{}\"\n", TIME_FORMAT));
    s.push_str("set grid\n");
    s.push_str("set datafile separator \",\"\n");
    s.push_str("unset key\n");
    s.push_str("set output graphname\n");
    s.push_str(&format!(
        "plot \"{}\" using 1:2 index 0 title \"\" with histeps lt rgb \"{}\"\n",
        quote(&data_file.to_string_lossy()),
        CHART_COLOR
    ));
    s
}

pub fn write_script(path: &Path, graphs_dir: &Path, data_file: &Path) -> Result<()> {
    std::fs::write(path, script(graphs_dir, data_file)).map_err(|e| GraphLogError::io(path, e))
}

/// One `timestamp,value` line per point, in series order.
pub fn write_data(path: &Path, points: &[ValuePoint]) -> Result<()> {
    let file = File::create(path).map_err(|e| GraphLogError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for p in points {
        writeln!(writer, "{},{}", p.timestamp, p.value).map_err(|e| GraphLogError::io(path, e))?;
    }
    writer.flush().map_err(|e| GraphLogError::io(path, e))
}

/// Reads a data file back. Lines without a parsable value are skipped.
#[cfg(test)]
pub fn read_data(path: &Path) -> Result<Vec<ValuePoint>> {
    let text = std::fs::read_to_string(path).map_err(|e| GraphLogError::io(path, e))?;
    Ok(text
        .lines()
        .filter_map(|line| {
            let (ts, value) = line.rsplit_once(',')?;
            let value = value.trim().parse::<f64>().ok()?;
            Some(ValuePoint::new(ts, value))
        })
        .collect())
}

/// Escapes a string for a double-quoted gnuplot string.
fn quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
