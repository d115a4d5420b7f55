use std::path::{Path, PathBuf};

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 600;
pub const CHART_COLOR: &str = "#0080A0";
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fixed file layout of a HomeSeer installation, rooted at `base`.
#[derive(Debug, Clone)]
pub struct Layout {
    pub log_store: PathBuf,
    pub graphs_dir: PathBuf,
    pub index_file: PathBuf,
    pub data_file: PathBuf,
    pub script_file: PathBuf,
}

impl Layout {
    pub fn new(base: &Path) -> Self {
        let html_dir = base.join("html");
        Self {
            log_store: base.join("Logs").join("HomeSeerLog.hsd"),
            graphs_dir: html_dir.join("graphs"),
            index_file: html_dir.join("HSGraphLog.htm"),
            data_file: base.join("tempPlot.dat"),
            script_file: base.join("tempPlotCmd.plt"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_rooted_at_base() {
        let layout = Layout::new(Path::new("/opt/HomeSeer"));
        assert_eq!(
            layout.log_store,
            PathBuf::from("/opt/HomeSeer/Logs/HomeSeerLog.hsd")
        );
        assert_eq!(layout.graphs_dir, PathBuf::from("/opt/HomeSeer/html/graphs"));
        assert_eq!(
            layout.index_file,
            PathBuf::from("/opt/HomeSeer/html/HSGraphLog.htm")
        );
        assert_eq!(layout.data_file, PathBuf::from("/opt/HomeSeer/tempPlot.dat"));
    }
}
