pub mod chart;
pub mod dataset;
pub mod menu;
pub mod profile;
pub mod report;
pub mod simulate;
pub mod timeline;

use std::path::{Path, PathBuf};

use timeline::Timeline;

/// `<name>_army_integration_data_<start>_<end>.<ext>` under `dir`.
pub fn dataset_path(dir: &Path, name: &str, timeline: &Timeline, ext: &str) -> PathBuf {
    dir.join(format!(
        "{}_army_integration_data_{}_{}.{}",
        name, timeline.start, timeline.end, ext
    ))
}

pub fn chart_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}_army_integration_analysis.png", name))
}

pub fn insights_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}_army_integration_insights.json", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names_follow_selection() {
        let dir = Path::new("out");
        let t = Timeline::default();
        assert_eq!(
            dataset_path(dir, "EU-27", &t, "csv"),
            Path::new("out/EU-27_army_integration_data_2017_2027.csv")
        );
        assert_eq!(
            chart_path(dir, "Land Forces"),
            Path::new("out/Land Forces_army_integration_analysis.png")
        );
        assert_eq!(
            insights_path(dir, "France"),
            Path::new("out/France_army_integration_insights.json")
        );
    }
}
