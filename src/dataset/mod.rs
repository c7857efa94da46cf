// src/dataset/mod.rs

use anyhow::{anyhow, bail, Result};
use std::fmt::Write as _;

use crate::timeline::Timeline;

pub mod arrow;
pub mod write;

pub use write::{write_csv, write_parquet};

/// Name of the key column, always first.
pub const YEAR: &str = "Year";

pub const DEFENSE_BUDGET: &str = "Defense_Budget";
pub const PERSONNEL: &str = "Personnel";
pub const PESCO_PROJECTS: &str = "PESCO_Projects";
pub const JOINT_EXERCISES: &str = "Joint_Exercises";
pub const INTEROPERABILITY: &str = "Interoperability";
pub const PROJECTION_CAPACITY: &str = "Projection_Capacity";
pub const REACTION_TIME: &str = "Reaction_Time";
pub const INTEROPERABLE_EQUIPMENT: &str = "Interoperable_Equipment";
pub const ECONOMIES_OF_SCALE: &str = "Economies_Of_Scale";
pub const REDUNDANCY_REDUCTION: &str = "Redundancy_Reduction";
pub const OPERATIONAL_EFFICIENCY: &str = "Operational_Efficiency";
pub const CYBER_CAPACITY: &str = "Cyber_Capacity";
pub const INTELLIGENCE_SHARING: &str = "Intelligence_Sharing";
pub const CONCERTED_DETERRENCE: &str = "Concerted_Deterrence";

/// Prefix of the per-country columns of a component dataset.
pub const CONTRIBUTION_PREFIX: &str = "Contribution_";

/// Columns shown by [`YearTable::preview`] in the CLI.
pub const PREVIEW_COLUMNS: &[&str] = &[
    YEAR,
    INTEROPERABILITY,
    PROJECTION_CAPACITY,
    PESCO_PROJECTS,
    ECONOMIES_OF_SCALE,
];

pub fn contribution_column(country: &str) -> String {
    format!("{}{}", CONTRIBUTION_PREFIX, country)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Year-keyed table. Columns keep insertion order and every column holds
/// exactly one value per year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearTable {
    years: Vec<i32>,
    columns: Vec<Column>,
}

impl YearTable {
    pub fn new(timeline: &Timeline) -> Self {
        let mut years = Vec::with_capacity(timeline.len());
        years.extend(timeline.years());
        Self {
            years,
            columns: Vec::new(),
        }
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn num_rows(&self) -> usize {
        self.years.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Header row: `Year` followed by the metric columns.
    pub fn column_names(&self) -> Vec<&str> {
        std::iter::once(YEAR)
            .chain(self.columns.iter().map(|c| c.name.as_str()))
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if name == YEAR || self.has_column(&name) {
            bail!("duplicate column `{}`", name);
        }
        if values.len() != self.years.len() {
            bail!(
                "column `{}` has {} values, expected {}",
                name,
                values.len(),
                self.years.len()
            );
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut [f64]> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| c.values.as_mut_slice())
    }

    /// Like [`get`](Self::get) but an error names the missing column.
    pub fn require(&self, name: &str) -> Result<&[f64]> {
        self.get(name)
            .ok_or_else(|| anyhow!("column `{}` missing from dataset", name))
    }

    /// Mean of `name` over the years matching `pred`; `None` when no year matches.
    pub fn mean_where(&self, name: &str, pred: impl Fn(i32) -> bool) -> Option<f64> {
        let values = self.get(name)?;
        let (sum, n) = self
            .years
            .iter()
            .zip(values)
            .filter(|(y, _)| pred(**y))
            .fold((0.0, 0usize), |(s, n), (_, v)| (s + v, n + 1));
        (n > 0).then(|| sum / n as f64)
    }

    /// Fixed-width text of the first `rows` rows of `columns` (unknown columns skipped).
    pub fn preview(&self, columns: &[&str], rows: usize) -> String {
        let shown: Vec<&str> = columns
            .iter()
            .copied()
            .filter(|c| *c == YEAR || self.has_column(c))
            .collect();
        let width = shown.iter().map(|c| c.len()).max().unwrap_or(0).max(8) + 2;

        let mut out = String::new();
        for c in &shown {
            let _ = write!(out, "{:>width$}", c, width = width);
        }
        out.push('\n');
        for (i, year) in self.years.iter().enumerate().take(rows) {
            for c in &shown {
                if *c == YEAR {
                    let _ = write!(out, "{:>width$}", year, width = width);
                } else if let Some(v) = self.get(c) {
                    let _ = write!(out, "{:>width$.2}", v[i], width = width);
                }
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> YearTable {
        let t = Timeline::new(2015, 2019).unwrap();
        let mut tbl = YearTable::new(&t);
        tbl.add_column(INTEROPERABILITY, vec![45.0, 45.0, 55.0, 65.0, 75.0])
            .unwrap();
        tbl
    }

    #[test]
    fn rejects_wrong_length_and_duplicates() {
        let mut tbl = table();
        assert!(tbl.add_column(REACTION_TIME, vec![1.0]).is_err());
        assert!(tbl.add_column(INTEROPERABILITY, vec![0.0; 5]).is_err());
        assert!(tbl.add_column(YEAR, vec![0.0; 5]).is_err());
        assert_eq!(tbl.column_names(), vec![YEAR, INTEROPERABILITY]);
    }

    #[test]
    fn mean_splits_on_year() {
        let tbl = table();
        assert_eq!(tbl.mean_where(INTEROPERABILITY, |y| y < 2017), Some(45.0));
        assert_eq!(tbl.mean_where(INTEROPERABILITY, |y| y >= 2017), Some(65.0));
        assert_eq!(tbl.mean_where(INTEROPERABILITY, |y| y > 2030), None);
        assert_eq!(tbl.mean_where(REACTION_TIME, |_| true), None);
    }

    #[test]
    fn preview_limits_rows_and_skips_unknown() {
        let tbl = table();
        let text = tbl.preview(PREVIEW_COLUMNS, 3);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains(INTEROPERABILITY));
        assert!(!lines[0].contains(PESCO_PROJECTS));
        assert!(lines[3].contains("2017"));
        assert!(lines[3].contains("55.00"));
    }
}
