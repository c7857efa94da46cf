// src/report/mod.rs

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::{
    fmt::{self, Write as _},
    fs,
    io::Write,
    path::Path,
};

use crate::dataset::{
    YearTable, DEFENSE_BUDGET, ECONOMIES_OF_SCALE, INTEROPERABILITY, JOINT_EXERCISES,
    PESCO_PROJECTS, PROJECTION_CAPACITY, REACTION_TIME, REDUNDANCY_REDUCTION,
};
use crate::dataset::write::{commit_tmp, tmp_path};
use crate::profile::{types, Profile, ProfileKind};
use crate::timeline::Timeline;

/// Relative change first → last year. Undefined when the series starts at zero.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(untagged)]
pub enum Growth {
    Pct(f64),
    Undefined,
}

impl Growth {
    pub fn of(values: &[f64]) -> Self {
        match (values.first(), values.last()) {
            (Some(&first), Some(&last)) if first != 0.0 => {
                Growth::Pct((last - first) / first * 100.0)
            }
            _ => Growth::Undefined,
        }
    }
}

impl fmt::Display for Growth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Growth::Pct(p) => write!(f, "{:.1}%", p),
            Growth::Undefined => f.write_str("n/a"),
        }
    }
}

pub static KEY_EVENTS: &[&str] = &[
    "2017: launch of PESCO (Permanent Structured Cooperation)",
    "2017-2019: first joint projects set up",
    "2020: COVID-19 pandemic hits joint exercises",
    "2021-2022: recovery and acceleration of integration",
    "2023-2027: projects take full effect and capabilities mature",
];

fn recommendations(profile: &Profile) -> Vec<String> {
    let mut out: Vec<&str> = match profile.kind {
        ProfileKind::MemberState | ProfileKind::Union => vec![
            "Keep harmonising equipment and doctrine",
            "Develop common force projection capabilities",
            "Strengthen cooperation on cyber defence",
            "Increase multinational joint exercises",
        ],
        ProfileKind::Component => vec![
            "Standardise equipment and procedures",
            "Build specialised centres of excellence",
            "Improve interoperability of command systems",
            "Create permanent multinational brigades",
        ],
    };
    if profile.kind.is_national() {
        if profile.has_specialisation(types::CYBERDEFENSE) {
            out.push("Stand up an integrated European cyber command");
            out.push("Invest in training and recruiting cyber experts");
        }
        if profile.has_specialisation(types::INTELLIGENCE) {
            out.push("Share intelligence in real time");
            out.push("Create joint analysis centres");
        }
        if profile.has_specialisation(types::NUCLEAR_DETERRENT) {
            out.push("Develop a concerted deterrence doctrine");
            out.push("Deepen the European strategic dialogue");
        }
    }
    out.into_iter().map(String::from).collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Figures and narrative derived from one generated dataset.
#[derive(Debug, Serialize)]
pub struct Insights {
    pub name: String,
    pub kind: ProfileKind,
    pub start_year: i32,
    pub end_year: i32,
    /// Year-end dates of the first and last simulated year.
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub generated_at: DateTime<Utc>,
    pub interoperability_growth: Growth,
    pub projection_growth: Growth,
    pub mean_reaction_time_days: f64,
    pub total_economies_bn: f64,
    pub mean_redundancy_reduction_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_growth: Option<Growth>,
    pub pesco_growth: Growth,
    pub exercises_growth: Growth,
    pub specialisations: Vec<String>,
    pub equipment: Vec<String>,
    pub contributors: Vec<String>,
    pub key_events: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Insights {
    pub fn compute(profile: &Profile, timeline: &Timeline, table: &YearTable) -> Result<Self> {
        let budget_growth = match profile.kind {
            ProfileKind::MemberState | ProfileKind::Union => table.get(DEFENSE_BUDGET).map(Growth::of),
            ProfileKind::Component => None,
        };
        let year_ends = timeline.year_ends();
        Ok(Self {
            name: profile.name.clone(),
            kind: profile.kind,
            start_year: timeline.start,
            end_year: timeline.end,
            period_start: year_ends.first().copied(),
            period_end: year_ends.last().copied(),
            generated_at: Utc::now(),
            interoperability_growth: Growth::of(table.require(INTEROPERABILITY)?),
            projection_growth: Growth::of(table.require(PROJECTION_CAPACITY)?),
            mean_reaction_time_days: mean(table.require(REACTION_TIME)?),
            total_economies_bn: table.require(ECONOMIES_OF_SCALE)?.iter().sum(),
            mean_redundancy_reduction_pct: mean(table.require(REDUNDANCY_REDUCTION)?),
            budget_growth,
            pesco_growth: Growth::of(table.require(PESCO_PROJECTS)?),
            exercises_growth: Growth::of(table.require(JOINT_EXERCISES)?),
            specialisations: profile.specialisations.clone(),
            equipment: profile.equipment.clone(),
            contributors: profile.contributors.clone(),
            key_events: KEY_EVENTS.iter().map(|s| s.to_string()).collect(),
            recommendations: recommendations(profile),
        })
    }

    /// The narrative report printed after the chart.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) -> fmt::Result {
        writeln!(
            out,
            "ANALYTICAL INSIGHTS - European Military Integration - {}",
            self.name
        )?;
        writeln!(out, "{}", "=".repeat(80))?;

        writeln!(out, "\n1. OPERATIONAL IMPACT:")?;
        writeln!(
            out,
            "Interoperability improvement ({}-{}): {}",
            self.start_year, self.end_year, self.interoperability_growth
        )?;
        writeln!(
            out,
            "Projection capacity improvement: {}",
            self.projection_growth
        )?;
        writeln!(
            out,
            "Mean reaction time: {:.1} days",
            self.mean_reaction_time_days
        )?;

        writeln!(out, "\n2. ECONOMIC IMPACT:")?;
        writeln!(
            out,
            "Total economies of scale: {:.2} bn EUR",
            self.total_economies_bn
        )?;
        writeln!(
            out,
            "Mean redundancy reduction: {:.1}%",
            self.mean_redundancy_reduction_pct
        )?;
        if let Some(g) = self.budget_growth {
            writeln!(out, "Defense budget growth: {}", g)?;
        }

        writeln!(out, "\n3. EUROPEAN COOPERATION:")?;
        writeln!(out, "PESCO project growth: {}", self.pesco_growth)?;
        writeln!(out, "Joint exercise growth: {}", self.exercises_growth)?;

        writeln!(out, "\n4. SPECIFICS OF {}:", self.name.to_uppercase())?;
        writeln!(out, "Type: {}", self.kind.as_str())?;
        match self.kind {
            ProfileKind::MemberState | ProfileKind::Union => {
                writeln!(out, "Specialisations: {}", self.specialisations.join(", "))?;
                writeln!(out, "Common equipment: {}", self.equipment.join(", "))?;
            }
            ProfileKind::Component => {
                writeln!(out, "Contributing countries: {}", self.contributors.join(", "))?;
                writeln!(out, "Key equipment: {}", self.equipment.join(", "))?;
            }
        }

        writeln!(out, "\n5. KEY EVENTS:")?;
        for e in &self.key_events {
            writeln!(out, "• {}", e)?;
        }

        writeln!(out, "\n6. STRATEGIC RECOMMENDATIONS:")?;
        for r in &self.recommendations {
            writeln!(out, "• {}", r)?;
        }
        Ok(())
    }
}

/// Pretty JSON of `insights`, temp file then rename.
pub fn write_json<P: AsRef<Path>>(insights: &Insights, path: P) -> Result<()> {
    let path = path.as_ref();
    let tmp = tmp_path(path);
    let written = (|| -> Result<()> {
        let mut f = fs::File::create(&tmp).with_context(|| format!("creating {:?}", tmp))?;
        serde_json::to_writer_pretty(&mut f, insights).context("serializing insights")?;
        f.write_all(b"\n")
            .with_context(|| format!("writing {:?}", tmp))?;
        Ok(())
    })();
    commit_tmp(&tmp, path, written)
}
