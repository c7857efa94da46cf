// src/simulate/mod.rs

use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::dataset::{self, YearTable};
use crate::profile::{types, Profile, ProfileKind};
use crate::timeline::Timeline;

pub mod curves;
pub mod events;

use curves::{Bounds, PhaseCurve};
pub use events::{apply_events, Event, EVENTS};

/// Limits of a generated column, if it has any.
pub fn column_bounds(name: &str) -> Bounds {
    let curve = match name {
        dataset::JOINT_EXERCISES => curves::JOINT_EXERCISES,
        dataset::INTEROPERABILITY => curves::INTEROPERABILITY,
        dataset::PROJECTION_CAPACITY => curves::PROJECTION_CAPACITY,
        dataset::REACTION_TIME => curves::REACTION_TIME,
        dataset::INTEROPERABLE_EQUIPMENT => curves::INTEROPERABLE_EQUIPMENT,
        dataset::ECONOMIES_OF_SCALE => curves::ECONOMIES_OF_SCALE,
        dataset::REDUNDANCY_REDUCTION => curves::REDUNDANCY_REDUCTION,
        dataset::OPERATIONAL_EFFICIENCY => curves::OPERATIONAL_EFFICIENCY,
        dataset::CYBER_CAPACITY => curves::CYBER_CAPACITY,
        dataset::INTELLIGENCE_SHARING => curves::INTELLIGENCE_SHARING,
        dataset::CONCERTED_DETERRENCE => curves::CONCERTED_DETERRENCE,
        dataset::PESCO_PROJECTS => return Bounds::at_least(0.0),
        n if n.starts_with(dataset::CONTRIBUTION_PREFIX) => curves::COUNTRY_CONTRIBUTION,
        _ => return Bounds::NONE,
    };
    curve.bounds
}

/// Specialisation tag → extra column and its curve.
fn specialisation_curve(tag: &str) -> Option<(&'static str, PhaseCurve)> {
    match tag {
        types::CYBERDEFENSE => Some((dataset::CYBER_CAPACITY, curves::CYBER_CAPACITY)),
        types::INTELLIGENCE => Some((dataset::INTELLIGENCE_SHARING, curves::INTELLIGENCE_SHARING)),
        types::NUCLEAR_DETERRENT => {
            Some((dataset::CONCERTED_DETERRENCE, curves::CONCERTED_DETERRENCE))
        }
        _ => None,
    }
}

/// Build the full dataset for `profile` over `timeline`: raw curves first,
/// then the event overlay, then the column bounds once more.
#[tracing::instrument(level = "info", skip(profile), fields(profile = %profile.name))]
pub fn generate_dataset(profile: &Profile, timeline: &Timeline) -> Result<YearTable> {
    info!(
        start = timeline.start,
        end = timeline.end,
        kind = profile.kind.as_str(),
        "generating integration data"
    );
    let mut table = YearTable::new(timeline);
    let years = table.years().to_vec();
    let kind = profile.kind;

    if kind.is_national() {
        let Some(budget_base) = profile.defense_budget_base else {
            bail!(
                "profile `{}` ({}) has no defense budget base",
                profile.name,
                kind.as_str()
            );
        };
        table.add_column(
            dataset::DEFENSE_BUDGET,
            curves::defense_budget(budget_base, kind, &years),
        )?;
        table.add_column(
            dataset::PERSONNEL,
            curves::personnel(profile.personnel_base, &years),
        )?;
    }

    let phase_columns: [(&str, PhaseCurve); 9] = [
        (
            dataset::PESCO_PROJECTS,
            curves::pesco_projects(profile.pesco_base()),
        ),
        (dataset::JOINT_EXERCISES, curves::JOINT_EXERCISES),
        (dataset::INTEROPERABILITY, curves::INTEROPERABILITY),
        (dataset::PROJECTION_CAPACITY, curves::PROJECTION_CAPACITY),
        (dataset::REACTION_TIME, curves::REACTION_TIME),
        (
            dataset::INTEROPERABLE_EQUIPMENT,
            curves::INTEROPERABLE_EQUIPMENT,
        ),
        (dataset::ECONOMIES_OF_SCALE, curves::ECONOMIES_OF_SCALE),
        (dataset::REDUNDANCY_REDUCTION, curves::REDUNDANCY_REDUCTION),
        (
            dataset::OPERATIONAL_EFFICIENCY,
            curves::OPERATIONAL_EFFICIENCY,
        ),
    ];
    for (name, curve) in phase_columns {
        table.add_column(name, curve.series(&years, kind))?;
    }

    match kind {
        ProfileKind::MemberState | ProfileKind::Union => {
            for tag in &profile.specialisations {
                if let Some((name, curve)) = specialisation_curve(tag) {
                    if table.has_column(name) {
                        continue;
                    }
                    debug!(tag = %tag, column = name, "specialisation column");
                    table.add_column(name, curve.series(&years, kind))?;
                }
            }
        }
        ProfileKind::Component => {
            for country in &profile.contributors {
                let name = dataset::contribution_column(country);
                if table.has_column(&name) {
                    continue;
                }
                table.add_column(name, curves::COUNTRY_CONTRIBUTION.series(&years, kind))?;
            }
        }
    }

    apply_events(&mut table, EVENTS);
    clamp_to_bounds(&mut table);

    debug!(
        columns = table.columns().len(),
        rows = table.num_rows(),
        "dataset ready"
    );
    Ok(table)
}

/// Hold every bounded column to its limits.
pub fn clamp_to_bounds(table: &mut YearTable) {
    let names: Vec<String> = table.columns().iter().map(|c| c.name.clone()).collect();
    for name in names {
        let bounds = column_bounds(&name);
        if bounds == Bounds::NONE {
            continue;
        }
        if let Some(values) = table.get_mut(&name) {
            for v in values.iter_mut() {
                *v = bounds.clamp(*v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::*;
    use crate::profile::Catalogue;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    const EPS: f64 = 1e-9;

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,eudefense::simulate=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn dataset_for(name: &str) -> YearTable {
        init_test_logging();
        let cat = Catalogue::builtin().unwrap();
        generate_dataset(&cat.resolve(name), &Timeline::default()).unwrap()
    }

    #[test]
    fn member_state_columns() {
        let tbl = dataset_for("Germany");
        assert_eq!(
            tbl.column_names(),
            vec![
                YEAR,
                DEFENSE_BUDGET,
                PERSONNEL,
                PESCO_PROJECTS,
                JOINT_EXERCISES,
                INTEROPERABILITY,
                PROJECTION_CAPACITY,
                REACTION_TIME,
                INTEROPERABLE_EQUIPMENT,
                ECONOMIES_OF_SCALE,
                REDUNDANCY_REDUCTION,
                OPERATIONAL_EFFICIENCY,
                CYBER_CAPACITY,
            ]
        );
        assert_eq!(tbl.num_rows(), 11);
    }

    #[test]
    fn specialisations_follow_profile_order() {
        let tbl = dataset_for("France");
        let names = tbl.column_names();
        let tail = &names[names.len() - 2..];
        assert_eq!(tail, &[CONCERTED_DETERRENCE, INTELLIGENCE_SHARING]);

        let eu = dataset_for("EU-27");
        assert!(eu.has_column(CYBER_CAPACITY));
        assert!(eu.has_column(INTELLIGENCE_SHARING));
        assert!(!eu.has_column(CONCERTED_DETERRENCE));
    }

    #[test]
    fn component_has_contributions_and_no_budget() {
        let tbl = dataset_for("Maritime Forces");
        assert!(!tbl.has_column(DEFENSE_BUDGET));
        assert!(!tbl.has_column(PERSONNEL));
        assert!(!tbl.has_column(CYBER_CAPACITY));
        for c in ["France", "Italy", "Spain", "Germany", "Netherlands"] {
            assert!(tbl.has_column(&contribution_column(c)), "missing {}", c);
        }
        // 2017: (10 + 2) * 0.5 * 1.10
        let ex = tbl.get(JOINT_EXERCISES).unwrap();
        assert!((ex[0] - 6.6).abs() < EPS);
    }

    #[test]
    fn overlay_values_for_known_years() {
        let tbl = dataset_for("EU-27");
        let idx = |y: i32| tbl.years().iter().position(|&x| x == y).unwrap();

        let interop = tbl.get(INTEROPERABILITY).unwrap();
        assert!((interop[idx(2017)] - 55.0 * 1.05).abs() < EPS);
        // 2021: (75 + 16) * 1.05 = 95.55
        assert!((interop[idx(2021)] - 95.55).abs() < EPS);
        // 2022 onwards is pushed past the cap and held there
        assert_eq!(interop[idx(2022)], 100.0);

        let budget = tbl.get(DEFENSE_BUDGET).unwrap();
        // 2020, i = 3: 220 * (1 + (0.05 + 0.04) * 3) * 0.95
        assert!((budget[idx(2020)] - 220.0 * 1.27 * 0.95).abs() < 1e-6);

        let pesco = tbl.get(PESCO_PROJECTS).unwrap();
        // 2023: (60 + 6 + 3) * 1.15
        assert!((pesco[idx(2023)] - 69.0 * 1.15).abs() < EPS);
    }

    #[test]
    fn every_profile_stays_within_bounds() {
        init_test_logging();
        let cat = Catalogue::builtin().unwrap();
        let wide = Timeline::new(2010, 2040).unwrap();
        for p in &cat.profiles {
            let tbl = generate_dataset(p, &wide).unwrap();
            for col in tbl.columns() {
                assert_eq!(col.values.len(), tbl.num_rows());
                let bounds = column_bounds(&col.name);
                for v in &col.values {
                    assert!(
                        bounds.contains(*v),
                        "{} / {}: {} out of {:?}",
                        p.name,
                        col.name,
                        v,
                        bounds
                    );
                }
            }
        }
    }

    #[test]
    fn national_profile_needs_budget() {
        let cat = Catalogue::builtin().unwrap();
        let mut p = cat.resolve("Germany");
        p.defense_budget_base = None;
        let err = generate_dataset(&p, &Timeline::default()).unwrap_err();
        assert!(err.to_string().contains("Germany"));
    }

    #[test]
    fn percentages_capped_at_hundred() {
        let tbl = dataset_for("France");
        for name in [
            INTEROPERABILITY,
            PROJECTION_CAPACITY,
            INTEROPERABLE_EQUIPMENT,
            CYBER_CAPACITY,
            INTELLIGENCE_SHARING,
            CONCERTED_DETERRENCE,
        ] {
            if let Some(values) = tbl.get(name) {
                assert!(values.iter().all(|v| *v <= 100.0), "{} over 100", name);
            }
        }
        assert!(tbl
            .get(OPERATIONAL_EFFICIENCY)
            .unwrap()
            .iter()
            .all(|v| *v <= 95.0));
    }
}
