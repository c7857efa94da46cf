// src/simulate/events.rs

use tracing::trace;

use crate::dataset::{
    YearTable, DEFENSE_BUDGET, ECONOMIES_OF_SCALE, INTEROPERABILITY, JOINT_EXERCISES,
    OPERATIONAL_EFFICIENCY, PESCO_PROJECTS, PROJECTION_CAPACITY,
};

/// A dated shock: multiply `column` by `factor` for every year in `from..=until`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Event {
    pub label: &'static str,
    pub from: i32,
    pub until: Option<i32>,
    pub adjustments: &'static [(&'static str, f64)],
}

impl Event {
    pub fn applies_to(&self, year: i32) -> bool {
        year >= self.from && self.until.map_or(true, |u| year <= u)
    }
}

pub static EVENTS: &[Event] = &[
    Event {
        label: "PESCO launch",
        from: 2017,
        until: None,
        adjustments: &[(INTEROPERABILITY, 1.05), (JOINT_EXERCISES, 1.10)],
    },
    Event {
        label: "reinforced cooperation",
        from: 2020,
        until: None,
        adjustments: &[
            (PROJECTION_CAPACITY, 1.08),
            (OPERATIONAL_EFFICIENCY, 1.06),
            (ECONOMIES_OF_SCALE, 1.12),
        ],
    },
    Event {
        label: "pandemic",
        from: 2020,
        until: Some(2021),
        adjustments: &[(DEFENSE_BUDGET, 0.95), (JOINT_EXERCISES, 0.80)],
    },
    Event {
        label: "post-pandemic acceleration",
        from: 2022,
        until: None,
        adjustments: &[(PESCO_PROJECTS, 1.15), (INTEROPERABILITY, 1.07)],
    },
];

/// Apply every event of `events` to `table` in order. Columns the table
/// does not carry are skipped.
pub fn apply_events(table: &mut YearTable, events: &[Event]) {
    let years = table.years().to_vec();
    for event in events {
        for &(column, factor) in event.adjustments {
            let Some(values) = table.get_mut(column) else {
                trace!(event = event.label, column, "column absent, skipping");
                continue;
            };
            for (v, &year) in values.iter_mut().zip(&years) {
                if event.applies_to(year) {
                    *v *= factor;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Timeline;

    const EPS: f64 = 1e-9;

    #[test]
    fn pandemic_window_is_inclusive() {
        let pandemic = &EVENTS[2];
        assert!(!pandemic.applies_to(2019));
        assert!(pandemic.applies_to(2020));
        assert!(pandemic.applies_to(2021));
        assert!(!pandemic.applies_to(2022));
    }

    #[test]
    fn exercises_compound_launch_and_pandemic() {
        let mut tbl = YearTable::new(&Timeline::new(2016, 2022).unwrap());
        tbl.add_column(JOINT_EXERCISES, vec![10.0; 7]).unwrap();
        apply_events(&mut tbl, EVENTS);

        let ex = tbl.get(JOINT_EXERCISES).unwrap();
        assert_eq!(ex[0], 10.0);
        assert!((ex[1] - 11.0).abs() < EPS);
        assert!((ex[4] - 10.0 * 1.10 * 0.80).abs() < EPS);
        assert!((ex[6] - 11.0).abs() < EPS);
    }

    #[test]
    fn missing_budget_column_is_skipped() {
        let mut tbl = YearTable::new(&Timeline::new(2020, 2020).unwrap());
        tbl.add_column(PESCO_PROJECTS, vec![4.0]).unwrap();
        apply_events(&mut tbl, EVENTS);
        assert!(!tbl.has_column(DEFENSE_BUDGET));
        assert_eq!(tbl.get(PESCO_PROJECTS).unwrap()[0], 4.0);
    }
}
