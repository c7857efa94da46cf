// src/simulate/curves.rs

use crate::profile::ProfileKind;
use crate::timeline::{years_since_launch, Phase};

/// `intercept + slope * k` within one phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub intercept: f64,
    pub slope: f64,
}

const fn seg(intercept: f64, slope: f64) -> Segment {
    Segment { intercept, slope }
}

impl Segment {
    pub fn at(&self, k: f64) -> f64 {
        self.intercept + self.slope * k
    }
}

/// Lower/upper limits a metric is held to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub const NONE: Bounds = Bounds {
        min: None,
        max: None,
    };

    pub const fn at_most(max: f64) -> Self {
        Bounds {
            min: None,
            max: Some(max),
        }
    }

    pub const fn at_least(min: f64) -> Self {
        Bounds {
            min: Some(min),
            max: None,
        }
    }

    pub fn clamp(&self, v: f64) -> f64 {
        let v = self.min.map_or(v, |lo| v.max(lo));
        self.max.map_or(v, |hi| v.min(hi))
    }

    pub fn contains(&self, v: f64) -> bool {
        self.min.map_or(true, |lo| v >= lo) && self.max.map_or(true, |hi| v <= hi)
    }
}

/// A metric that follows the calendar phases.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseCurve {
    pub before: f64,
    pub launch: Segment,
    pub acceleration: Segment,
    pub maturity: Segment,
    pub bounds: Bounds,
    /// Scale applied to components; states and the union use 1.
    pub component_scale: f64,
}

impl PhaseCurve {
    pub fn raw(&self, year: i32) -> f64 {
        match Phase::of(year) {
            Phase::Before => self.before,
            Phase::Launch(k) => self.launch.at(k),
            Phase::Acceleration(k) => self.acceleration.at(k),
            Phase::Maturity(k) => self.maturity.at(k),
        }
    }

    pub fn value(&self, year: i32, kind: ProfileKind) -> f64 {
        let scale = match kind {
            ProfileKind::Component => self.component_scale,
            ProfileKind::MemberState | ProfileKind::Union => 1.0,
        };
        self.bounds.clamp(self.raw(year) * scale)
    }

    pub fn series(&self, years: &[i32], kind: ProfileKind) -> Vec<f64> {
        years.iter().map(|&y| self.value(y, kind)).collect()
    }
}

const fn curve(
    before: f64,
    launch: Segment,
    acceleration: Segment,
    maturity: Segment,
    bounds: Bounds,
) -> PhaseCurve {
    PhaseCurve {
        before,
        launch,
        acceleration,
        maturity,
        bounds,
        component_scale: 1.0,
    }
}

const EXERCISE_BASE: f64 = 10.0;

pub const JOINT_EXERCISES: PhaseCurve = PhaseCurve {
    component_scale: 0.5,
    ..curve(
        EXERCISE_BASE,
        seg(EXERCISE_BASE, 0.2 * EXERCISE_BASE),
        seg(1.6 * EXERCISE_BASE, 0.3 * EXERCISE_BASE),
        seg(2.5 * EXERCISE_BASE, 0.4 * EXERCISE_BASE),
        Bounds::at_least(0.0),
    )
};

pub const INTEROPERABILITY: PhaseCurve = curve(
    45.0,
    seg(45.0, 10.0),
    seg(75.0, 8.0),
    seg(99.0, 1.0),
    Bounds::at_most(100.0),
);

pub const PROJECTION_CAPACITY: PhaseCurve = curve(
    30.0,
    seg(30.0, 8.0),
    seg(54.0, 6.0),
    seg(72.0, 4.0),
    Bounds::at_most(100.0),
);

pub const REACTION_TIME: PhaseCurve = curve(
    30.0,
    seg(30.0, -3.0),
    seg(21.0, -2.0),
    seg(15.0, -1.0),
    Bounds::at_least(5.0),
);

pub const INTEROPERABLE_EQUIPMENT: PhaseCurve = curve(
    25.0,
    seg(25.0, 12.0),
    seg(61.0, 10.0),
    seg(91.0, 8.0),
    Bounds::at_most(100.0),
);

const SAVINGS_BASE: f64 = 0.5;

pub const ECONOMIES_OF_SCALE: PhaseCurve = PhaseCurve {
    component_scale: 0.7,
    ..curve(
        0.0,
        seg(0.0, SAVINGS_BASE),
        seg(3.0 * SAVINGS_BASE, 0.8 * SAVINGS_BASE),
        seg(5.4 * SAVINGS_BASE, 1.2 * SAVINGS_BASE),
        Bounds::at_least(0.0),
    )
};

pub const REDUNDANCY_REDUCTION: PhaseCurve = curve(
    0.0,
    seg(0.0, 5.0),
    seg(15.0, 4.0),
    seg(27.0, 3.0),
    Bounds::at_most(50.0),
);

pub const OPERATIONAL_EFFICIENCY: PhaseCurve = curve(
    60.0,
    seg(60.0, 5.0),
    seg(75.0, 4.0),
    seg(87.0, 3.0),
    Bounds::at_most(95.0),
);

pub const CYBER_CAPACITY: PhaseCurve = curve(
    40.0,
    seg(40.0, 8.0),
    seg(64.0, 6.0),
    seg(82.0, 4.0),
    Bounds::at_most(100.0),
);

pub const INTELLIGENCE_SHARING: PhaseCurve = curve(
    30.0,
    seg(30.0, 10.0),
    seg(60.0, 8.0),
    seg(84.0, 6.0),
    Bounds::at_most(100.0),
);

pub const CONCERTED_DETERRENCE: PhaseCurve = curve(
    50.0,
    seg(50.0, 7.0),
    seg(71.0, 5.0),
    seg(86.0, 4.0),
    Bounds::at_most(100.0),
);

pub const COUNTRY_CONTRIBUTION: PhaseCurve = curve(
    15.0,
    seg(15.0, 2.0),
    seg(21.0, 1.5),
    seg(25.5, 1.0),
    Bounds::at_most(30.0),
);

/// PESCO projects scale with the profile's own project count.
pub fn pesco_projects(base: f64) -> PhaseCurve {
    curve(
        0.0,
        seg(0.0, base / 3.0),
        seg(base, 2.0),
        seg(base + 6.0, 3.0),
        Bounds::at_least(0.0),
    )
}

/// `base * (1 + (growth + integration) * i)`, integration adding a point per
/// year since launch, capped at six.
pub fn defense_budget(base: f64, kind: ProfileKind, years: &[i32]) -> Vec<f64> {
    let growth = match kind {
        ProfileKind::MemberState => 0.03,
        ProfileKind::Union => 0.05,
        ProfileKind::Component => 0.025,
    };
    years
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            let integration = 0.01 * years_since_launch(y).min(6.0);
            base * (1.0 + (growth + integration) * i as f64)
        })
        .collect()
}

/// Slow decline of headcount, offset by integration (half a point per year, capped at five).
pub fn personnel(base: f64, years: &[i32]) -> Vec<f64> {
    years
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            let integration = 0.005 * years_since_launch(y).min(5.0);
            base * (1.0 - (0.01 - integration) * i as f64)
        })
        .collect()
}
