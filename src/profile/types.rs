// src/profile/types.rs

use serde::{Deserialize, Serialize};

/// Specialisation tags that drive an extra dataset column.
pub const CYBERDEFENSE: &str = "cyberdefense";
pub const INTELLIGENCE: &str = "intelligence";
pub const NUCLEAR_DETERRENT: &str = "nuclear_deterrent";

/// What a profile describes: a single state, the whole union, or a force component.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    MemberState,
    Union,
    Component,
}

impl ProfileKind {
    pub fn as_str(&self) -> &str {
        match self {
            ProfileKind::MemberState => "member_state",
            ProfileKind::Union => "union",
            ProfileKind::Component => "component",
        }
    }

    /// States and the union carry budget, personnel and specialisation data.
    pub fn is_national(&self) -> bool {
        matches!(self, ProfileKind::MemberState | ProfileKind::Union)
    }
}

/// A single country or component entry of the catalogue.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Profile {
    pub name: String,
    pub kind: ProfileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defense_budget_base: Option<f64>,
    pub personnel_base: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pesco_projects: Option<f64>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specialisations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<String>,
}

impl Profile {
    /// Project count used as the PESCO base; components carry none and get 5.
    pub fn pesco_base(&self) -> f64 {
        self.pesco_projects.unwrap_or(5.0)
    }

    pub fn has_specialisation(&self, tag: &str) -> bool {
        self.specialisations.iter().any(|s| s == tag)
    }
}
