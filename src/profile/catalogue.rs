use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path};
use tracing::{debug, info};

use super::types::Profile;

/// Catalogue shipped with the binary, in menu order.
static BUILTIN_PROFILES: &str = include_str!("../../assets/profiles.yaml");

/// Name selected when the menu input cannot be used.
pub const FALLBACK_SELECTION: &str = "EU-27";

/// Ordered set of profiles plus the fallback used for unknown names.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Catalogue {
    pub default: Profile,
    pub profiles: Vec<Profile>,
}

impl Catalogue {
    /// Parse the built-in YAML catalogue.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_PROFILES).context("parsing built-in profile catalogue")
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let cat: Catalogue = serde_yaml::from_str(text)?;
        if cat.profiles.is_empty() {
            return Err(anyhow!("profile catalogue has no entries"));
        }
        for p in std::iter::once(&cat.default).chain(&cat.profiles) {
            validate(p)?;
        }
        Ok(cat)
    }

    /// Load an override file and merge it into `self`.
    pub fn merge_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        let extra: Overrides =
            serde_yaml::from_str(&text).with_context(|| format!("parsing {:?}", path))?;
        info!(path = %path.display(), profiles = extra.profiles.len(), "merging profile overrides");
        self.merge(extra).with_context(|| format!("merging {:?}", path))
    }

    /// Profiles with a known name replace it in place; new names are appended
    /// to the menu. A `default` entry replaces the fallback profile.
    /// Nothing is merged if any incoming profile is invalid.
    pub fn merge(&mut self, extra: Overrides) -> Result<()> {
        for p in extra.default.iter().chain(&extra.profiles) {
            validate(p)?;
        }
        if let Some(default) = extra.default {
            self.default = default;
        }
        let mut by_name: HashMap<String, usize> = self
            .profiles
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        for p in extra.profiles {
            match by_name.get(&p.name) {
                Some(&idx) => {
                    debug!(name = %p.name, "overriding profile");
                    self.profiles[idx] = p;
                }
                None => {
                    debug!(name = %p.name, "adding profile");
                    by_name.insert(p.name.clone(), self.profiles.len());
                    self.profiles.push(p);
                }
            }
        }
        Ok(())
    }

    /// Menu labels, numbered from 1 by the caller.
    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Look up `name`; unknown names get a copy of the default profile
    /// carrying the requested name.
    pub fn resolve(&self, name: &str) -> Profile {
        match self.get(name) {
            Some(p) => p.clone(),
            None => {
                debug!(name, "unknown profile, using default configuration");
                Profile {
                    name: name.to_string(),
                    ..self.default.clone()
                }
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("serializing profile catalogue")
    }
}

/// States and the union need a budget base.
fn validate(p: &Profile) -> Result<()> {
    if p.kind.is_national() && p.defense_budget_base.is_none() {
        bail!(
            "profile `{}` is a {} but has no defense_budget_base",
            p.name,
            p.kind.as_str()
        );
    }
    Ok(())
}

/// Shape of a `--profiles` file: both keys are optional.
#[derive(Debug, Default, Deserialize)]
pub struct Overrides {
    #[serde(default)]
    pub default: Option<Profile>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::types::{ProfileKind, CYBERDEFENSE, INTELLIGENCE, NUCLEAR_DETERRENT};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn builtin_has_full_menu() -> Result<()> {
        let cat = Catalogue::builtin()?;
        let names = cat.names();
        assert_eq!(names.len(), 31);
        assert_eq!(names[0], "Germany");
        assert_eq!(names[27], FALLBACK_SELECTION);
        assert_eq!(names[30], "Air Forces");
        Ok(())
    }

    #[test]
    fn builtin_kinds_and_fields() -> Result<()> {
        let cat = Catalogue::builtin()?;
        let france = cat.get("France").expect("France missing");
        assert_eq!(france.kind, ProfileKind::MemberState);
        assert_eq!(france.defense_budget_base, Some(40.0));
        assert!(france.has_specialisation(NUCLEAR_DETERRENT));
        assert!(france.has_specialisation(INTELLIGENCE));

        let eu = cat.get("EU-27").expect("EU-27 missing");
        assert_eq!(eu.kind, ProfileKind::Union);
        assert!(eu.has_specialisation(CYBERDEFENSE));

        let land = cat.get("Land Forces").expect("Land Forces missing");
        assert_eq!(land.kind, ProfileKind::Component);
        assert_eq!(land.defense_budget_base, None);
        assert_eq!(land.pesco_base(), 5.0);
        assert_eq!(land.contributors.len(), 5);
        Ok(())
    }

    #[test]
    fn unknown_name_uses_default() -> Result<()> {
        let cat = Catalogue::builtin()?;
        let p = cat.resolve("Atlantis");
        assert_eq!(p.name, "Atlantis");
        assert_eq!(p.kind, ProfileKind::MemberState);
        assert_eq!(p.defense_budget_base, Some(8.0));
        assert_eq!(p.personnel_base, 50000.0);
        assert_eq!(p.pesco_base(), 4.0);
        Ok(())
    }

    #[test]
    fn merge_file_overrides_and_appends() -> Result<()> {
        let mut cat = Catalogue::builtin()?;
        let mut f = NamedTempFile::new()?;
        writeln!(
            f,
            r#"profiles:
  - name: Malta
    kind: member_state
    defense_budget_base: 0.9
    personnel_base: 2100
  - name: Iceland
    kind: member_state
    defense_budget_base: 0.1
    personnel_base: 300
    specialisations: [cyberdefense]
"#
        )?;
        cat.merge_file(f.path())?;

        assert_eq!(cat.names().len(), 32);
        assert_eq!(cat.get("Malta").unwrap().defense_budget_base, Some(0.9));
        assert_eq!(cat.names()[31], "Iceland");
        assert!(cat.get("Iceland").unwrap().has_specialisation(CYBERDEFENSE));
        Ok(())
    }

    #[test]
    fn national_profile_without_budget_rejected() -> Result<()> {
        let mut cat = Catalogue::builtin()?;
        let mut f = NamedTempFile::new()?;
        writeln!(
            f,
            r#"profiles:
  - name: Iceland
    kind: member_state
    personnel_base: 300
"#
        )?;
        let err = cat.merge_file(f.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Iceland"));
        assert_eq!(cat.names().len(), 31);
        assert!(cat.get("Iceland").is_none());

        // components carry no budget
        let mut g = NamedTempFile::new()?;
        writeln!(
            g,
            r#"profiles:
  - name: Space Forces
    kind: component
    personnel_base: 1000
    contributors: [France]
"#
        )?;
        cat.merge_file(g.path())?;
        assert_eq!(cat.names().len(), 32);
        Ok(())
    }

    #[test]
    fn yaml_without_budget_for_union_fails_to_parse() {
        let text = r#"default:
  name: default
  kind: member_state
  defense_budget_base: 8.0
  personnel_base: 50000
profiles:
  - name: EU-27
    kind: union
    personnel_base: 1450000
"#;
        assert!(Catalogue::from_yaml(text).is_err());
    }

    #[test]
    fn yaml_export_parses_back() -> Result<()> {
        let cat = Catalogue::builtin()?;
        let again = Catalogue::from_yaml(&cat.to_yaml()?)?;
        assert_eq!(again, cat);
        Ok(())
    }
}
