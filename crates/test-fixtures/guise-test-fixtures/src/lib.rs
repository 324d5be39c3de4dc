//! JSON fixtures for guise tests.
//!
//! `fixtures/manifest.json` maps short names to files, grouped into sets
//! (node templates, runtime configs). Deserialization target is chosen by the
//! caller, so this crate does not depend on the cores.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    templates: BTreeMap<String, String>,
    #[serde(default)]
    configs: BTreeMap<String, String>,
}

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .expect("fixtures/manifest.json is valid JSON")
});

/// A group of fixtures listed in the manifest.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Set {
    Templates,
    Configs,
}

impl Set {
    fn entries(self) -> &'static BTreeMap<String, String> {
        match self {
            Set::Templates => &MANIFEST.templates,
            Set::Configs => &MANIFEST.configs,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Set::Templates => "template",
            Set::Configs => "config",
        }
    }
}

/// Fixture names in `set`, sorted.
pub fn names(set: Set) -> Vec<&'static str> {
    set.entries().keys().map(String::as_str).collect()
}

/// Absolute path of a fixture file.
pub fn path(set: Set, name: &str) -> Result<PathBuf> {
    let Some(rel) = set.entries().get(name) else {
        bail!("no {} fixture named '{name}'", set.label());
    };
    Ok(PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../../fixtures")
        .join(rel))
}

/// Raw JSON text of a fixture.
pub fn text(set: Set, name: &str) -> Result<String> {
    let file = path(set, name)?;
    std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))
}

pub fn load<T: DeserializeOwned>(set: Set, name: &str) -> Result<T> {
    let raw = text(set, name)?;
    serde_json::from_str(&raw)
        .with_context(|| format!("decoding {} fixture '{name}'", set.label()))
}

/// Node templates (`NodeTemplate` JSON).
pub mod templates {
    use super::{Result, Set};

    pub fn load<T: serde::de::DeserializeOwned>(name: &str) -> Result<T> {
        super::load(Set::Templates, name)
    }

    pub fn names() -> Vec<&'static str> {
        super::names(Set::Templates)
    }
}

/// Runtime configs (`GuiConfig` JSON).
pub mod configs {
    use super::{Result, Set};

    pub fn load<T: serde::de::DeserializeOwned>(name: &str) -> Result<T> {
        super::load(Set::Configs, name)
    }

    pub fn names() -> Vec<&'static str> {
        super::names(Set::Configs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_entry_is_readable_json() {
        for set in [Set::Templates, Set::Configs] {
            for name in names(set) {
                let value: serde_json::Value = load(set, name).unwrap();
                assert!(value.is_object(), "{name} is not an object");
            }
        }
        assert!(templates::names().contains(&"hud"));
        assert!(configs::names().contains(&"small"));
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = path(Set::Templates, "nope").unwrap_err();
        assert!(err.to_string().contains("no template fixture named 'nope'"));
    }
}
