// src/env/overlay.rs

//! Environment layering.
//!
//! An [`EnvironmentOverlay`] holds two kinds of entries:
//! - overrides, which always shadow the inherited value;
//! - defaults, which are only injected when the key is absent.
//!
//! Applying an overlay never mutates the base map; it produces a new
//! [`ComposedEnvironment`].

use std::collections::BTreeMap;

/// Plain variable map (name -> value). Keys are unique.
pub type EnvMap = BTreeMap<String, String>;

/// Snapshot of the current process environment.
///
/// Entries that are not valid UTF-8 are skipped.
pub fn base_environment() -> EnvMap {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentOverlay {
    overrides: EnvMap,
    defaults: EnvMap,
}

impl EnvironmentOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always set `key`, shadowing the inherited value and earlier layers.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.defaults.remove(&key);
        self.overrides.insert(key, value.into());
        self
    }

    /// Set `key` only if nothing below this overlay defines it.
    pub fn default_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        if !self.overrides.contains_key(&key) {
            self.defaults.insert(key, value.into());
        }
        self
    }

    /// Apply this overlay on top of `base`.
    pub fn apply(&self, base: &EnvMap) -> ComposedEnvironment {
        let mut vars = base.clone();
        for (k, v) in &self.overrides {
            vars.insert(k.clone(), v.clone());
        }
        for (k, v) in &self.defaults {
            vars.entry(k.clone()).or_insert_with(|| v.clone());
        }
        ComposedEnvironment { vars }
    }
}

/// Final environment handed to a spawned process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposedEnvironment {
    vars: EnvMap,
}

impl ComposedEnvironment {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &EnvMap {
        &self.vars
    }
}

impl From<EnvMap> for ComposedEnvironment {
    fn from(vars: EnvMap) -> Self {
        Self { vars }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> EnvMap {
        EnvMap::from([
            ("HOME".to_string(), "/home/dev".to_string()),
            ("DEBUG".to_string(), "false".to_string()),
        ])
    }

    #[test]
    fn overrides_shadow_base_values() {
        let env = EnvironmentOverlay::new().set("DEBUG", "true").apply(&base());
        assert_eq!(env.get("DEBUG"), Some("true"));
        assert_eq!(env.get("HOME"), Some("/home/dev"));
    }

    #[test]
    fn defaults_only_fill_missing_keys() {
        let env = EnvironmentOverlay::new()
            .default_value("HOME", "/nowhere")
            .default_value("EDITOR", "vi")
            .apply(&base());
        assert_eq!(env.get("HOME"), Some("/home/dev"));
        assert_eq!(env.get("EDITOR"), Some("vi"));
    }

    #[test]
    fn later_set_wins_over_default_for_same_key() {
        let env = EnvironmentOverlay::new()
            .default_value("X", "default")
            .set("X", "forced")
            .apply(&EnvMap::new());
        assert_eq!(env.get("X"), Some("forced"));
    }

    #[test]
    fn applying_leaves_base_untouched() {
        let base = base();
        let before = base.clone();
        let _ = EnvironmentOverlay::new()
            .set("DEBUG", "true")
            .default_value("NEW", "1")
            .apply(&base);
        assert_eq!(base, before);
    }
}
