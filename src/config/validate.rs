// src/config/validate.rs

use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DevrunError, Result};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::DevrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.tools, raw.paths, raw.session))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_tools(cfg)?;
    validate_paths(cfg)?;
    validate_session(cfg)?;
    Ok(())
}

fn validate_tools(cfg: &RawConfigFile) -> Result<()> {
    let tools = [
        ("backend_compiler", &cfg.tools.backend_compiler),
        ("asset_tool", &cfg.tools.asset_tool),
        ("backend_binary", &cfg.tools.backend_binary),
    ];
    for (key, value) in tools {
        if value.trim().is_empty() {
            return Err(DevrunError::ConfigError(format!(
                "[tools].{key} must not be empty"
            )));
        }
    }
    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    let paths = [
        ("backend", &cfg.paths.backend),
        ("frontend", &cfg.paths.frontend),
        ("output", &cfg.paths.output),
        ("metadata", &cfg.paths.metadata),
    ];
    for (key, value) in paths {
        if value.trim().is_empty() {
            return Err(DevrunError::ConfigError(format!(
                "[paths].{key} must not be empty"
            )));
        }
        if Path::new(value).is_absolute() {
            return Err(DevrunError::ConfigError(format!(
                "[paths].{key} must be relative to the project root (got {value})"
            )));
        }
    }
    Ok(())
}

fn validate_session(cfg: &RawConfigFile) -> Result<()> {
    if cfg.session.assets_prefix.trim().is_empty() {
        return Err(DevrunError::ConfigError(
            "[session].assets_prefix must not be empty".to_string(),
        ));
    }
    parse_duration(&cfg.session.stop_grace).map_err(|e| {
        DevrunError::ConfigError(format!("[session].stop_grace: {e}"))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BackendLaunch, Role};

    #[test]
    fn defaults_are_valid() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert_eq!(cfg.tools.backend_compiler, "go");
        assert_eq!(cfg.tools.asset_tool, "npm");
        assert_eq!(cfg.paths.output, "frontend/dist");
        assert_eq!(cfg.session.foreground, Role::Frontend);
        assert_eq!(cfg.session.backend_launch, BackendLaunch::Prebuilt);
    }

    #[test]
    fn parses_partial_toml() {
        let raw: RawConfigFile = toml::from_str(
            r#"
[tools]
asset_tool = "pnpm"

[session]
foreground = "backend"
backend_launch = "source"
"#,
        )
        .unwrap();
        let cfg = ConfigFile::try_from(raw).unwrap();
        assert_eq!(cfg.tools.asset_tool, "pnpm");
        assert_eq!(cfg.tools.backend_compiler, "go");
        assert_eq!(cfg.session.foreground, Role::Backend);
        assert_eq!(cfg.session.backend_launch, BackendLaunch::Source);
    }

    #[test]
    fn rejects_empty_tool_name() {
        let mut raw = RawConfigFile::default();
        raw.tools.asset_tool = "  ".to_string();
        match ConfigFile::try_from(raw) {
            Err(DevrunError::ConfigError(msg)) => assert!(msg.contains("asset_tool")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_absolute_paths() {
        let mut raw = RawConfigFile::default();
        raw.paths.output = if cfg!(windows) {
            r"C:\dist".to_string()
        } else {
            "/tmp/dist".to_string()
        };
        match ConfigFile::try_from(raw) {
            Err(DevrunError::ConfigError(msg)) => assert!(msg.contains("[paths].output")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_stop_grace() {
        let mut raw = RawConfigFile::default();
        raw.session.stop_grace = "soon".to_string();
        match ConfigFile::try_from(raw) {
            Err(DevrunError::ConfigError(msg)) => assert!(msg.contains("stop_grace")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_overflowing_stop_grace() {
        let raw: RawConfigFile = toml::from_str(
            r#"
[session]
stop_grace = "307445734561825861h"
"#,
        )
        .unwrap();
        match ConfigFile::try_from(raw) {
            Err(DevrunError::ConfigError(msg)) => assert!(msg.contains("too large")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn unknown_role_is_a_toml_error() {
        let res: std::result::Result<RawConfigFile, _> = toml::from_str(
            r#"
[session]
foreground = "database"
"#,
        );
        assert!(res.is_err());
    }
}
