use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Which of the two long-running children a process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Backend,
    Frontend,
}

impl Role {
    /// The role of the companion process.
    pub fn other(self) -> Role {
        match self {
            Role::Backend => Role::Frontend,
            Role::Frontend => Role::Backend,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Frontend
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Backend => f.write_str("back-end"),
            Role::Frontend => f.write_str("front-end"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "backend" | "back-end" => Ok(Role::Backend),
            "frontend" | "front-end" => Ok(Role::Frontend),
            other => Err(format!(
                "invalid role: {other} (expected \"backend\" or \"frontend\")"
            )),
        }
    }
}

/// How the back-end service is started after a successful build.
///
/// - `Prebuilt`: run the binary produced by the build step with
///   `--debug --metadata-path <path>`.
/// - `Source`: `<compiler> run .` configured purely through the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendLaunch {
    Prebuilt,
    Source,
}

impl Default for BackendLaunch {
    fn default() -> Self {
        BackendLaunch::Prebuilt
    }
}

impl FromStr for BackendLaunch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prebuilt" => Ok(BackendLaunch::Prebuilt),
            "source" => Ok(BackendLaunch::Source),
            other => Err(format!(
                "invalid backend_launch: {other} (expected \"prebuilt\" or \"source\")"
            )),
        }
    }
}

/// Host platform as far as executable lookup is concerned.
///
/// Only Windows has the special-cased installation layout where tools
/// installed per-user are not on the default search path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };
    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| "duration too large".to_string())
}
