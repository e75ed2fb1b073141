// src/env/mod.rs

//! Environment composition for the spawned processes.
//!
//! - [`overlay`] implements the layering rules (overrides vs. defaults).
//! - [`compose`] knows which variables each child receives and where it runs.

pub mod compose;
pub mod overlay;

pub use compose::{
    compose_session, ProcessEnv, ProjectLayout, SessionEnvironments, ASSETS_PREFIX_VAR,
    DEBUG_VAR, METADATA_PATH_VAR, STATIC_PATH_VAR,
};
pub use overlay::{base_environment, ComposedEnvironment, EnvMap, EnvironmentOverlay};
