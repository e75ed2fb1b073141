// src/exec/build.rs

//! Fail-fast build step that runs before anything long-lived is started.

use tracing::{error, info};

use crate::errors::{DevrunError, Result};
use crate::exec::backend::ProcessLauncher;
use crate::exec::command::CommandSpec;

/// Run the back-end build and wait for it.
///
/// Any outcome other than exit code 0 is [`DevrunError::BuildFailed`].
pub async fn run_build<L>(launcher: &mut L, spec: &CommandSpec) -> Result<()>
where
    L: ProcessLauncher + ?Sized,
{
    info!(cmd = %spec, cwd = %spec.cwd.display(), "building back-end");

    let outcome = launcher.run_to_completion(spec).await?;
    if !outcome.success() {
        error!(%outcome, "back-end build failed");
        return Err(DevrunError::BuildFailed(outcome));
    }

    info!("back-end build finished");
    Ok(())
}
