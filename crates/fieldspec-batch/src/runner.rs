use std::path::Path;
use std::process::{Command, ExitStatus};

use tracing::{info, warn};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};

fn run(mut cmd: Command, program: &str) -> Result<ExitStatus> {
    cmd.status().map_err(|source| HarnessError::Spawn {
        program: program.to_string(),
        source,
    })
}

/// Install the job's declared dependencies, if it declares any.
pub fn install_dependencies(config: &HarnessConfig, work_dir: &Path) -> Result<bool> {
    if !work_dir.join(&config.requirements).is_file() {
        info!(file = %config.requirements, "no requirements file, skipping install");
        return Ok(false);
    }

    let (program, args) = config
        .install_cmd
        .split_first()
        .ok_or_else(|| HarnessError::Config("empty install command".into()))?;
    info!(program = %program, file = %config.requirements, "installing dependencies");

    let mut cmd = Command::new(program);
    cmd.args(args).arg(&config.requirements).current_dir(work_dir);
    let status = run(cmd, program)?;
    if !status.success() {
        return Err(HarnessError::Install {
            status: status.to_string(),
        });
    }
    Ok(true)
}

/// Run the job's entry point and return its exit code.
///
/// The job inherits the harness environment plus `extra_env`.
pub fn execute(config: &HarnessConfig, work_dir: &Path, extra_env: &[(&str, &Path)]) -> Result<i32> {
    info!(
        interpreter = %config.interpreter,
        entry = %config.entry_point,
        "starting job"
    );
    let mut cmd = Command::new(&config.interpreter);
    cmd.arg(&config.entry_point).current_dir(work_dir);
    for (name, value) in extra_env {
        cmd.env(name, value);
    }
    let status = run(cmd, &config.interpreter)?;

    match status.code() {
        Some(code) => Ok(code),
        None => {
            warn!(%status, "job terminated by signal");
            Ok(1)
        }
    }
}
