//! CLI subcommand implementations.

use crate::config::{self, CONFIG_FILE_NAME};
use crate::core::console::Console;
use crate::core::error::{Error, Result};
use crate::core::gateway::SystemGateway;
use crate::core::git::GitRepo;
use crate::core::runner::{Precommit, RunOptions};
use std::process::ExitCode;

/// Hook script installed by `precommit init`.
const HOOK_SCRIPT: &str = "#!/bin/sh\n\nprecommit --all\n";

/// Check for pre-commit failures.
pub fn check(repo: &GitRepo, options: RunOptions, console: Console) -> Result<ExitCode> {
    let engine = load_engine(repo, options, console.clone())?;
    let repository = repo.snapshot()?;
    let mut gateway = SystemGateway::new(console);

    let summary = engine.check(&mut gateway, &repository)?;

    Ok(if summary.found_problems() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Apply available fixes for the problems that check finds.
///
/// Fix mode is advisory: it never fails the process unless an internal
/// error occurred.
pub fn fix(repo: &GitRepo, options: RunOptions, console: Console) -> Result<ExitCode> {
    let engine = load_engine(repo, options, console.clone())?;
    let repository = repo.snapshot()?;
    let mut gateway = SystemGateway::new(console);

    engine.fix(&mut gateway, &repository)?;

    Ok(ExitCode::SUCCESS)
}

fn load_engine(repo: &GitRepo, options: RunOptions, console: Console) -> Result<Precommit> {
    let checklist = config::load_checklist(repo.root())?;
    Ok(Precommit::new(checklist.into_checks(), console, options))
}

/// Write a default precommit.toml and install the pre-commit hook.
pub fn init(repo: &GitRepo, force: bool) -> Result<ExitCode> {
    let config_path = repo.root().join(CONFIG_FILE_NAME);
    if !force && config_path.exists() {
        return Err(Error::AlreadyExists { path: config_path });
    }

    let hook_path = repo.hook_path("pre-commit");
    if !force && hook_path.exists() {
        return Err(Error::AlreadyExists { path: hook_path });
    }

    std::fs::write(&config_path, config::DEFAULT_CONFIG)
        .map_err(|e| Error::io(format!("write {CONFIG_FILE_NAME}"), e))?;

    let hooks_dir = repo.hooks_dir();
    if !hooks_dir.exists() {
        std::fs::create_dir_all(&hooks_dir).map_err(|e| Error::io("create hooks dir", e))?;
    }
    std::fs::write(&hook_path, HOOK_SCRIPT).map_err(|e| Error::io("write hook", e))?;

    // Make the hook executable by everyone.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&hook_path)
            .map_err(|e| Error::io("get hook metadata", e))?
            .permissions();
        perms.set_mode(perms.mode() | 0o111);
        std::fs::set_permissions(&hook_path, perms)
            .map_err(|e| Error::io("set hook permissions", e))?;
    }

    Ok(ExitCode::SUCCESS)
}
