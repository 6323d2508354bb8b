use crate::command::ExitCode;
use anyhow::{Context, Result, anyhow};
use nix::unistd::{Uid, User};
use std::path::PathBuf;

/// Mutable, per-session state shared by the interpreter and the builtins.
///
/// The environment contains:
/// - `should_exit`: set by `exit`; the dispatch loop stops as soon as it sees it.
/// - `last_status`: status of the most recently dispatched command.
///
/// The process environment itself (variables, working directory) is not
/// copied here: `cd` changes the real working directory and children inherit
/// both unchanged.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// When set to true, the dispatch loop terminates before the next prompt.
    pub should_exit: bool,
    /// Exit code of the last command, informational only.
    pub last_status: ExitCode,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the dispatch loop to stop.
    pub fn request_exit(&mut self) {
        self.should_exit = true;
    }
}

/// Home directory of the invoking user, taken from the user database
/// (`getpwuid(getuid())`) rather than from `$HOME`.
pub fn home_dir() -> Result<PathBuf> {
    let uid = Uid::current();
    let user = User::from_uid(uid)
        .with_context(|| format!("user database lookup failed for uid {uid}"))?
        .ok_or_else(|| anyhow!("no user database entry for uid {uid}"))?;
    Ok(user.dir)
}
