use crate::command::ExitCode;
use crate::env::Environment;
use anyhow::Result;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Owner-execute permission bit (`S_IXUSR`).
const USER_EXEC: u32 = 0o100;

/// Ordered list of directories consulted for external programs.
///
/// The list is fixed when the shell starts; the invoking environment's
/// `PATH` is never looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<String>,
}

impl SearchPath {
    pub fn new<I, S>(dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    /// Look `name` up in every directory, in order.
    ///
    /// Candidates are built by plain concatenation, `dir + "/" + name`, and
    /// checked with `stat` (symlinks are followed):
    /// - a regular file with the owner-execute bit is the match;
    /// - a regular file without it ends the search with
    ///   [`Resolution::NotExecutable`];
    /// - anything else, including a missing file or a directory, moves on to
    ///   the next directory.
    pub fn resolve(&self, name: &str) -> Resolution {
        for dir in &self.dirs {
            let candidate = PathBuf::from(format!("{dir}/{name}"));
            let Ok(meta) = std::fs::metadata(&candidate) else {
                log::trace!("{} does not exist", candidate.display());
                continue;
            };
            if !meta.is_file() {
                log::debug!("{} is not a regular file", candidate.display());
                continue;
            }
            if meta.permissions().mode() & USER_EXEC != 0 {
                log::debug!("resolved {name} to {}", candidate.display());
                return Resolution::Found(candidate);
            }
            log::debug!("{} lacks the owner-execute bit", candidate.display());
            return Resolution::NotExecutable(candidate);
        }
        Resolution::NotFound
    }
}

impl Default for SearchPath {
    /// Current directory first, then `/usr/bin`.
    fn default() -> Self {
        Self::new([".", "/usr/bin"])
    }
}

/// Outcome of a [`SearchPath::resolve`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An executable regular file.
    Found(PathBuf),
    /// A regular file that the owner may not execute; the search stopped here.
    NotExecutable(PathBuf),
    /// No directory holds a regular file of that name.
    NotFound,
}

/// A program located on the search path together with its argument vector.
pub struct ExternalCommand<'a> {
    path: PathBuf,
    argv: &'a [&'a str],
}

impl<'a> ExternalCommand<'a> {
    /// `argv[0]` is the name as typed; it is passed to the child as argument
    /// zero while `path` is what gets executed.
    pub fn new(path: PathBuf, argv: &'a [&'a str]) -> Self {
        Self { path, argv }
    }

    /// Spawn the program and block until it exits.
    ///
    /// The child inherits the environment, the working directory and the
    /// standard streams. If the program image cannot be loaded the child
    /// terminates on its own and the error is returned here; a child never
    /// goes on running shell code.
    pub fn execute(self, stdout: &mut dyn Write) -> Result<ExitCode> {
        stdout.flush()?;
        let mut command = std::process::Command::new(&self.path);
        if let Some((arg0, rest)) = self.argv.split_first() {
            command.arg0(arg0).args(rest);
        }
        let mut child = command.spawn()?;
        log::info!("started {} as pid {}", self.path.display(), child.id());
        let exit_status = child.wait()?;
        let code = match exit_status.code() {
            Some(x) => x,
            None => terminated_by_signal(exit_status),
        };
        log::info!("{} exited with status {code}", self.path.display());
        Ok(code)
    }
}

fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

/// Locate `argv[0]` on `search_path` and run it.
///
/// Returns `Ok(true)` when a program was found and has finished, whatever its
/// exit status. Returns `Ok(false)` when there was nothing to run: no match,
/// a match that is not executable, or a child that could not be started. The
/// last two print a diagnostic first; plain "not found" is left to the
/// caller.
pub fn run_program(
    search_path: &SearchPath,
    argv: &[&str],
    stdout: &mut dyn Write,
    env: &mut Environment,
) -> Result<bool> {
    let Some(name) = argv.first() else {
        return Ok(false);
    };
    match search_path.resolve(name) {
        Resolution::Found(path) => match ExternalCommand::new(path, argv).execute(stdout) {
            Ok(code) => {
                env.last_status = code;
                Ok(true)
            }
            Err(e) => {
                log::warn!("failed to run {name}: {e:#}");
                writeln!(stdout, "Unable to create child process.")?;
                Ok(false)
            }
        },
        Resolution::NotExecutable(_) => {
            writeln!(stdout, "Error: File found is not executable.")?;
            Ok(false)
        }
        Resolution::NotFound => Ok(false),
    }
}
