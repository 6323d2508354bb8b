use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::{self as shell_env, Environment};
use crate::interpreter::Factory;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::cmp::Ordering;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins turn their operands into a value through [`argh::FromArgs`] and
/// are executed directly in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "ls" or "cd".
    fn name() -> &'static str;

    /// Executes the command using the provided output stream and environment.
    ///
    /// An `Err` is reported by printing its message on a line of its own;
    /// the message is the user-facing diagnostic, the context chain below it
    /// only goes to the log.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;

    /// Diagnostic printed when argument parsing rejects the command line.
    fn usage_error(output: &str) -> String {
        format!("Error: {}\n", output.trim_end())
    }
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        match <T as BuiltinCommand>::execute(*self, stdout, env) {
            Ok(x) => Ok(x),
            Err(e) => {
                log::warn!("{}: {e:#}", T::name());
                writeln!(stdout, "{e}")?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        stdout.write_all(self.output.as_bytes())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        if name != T::name() {
            return None;
        }
        Some(match T::from_args(&[name], args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => {
                let is_error = status.is_err();
                let output = if is_error {
                    T::usage_error(&output)
                } else {
                    output
                };
                Box::new(InvalidArgs { output, is_error })
            }
        })
    }
}

/// End the shell session with status 0.
///
/// Any arguments are accepted and ignored: `exit 5` exits with 0 as well.
#[derive(Debug, Default)]
pub struct Exit {
    ignored: Vec<String>,
}

impl FromArgs for Exit {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Self {
            ignored: args.iter().map(|a| a.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        if !self.ignored.is_empty() {
            log::debug!("exit: ignoring arguments {:?}", self.ignored);
        }
        env.request_exit();
        Ok(0)
    }
}

/// Print the current working directory to standard output.
#[derive(Debug, Default)]
pub struct Pwd;

impl FromArgs for Pwd {
    fn from_args(_command_name: &[&str], _args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Pwd)
    }
}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        let cwd = env::current_dir().context("Error: Could not retrieve working directory.")?;
        stdout.write_all(cwd.as_os_str().as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(0)
    }
}

/// Change the current working directory.
///
/// The first operand is used verbatim as the target, even when it looks like
/// an option (`cd -x`, `cd --help`); further operands are ignored. Without an
/// operand the home directory from the user database is used.
#[derive(Debug, Default)]
pub struct Cd {
    pub target: Option<String>,
}

impl FromArgs for Cd {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Self {
            target: args.first().map(|a| a.to_string()),
        })
    }
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        let target = match self.target {
            Some(t) => PathBuf::from(t),
            None => shell_env::home_dir().context("Error: Unable to retrieve home directory.")?,
        };

        env::set_current_dir(&target)
            .with_context(|| format!("chdir to {}", target.display()))
            .context("Error: Unable to locate the specified directory.")?;
        log::debug!("cd: now in {}", target.display());
        Ok(0)
    }
}

/// List the entries of the current directory, sorted without regard to case.
///
/// Entries whose names begin with '.' are hidden unless `-a` is given. `-a`
/// is the only operand accepted.
#[derive(Debug, Default)]
pub struct Ls {
    pub all: bool,
}

impl FromArgs for Ls {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        match args {
            [] => Ok(Self { all: false }),
            ["-a"] => Ok(Self { all: true }),
            _ => Err(EarlyExit {
                output: String::new(),
                status: Err(()),
            }),
        }
    }
}

impl BuiltinCommand for Ls {
    fn name() -> &'static str {
        "ls"
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        for name in list_directory(".", self.all)? {
            stdout.write_all(name.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
        Ok(0)
    }

    fn usage_error(_output: &str) -> String {
        "Error: Invalid second input parameter (should be '-a').\n".to_string()
    }
}

/// Entry names of `dir` in `ls` order, exactly as the file system stores them.
///
/// With `all`, the `.` and `..` entries are included and nothing is hidden;
/// otherwise names starting with `.` are dropped.
fn list_directory(dir: &str, all: bool) -> Result<Vec<OsString>> {
    let entries = fs::read_dir(dir).context("Error: Unable to read the current directory.")?;
    let mut names = Vec::new();
    if all {
        names.push(OsString::from("."));
        names.push(OsString::from(".."));
    }
    for entry in entries {
        let entry = entry.context("Error: Unable to read the current directory.")?;
        let name = entry.file_name();
        if all || !name.as_bytes().starts_with(b".") {
            names.push(name);
        }
    }
    names.sort_by(|a, b| compare_ignore_ascii_case(a.as_bytes(), b.as_bytes()));
    Ok(names)
}

/// `strcasecmp` ordering, with a byte-wise tie break so the result is stable.
fn compare_ignore_ascii_case(a: &[u8], b: &[u8]) -> Ordering {
    let lower = |s: &[u8]| s.iter().map(|c| c.to_ascii_lowercase()).collect::<Vec<u8>>();
    lower(a).cmp(&lower(b)).then_with(|| a.cmp(b))
}
