use crate::command::{CommandFactory, ExitCode};
use crate::config::Config;
use crate::env::Environment;
use crate::external;
use crate::io_adapters::{LineSource, check_line_len, decode_line};
use crate::lexer;
use anyhow::Result;
use std::io::Write;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports the builtins defined in this crate.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// What happened to a dispatched command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A builtin ran and finished with this status.
    Builtin(ExitCode),
    /// An external program was found, ran, and has been reaped.
    Program,
    /// Neither a builtin nor a runnable program.
    NotFound,
}

/// A minimal shell: builtins first, then programs on the search path.
///
/// The interpreter owns the session [`Environment`], the [`Config`] and an
/// ordered list of [`CommandFactory`] objects; the first factory that
/// recognizes a command name handles it. See [`Default`] for the builtins
/// included out of the box.
///
/// Example
/// ```
/// use lab_shell::Interpreter;
/// let mut sh = Interpreter::default();
/// let mut out: Vec<u8> = Vec::new();
/// sh.execute_line(b"frobnicate", &mut out).unwrap();
/// assert_eq!(out, b"Error: Command 'frobnicate' not found.\n");
/// ```
pub struct Interpreter {
    env: Environment,
    config: Config,
    builtins: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of builtin factories.
    pub fn new(config: Config, builtins: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            config,
            builtins,
        }
    }

    /// Create an interpreter with the default builtins and the given config.
    pub fn with_config(config: Config) -> Self {
        use crate::builtin::*;
        Self::new(
            config,
            vec![
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<Pwd>::default()),
                Box::new(Factory::<Ls>::default()),
                Box::new(Factory::<Cd>::default()),
            ],
        )
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Names of the builtins in lookup order.
    pub fn builtin_names(&self) -> Vec<&'static str> {
        self.builtins.iter().map(|f| f.name()).collect()
    }

    /// Run a builtin if `argv[0]` names one.
    ///
    /// Returns `None` when no builtin has that name.
    pub fn try_builtin(&mut self, argv: &[&str], stdout: &mut dyn Write) -> Result<Option<ExitCode>> {
        let Some((name, args)) = argv.split_first() else {
            return Ok(None);
        };
        for factory in &self.builtins {
            if let Some(cmd) = factory.try_create(name, args) {
                log::debug!("builtin {name}");
                let code = cmd.execute(stdout, &mut self.env)?;
                self.env.last_status = code;
                return Ok(Some(code));
            }
        }
        Ok(None)
    }

    /// Dispatch one argument vector: builtin, then external program.
    ///
    /// Nothing is printed for [`Dispatch::NotFound`]; the caller decides how
    /// to report it.
    pub fn dispatch(&mut self, argv: &[&str], stdout: &mut dyn Write) -> Result<Dispatch> {
        if let Some(code) = self.try_builtin(argv, stdout)? {
            return Ok(Dispatch::Builtin(code));
        }
        if external::run_program(&self.config.search_path, argv, stdout, &mut self.env)? {
            return Ok(Dispatch::Program);
        }
        Ok(Dispatch::NotFound)
    }

    /// Tokenize and dispatch the raw bytes of one input line, newline already
    /// removed.
    ///
    /// The length limit applies to the bytes as read. A line that is not valid
    /// UTF-8 is reported and not run. Every command-level problem is reported
    /// on `stdout` and swallowed; an `Err` only comes back when `stdout` itself
    /// fails.
    pub fn execute_line(&mut self, line: &[u8], stdout: &mut dyn Write) -> Result<()> {
        if let Err(e) = check_line_len(line, self.config.max_line_len()) {
            log::warn!("line of {} bytes exceeds {} bytes", e.len, e.max);
            writeln!(stdout, "{e}")?;
            return Ok(());
        }
        let line = match decode_line(line) {
            Ok(line) => line,
            Err(e) => {
                log::warn!("invalid UTF-8 after byte {}", e.valid_up_to);
                writeln!(stdout, "{e}")?;
                return Ok(());
            }
        };
        let argv = match lexer::split_into_tokens(line, self.config.max_args) {
            Ok(argv) => argv,
            Err(e) => {
                writeln!(stdout, "{e}")?;
                return Ok(());
            }
        };
        if argv.is_empty() {
            return Ok(());
        }
        if self.dispatch(&argv, stdout)? == Dispatch::NotFound {
            writeln!(stdout, "Error: Command '{}' not found.", argv[0])?;
        }
        Ok(())
    }

    /// Read-dispatch loop.
    ///
    /// Prompts, reads and dispatches until the source reports end of input or
    /// `exit` has run.
    pub fn repl(&mut self, source: &mut dyn LineSource, stdout: &mut dyn Write) -> Result<()> {
        while !self.env.should_exit {
            let Some(line) = source.read_line(&self.config.prompt)? else {
                log::debug!("end of input");
                break;
            };
            self.execute_line(&line, stdout)?;
            stdout.flush()?;
        }
        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default configuration and the
    /// builtins `exit`, `pwd`, `ls` and `cd`, in that lookup order.
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}
