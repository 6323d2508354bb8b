use argh::FromArgs;
use lab_shell::Interpreter;
use lab_shell::config::Config;
use lab_shell::io_adapters::{BufReadSource, EditorSource, LineSource};
use lab_shell::logger::StderrLogger;
use log::LevelFilter;
use std::io::IsTerminal;

#[derive(FromArgs)]
/// A small command shell with the builtins exit, pwd, ls and cd.
struct Args {
    #[argh(option, default = "LevelFilter::Off")]
    /// log verbosity on standard error: off, error, warn, info, debug or trace.
    log_level: LevelFilter,

    #[argh(switch)]
    /// read lines without the interactive editor, even on a terminal.
    plain: bool,

    #[argh(option)]
    /// prompt written before each line (default "%> ").
    prompt: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    StderrLogger::init(args.log_level)?;

    let mut config = Config::default();
    if let Some(prompt) = args.prompt {
        config = config.with_prompt(prompt);
    }

    let mut source: Box<dyn LineSource> = if !args.plain && std::io::stdin().is_terminal() {
        Box::new(EditorSource::new()?)
    } else {
        Box::new(BufReadSource::new(std::io::stdin().lock(), std::io::stdout()))
    };

    let mut sh = Interpreter::with_config(config);
    sh.repl(source.as_mut(), &mut std::io::stdout())?;
    log::debug!("leaving with status 0");
    Ok(())
}
