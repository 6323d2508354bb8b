use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fmt;
use std::io::{BufRead, Write};

/// Where the dispatch loop gets its lines from.
///
/// `read_line` shows `prompt`, blocks until a full line is available and
/// returns its raw bytes without the trailing newline. `Ok(None)` means end
/// of input.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<Vec<u8>>>;
}

/// A line did not fit into the line buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTooLong {
    pub len: usize,
    pub max: usize,
}

impl fmt::Display for LineTooLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: Command line too long.")
    }
}

impl std::error::Error for LineTooLong {}

/// A line that is not valid UTF-8 and so cannot be split into arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotUtf8 {
    pub valid_up_to: usize,
}

impl fmt::Display for NotUtf8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: Command line is not valid UTF-8.")
    }
}

impl std::error::Error for NotUtf8 {}

/// Views a length-checked line as text without rewriting any byte.
pub fn decode_line(line: &[u8]) -> std::result::Result<&str, NotUtf8> {
    std::str::from_utf8(line).map_err(|e| NotUtf8 {
        valid_up_to: e.valid_up_to(),
    })
}

/// Checks the raw bytes of a line, newline already removed, against the
/// buffer capacity.
pub fn check_line_len(line: &[u8], max: usize) -> std::result::Result<(), LineTooLong> {
    if line.len() > max {
        Err(LineTooLong {
            len: line.len(),
            max,
        })
    } else {
        Ok(())
    }
}

/// Plain line reader over any buffered input.
///
/// Used for pipes and files, and by the tests. The prompt goes to `prompt_out`
/// and is flushed before blocking on the read.
pub struct BufReadSource<R, W> {
    input: R,
    prompt_out: W,
}

impl<R: BufRead, W: Write> BufReadSource<R, W> {
    pub fn new(input: R, prompt_out: W) -> Self {
        Self { input, prompt_out }
    }
}

impl<R: BufRead, W: Write> LineSource for BufReadSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<Vec<u8>>> {
        write!(self.prompt_out, "{prompt}")?;
        self.prompt_out.flush()?;

        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Ok(Some(buf))
    }
}

/// Interactive line editor with in-memory history.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<Vec<u8>>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim_matches(' ').is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line.into_bytes()))
            }
            // Ctrl-C and Ctrl-D both end the session, like the default
            // SIGINT disposition and end of file would.
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
