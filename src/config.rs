//! Session settings, fixed once the interpreter is built.

use crate::external::SearchPath;

/// Prompt written before every read.
pub const DEFAULT_PROMPT: &str = "%> ";

/// Maximum number of tokens on one command line.
pub const DEFAULT_MAX_ARGS: usize = 10;

/// Size of the line buffer in bytes, terminator included.
pub const DEFAULT_LINE_CAPACITY: usize = 1024;

/// Immutable configuration of a shell session.
///
/// Built once at start-up (see `main`) and handed to the
/// [`Interpreter`](crate::Interpreter), which only ever borrows it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Text written (without newline) before each line is read.
    pub prompt: String,
    /// Upper bound on the number of tokens per line.
    pub max_args: usize,
    /// Line buffer size including the terminator; a line may hold at most
    /// `line_capacity - 1` bytes of content.
    pub line_capacity: usize,
    /// Directories searched for external programs, in order.
    pub search_path: SearchPath,
}

impl Config {
    /// Longest line content, in bytes, that is accepted.
    pub fn max_line_len(&self) -> usize {
        self.line_capacity.saturating_sub(1)
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_search_path(mut self, search_path: SearchPath) -> Self {
        self.search_path = search_path;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            max_args: DEFAULT_MAX_ARGS,
            line_capacity: DEFAULT_LINE_CAPACITY,
            search_path: SearchPath::default(),
        }
    }
}
