//! A small interactive command shell.
//!
//! Lines are split on spaces into at most ten tokens. The first token names
//! either one of the builtins (`exit`, `pwd`, `ls`, `cd`) or a program, which
//! is looked up in the current directory and then in `/usr/bin` and run as a
//! child process while the shell waits for it.
//!
//! The main entry point is [`Interpreter`], which dispatches lines read from a
//! [`LineSource`](io_adapters::LineSource). The public modules expose the
//! pieces it is built from, for embedding and for tests.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod external;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod logger;

#[cfg(test)]
mod test_support;

/// Just a convenient re-export of the command dispatcher.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Dispatch, Interpreter};
