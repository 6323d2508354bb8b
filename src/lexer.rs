//! Splitting a command line into argument tokens.
//!
//! Only the space character separates tokens. Tabs and every other character
//! belong to the token they appear in; there is no quoting or escaping.

use std::fmt;

/// The single character that separates tokens.
pub const DELIMITER: char = ' ';

/// Errors that can occur while tokenizing a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexingError {
    /// The line holds more tokens than the argument vector can take.
    TooManyArguments { max: usize },
}

impl fmt::Display for LexingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexingError::TooManyArguments { .. } => write!(f, "Error: Too many arguments."),
        }
    }
}

impl std::error::Error for LexingError {}

/// Splits `line` into at most `max_args` tokens.
///
/// Tokens borrow from `line`; nothing is copied. Runs of spaces count as a
/// single separator and leading or trailing spaces produce no empty tokens,
/// so an empty or space-only line yields an empty vector.
///
/// # Errors
/// [`LexingError::TooManyArguments`] when the line has more than `max_args`
/// tokens. The caller gets no partial vector in that case.
pub fn split_into_tokens(line: &str, max_args: usize) -> Result<Vec<&str>, LexingError> {
    let mut args = Vec::with_capacity(max_args);
    for token in line.split(DELIMITER).filter(|t| !t.is_empty()) {
        if args.len() == max_args {
            log::debug!("rejecting line with more than {max_args} tokens");
            return Err(LexingError::TooManyArguments { max: max_args });
        }
        args.push(token);
    }
    log::debug!("tokens = {:?}", args);
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_words() {
        assert_eq!(split_into_tokens("ls -a", 10).unwrap(), vec!["ls", "-a"]);
    }

    #[test]
    fn test_runs_of_spaces_collapse() {
        let tokens = split_into_tokens("   cd    /tmp   ", 10).unwrap();
        assert_eq!(tokens, vec!["cd", "/tmp"]);
    }

    #[test]
    fn test_empty_and_blank_lines_yield_nothing() {
        assert!(split_into_tokens("", 10).unwrap().is_empty());
        assert!(split_into_tokens("      ", 10).unwrap().is_empty());
    }

    #[test]
    fn test_tabs_are_not_delimiters() {
        let tokens = split_into_tokens("echo\tfoo bar", 10).unwrap();
        assert_eq!(tokens, vec!["echo\tfoo", "bar"]);
    }

    #[test]
    fn test_tokens_borrow_from_line() {
        let line = String::from("pwd now");
        let tokens = split_into_tokens(&line, 10).unwrap();
        let start = line.as_ptr() as usize;
        let second = tokens[1].as_ptr() as usize;
        assert_eq!(second - start, 4);
    }

    #[test]
    fn test_rejoining_reproduces_tokens() {
        let lines = ["a", "a b", "  one two  three ", "x y z w v u t s r q"];
        for line in lines {
            let tokens = split_into_tokens(line, 10).unwrap();
            let rejoined = tokens.join(" ");
            let expected: Vec<&str> = line.split_whitespace().collect();
            assert_eq!(rejoined, expected.join(" "), "line {:?}", line);
        }
    }

    #[test]
    fn test_exactly_max_tokens_is_accepted() {
        let line = "1 2 3 4 5 6 7 8 9 10";
        assert_eq!(split_into_tokens(line, 10).unwrap().len(), 10);
    }

    #[test]
    fn test_more_than_max_tokens_is_an_error() {
        let line = "1 2 3 4 5 6 7 8 9 10 11";
        let err = split_into_tokens(line, 10).unwrap_err();
        assert_eq!(err, LexingError::TooManyArguments { max: 10 });
        assert_eq!(err.to_string(), "Error: Too many arguments.");
    }

    #[test]
    fn test_trailing_spaces_do_not_count_towards_limit() {
        let line = "1 2 3 4 5 6 7 8 9 10     ";
        assert_eq!(split_into_tokens(line, 10).unwrap().len(), 10);
    }
}
