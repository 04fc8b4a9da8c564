//! Error types for every stage of a run.
//!
//! All of them are fatal: the first error aborts the script and only the
//! top-level driver decides how to report it and which exit code to use.

use crate::command::ExitCode;
use crate::span::Location;
use std::path::PathBuf;
use thiserror::Error;

/// What went wrong while tokenizing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("reached EOF in {0}-quoted string")]
    UnterminatedString(&'static str),

    #[error("unterminated command substitution")]
    UnterminatedSubshell,

    #[error("invalid identifier `{0}` in interpolation")]
    InvalidIdentifier(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", .location.render(.kind))]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: Location,
}

/// What went wrong while building the AST.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected `{found}`, expected {expected}")]
    UnexpectedToken { found: String, expected: String },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("unmatched `{0}`")]
    Unmatched(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", .location.render(.kind))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub location: Location,
}

impl ParseError {
    /// True when more input could still complete the script, e.g. an `if`
    /// whose `endif` has not been typed yet.
    pub fn is_incomplete(&self) -> bool {
        match &self.kind {
            ParseErrorKind::UnexpectedEof { .. } => true,
            ParseErrorKind::Unmatched(keyword) => keyword == "if" || keyword == "for",
            ParseErrorKind::UnexpectedToken { .. } => false,
        }
    }
}

/// What went wrong while running a statement.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("{command}: {message}")]
    Command { command: String, message: String },

    #[error("{0} is not supported")]
    Unsupported(&'static str),

    #[error("could not write output: {0}")]
    Output(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", render_runtime(.kind, .location))]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub location: Option<Location>,
}

fn render_runtime(kind: &RuntimeErrorKind, location: &Option<Location>) -> String {
    match location {
        Some(location) => location.render(kind),
        None => format!("Failure: {kind}"),
    }
}

/// Requested by the `exit` builtin; carried through `anyhow` until the
/// interpreter turns it into [`Error::Exit`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("exit {0}")]
pub struct ExitRequest(pub ExitCode);

/// Anything that ends a run early.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("Failure: could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not a failure: the script called `exit`.
    #[error("exit {0}")]
    Exit(ExitCode),
}

impl Error {
    /// The process exit code this outcome maps to.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Error::Exit(code) => *code,
            _ => 1,
        }
    }
}
