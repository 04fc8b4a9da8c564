//! crosh: a small scripting language for setting up environments.
//!
//! A script is a list of statements: variable declarations (optionally
//! exported to child processes), command executions with per-command
//! variable bindings, `if`/`else if`/`else` chains and `for` loops over
//! whitespace-separated words.
//!
//! ```text
//! export PATH=$HOME/bin:$PATH
//! for f in .bashrc .profile
//!   append 'source ~/.crosh_env' $HOME/$f
//! endfor
//! if eq $?--verbose true
//!   echo "done"
//! endif
//! ```
//!
//! Running a script goes through [`lexer::lex`], [`parser::parse`] and
//! finally [`Interpreter`]. Every error is fatal and reported with the file,
//! line and a caret under the offending spot.

mod builtin;
pub mod command;
pub mod context;
pub mod error;
mod external;
mod interpreter;
pub mod lexer;
pub mod parser;
pub mod span;

pub use context::{Context, ContextEntry};
pub use error::Error;
pub use interpreter::Interpreter;
pub use span::Source;

/// Serialises tests that change the process working directory.
#[cfg(test)]
pub(crate) static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
