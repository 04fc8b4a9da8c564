use crate::context::Context;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Where a command writes its output.
///
/// Either the terminal, whose handle spawned processes inherit, or an
/// in-memory buffer collecting the output of a command substitution.
pub trait Stdout: Write {
    /// True when output must be collected rather than inherited.
    fn captures(&self) -> bool;
}

impl Stdout for std::io::Stdout {
    fn captures(&self) -> bool {
        false
    }
}

impl Stdout for Vec<u8> {
    fn captures(&self) -> bool {
        true
    }
}

/// What a finished command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A builtin's return value.
    Value(String),
    /// An external process' exit status.
    Status(ExitCode),
}

/// Object-safe trait for any command that can be executed by the interpreter.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    fn execute(self: Box<Self>, ctx: &Context, stdout: &mut dyn Stdout) -> Result<Outcome>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
/// Implementations can use the context to resolve executables (e.g., using PATH).
pub trait CommandFactory {
    fn try_create(&self, ctx: &Context, name: &str, args: &[String]) -> Option<Box<dyn ExecutableCommand>>;
}
