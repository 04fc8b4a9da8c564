use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Outcome, Stdout};
use crate::context::Context;
use crate::error::ExitRequest;
use crate::external::find_command_path;
use crate::interpreter::Factory;
use anyhow::{Context as _, Result, bail};
use argh::{EarlyExit, FromArgs};
use regex::Regex;
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Built-in commands known to the interpreter at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process. Their return value is a string
/// which the interpreter prints, or tests in an `if`.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    fn execute(self, ctx: &Context, stdout: &mut dyn Stdout) -> Result<String>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, ctx: &Context, stdout: &mut dyn Stdout) -> Result<Outcome> {
        tracing::debug!(builtin = T::name(), "running builtin");
        <T as BuiltinCommand>::execute(*self, ctx, stdout).map(Outcome::Value)
    }
}

/// Stands in for a builtin whose arguments did not parse.
struct InvalidArgs {
    message: String,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, _ctx: &Context, _stdout: &mut dyn Stdout) -> Result<Outcome> {
        bail!("{}", self.message.trim_end())
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, _ctx: &Context, name: &str, args: &[String]) -> Option<Box<dyn ExecutableCommand>> {
        if name != T::name() {
            return None;
        }
        // Everything is positional: `eq -v $1` must not treat -v as a flag
        let args: Vec<&str> = std::iter::once("--")
            .chain(args.iter().map(String::as_str))
            .collect();
        Some(match T::from_args(&[name], &args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, .. }) => Box::new(InvalidArgs { message: output }),
        })
    }
}

/// Replace the contents of `path` through a temporary file in the same
/// directory, so readers never see a half-written file.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("can't create temporary file in {}", dir.display()))?;
    tmp.write_all(contents)?;
    tmp.persist(path)
        .with_context(|| format!("can't replace {}", path.display()))?;
    Ok(())
}

#[derive(FromArgs)]
/// Insert a line at the start of a file.
pub struct Prepend {
    #[argh(positional)]
    /// line to insert.
    pub text: String,

    #[argh(positional)]
    /// file to modify.
    pub file: String,
}

impl BuiltinCommand for Prepend {
    fn name() -> &'static str {
        "prepend"
    }

    fn execute(self, _ctx: &Context, _stdout: &mut dyn Stdout) -> Result<String> {
        let path = Path::new(&self.file);
        let old = fs::read(path).with_context(|| format!("can't read {}", self.file))?;
        let mut contents = Vec::with_capacity(self.text.len() + 1 + old.len());
        contents.extend_from_slice(self.text.as_bytes());
        contents.push(b'\n');
        contents.extend_from_slice(&old);
        write_atomically(path, &contents)?;
        Ok(String::new())
    }
}

#[derive(FromArgs)]
/// Append a line to a file, creating it if needed.
pub struct Append {
    #[argh(positional)]
    /// line to append.
    pub text: String,

    #[argh(positional)]
    /// file to modify.
    pub file: String,
}

impl BuiltinCommand for Append {
    fn name() -> &'static str {
        "append"
    }

    fn execute(self, _ctx: &Context, _stdout: &mut dyn Stdout) -> Result<String> {
        let old = match fs::read(&self.file) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e).with_context(|| format!("can't read {}", self.file)),
        };
        let mut file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.file)
            .with_context(|| format!("can't open {}", self.file))?;
        if old.last().is_some_and(|&b| b != b'\n') {
            file.write_all(b"\n")?;
        }
        writeln!(file, "{}", self.text)?;
        Ok(String::new())
    }
}

#[derive(FromArgs)]
/// Replace every match of a regular expression in a file.
pub struct Replace {
    #[argh(positional)]
    /// regular expression to search for.
    pub pattern: String,

    #[argh(positional)]
    /// replacement text; `$1` refers to capture groups.
    pub replacement: String,

    #[argh(positional)]
    /// file to modify.
    pub file: String,
}

impl BuiltinCommand for Replace {
    fn name() -> &'static str {
        "replace"
    }

    fn execute(self, _ctx: &Context, _stdout: &mut dyn Stdout) -> Result<String> {
        let re = Regex::new(&self.pattern).with_context(|| format!("invalid pattern {:?}", self.pattern))?;
        let path = Path::new(&self.file);
        let contents = fs::read_to_string(path).with_context(|| format!("can't read {}", self.file))?;
        let replaced = re.replace_all(&contents, self.replacement.as_str());
        write_atomically(path, replaced.as_bytes())?;
        Ok(String::new())
    }
}

#[derive(FromArgs)]
/// Print the path a command name resolves to, or nothing.
pub struct Which {
    #[argh(positional)]
    /// command to look up.
    pub command: String,
}

impl BuiltinCommand for Which {
    fn name() -> &'static str {
        "which"
    }

    fn execute(self, ctx: &Context, _stdout: &mut dyn Stdout) -> Result<String> {
        let search_paths = ctx.value("PATH");
        Ok(find_command_path(OsStr::new(search_paths), Path::new(&self.command))
            .map(|path| path.display().to_string())
            .unwrap_or_default())
    }
}

#[derive(FromArgs)]
/// Move or rename a file.
pub struct Mv {
    #[argh(positional)]
    /// file to move.
    pub source: String,

    #[argh(positional)]
    /// new location.
    pub dest: String,
}

impl BuiltinCommand for Mv {
    fn name() -> &'static str {
        "mv"
    }

    fn execute(self, _ctx: &Context, _stdout: &mut dyn Stdout) -> Result<String> {
        fs::rename(&self.source, &self.dest)
            .with_context(|| format!("can't move {} to {}", self.source, self.dest))?;
        Ok(String::new())
    }
}

#[derive(FromArgs)]
/// Copy a file.
pub struct Cp {
    #[argh(positional)]
    /// file to copy.
    pub source: String,

    #[argh(positional)]
    /// destination path.
    pub dest: String,
}

impl BuiltinCommand for Cp {
    fn name() -> &'static str {
        "cp"
    }

    fn execute(self, _ctx: &Context, _stdout: &mut dyn Stdout) -> Result<String> {
        fs::copy(&self.source, &self.dest)
            .with_context(|| format!("can't copy {} to {}", self.source, self.dest))?;
        Ok(String::new())
    }
}

#[derive(FromArgs)]
/// Remove files, and directories with everything in them.
pub struct Rm {
    #[argh(positional, greedy)]
    /// paths to remove.
    pub paths: Vec<String>,
}

impl BuiltinCommand for Rm {
    fn name() -> &'static str {
        "rm"
    }

    fn execute(self, _ctx: &Context, _stdout: &mut dyn Stdout) -> Result<String> {
        if self.paths.is_empty() {
            bail!("missing operand");
        }
        for path in &self.paths {
            let meta = fs::symlink_metadata(path).with_context(|| format!("can't remove {path}"))?;
            let removed = if meta.is_dir() {
                fs::remove_dir_all(path)
            } else {
                fs::remove_file(path)
            };
            removed.with_context(|| format!("can't remove {path}"))?;
        }
        Ok(String::new())
    }
}

#[derive(FromArgs)]
/// End the script with an exit code.
pub struct Exit {
    #[argh(positional)]
    /// exit code, 0 when omitted.
    pub code: Option<ExitCode>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _ctx: &Context, _stdout: &mut dyn Stdout) -> Result<String> {
        Err(ExitRequest(self.code.unwrap_or(0)).into())
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: String,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _ctx: &Context, _stdout: &mut dyn Stdout) -> Result<String> {
        std::env::set_current_dir(&self.target).with_context(|| format!("can't chdir to {}", self.target))?;
        Ok(String::new())
    }
}

#[derive(FromArgs)]
/// Compare two strings: `true` when they are equal.
pub struct Equal {
    #[argh(positional)]
    /// left-hand side.
    pub left: String,

    #[argh(positional)]
    /// right-hand side.
    pub right: String,
}

impl BuiltinCommand for Equal {
    fn name() -> &'static str {
        "eq"
    }

    fn execute(self, _ctx: &Context, _stdout: &mut dyn Stdout) -> Result<String> {
        Ok((self.left == self.right).to_string())
    }
}

#[derive(FromArgs)]
/// Compare two strings: `true` when they differ.
pub struct NotEqual {
    #[argh(positional)]
    /// left-hand side.
    pub left: String,

    #[argh(positional)]
    /// right-hand side.
    pub right: String,
}

impl BuiltinCommand for NotEqual {
    fn name() -> &'static str {
        "neq"
    }

    fn execute(self, _ctx: &Context, _stdout: &mut dyn Stdout) -> Result<String> {
        Ok((self.left != self.right).to_string())
    }
}

#[derive(FromArgs)]
/// write the arguments to standard output, separated by spaces and followed by a newline.
pub struct Echo {
    #[argh(positional, greedy)]
    /// values to print as-is, separated by spaces.
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(self, _ctx: &Context, stdout: &mut dyn Stdout) -> Result<String> {
        writeln!(stdout, "{}", self.args.join(" "))?;
        Ok(String::new())
    }
}

#[derive(FromArgs)]
/// Print the current working directory.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, _ctx: &Context, _stdout: &mut dyn Stdout) -> Result<String> {
        let dir = std::env::current_dir().context("can't read the current directory")?;
        Ok(dir.display().to_string())
    }
}
