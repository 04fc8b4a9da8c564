use crate::command::{CommandFactory, ExecutableCommand, Outcome, Stdout};
use crate::context::Context;
use crate::interpreter::Factory;
use anyhow::{Context as _, Result};
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

/// Command that is not a builtin.
pub struct ExternalCommand {
    path: PathBuf,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(path: PathBuf, args: Vec<OsString>) -> Self {
        Self { path, args }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(&self, ctx: &Context, name: &str, args: &[String]) -> Option<Box<dyn ExecutableCommand>> {
        // The script's PATH, not the one crosh was started with
        let search_paths = ctx.value("PATH");
        let executable = find_command_path(OsStr::new(search_paths), Path::new(name))?;
        Some(Box::new(ExternalCommand::new(
            executable.into_owned(),
            args.iter().map(OsString::from).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    /// Runs the process to completion with only the exported variables as
    /// its environment. Output is inherited, or collected when `stdout`
    /// captures.
    fn execute(self: Box<Self>, ctx: &Context, stdout: &mut dyn Stdout) -> Result<Outcome> {
        let mut cmd = std::process::Command::new(&self.path);
        cmd.args(&self.args).env_clear().envs(ctx.exported());
        tracing::debug!(command = %self.path.display(), args = ?self.args, "spawning");

        let spawn_error = || format!("can't run {}", self.path.display());
        let exit_status = if stdout.captures() {
            let output = cmd
                .stdout(Stdio::piped())
                .spawn()
                .with_context(spawn_error)?
                .wait_with_output()?;
            stdout.write_all(&output.stdout)?;
            output.status
        } else {
            // Keep our buffered output ahead of the child's
            stdout.flush()?;
            cmd.spawn().with_context(spawn_error)?.wait()?
        };

        let code = match exit_status.code() {
            Some(x) => x,
            None => terminated_by_signal(exit_status),
        };
        tracing::debug!(command = %self.path.display(), code, "exited");
        Ok(Outcome::Status(code))
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - Relative with multiple components (e.g., `bin/tool`): returns it if it exists.
/// - `./foo` on Unix or any `./`-prefixed path on other platforms: returns it if it exists.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first existing match.
/// - Empty path: returns `None`.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        // An empty PATH entry would resolve against the working directory
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(cmd))
        .find(|path| path.is_file())
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}
