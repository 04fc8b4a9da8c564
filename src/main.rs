use argh::FromArgs;
use crosh::command::ExitCode;
use crosh::{Context, Error, Interpreter};
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(FromArgs)]
/// Run a crosh script, or read statements interactively when no script is given.
struct Cli {
    #[argh(option)]
    /// log filter such as `debug` or `crosh=trace`; defaults to $CROSH_LOG, then `warn`
    log: Option<String>,

    #[argh(positional, greedy)]
    /// script to run followed by its arguments, available as $1, $2, ... and $@
    args: Vec<String>,
}

fn setup_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_env("CROSH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> ExitCode {
    let interpreter = Interpreter::default();
    // Non-UTF-8 entries are kept, with invalid bytes replaced
    let env = std::env::vars_os().map(|(key, value)| {
        (key.to_string_lossy().into_owned(), value.to_string_lossy().into_owned())
    });
    let mut ctx = Context::from_process(&cli.args, env);

    let Some(script) = cli.args.first() else {
        return match interpreter.repl(&mut ctx) {
            Ok(code) => code,
            Err(err) => {
                eprintln!("Failure: {err:#}");
                1
            }
        };
    };

    match interpreter.run_file(Path::new(script), &mut ctx) {
        Ok(()) => 0,
        Err(Error::Exit(code)) => code,
        Err(err) => {
            eprintln!("{err}");
            err.exit_code()
        }
    }
}

fn main() {
    let cli: Cli = argh::from_env();
    setup_logging(cli.log.as_deref());
    tracing::debug!(args = ?cli.args, "starting");
    std::process::exit(run(&cli));
}
