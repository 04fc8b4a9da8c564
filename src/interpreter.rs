use crate::command::{CommandFactory, ExitCode, Outcome, Stdout};
use crate::context::Context;
use crate::error::{Error, ExitRequest, RuntimeError, RuntimeErrorKind};
use crate::lexer::lex;
use crate::parser::{Ast, Declaration, Execution, Expression, For, If, Statement, StringLiteral, Test, WordPart, parse};
use crate::span::{Origin, Source};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only builds commands defined in this crate: builtins and the external launcher.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Runs crosh scripts.
///
/// The interpreter owns a list of [`CommandFactory`] objects that are queried
/// in order to create commands by name; variables live in the [`Context`]
/// passed to each call. See [`Default`] for the factories included out of
/// the box.
///
/// Example
/// ```
/// use crosh::{Context, Interpreter, Source};
/// let mut ctx = Context::new();
/// let mut out = Vec::new();
/// let source = Source::new("example", "name=world\necho hello $name");
/// Interpreter::default().run_source(&source, &mut ctx, &mut out).unwrap();
/// assert_eq!(out, b"hello world\n");
/// ```
pub struct Interpreter {
    commands: Vec<Box<dyn CommandFactory>>,
}

fn runtime(origin: &Origin, kind: RuntimeErrorKind) -> Error {
    Error::Runtime(RuntimeError {
        kind,
        location: Some(origin.location()),
    })
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { commands }
    }

    /// Read, lex, parse and run a script file.
    pub fn run_file(&self, path: &Path, ctx: &mut Context) -> Result<(), Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_owned(),
            source,
        })?;
        let source = Source::new(path.display().to_string(), text);
        self.run_source(&source, ctx, &mut std::io::stdout())
    }

    /// Lex and parse the whole of `source` before running any of it.
    pub fn run_source(&self, source: &Rc<Source>, ctx: &mut Context, stdout: &mut dyn Stdout) -> Result<(), Error> {
        let tokens = lex(source)?;
        let ast = parse(tokens)?;
        self.interpret(&ast, ctx, stdout)
    }

    pub fn interpret(&self, ast: &Ast, ctx: &mut Context, stdout: &mut dyn Stdout) -> Result<(), Error> {
        for statement in ast {
            self.interpret_statement(statement, ctx, stdout)?;
        }
        Ok(())
    }

    fn interpret_statement(&self, statement: &Statement, ctx: &mut Context, stdout: &mut dyn Stdout) -> Result<(), Error> {
        match statement {
            Statement::Declaration(declaration) => self.interpret_declaration(declaration, ctx),
            Statement::Execution(execution) => self.interpret_execution(execution, ctx, stdout),
            Statement::If(branch) => self.interpret_if(branch, ctx, stdout),
            Statement::For(looped) => self.interpret_for(looped, ctx, stdout),
        }
    }

    fn interpret_declaration(&self, declaration: &Declaration, ctx: &mut Context) -> Result<(), Error> {
        let value = self.evaluate(&declaration.value, ctx)?;
        ctx.set(declaration.name.as_str(), value, declaration.export);
        Ok(())
    }

    fn interpret_execution(&self, execution: &Execution, ctx: &Context, stdout: &mut dyn Stdout) -> Result<(), Error> {
        if let Outcome::Value(value) = self.execute(execution, ctx, stdout)? {
            if !value.is_empty() {
                writeln!(stdout, "{value}")
                    .map_err(|e| runtime(execution.command.origin(), RuntimeErrorKind::Output(e.to_string())))?;
            }
        }
        Ok(())
    }

    /// Run a command in a derived context holding its local declarations.
    fn execute(&self, execution: &Execution, ctx: &Context, stdout: &mut dyn Stdout) -> Result<Outcome, Error> {
        let mut local = ctx.derive();
        for declaration in &execution.local_declarations {
            let value = self.evaluate(&declaration.value, &local)?;
            local.set(declaration.name.as_str(), value, true);
        }

        let origin = execution.command.origin();
        let name = self.evaluate(&execution.command, &local)?;
        let args = execution
            .args
            .iter()
            .map(|arg| self.evaluate(arg, &local))
            .collect::<Result<Vec<_>, _>>()?;

        let command = self
            .commands
            .iter()
            .find_map(|factory| factory.try_create(&local, &name, &args))
            .ok_or_else(|| runtime(origin, RuntimeErrorKind::CommandNotFound(name.clone())))?;

        tracing::debug!(command = %name, ?args, "executing");
        command.execute(&local, stdout).map_err(|err| match err.downcast_ref::<ExitRequest>() {
            Some(ExitRequest(code)) => Error::Exit(*code),
            None => runtime(
                origin,
                RuntimeErrorKind::Command {
                    command: name,
                    message: format!("{err:#}"),
                },
            ),
        })
    }

    fn interpret_if(&self, branch: &If, ctx: &mut Context, stdout: &mut dyn Stdout) -> Result<(), Error> {
        let result = match &branch.test {
            Test::Value(expression) => self.evaluate(expression, ctx)?,
            Test::Command(execution) => match self.execute(execution, ctx, stdout)? {
                Outcome::Value(value) => value,
                Outcome::Status(code) => (code == 0).to_string(),
            },
        };

        if result == "true" {
            self.interpret(&branch.body, ctx, stdout)
        } else if let Some(next) = &branch.else_if {
            self.interpret_if(next, ctx, stdout)
        } else if let Some(body) = &branch.else_body {
            self.interpret(body, ctx, stdout)
        } else {
            Ok(())
        }
    }

    fn interpret_for(&self, looped: &For, ctx: &mut Context, stdout: &mut dyn Stdout) -> Result<(), Error> {
        let mut fields = Vec::new();
        for expression in &looped.over {
            let value = self.evaluate(expression, ctx)?;
            fields.extend(value.split_whitespace().map(str::to_owned));
        }

        let result = fields.into_iter().try_for_each(|field| {
            ctx.set(looped.variable.as_str(), field, false);
            self.interpret(&looped.body, ctx, stdout)
        });
        ctx.remove(&looped.variable);
        result
    }

    /// The string value of an expression.
    fn evaluate(&self, expression: &Expression, ctx: &Context) -> Result<String, Error> {
        let literal = match expression {
            Expression::String { literal, .. } => literal,
            Expression::Redirect { origin, .. } => {
                return Err(runtime(origin, RuntimeErrorKind::Unsupported("output redirection")));
            }
            Expression::Pipe { origin } => return Err(runtime(origin, RuntimeErrorKind::Unsupported("piping"))),
        };

        let parts = match literal {
            StringLiteral::SingleQuoted(text) => return Ok(text.clone()),
            StringLiteral::DoubleQuoted(parts) | StringLiteral::Unquoted(parts) => parts,
        };

        let mut value = String::new();
        for part in parts {
            match part {
                WordPart::Literal(text) => value.push_str(text),
                WordPart::Variable(name) => value.push_str(ctx.value(name)),
                WordPart::Subshell(body) => value.push_str(&self.substitute(body, ctx)?),
            }
        }
        Ok(value)
    }

    /// `$(body)`: run against a copy of `ctx` and return what it printed.
    fn substitute(&self, body: &Ast, ctx: &Context) -> Result<String, Error> {
        let mut copy = ctx.derive();
        let mut captured: Vec<u8> = Vec::new();
        self.interpret(body, &mut copy, &mut captured)?;

        let output = String::from_utf8_lossy(&captured);
        Ok(output.trim_end_matches('\n').to_string())
    }

    /// Interactive prompt. Statements run as soon as they are complete;
    /// errors are reported and the session goes on.
    ///
    /// Returns the code passed to `exit`, or 0 at end of input.
    pub fn repl(&self, ctx: &mut Context) -> anyhow::Result<ExitCode> {
        let mut rl = DefaultEditor::new()?;
        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() { "crosh$ " } else { "...> " };
            match rl.readline(prompt) {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    buffer.push_str(&line);
                    buffer.push('\n');
                    if continues_line(&buffer) {
                        continue;
                    }

                    let source = Source::new("<stdin>", buffer.as_str());
                    let parsed = lex(&source)
                        .map_err(Error::from)
                        .and_then(|tokens| parse(tokens).map_err(Error::from));
                    let result = match parsed {
                        // An open `if`/`for`: keep reading
                        Err(Error::Parse(err)) if err.is_incomplete() => continue,
                        Err(err) => Err(err),
                        Ok(ast) => self.interpret(&ast, ctx, &mut std::io::stdout()),
                    };
                    buffer.clear();

                    match result {
                        Ok(()) => {}
                        Err(Error::Exit(code)) => return Ok(code),
                        Err(err) => eprintln!("{err}"),
                    }
                }
                Err(ReadlineError::Interrupted) => buffer.clear(),
                Err(ReadlineError::Eof) => return Ok(0),
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// True when `buffer` ends in a lone `\` word, which joins it with the
/// next line.
fn continues_line(buffer: &str) -> bool {
    match buffer.trim_end().strip_suffix('\\') {
        Some(rest) => rest.is_empty() || rest.ends_with(char::is_whitespace),
        None => false,
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `prepend`, `append`, `replace`, `which`, `mv`, `cp`,
    ///   `rm`, `exit`, `cd`, `eq`, `neq`, `echo`, `pwd`
    /// - external command launcher, consulted last
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Prepend>::default()),
            Box::new(Factory::<Append>::default()),
            Box::new(Factory::<Replace>::default()),
            Box::new(Factory::<Which>::default()),
            Box::new(Factory::<Mv>::default()),
            Box::new(Factory::<Cp>::default()),
            Box::new(Factory::<Rm>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Equal>::default()),
            Box::new(Factory::<NotEqual>::default()),
            Box::new(Factory::<Echo>::default()),
            Box::new(Factory::<Pwd>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}
