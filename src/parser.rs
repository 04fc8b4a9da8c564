//! Recursive-descent parser turning [`Token`]s into an [`Ast`].

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Quoting, Token, TokenKind, TokenPart, is_identifier};
use crate::span::{Location, Origin};

/// Keywords that close a body.
const CLOSERS: &[&str] = &["else", "endif", "endfor"];

/// A piece of an interpolated word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordPart {
    Literal(String),
    /// `$name` or `${name}`.
    Variable(String),
    /// `$(...)`, parsed together with the rest of the script.
    Subshell(Ast),
}

/// A string as written: the quoting decides whether it is interpolated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringLiteral {
    /// Never interpolated.
    SingleQuoted(String),
    DoubleQuoted(Vec<WordPart>),
    /// A bareword, or several adjacent tokens glued into one word.
    Unquoted(Vec<WordPart>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    String { literal: StringLiteral, origin: Origin },
    /// `> target`. Recognised but never executed.
    Redirect { target: StringLiteral, origin: Origin },
    /// `|`. Recognised but never executed.
    Pipe { origin: Origin },
}

impl Expression {
    pub fn origin(&self) -> &Origin {
        match self {
            Expression::String { origin, .. }
            | Expression::Redirect { origin, .. }
            | Expression::Pipe { origin } => origin,
        }
    }
}

/// `name=value` or `export name=value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: Expression,
    pub export: bool,
}

/// A command invocation, e.g. `FOO=bar make -j4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Assignments visible only to this invocation, always exported to it.
    pub local_declarations: Vec<Declaration>,
    pub command: Expression,
    pub args: Vec<Expression>,
}

/// The condition of an `if`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Test {
    /// A single word, true when it evaluates to `true`.
    Value(Expression),
    /// Several words, run as a command whose result decides the branch.
    Command(Execution),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct If {
    pub test: Test,
    pub body: Ast,
    /// The next `else if` link of the chain.
    pub else_if: Option<Box<If>>,
    /// A trailing bare `else`.
    pub else_body: Option<Ast>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct For {
    pub variable: String,
    pub over: Vec<Expression>,
    pub body: Ast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Declaration(Declaration),
    Execution(Execution),
    If(If),
    For(For),
}

pub type Ast = Vec<Statement>;

/// Tokens that can be (part of) a word. Keywords other than the operators
/// are plain text wherever a word is expected.
fn is_word(token: &Token) -> bool {
    token.kind == TokenKind::String || !matches!(token.value.as_str(), ";" | ">" | "|")
}

fn parts_of(token: Token) -> Vec<TokenPart> {
    match (token.kind, token.quoting) {
        (TokenKind::Syntax, _) | (_, Quoting::Single) => vec![TokenPart::Literal(token.value)],
        _ => token.parts,
    }
}

/// Concatenates adjacent literal parts.
fn merge_literals(parts: Vec<TokenPart>) -> Vec<TokenPart> {
    let mut merged: Vec<TokenPart> = Vec::with_capacity(parts.len());
    for part in parts {
        if let (Some(TokenPart::Literal(prev)), TokenPart::Literal(text)) = (merged.last_mut(), &part) {
            prev.push_str(text);
            continue;
        }
        merged.push(part);
    }
    merged
}

/// Parses the bodies of command substitutions along the way.
fn word_parts(parts: Vec<TokenPart>) -> Result<Vec<WordPart>, ParseError> {
    parts
        .into_iter()
        .map(|part| {
            Ok(match part {
                TokenPart::Literal(text) => WordPart::Literal(text),
                TokenPart::Variable(name) => WordPart::Variable(name),
                TokenPart::Subshell(tokens) => WordPart::Subshell(AstBuilder::from(tokens).build_ast()?),
            })
        })
        .collect()
}

/// Builds the literal for one token, or for several glued ones.
fn word_literal(mut tokens: Vec<Token>) -> Result<StringLiteral, ParseError> {
    if tokens.len() == 1 {
        let token = tokens.remove(0);
        return Ok(match (token.kind, token.quoting) {
            (TokenKind::String, Quoting::Single) => StringLiteral::SingleQuoted(token.value),
            (TokenKind::String, Quoting::Double) => StringLiteral::DoubleQuoted(word_parts(token.parts)?),
            _ => StringLiteral::Unquoted(word_parts(parts_of(token))?),
        });
    }
    let parts = merge_literals(tokens.into_iter().flat_map(parts_of).collect());
    Ok(StringLiteral::Unquoted(word_parts(parts)?))
}

struct AstBuilder {
    tokens: Vec<Token>,
    pos: usize,
}

impl AstBuilder {
    fn from(tokens: Vec<Token>) -> Self {
        AstBuilder { tokens, pos: 0 }
    }

    fn build_ast(mut self) -> Result<Ast, ParseError> {
        // A stray closer at top level is reported by parse_body
        self.parse_body(&[])
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Helper to look ahead n tokens
    fn peek_n(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    fn peek_syntax(&self, value: &str) -> bool {
        self.peek().is_some_and(|t| t.is_syntax(value))
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, value: &str) -> Result<Token, ParseError> {
        let expected = format!("`{value}`");
        match self.consume() {
            Some(token) if token.is_syntax(value) => Ok(token),
            Some(token) => Err(unexpected(&token, &expected)),
            None => Err(self.eof(&expected)),
        }
    }

    /// Parse statements until EOF or one of `closers`, which is left unconsumed.
    fn parse_body(&mut self, closers: &[&str]) -> Result<Ast, ParseError> {
        let mut ast = Vec::new();
        loop {
            match self.peek() {
                None => return Ok(ast),
                Some(token) if token.is_syntax(";") => {
                    self.consume();
                }
                Some(token) if token.kind == TokenKind::Syntax && closers.contains(&token.value.as_str()) => {
                    return Ok(ast);
                }
                Some(token) if token.kind == TokenKind::Syntax && CLOSERS.contains(&token.value.as_str()) => {
                    return Err(unmatched(token));
                }
                Some(_) => {
                    ast.extend(self.parse_statement()?);
                    self.expect_terminator()?;
                }
            }
        }
    }

    fn expect_terminator(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(token) if token.is_syntax(";") => Ok(()),
            Some(token) if token.kind == TokenKind::Syntax && CLOSERS.contains(&token.value.as_str()) => Ok(()),
            Some(token) => Err(unexpected(token, "`;` or a newline")),
        }
    }

    /// Parse one statement. A declaration group yields one statement per declaration.
    fn parse_statement(&mut self) -> Result<Vec<Statement>, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.eof("a statement"));
        };

        if token.is_syntax("if") {
            return Ok(vec![Statement::If(self.parse_if()?)]);
        }
        if token.is_syntax("for") {
            return Ok(vec![Statement::For(self.parse_for()?)]);
        }
        if token.is_syntax("export") || self.at_declaration() {
            return self.parse_declarations();
        }
        if token.kind == TokenKind::String {
            return Ok(vec![Statement::Execution(self.parse_execution(Vec::new())?)]);
        }
        Err(unexpected(token, "a statement"))
    }

    /// `NAME=`: an unquoted identifier glued to a following `=`.
    fn at_declaration(&self) -> bool {
        match (self.peek(), self.peek_n(1)) {
            (Some(name), Some(eq)) => {
                name.kind == TokenKind::String
                    && name.quoting == Quoting::Unquoted
                    && is_identifier(&name.value)
                    && eq.is_syntax("=")
                    && name.span().end == eq.span().start
            }
            _ => false,
        }
    }

    /// Parse `(export? NAME=value)+`, then either fold the group into the
    /// local declarations of a following command or emit it as standalone
    /// declarations.
    fn parse_declarations(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut declarations = Vec::new();
        let mut export = false;
        loop {
            let export_token = if self.peek_syntax("export") {
                export = true;
                self.consume()
            } else {
                None
            };

            if !self.at_declaration() {
                if export_token.is_some() {
                    return Err(match self.peek() {
                        Some(token) => unexpected(token, "NAME=value after `export`"),
                        None => self.eof("NAME=value after `export`"),
                    });
                }
                break;
            }
            declarations.push(self.parse_declaration(export)?);
        }

        if self.peek().is_some_and(|t| t.kind == TokenKind::String) {
            let execution = self.parse_execution(declarations)?;
            return Ok(vec![Statement::Execution(execution)]);
        }
        Ok(declarations.into_iter().map(Statement::Declaration).collect())
    }

    fn parse_declaration(&mut self, export: bool) -> Result<Declaration, ParseError> {
        let Some(name) = self.consume() else {
            return Err(self.eof("a variable name"));
        };
        let eq = self.expect("=")?;

        // `NAME= cmd` assigns the empty string
        let has_value = self
            .peek()
            .is_some_and(|t| is_word(t) && t.span().start == eq.span().end);
        let value = if has_value {
            self.parse_word("a value")?
        } else {
            Expression::String {
                literal: StringLiteral::Unquoted(Vec::new()),
                origin: eq.origin.clone(),
            }
        };

        Ok(Declaration {
            name: name.value,
            value,
            export,
        })
    }

    /// Parse a command and its arguments up to the end of the statement.
    fn parse_execution(&mut self, local_declarations: Vec<Declaration>) -> Result<Execution, ParseError> {
        let command = self.parse_word("a command")?;
        let mut args = Vec::new();

        while let Some(token) = self.peek() {
            if token.is_syntax(";") {
                break;
            }
            if token.is_syntax(">") {
                let Some(operator) = self.consume() else { break };
                let target = self.parse_word("a redirection target")?;
                if let Expression::String { literal, origin } = target {
                    args.push(Expression::Redirect {
                        target: literal,
                        origin: operator.origin.to(&origin),
                    });
                }
            } else if token.is_syntax("|") {
                let origin = token.origin.clone();
                self.consume();
                args.push(Expression::Pipe { origin });
            } else {
                args.push(self.parse_word("an argument")?);
            }
        }

        Ok(Execution {
            local_declarations,
            command,
            args,
        })
    }

    /// Parse one word, gluing tokens written without whitespace between them
    /// (`--opt="a b"` is a single argument).
    fn parse_word(&mut self, expected: &str) -> Result<Expression, ParseError> {
        let first = match self.consume() {
            Some(token) if is_word(&token) => token,
            Some(token) => return Err(unexpected(&token, expected)),
            None => return Err(self.eof(expected)),
        };

        let mut origin = first.origin.clone();
        let mut tokens = vec![first];
        while self.peek().is_some_and(|t| is_word(t) && t.span().start == origin.span.end) {
            if let Some(token) = self.consume() {
                origin = origin.to(&token.origin);
                tokens.push(token);
            }
        }

        Ok(Expression::String {
            literal: word_literal(tokens)?,
            origin,
        })
    }

    /// Words up to the next `;`; at least one is required.
    fn parse_words(&mut self, expected: &str) -> Result<Vec<Expression>, ParseError> {
        let mut words = vec![self.parse_word(expected)?];
        while self.peek().is_some_and(is_word) {
            words.push(self.parse_word(expected)?);
        }
        Ok(words)
    }

    /// Consume the `;` ending an `if`/`for` header; EOF there means the
    /// block was never closed.
    fn end_header(&mut self, keyword: &Token) -> Result<(), ParseError> {
        match self.consume() {
            Some(token) if token.is_syntax(";") => Ok(()),
            Some(token) => Err(unexpected(&token, "`;` or a newline")),
            None => Err(unmatched(keyword)),
        }
    }

    /// `if test ; body (else if test ; body)* (else body)? endif`
    fn parse_if(&mut self) -> Result<If, ParseError> {
        let keyword = self.expect("if")?;
        if self.peek().is_none() {
            return Err(unmatched(&keyword));
        }
        let mut words = self.parse_words("a test")?;
        self.end_header(&keyword)?;

        let test = if words.len() == 1 {
            Test::Value(words.remove(0))
        } else {
            let command = words.remove(0);
            Test::Command(Execution {
                local_declarations: Vec::new(),
                command,
                args: words,
            })
        };

        let body = self.parse_body(&["else", "endif"])?;
        match self.consume() {
            Some(token) if token.is_syntax("endif") => Ok(If {
                test,
                body,
                else_if: None,
                else_body: None,
            }),
            Some(_) if self.peek_syntax("if") => {
                // `else if`: the nested chain consumes the shared `endif`
                let next = self.parse_if()?;
                Ok(If {
                    test,
                    body,
                    else_if: Some(Box::new(next)),
                    else_body: None,
                })
            }
            Some(_) => {
                let else_body = self.parse_body(&["endif"])?;
                match self.consume() {
                    Some(token) if token.is_syntax("endif") => Ok(If {
                        test,
                        body,
                        else_if: None,
                        else_body: Some(else_body),
                    }),
                    _ => Err(unmatched(&keyword)),
                }
            }
            None => Err(unmatched(&keyword)),
        }
    }

    /// `for NAME in words ; body endfor`
    fn parse_for(&mut self) -> Result<For, ParseError> {
        let keyword = self.expect("for")?;
        let variable = match self.consume() {
            Some(token)
                if token.kind == TokenKind::String
                    && token.quoting == Quoting::Unquoted
                    && is_identifier(&token.value) =>
            {
                token.value
            }
            Some(token) => return Err(unexpected(&token, "a loop variable")),
            None => return Err(unmatched(&keyword)),
        };
        self.expect("in")?;
        if self.peek().is_none() {
            return Err(unmatched(&keyword));
        }
        let over = self.parse_words("a list to iterate")?;
        self.end_header(&keyword)?;

        let body = self.parse_body(&["endfor"])?;
        match self.consume() {
            Some(token) if token.is_syntax("endfor") => Ok(For { variable, over, body }),
            _ => Err(unmatched(&keyword)),
        }
    }

    fn eof(&self, expected: &str) -> ParseError {
        let location = match self.tokens.last() {
            Some(last) => last.origin.source.locate(last.span().end),
            None => Location {
                file: String::new(),
                line: 1,
                text: String::new(),
                column: 0,
            },
        };
        ParseError {
            kind: ParseErrorKind::UnexpectedEof {
                expected: expected.to_string(),
            },
            location,
        }
    }
}

fn unexpected(token: &Token, expected: &str) -> ParseError {
    ParseError {
        kind: ParseErrorKind::UnexpectedToken {
            found: token.value.clone(),
            expected: expected.to_string(),
        },
        location: token.origin.location(),
    }
}

fn unmatched(token: &Token) -> ParseError {
    ParseError {
        kind: ParseErrorKind::Unmatched(token.value.clone()),
        location: token.origin.location(),
    }
}

/// Build the AST of a whole script.
pub fn parse(tokens: Vec<Token>) -> Result<Ast, ParseError> {
    let ast = AstBuilder::from(tokens).build_ast()?;
    tracing::trace!(statements = ast.len(), "parsed");
    Ok(ast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::span::Source;

    fn ast(text: &str) -> Ast {
        parse(lex(&Source::new("test.crosh", text)).unwrap()).unwrap()
    }

    fn parse_err(text: &str) -> ParseError {
        parse(lex(&Source::new("test.crosh", text)).unwrap()).unwrap_err()
    }

    fn unquoted(text: &str) -> StringLiteral {
        StringLiteral::Unquoted(vec![WordPart::Literal(text.to_string())])
    }

    fn literal(expr: &Expression) -> &StringLiteral {
        match expr {
            Expression::String { literal, .. } => literal,
            other => panic!("expected a string, got {other:?}"),
        }
    }

    fn declaration(statement: &Statement) -> &Declaration {
        match statement {
            Statement::Declaration(d) => d,
            other => panic!("expected a declaration, got {other:?}"),
        }
    }

    fn execution(statement: &Statement) -> &Execution {
        match statement {
            Statement::Execution(e) => e,
            other => panic!("expected an execution, got {other:?}"),
        }
    }

    #[test]
    fn empty_script() {
        assert!(ast("").is_empty());
        assert!(ast(";;\n;").is_empty());
    }

    #[test]
    fn newline_separates_declarations() {
        let a = ast("a=1\nb=2");
        assert_eq!(a.len(), 2);
        assert_eq!(declaration(&a[0]).name, "a");
        assert_eq!(literal(&declaration(&a[0]).value), &unquoted("1"));
        assert_eq!(declaration(&a[1]).name, "b");
        assert!(!declaration(&a[1]).export);
    }

    #[test]
    fn continued_line_is_one_statement() {
        let a = ast("echo one \\\n  two");
        assert_eq!(a.len(), 1);
        assert_eq!(execution(&a[0]).args.len(), 2);

        // both declarations on one logical line
        let a = ast("a=1 \\\nb=2");
        assert_eq!(a.len(), 2);
        assert_eq!(declaration(&a[1]).name, "b");
    }

    #[test]
    fn local_declarations_prefix_a_command() {
        let a = ast("FOO=bar BAZ=\"x y\" make -j4");
        assert_eq!(a.len(), 1);
        let e = execution(&a[0]);
        assert_eq!(e.local_declarations.len(), 2);
        assert_eq!(e.local_declarations[0].name, "FOO");
        assert_eq!(e.local_declarations[1].name, "BAZ");
        assert_eq!(literal(&e.command), &unquoted("make"));
        assert_eq!(e.args.len(), 1);
    }

    #[test]
    fn empty_value_before_command() {
        let a = ast("EDITOR= git commit");
        let e = execution(&a[0]);
        assert_eq!(e.local_declarations[0].name, "EDITOR");
        assert_eq!(literal(&e.local_declarations[0].value), &StringLiteral::Unquoted(Vec::new()));
        assert_eq!(literal(&e.command), &unquoted("git"));
    }

    #[test]
    fn export_applies_to_rest_of_group() {
        let a = ast("export A=1 B=2");
        assert_eq!(a.len(), 2);
        assert!(declaration(&a[0]).export);
        assert!(declaration(&a[1]).export);

        let a = ast("A=1 export B=2");
        assert!(!declaration(&a[0]).export);
        assert!(declaration(&a[1]).export);
    }

    #[test]
    fn export_requires_assignment() {
        let err = parse_err("export FOO");
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn spaced_equals_is_a_command() {
        let a = ast("a = 1");
        let e = execution(&a[0]);
        assert_eq!(literal(&e.command), &unquoted("a"));
        assert_eq!(e.args.len(), 2);
    }

    #[test]
    fn quoted_name_is_not_a_declaration() {
        let a = ast("'a'=1");
        let e = execution(&a[0]);
        assert_eq!(
            literal(&e.command),
            &StringLiteral::Unquoted(vec![WordPart::Literal("a=1".into())])
        );
    }

    #[test]
    fn adjacent_tokens_glue_into_one_argument() {
        let a = ast("echo --opt=\"a b\" x\"$y\"z k=v");
        let e = execution(&a[0]);
        assert_eq!(e.args.len(), 3);
        assert_eq!(
            literal(&e.args[1]),
            &StringLiteral::Unquoted(vec![
                WordPart::Literal("x".into()),
                WordPart::Variable("y".into()),
                WordPart::Literal("z".into()),
            ])
        );
        assert_eq!(literal(&e.args[2]), &unquoted("k=v"));
    }

    #[test]
    fn quoting_kinds_are_kept() {
        let a = ast("echo 'a $b' \"c $d\"");
        let e = execution(&a[0]);
        assert_eq!(literal(&e.args[0]), &StringLiteral::SingleQuoted("a $b".into()));
        assert!(matches!(literal(&e.args[1]), StringLiteral::DoubleQuoted(_)));
    }

    #[test]
    fn keywords_are_plain_arguments() {
        let a = ast("echo if in for endif");
        assert_eq!(execution(&a[0]).args.len(), 4);
    }

    #[test]
    fn subshell_body_is_parsed_with_the_script() {
        let a = ast("v=$(if true; echo yes; endif)");
        let StringLiteral::Unquoted(parts) = literal(&declaration(&a[0]).value) else {
            panic!("expected an unquoted value")
        };
        let [WordPart::Subshell(body)] = parts.as_slice() else { panic!("expected one subshell, got {parts:?}") };
        assert!(matches!(body[0], Statement::If(_)));
    }

    #[test]
    fn malformed_subshell_fails_to_parse() {
        let err = parse_err("echo one\necho $(endfor)");
        assert_eq!(err.kind, ParseErrorKind::Unmatched("endfor".into()));
        assert_eq!(err.location.line, 2);
        assert_eq!(err.location.column, 7);
    }

    #[test]
    fn redirect_and_pipe_are_recognised() {
        let a = ast("echo hi > out.txt | wc");
        let e = execution(&a[0]);
        assert_eq!(e.args.len(), 4);
        assert!(matches!(&e.args[1], Expression::Redirect { target, .. } if *target == unquoted("out.txt")));
        assert!(matches!(e.args[2], Expression::Pipe { .. }));
    }

    #[test]
    fn if_else_if_else_chain() {
        let a = ast(
            "if eq a b\n  echo one\nelse if eq a a\n  echo two\nelse\n  echo three\nendif",
        );
        assert_eq!(a.len(), 1);
        let Statement::If(first) = &a[0] else { panic!("expected if") };
        assert!(matches!(&first.test, Test::Command(e) if e.args.len() == 2));
        assert_eq!(first.body.len(), 1);
        assert!(first.else_body.is_none());

        let second = first.else_if.as_deref().expect("else if link");
        assert!(second.else_if.is_none());
        assert_eq!(second.else_body.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn single_word_test_is_a_value() {
        let a = ast("if $?-v; echo verbose; endif");
        let Statement::If(i) = &a[0] else { panic!("expected if") };
        assert!(matches!(i.test, Test::Value(_)));
        assert_eq!(i.body.len(), 1);
    }

    #[test]
    fn for_loop() {
        let a = ast("for x in \"a b\" c\n  echo $x\nendfor\necho done");
        assert_eq!(a.len(), 2);
        let Statement::For(f) = &a[0] else { panic!("expected for") };
        assert_eq!(f.variable, "x");
        assert_eq!(f.over.len(), 2);
        assert_eq!(f.body.len(), 1);
    }

    #[test]
    fn nested_blocks() {
        let a = ast("for x in a b\n if eq $x a\n  for y in 1 2\n   echo $x$y\n  endfor\n endif\nendfor");
        let Statement::For(outer) = &a[0] else { panic!("expected for") };
        let Statement::If(i) = &outer.body[0] else { panic!("expected if") };
        assert!(matches!(i.body[0], Statement::For(_)));
    }

    #[test]
    fn unclosed_if_is_unmatched() {
        let err = parse_err("if true\n echo hi\n");
        assert_eq!(err.kind, ParseErrorKind::Unmatched("if".into()));
        assert_eq!(err.location.line, 1);
        assert!(err.is_incomplete());
    }

    #[test]
    fn stray_closer_is_unmatched() {
        let err = parse_err("echo hi\nendfor");
        assert_eq!(err.kind, ParseErrorKind::Unmatched("endfor".into()));
        assert_eq!(err.location.line, 2);

        let err = parse_err("for x in a\nelse\nendfor");
        assert_eq!(err.kind, ParseErrorKind::Unmatched("else".into()));
    }

    #[test]
    fn bad_loop_variable() {
        let err = parse_err("for 'x' in a; endfor");
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { ref expected, .. } if expected == "a loop variable"));
    }

    #[test]
    fn statements_need_terminators() {
        let err = parse_err("if true; echo a; endif echo b");
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { ref found, .. } if found == "echo"));

        let err = parse_err("a=1 if");
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { ref found, .. } if found == "if"));
    }

    #[test]
    fn operator_cannot_start_a_statement() {
        let err = parse_err("| wc");
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { ref found, .. } if found == "|"));
    }
}
