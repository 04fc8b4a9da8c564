//! A module implementing lexical analysis (tokenization) for crosh scripts.

use crate::error::{LexError, LexErrorKind};
use crate::span::{Origin, Source, Span};
use std::rc::Rc;

/// Unquoted words that the parser treats as syntax rather than text.
pub const KEYWORDS: &[&str] = &[
    "if", "else", "endif", "for", "in", "endfor", "export", "=", ";", ">", "|",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Text: a command name, an argument or a value.
    String,
    /// One of [`KEYWORDS`].
    Syntax,
}

/// How a token was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quoting {
    /// `'…'`: never interpolated.
    Single,
    /// `"…"`: interpolated.
    Double,
    /// A bareword: interpolated, and eligible to be a keyword.
    Unquoted,
}

/// A part of a string, which can be either literal text, a variable reference, or a command substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPart {
    /// Literal text that requires no further processing.
    Literal(String),
    /// `$name` or `${name}`. Contains the name only.
    Variable(String),
    /// Command substitution in the format `$(...)`. Contains the tokens of
    /// the text inside the parentheses, located in the enclosing source.
    Subshell(Vec<Token>),
}

/// Represents a token resulting from lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub quoting: Quoting,
    /// The token text as written, without surrounding quotes.
    pub value: String,
    /// Interpolation parts; empty for syntax tokens.
    pub parts: Vec<TokenPart>,
    pub origin: Origin,
}

impl Token {
    /// True if this is the syntax token `value`.
    pub fn is_syntax(&self, value: &str) -> bool {
        self.kind == TokenKind::Syntax && self.value == value
    }

    pub fn span(&self) -> Span {
        self.origin.span
    }
}

/// `name` as accepted on the left of `=` or after `for`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

/// Length in bytes of the variable name at the start of `s`, if any.
///
/// Names are identifiers, positional digits (`0`, `12`), `@`, or flags
/// (`-v`, `--dry-run`), each optionally prefixed by `?`.
fn name_len(s: &str) -> Option<usize> {
    let (prefix, rest) = match s.strip_prefix('?') {
        Some(rest) => (1, rest),
        None => (0, s),
    };
    let first = rest.chars().next()?;
    let len = if first == '@' {
        1
    } else if first.is_ascii_digit() {
        rest.chars().take_while(char::is_ascii_digit).count()
    } else if first == '-' {
        let dashes = rest.chars().take_while(|c| *c == '-').count();
        let body = &rest[dashes..];
        if !body.chars().next().is_some_and(char::is_alphanumeric) {
            return None;
        }
        dashes
            + body
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
                .map(char::len_utf8)
                .sum::<usize>()
    } else if first.is_alphabetic() || first == '_' {
        rest.chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .map(char::len_utf8)
            .sum::<usize>()
    } else {
        return None;
    };
    Some(prefix + len)
}

/// Byte index of the `)` closing a `$(` whose body starts `s`.
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

struct Lexer<'a> {
    source: &'a Rc<Source>,
    /// Source text up to the end of the region being lexed; offsets stay
    /// relative to the whole source.
    text: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a Rc<Source>) -> Self {
        Self::within(source, 0, source.text.len())
    }

    /// A lexer for the bytes `start..end` of `source`.
    fn within(source: &'a Rc<Source>, start: usize, end: usize) -> Self {
        Lexer {
            source,
            text: &source.text[..end],
            pos: start,
            tokens: Vec::new(),
        }
    }

    fn make_tokens(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            if let Some(newline) = self.skip_whitespace() {
                self.terminate_statement(newline);
            }

            let Some(ch) = self.peek_char() else {
                break;
            };

            let token = match ch {
                '#' => {
                    self.skip_comment();
                    continue;
                }
                '\'' => self.lex_single_quoted()?,
                '"' => self.lex_double_quoted()?,
                _ => self.lex_unquoted()?,
            };
            self.tokens.push(token);
        }

        Ok(self.tokens)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.peek_char();
        if let Some(c) = ch {
            self.pos += c.len_utf8();
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    /// Skips whitespace, returning the offset of the first newline crossed.
    fn skip_whitespace(&mut self) -> Option<usize> {
        let mut newline = None;
        while let Some(c) = self.peek_char() {
            if !c.is_whitespace() {
                break;
            }
            if c == '\n' && newline.is_none() {
                newline = Some(self.pos);
            }
            self.read_char();
        }
        newline
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.read_char();
        }
    }

    /// An unescaped newline ends the statement; a lone `\` before it
    /// continues the line instead.
    fn terminate_statement(&mut self, at: usize) {
        match self.tokens.last() {
            Some(last)
                if last.kind == TokenKind::String
                    && last.quoting == Quoting::Unquoted
                    && last.value == "\\" =>
            {
                self.tokens.pop();
            }
            Some(last) if last.is_syntax(";") => {}
            Some(_) => {
                let origin = Origin::new(self.source.clone(), Span::new(at, at + 1));
                self.tokens.push(Token {
                    kind: TokenKind::Syntax,
                    quoting: Quoting::Unquoted,
                    value: ";".to_string(),
                    parts: Vec::new(),
                    origin,
                });
            }
            None => {}
        }
    }

    fn lex_single_quoted(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        self.read_char();
        let Some(len) = self.text[self.pos..].find('\'') else {
            return Err(self.error(start, LexErrorKind::UnterminatedString("single")));
        };
        let value = self.text[self.pos..self.pos + len].to_string();
        self.pos += len + 1;
        Ok(self.token(
            start,
            TokenKind::String,
            Quoting::Single,
            value.clone(),
            vec![TokenPart::Literal(value)],
        ))
    }

    fn lex_double_quoted(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        self.read_char();
        let content_start = self.pos;
        // nesting depth of `$(`; quotes inside a substitution belong to it
        let mut depth = 0usize;
        loop {
            match self.read_char() {
                None => {
                    return Err(self.error(start, LexErrorKind::UnterminatedString("double")));
                }
                Some('\\') => {
                    self.read_char();
                }
                Some('$') if self.peek_char() == Some('(') => {
                    self.read_char();
                    depth += 1;
                }
                Some('(') if depth > 0 => depth += 1,
                Some(')') if depth > 0 => depth -= 1,
                Some('"') if depth == 0 => break,
                Some(_) => {}
            }
        }
        let value = self.text[content_start..self.pos - 1].to_string();
        let parts = self.interpolate(&value, content_start, Quoting::Double)?;
        Ok(self.token(start, TokenKind::String, Quoting::Double, value, parts))
    }

    fn lex_unquoted(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        if let Some(c @ (';' | '|' | '>' | '=')) = self.peek_char() {
            self.read_char();
            return Ok(self.token(start, TokenKind::Syntax, Quoting::Unquoted, c.to_string(), Vec::new()));
        }

        // nesting depth of `$(`
        let mut depth = 0usize;
        while let Some(c) = self.peek_char() {
            if depth == 0 {
                if c.is_whitespace() || matches!(c, ';' | '|' | '>' | '\'' | '"') {
                    break;
                }
                if c == '=' && is_identifier(&self.text[start..self.pos]) {
                    break;
                }
            }
            match c {
                '\\' => {
                    self.read_char();
                    if !matches!(self.peek_char(), Some('\n') | None) {
                        self.read_char();
                    }
                }
                '$' if self.text[self.pos..].starts_with("$(") => {
                    self.pos += 2;
                    depth += 1;
                }
                '(' if depth > 0 => {
                    self.read_char();
                    depth += 1;
                }
                ')' if depth > 0 => {
                    self.read_char();
                    depth -= 1;
                }
                _ => {
                    self.read_char();
                }
            }
        }

        let value = self.text[start..self.pos].to_string();
        if KEYWORDS.contains(&value.as_str()) {
            return Ok(self.token(start, TokenKind::Syntax, Quoting::Unquoted, value, Vec::new()));
        }
        let parts = self.interpolate(&value, start, Quoting::Unquoted)?;
        Ok(self.token(start, TokenKind::String, Quoting::Unquoted, value, parts))
    }

    /// Splits `raw` (found at byte `base` of the source) into literal text,
    /// variable references and command substitutions.
    fn interpolate(&self, raw: &str, base: usize, quoting: Quoting) -> Result<Vec<TokenPart>, LexError> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut pos = 0;

        while let Some(c) = raw[pos..].chars().next() {
            match c {
                '\\' => match raw[pos + 1..].chars().next() {
                    Some(next) if quoting == Quoting::Unquoted || matches!(next, '$' | '"' | '\\') => {
                        literal.push(next);
                        pos += 1 + next.len_utf8();
                    }
                    _ => {
                        literal.push('\\');
                        pos += 1;
                    }
                },
                '$' => {
                    let rest = &raw[pos + 1..];
                    let (part, end) = if let Some(body) = rest.strip_prefix('(') {
                        let len = matching_paren(body)
                            .ok_or_else(|| self.error(base + pos, LexErrorKind::UnterminatedSubshell))?;
                        let body_start = base + pos + 2;
                        let tokens = Lexer::within(self.source, body_start, body_start + len).make_tokens()?;
                        (TokenPart::Subshell(tokens), pos + 2 + len + 1)
                    } else if let Some(body) = rest.strip_prefix('{') {
                        let Some(len) = body.find('}') else {
                            return Err(self.error(
                                base + pos,
                                LexErrorKind::InvalidIdentifier(raw[pos..].to_string()),
                            ));
                        };
                        let name = &body[..len];
                        if name_len(name) != Some(name.len()) {
                            return Err(self.error(
                                base + pos,
                                LexErrorKind::InvalidIdentifier(name.to_string()),
                            ));
                        }
                        (TokenPart::Variable(name.to_string()), pos + 2 + len + 1)
                    } else if let Some(len) = name_len(rest) {
                        (TokenPart::Variable(rest[..len].to_string()), pos + 1 + len)
                    } else {
                        literal.push('$');
                        pos += 1;
                        continue;
                    };

                    if !literal.is_empty() {
                        parts.push(TokenPart::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(part);
                    pos = end;
                }
                _ => {
                    literal.push(c);
                    pos += c.len_utf8();
                }
            }
        }

        if !literal.is_empty() {
            parts.push(TokenPart::Literal(literal));
        }
        Ok(parts)
    }

    fn token(&self, start: usize, kind: TokenKind, quoting: Quoting, value: String, parts: Vec<TokenPart>) -> Token {
        Token {
            kind,
            quoting,
            value,
            parts,
            origin: Origin::new(self.source.clone(), Span::new(start, self.pos)),
        }
    }

    fn error(&self, offset: usize, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            location: self.source.locate(offset),
        }
    }
}

/// The main entry point function to perform lexical analysis.
///
/// Newlines become `;` tokens unless the line ends in a lone `\`.
/// Fails on unterminated quotes or substitutions and on malformed `${…}`.
pub fn lex(source: &Rc<Source>) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(source).make_tokens()?;
    tracing::trace!(source = %source.name, count = tokens.len(), "lexed");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Token> {
        lex(&Source::new("test.crosh", text)).unwrap()
    }

    fn values(text: &str) -> Vec<String> {
        tokens(text).into_iter().map(|t| t.value).collect()
    }

    fn lit(s: &str) -> TokenPart {
        TokenPart::Literal(s.to_string())
    }

    fn var(s: &str) -> TokenPart {
        TokenPart::Variable(s.to_string())
    }

    /// Token values inside a `$(...)` part.
    fn subshell(part: &TokenPart) -> Vec<&str> {
        match part {
            TokenPart::Subshell(tokens) => tokens.iter().map(|t| t.value.as_str()).collect(),
            other => panic!("expected a subshell, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(tokens("").is_empty());
        assert!(tokens("  \n\t\n").is_empty());
    }

    #[test]
    fn keywords_are_syntax() {
        let ts = tokens("if for in endfor endif else export ; > |");
        assert!(ts.iter().all(|t| t.kind == TokenKind::Syntax));
    }

    #[test]
    fn quoted_keywords_are_strings() {
        let ts = tokens("'if' \"endif\" iffy");
        assert!(ts.iter().all(|t| t.kind == TokenKind::String));
    }

    #[test]
    fn single_quotes_are_verbatim() {
        let ts = tokens("'$HOME ${x} \\n'");
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].quoting, Quoting::Single);
        assert_eq!(ts[0].value, "$HOME ${x} \\n");
        assert_eq!(ts[0].parts, vec![lit("$HOME ${x} \\n")]);
    }

    #[test]
    fn double_quotes_interpolate() {
        let ts = tokens("\"hello $name, ${greeting}!\"");
        assert_eq!(
            ts[0].parts,
            vec![lit("hello "), var("name"), lit(", "), var("greeting"), lit("!")]
        );
    }

    #[test]
    fn escaped_dollar_is_literal() {
        let ts = tokens("\"cost \\$5 \\$x\"");
        assert_eq!(ts[0].parts, vec![lit("cost $5 $x")]);
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let ts = tokens("\"say \\\"hi\\\"\" next");
        assert_eq!(ts.len(), 2);
        assert_eq!(ts[0].parts, vec![lit("say \"hi\"")]);
    }

    #[test]
    fn unquoted_words_interpolate() {
        let ts = tokens("$HOME/bin:$PATH");
        assert_eq!(ts[0].kind, TokenKind::String);
        assert_eq!(ts[0].parts, vec![var("HOME"), lit("/bin:"), var("PATH")]);
    }

    #[test]
    fn positional_and_flag_variables() {
        let ts = tokens("\"$0 $12 $@ $-v $?--dry-run\"");
        assert_eq!(
            ts[0].parts,
            vec![
                var("0"),
                lit(" "),
                var("12"),
                lit(" "),
                var("@"),
                lit(" "),
                var("-v"),
                lit(" "),
                var("?--dry-run"),
            ]
        );
    }

    #[test]
    fn identifiers_take_digits_after_first_letter() {
        let ts = tokens("\"$a1b $1a\"");
        assert_eq!(ts[0].parts, vec![var("a1b"), lit(" "), var("1"), lit("a")]);
    }

    #[test]
    fn lone_dollar_is_literal() {
        let ts = tokens("\"$ and $.\"");
        assert_eq!(ts[0].parts, vec![lit("$ and $.")]);
    }

    #[test]
    fn subshell_part() {
        let ts = tokens("echo $(which ls) \"in $(pwd)\"");
        assert_eq!(ts.len(), 3);
        assert_eq!(ts[1].parts.len(), 1);
        assert_eq!(subshell(&ts[1].parts[0]), vec!["which", "ls"]);
        assert_eq!(ts[2].parts[0], lit("in "));
        assert_eq!(subshell(&ts[2].parts[1]), vec!["pwd"]);
    }

    #[test]
    fn nested_subshell() {
        let ts = tokens("$(echo $(pwd))");
        assert_eq!(subshell(&ts[0].parts[0]), vec!["echo", "$(pwd)"]);
        let TokenPart::Subshell(inner) = &ts[0].parts[0] else { panic!("expected a subshell") };
        assert_eq!(subshell(&inner[1].parts[0]), vec!["pwd"]);
    }

    #[test]
    fn subshell_tokens_keep_their_position() {
        let ts = tokens("a=1\nb=$(echo\n  two)");
        let TokenPart::Subshell(inner) = &ts[6].parts[0] else { panic!("expected a subshell") };
        let values: Vec<_> = inner.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["echo", ";", "two"]);
        assert_eq!(inner[0].span(), Span::new(8, 12));
        assert_eq!(inner[2].origin.location().line, 3);
    }

    #[test]
    fn double_quoted_subshell_may_contain_quotes() {
        let ts = tokens("echo \"[$(echo \"hi there\")]\" next");
        assert_eq!(ts.len(), 3);
        assert_eq!(ts[1].parts[0], lit("["));
        assert_eq!(subshell(&ts[1].parts[1]), vec!["echo", "hi there"]);
        assert_eq!(ts[1].parts[2], lit("]"));
    }

    #[test]
    fn error_inside_subshell_points_into_the_script() {
        let err = lex(&Source::new("t.crosh", "echo one\na=$(echo \"x)")).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString("double"));
        assert_eq!(err.location.line, 2);
        assert_eq!(err.location.text, "a=$(echo \"x)");
        assert_eq!(err.location.column, 9);
    }

    #[test]
    fn declaration_splits_at_equals() {
        assert_eq!(values("a=1"), vec!["a", "=", "1"]);
        assert_eq!(values("PATH=\"$HOME/bin\""), vec!["PATH", "=", "$HOME/bin"]);
        assert_eq!(values("--opt=x a.b=c"), vec!["--opt=x", "a.b=c"]);
    }

    #[test]
    fn operators_end_words() {
        assert_eq!(values("echo hi;echo there>out|x"), vec![
            "echo", "hi", ";", "echo", "there", ">", "out", "|", "x"
        ]);
    }

    #[test]
    fn newline_synthesizes_terminator() {
        assert_eq!(values("a=1\nb=2"), vec!["a", "=", "1", ";", "b", "=", "2"]);
        let ts = tokens("a=1\nb=2");
        assert!(ts[3].is_syntax(";"));
        assert_eq!(ts[2].value, "1");
    }

    #[test]
    fn blank_lines_make_one_terminator() {
        assert_eq!(values("a\n\n\nb;\nc"), vec!["a", ";", "b", ";", "c"]);
    }

    #[test]
    fn backslash_continues_line() {
        assert_eq!(values("a=1 \\\nb=2"), vec!["a", "=", "1", "b", "=", "2"]);
        assert_eq!(values("echo one \\\n  two"), vec!["echo", "one", "two"]);
    }

    #[test]
    fn escaped_space_stays_in_word() {
        let ts = tokens("my\\ file");
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].parts, vec![lit("my file")]);
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(values("# setup\necho hi # trailing\necho a#b"), vec![
            "echo", "hi", ";", "echo", "a#b"
        ]);
    }

    #[test]
    fn spans_track_source_offsets() {
        let ts = tokens("echo  \"x\"");
        assert_eq!(ts[0].span(), Span::new(0, 4));
        assert_eq!(ts[1].span(), Span::new(6, 9));
    }

    #[test]
    fn unterminated_double_quote_reports_line_and_caret() {
        let src = Source::new("setup.crosh", "a=1\necho \"unterminated\nb=2");
        let err = lex(&src).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString("double"));
        assert_eq!(err.location.line, 2);
        assert_eq!(err.location.column, 5);
        assert!(err.to_string().contains("^ near here"));
    }

    #[test]
    fn unterminated_single_quote() {
        let err = lex(&Source::new("t", "echo 'x")).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString("single"));
    }

    #[test]
    fn invalid_braced_identifier() {
        let err = lex(&Source::new("t", "echo \"${a b}\"")).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidIdentifier("a b".into()));

        let err = lex(&Source::new("t", "echo \"${}\"")).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidIdentifier(String::new()));

        let err = lex(&Source::new("t", "echo \"${x\"")).unwrap_err();
        assert!(matches!(err.kind, LexErrorKind::InvalidIdentifier(_)));
    }

    #[test]
    fn unterminated_subshell() {
        let err = lex(&Source::new("t", "echo $(pwd")).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedSubshell);

        let err = lex(&Source::new("t", "echo \"$(pwd\"")).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString("double"));
    }

    #[test]
    fn identifier_rules() {
        assert!(is_identifier("FOO_1"));
        assert!(is_identifier("_x"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }
}
