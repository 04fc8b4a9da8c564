//! Source text, byte spans and the `file, line, caret` diagnostics built from them.

use std::fmt;
use std::rc::Rc;

/// A range of bytes in a [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    /// Create an empty span at a position.
    #[inline]
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Merge two spans into one that covers both.
    #[inline]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A named piece of script text: a file, an interactive line, or the body
/// of a command substitution.
#[derive(Debug, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub text: String,
}

impl Source {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            text: text.into(),
        })
    }

    /// Find the line containing `offset` and the caret column under it.
    ///
    /// Tabs are widened to two spaces and non-printable characters are
    /// dropped so the caret lines up on any terminal.
    pub fn locate(&self, offset: usize) -> Location {
        let mut line = 1;
        let mut text = String::new();
        let mut column = 0;

        for (i, c) in self.text.char_indices() {
            if c == '\n' {
                // Stop at the end of the failing line
                if i >= offset {
                    break;
                }
                line += 1;
                text.clear();
                column = 0;
                continue;
            }

            let rendered = if c == '\t' {
                "  ".to_string()
            } else if c.is_control() {
                continue;
            } else {
                c.to_string()
            };
            if i < offset {
                column += rendered.chars().count();
            }
            text.push_str(&rendered);
        }

        Location {
            file: self.name.clone(),
            line,
            text,
            column,
        }
    }
}

/// Where a token or AST node came from.
#[derive(Clone, PartialEq, Eq)]
pub struct Origin {
    pub source: Rc<Source>,
    pub span: Span,
}

impl Origin {
    pub fn new(source: Rc<Source>, span: Span) -> Self {
        Self { source, span }
    }

    pub fn location(&self) -> Location {
        self.source.locate(self.span.start)
    }

    /// An origin covering both `self` and `other`, which must share a source.
    pub fn to(&self, other: &Origin) -> Origin {
        Origin {
            source: self.source.clone(),
            span: self.span.merge(other.span),
        }
    }
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}..{}", self.source.name, self.span.start, self.span.end)
    }
}

/// A resolved position: file name, 1-based line, the rendered line and the
/// caret column within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub text: String,
    pub column: usize,
}

impl Location {
    /// Render `message` the way every fatal error is reported.
    ///
    /// ```text
    /// Failure in setup.crosh, line 3: reached EOF in string
    /// echo "unterminated
    ///      ^ near here
    /// ```
    pub fn render(&self, message: impl fmt::Display) -> String {
        format!(
            "Failure in {}, line {}: {}\n{}\n{}^ near here",
            self.file,
            self.line,
            message,
            self.text,
            " ".repeat(self.column)
        )
    }
}
