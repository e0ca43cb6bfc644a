//! Markup lexer using logos.
//!
//! Whitespace is a token of its own so that the parser can slice text nodes
//! straight out of the source without losing a byte. Every token boundary is
//! also a point where the parser may resynchronize after reading raw text
//! (comments, quoted attribute values, `<script>` bodies) directly from the
//! source.

use crate::Span;
use logos::Logos;
use text_size::TextSize;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span of the token in the source.
    pub span: Span,
}

/// Token kinds for markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Default)]
pub enum TokenKind {
    /// `<!--`
    #[token("<!--", priority = 10)]
    CommentOpen,

    /// `</`
    #[token("</", priority = 10)]
    LAngleSlash,

    /// `<`
    #[token("<", priority = 10)]
    LAngle,

    /// `/>`
    #[token("/>", priority = 10)]
    SlashRAngle,

    /// `>`
    #[token(">", priority = 10)]
    RAngle,

    /// `/`
    #[token("/", priority = 10)]
    Slash,

    /// `=`
    #[token("=", priority = 10)]
    Eq,

    /// `"`
    #[token("\"", priority = 10)]
    DoubleQuote,

    /// `'`
    #[token("'", priority = 10)]
    SingleQuote,

    /// A run of whitespace, newlines included.
    #[regex(r"[ \t\r\n\f]+", priority = 5)]
    Whitespace,

    /// Anything else: tag names, attribute names, words of text.
    #[regex(r#"[^ \t\r\n\f<>/="']+"#, priority = 1)]
    Name,

    /// End of file
    Eof,

    /// Invalid/unknown token
    #[default]
    Error,
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::CommentOpen => "'<!--'",
            TokenKind::LAngleSlash => "'</'",
            TokenKind::LAngle => "'<'",
            TokenKind::SlashRAngle => "'/>'",
            TokenKind::RAngle => "'>'",
            TokenKind::Slash => "'/'",
            TokenKind::Eq => "'='",
            TokenKind::DoubleQuote => "'\"'",
            TokenKind::SingleQuote => "'''",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Name => "name",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        }
    }
}

/// A lexer for markup source.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
            finished: false,
        }
    }

    /// Returns the source string being lexed.
    pub fn source(&self) -> &'src str {
        self.source
    }
}

fn span_of(range: std::ops::Range<usize>) -> Span {
    Span::new(
        TextSize::from(range.start as u32),
        TextSize::from(range.end as u32),
    )
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.inner.next() {
            Some(Ok(kind)) => Some(Token {
                kind,
                span: span_of(self.inner.span()),
            }),
            Some(Err(())) => Some(Token {
                kind: TokenKind::Error,
                span: span_of(self.inner.span()),
            }),
            None => {
                self.finished = true;
                let end = self.source.len();
                Some(Token {
                    kind: TokenKind::Eof,
                    span: span_of(end..end),
                })
            }
        }
    }
}
