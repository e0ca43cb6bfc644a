//! Recursive descent parser for single-file component markup.
//!
//! The parser never fails: malformed input produces a best-effort tree plus a
//! list of [`ParseError`]s. Text, comments, attribute values, and raw-text
//! element bodies are sliced directly from the source so that untouched
//! content serializes back byte-for-byte.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::ParseResult;
use smol_str::SmolStr;
use text_size::TextSize;

/// The markup parser.
pub struct Parser<'src> {
    /// The source being parsed.
    source: &'src str,
    /// The token stream.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Parse errors collected during parsing.
    errors: Vec<ParseError>,
    /// Names of the elements currently open, outermost first.
    open: Vec<SmolStr>,
    /// EOF token for when we're past the end
    eof_token: Token,
}

impl<'src> Parser<'src> {
    /// Creates a new parser.
    pub fn new(source: &'src str) -> Self {
        let tokens: Vec<Token> = Lexer::new(source).collect();
        let end = TextSize::from(source.len() as u32);
        Self {
            source,
            tokens,
            pos: 0,
            errors: Vec::new(),
            open: Vec::new(),
            eof_token: Token {
                kind: TokenKind::Eof,
                span: Span::empty(end),
            },
        }
    }

    /// Parses the source into a document.
    pub fn parse(mut self) -> ParseResult {
        let document = self.parse_document();
        ParseResult {
            document,
            errors: self.errors,
        }
    }

    // === Token helpers ===

    /// Returns the current token.
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof_token)
    }

    /// Returns the current token kind.
    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    /// Returns the text of the current token.
    fn current_text(&self) -> &'src str {
        let span = self.current().span;
        &self.source[usize::from(span.start())..usize::from(span.end())]
    }

    /// Returns the byte offset of the current token.
    fn offset(&self) -> usize {
        self.current().span.start().into()
    }

    /// Returns the token after the current one.
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos + 1).unwrap_or(&self.eof_token)
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Advances if the current token matches, returns true if matched.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skips whitespace tokens.
    fn skip_whitespace(&mut self) {
        while self.check(TokenKind::Whitespace) {
            self.advance();
        }
    }

    /// Moves past every token that starts before `offset`.
    ///
    /// Raw reads always stop on a token boundary, so no token is split.
    fn skip_to(&mut self, offset: usize) {
        while !self.check(TokenKind::Eof) && self.offset() < offset {
            self.advance();
        }
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(TextSize::from(start as u32), TextSize::from(end as u32))
    }

    /// Reports an error covering `start..` the current position.
    fn error(&mut self, kind: ParseErrorKind, start: usize) {
        let end = self.offset().max(start);
        let span = self.span(start, end);
        self.errors.push(ParseError::new(kind, span));
    }

    /// Returns true if the current `<` starts an element.
    fn starts_element(&self) -> bool {
        let next = self.peek();
        next.kind == TokenKind::Name
            && next.span.start() == self.current().span.end()
            && self
                .slice(next.span)
                .starts_with(|c: char| c.is_ascii_alphabetic())
    }

    /// Returns true if the current `<` starts a `<!...>` declaration.
    fn starts_declaration(&self) -> bool {
        let next = self.peek();
        next.kind == TokenKind::Name
            && next.span.start() == self.current().span.end()
            && self.slice(next.span).starts_with('!')
    }

    fn slice(&self, span: Span) -> &'src str {
        &self.source[usize::from(span.start())..usize::from(span.end())]
    }

    // === Nodes ===

    fn parse_document(&mut self) -> Document {
        let mut nodes = Vec::new();

        while !self.check(TokenKind::Eof) {
            if self.check(TokenKind::LAngleSlash) {
                let start = self.offset();
                let found = self.closing_tag_name().to_string();
                self.skip_closing_tag();
                self.error(ParseErrorKind::UnexpectedClosingTag { found }, start);
                continue;
            }
            if let Some(node) = self.parse_node() {
                nodes.push(node);
            }
        }

        Document {
            nodes,
            span: self.span(0, self.source.len()),
        }
    }

    fn parse_node(&mut self) -> Option<Node> {
        match self.current_kind() {
            TokenKind::Eof => None,
            TokenKind::CommentOpen => Some(self.parse_comment()),
            TokenKind::LAngle if self.starts_element() => Some(self.parse_element()),
            TokenKind::LAngle if self.starts_declaration() => Some(self.parse_doctype()),
            _ => Some(self.parse_text()),
        }
    }

    fn parse_text(&mut self) -> Node {
        let start = self.offset();
        // The first token always belongs to the text, even a stray `<`.
        self.advance();

        loop {
            match self.current_kind() {
                TokenKind::Eof | TokenKind::LAngleSlash | TokenKind::CommentOpen => break,
                TokenKind::LAngle if self.starts_element() || self.starts_declaration() => break,
                _ => self.advance(),
            }
        }

        let end = self.offset();
        Node::Text(Text {
            span: self.span(start, end),
            data: self.source[start..end].to_string(),
        })
    }

    fn parse_comment(&mut self) -> Node {
        let start = self.offset();
        let body_start: usize = self.current().span.end().into();

        let (data, end) = match self.source[body_start..].find("-->") {
            Some(len) => (&self.source[body_start..body_start + len], body_start + len + 3),
            None => {
                self.error(ParseErrorKind::UnterminatedComment, start);
                (&self.source[body_start..], self.source.len())
            }
        };
        self.skip_to(end);

        Node::Comment(Comment {
            span: self.span(start, end),
            data: data.to_string(),
        })
    }

    fn parse_doctype(&mut self) -> Node {
        let start = self.offset();
        // Skip `<!`.
        let body_start = start + 2;

        let (data, end) = match self.source[body_start..].find('>') {
            Some(len) => (&self.source[body_start..body_start + len], body_start + len + 1),
            None => (&self.source[body_start..], self.source.len()),
        };
        self.skip_to(end);

        Node::Doctype(Doctype {
            span: self.span(start, end),
            data: data.to_string(),
        })
    }

    fn parse_element(&mut self) -> Node {
        let start = self.offset();
        self.advance(); // `<`

        let name = SmolStr::new(self.current_text());
        self.advance();

        let attributes = self.parse_attributes();

        let self_closing = match self.current_kind() {
            TokenKind::SlashRAngle => {
                self.advance();
                true
            }
            TokenKind::RAngle => {
                self.advance();
                false
            }
            _ => {
                self.error(
                    ParseErrorKind::UnterminatedStartTag {
                        tag_name: name.to_string(),
                    },
                    start,
                );
                let end = self.offset();
                return Node::Element(Element {
                    span: self.span(start, end),
                    name,
                    attributes,
                    children: Vec::new(),
                    self_closing: false,
                });
            }
        };

        let mut children = Vec::new();
        if !self_closing && !is_void_element(&name) {
            let closed = if is_raw_text_element(&name) {
                self.parse_raw_text(&name, &mut children)
            } else {
                self.parse_children(&name, &mut children)
            };

            if closed {
                self.skip_closing_tag();
            } else {
                self.error(
                    ParseErrorKind::UnclosedTag {
                        tag_name: name.to_string(),
                    },
                    start,
                );
            }
        }

        let end = self.offset();
        Node::Element(Element {
            span: self.span(start, end),
            name,
            attributes,
            children,
            self_closing,
        })
    }

    /// Parses child nodes until the matching closing tag.
    ///
    /// Returns false when the element is implicitly closed, either by EOF or
    /// by the closing tag of an ancestor.
    fn parse_children(&mut self, name: &SmolStr, children: &mut Vec<Node>) -> bool {
        self.open.push(name.clone());

        let closed = loop {
            match self.current_kind() {
                TokenKind::Eof => break false,
                TokenKind::LAngleSlash => {
                    let found = self.closing_tag_name();
                    if found.eq_ignore_ascii_case(name) {
                        break true;
                    }
                    if self
                        .open
                        .iter()
                        .any(|open| open.eq_ignore_ascii_case(found))
                    {
                        break false;
                    }
                    let start = self.offset();
                    let found = found.to_string();
                    self.skip_closing_tag();
                    self.error(ParseErrorKind::UnexpectedClosingTag { found }, start);
                }
                _ => {
                    if let Some(node) = self.parse_node() {
                        children.push(node);
                    }
                }
            }
        };

        self.open.pop();
        closed
    }

    /// Reads the verbatim body of a raw-text element.
    fn parse_raw_text(&mut self, name: &str, children: &mut Vec<Node>) -> bool {
        let body_start = self.offset();
        let needle = format!("</{}", name.to_ascii_lowercase());
        let found = self.source[body_start..]
            .to_ascii_lowercase()
            .find(&needle);

        let body_end = match found {
            Some(len) => body_start + len,
            None => self.source.len(),
        };
        if body_end > body_start {
            children.push(Node::Text(Text {
                span: self.span(body_start, body_end),
                data: self.source[body_start..body_end].to_string(),
            }));
        }
        self.skip_to(body_end);

        found.is_some()
    }

    /// Returns the tag name following the current `</`.
    fn closing_tag_name(&self) -> &'src str {
        let next = self.peek();
        if next.kind == TokenKind::Name && next.span.start() == self.current().span.end() {
            self.slice(next.span)
        } else {
            ""
        }
    }

    /// Consumes a closing tag through its `>`.
    fn skip_closing_tag(&mut self) {
        self.eat(TokenKind::LAngleSlash);
        loop {
            match self.current_kind() {
                TokenKind::RAngle => {
                    self.advance();
                    break;
                }
                TokenKind::Eof
                | TokenKind::LAngle
                | TokenKind::LAngleSlash
                | TokenKind::CommentOpen => break,
                _ => self.advance(),
            }
        }
    }

    // === Attributes ===

    fn parse_attributes(&mut self) -> Vec<Attribute> {
        let mut attributes = Vec::new();

        loop {
            self.skip_whitespace();

            match self.current_kind() {
                TokenKind::RAngle
                | TokenKind::SlashRAngle
                | TokenKind::Eof
                | TokenKind::LAngle
                | TokenKind::LAngleSlash
                | TokenKind::CommentOpen => break,
                TokenKind::Name => attributes.push(self.parse_attribute()),
                // Stray `/`, `=`, or quotes inside a start tag.
                _ => self.advance(),
            }
        }

        attributes
    }

    fn parse_attribute(&mut self) -> Attribute {
        let start = self.offset();
        let name = SmolStr::new(self.current_text());
        self.advance();

        let before_eq = self.pos;
        self.skip_whitespace();
        if !self.eat(TokenKind::Eq) {
            self.pos = before_eq;
            return Attribute {
                span: self.span(start, self.offset()),
                name,
                value: String::new(),
                quote: Quote::Bare,
                deleted: false,
            };
        }
        self.skip_whitespace();

        let (value, quote) = match self.current_kind() {
            TokenKind::DoubleQuote => (self.parse_quoted_value(&name, '"'), Quote::Double),
            TokenKind::SingleQuote => (self.parse_quoted_value(&name, '\''), Quote::Single),
            TokenKind::Name | TokenKind::Slash | TokenKind::Eq => {
                let value_start = self.offset();
                while matches!(
                    self.current_kind(),
                    TokenKind::Name | TokenKind::Slash | TokenKind::Eq
                ) {
                    self.advance();
                }
                (
                    self.source[value_start..self.offset()].to_string(),
                    Quote::Unquoted,
                )
            }
            _ => (String::new(), Quote::Double),
        };

        let end = self.offset();
        Attribute {
            span: self.span(start, end),
            name,
            value,
            quote,
            deleted: false,
        }
    }

    /// Reads a quoted value; the current token is the opening quote.
    fn parse_quoted_value(&mut self, name: &str, quote: char) -> String {
        let open = self.offset();
        let body_start: usize = self.current().span.end().into();

        match self.source[body_start..].find(quote) {
            Some(len) => {
                let value = self.source[body_start..body_start + len].to_string();
                self.skip_to(body_start + len);
                self.advance(); // closing quote
                value
            }
            None => {
                let value = self.source[body_start..].to_string();
                self.skip_to(self.source.len());
                self.error(
                    ParseErrorKind::UnterminatedAttributeValue {
                        name: name.to_string(),
                    },
                    open,
                );
                value
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParseResult {
        Parser::new(source).parse()
    }

    fn first_element(result: &ParseResult) -> &Element {
        result.document.nodes[0]
            .as_element()
            .expect("expected an element")
    }

    #[test]
    fn test_parse_simple_element() {
        let result = parse("<div>hello</div>");
        assert!(result.errors.is_empty());
        let el = first_element(&result);
        assert_eq!(el.name.as_str(), "div");
        assert_eq!(el.children.len(), 1);
        match &el.children[0] {
            Node::Text(text) => assert_eq!(text.data, "hello"),
            other => panic!("Expected Text, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_attributes_in_order() {
        let result = parse(r#"<div v-for="(a, i) in list" :key="a.id" class='x' hidden></div>"#);
        assert!(result.errors.is_empty());
        let el = first_element(&result);
        let names: Vec<&str> = el.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["v-for", ":key", "class", "hidden"]);
        assert_eq!(el.attributes[0].value, "(a, i) in list");
        assert_eq!(el.attributes[2].quote, Quote::Single);
        assert_eq!(el.attributes[3].quote, Quote::Bare);
    }

    #[test]
    fn test_parse_value_with_markup_characters() {
        let result = parse(r#"<p :title="a > b ? '<x>' : 'y'"></p>"#);
        assert!(result.errors.is_empty());
        let el = first_element(&result);
        assert_eq!(el.attributes[0].value, "a > b ? '<x>' : 'y'");
    }

    #[test]
    fn test_parse_unquoted_value() {
        let result = parse("<a href=/path/to>x</a>");
        let el = first_element(&result);
        assert_eq!(el.attributes[0].value, "/path/to");
        assert_eq!(el.attributes[0].quote, Quote::Unquoted);
    }

    #[test]
    fn test_parse_void_element() {
        let result = parse(r#"<input v-model="name"><span></span>"#);
        assert!(result.errors.is_empty());
        assert_eq!(result.document.nodes.len(), 2);
        assert!(first_element(&result).children.is_empty());
    }

    #[test]
    fn test_parse_self_closing() {
        let result = parse("<my-comp/>");
        assert!(result.errors.is_empty());
        assert!(first_element(&result).self_closing);
    }

    #[test]
    fn test_parse_script_is_raw() {
        let result = parse("<script>if (a < b) { x = '</div>'; }</script>");
        assert!(result.errors.is_empty());
        let el = first_element(&result);
        assert_eq!(el.raw_text(), Some("if (a < b) { x = '</div>'; }"));
    }

    #[test]
    fn test_parse_comment() {
        let result = parse("<!-- a <b> -->");
        assert!(result.errors.is_empty());
        match &result.document.nodes[0] {
            Node::Comment(c) => assert_eq!(c.data, " a <b> "),
            other => panic!("Expected Comment, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_doctype() {
        let result = parse("<!DOCTYPE html><p></p>");
        assert!(matches!(&result.document.nodes[0], Node::Doctype(d) if d.data == "DOCTYPE html"));
        assert_eq!(result.document.nodes.len(), 2);
    }

    #[test]
    fn test_parse_nested_template() {
        let result = parse("<template><div><span>a</span></div></template>");
        assert!(result.errors.is_empty());
        let template = first_element(&result);
        let div = template.children[0].as_element().unwrap();
        assert_eq!(div.children[0].as_element().unwrap().name, "span");
    }

    #[test]
    fn test_unclosed_tag_reports_error() {
        let result = parse("<div><p>text</div>");
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            &result.errors[0].kind,
            ParseErrorKind::UnclosedTag { tag_name } if tag_name == "p"
        ));
        let div = first_element(&result);
        assert_eq!(div.children.len(), 1);
    }

    #[test]
    fn test_stray_closing_tag_reports_error() {
        let result = parse("<div></span></div>");
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(
            &result.errors[0].kind,
            ParseErrorKind::UnexpectedClosingTag { found } if found == "span"
        ));
    }

    #[test]
    fn test_unterminated_value() {
        let result = parse(r#"<div title="oops></div>"#);
        assert!(result.errors.iter().any(|e| matches!(
            e.kind,
            ParseErrorKind::UnterminatedAttributeValue { .. }
        )));
    }

    #[test]
    fn test_less_than_in_text() {
        let result = parse("<p>a < b</p>");
        assert!(result.errors.is_empty());
        let p = first_element(&result);
        match &p.children[..] {
            [Node::Text(t)] => assert_eq!(t.data, "a < b"),
            other => panic!("unexpected children {:?}", other),
        }
    }
}
