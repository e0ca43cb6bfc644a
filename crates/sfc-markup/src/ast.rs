//! Markup tree types.
//!
//! The tree is built once by the parser, mutated in place by a transformer,
//! and written back out by [`crate::serialize`].

use smol_str::SmolStr;
use text_size::TextRange;

/// A source range. Synthetic nodes carry an empty range at offset zero.
pub type Span = TextRange;

/// HTML void elements that never have closing tags.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is kept verbatim as a single text child.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Returns true if the given element name is an HTML void element.
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

/// Returns true if the element's content is raw text.
pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS
        .iter()
        .any(|raw| raw.eq_ignore_ascii_case(name))
}

/// The root document fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level nodes in source order.
    pub nodes: Vec<Node>,
    /// The span of the whole source.
    pub span: Span,
}

impl Document {
    /// Returns the top-level elements with the given tag name.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.nodes.iter().filter_map(move |node| match node {
            Node::Element(el) if el.name == name => Some(el),
            _ => None,
        })
    }
}

/// A node in the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// Text content, kept byte-for-byte.
    Text(Text),
    /// A `<!-- ... -->` comment.
    Comment(Comment),
    /// A `<!...>` declaration such as a doctype.
    Doctype(Doctype),
}

impl Node {
    /// Returns the span of this node.
    pub fn span(&self) -> Span {
        match self {
            Node::Element(n) => n.span,
            Node::Text(n) => n.span,
            Node::Comment(n) => n.span,
            Node::Doctype(n) => n.span,
        }
    }

    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Returns the element mutably if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// An element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The span of the element including its closing tag.
    pub span: Span,
    /// The tag name, case preserved.
    pub name: SmolStr,
    /// The attributes in source order.
    pub attributes: Vec<Attribute>,
    /// The child nodes.
    pub children: Vec<Node>,
    /// Whether the start tag was written as `<name ... />`.
    pub self_closing: bool,
}

impl Element {
    /// Creates an empty synthetic element.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            span: Span::default(),
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Returns the first live attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attr| !attr.deleted && attr.name == name)
    }

    /// Returns the index of the first live attribute with the given name.
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|attr| !attr.deleted && attr.name == name)
    }

    /// Drops every attribute marked as deleted.
    pub fn purge_deleted(&mut self) {
        self.attributes.retain(|attr| !attr.deleted);
    }

    /// Returns the text content of a raw-text element such as `<script>`.
    pub fn raw_text(&self) -> Option<&str> {
        match self.children.as_slice() {
            [Node::Text(text)] => Some(text.data.as_str()),
            [] => Some(""),
            _ => None,
        }
    }

    /// Replaces the content of a raw-text element.
    pub fn set_raw_text(&mut self, data: impl Into<String>) {
        let data = data.into();
        self.children.clear();
        if !data.is_empty() {
            self.children.push(Node::Text(Text {
                span: Span::default(),
                data,
            }));
        }
    }
}

/// How an attribute value was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quote {
    /// `name="value"`
    #[default]
    Double,
    /// `name='value'`
    Single,
    /// `name=value`
    Unquoted,
    /// `name` with no value at all.
    Bare,
}

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The span of the attribute in the source.
    pub span: Span,
    /// The attribute name, case preserved.
    pub name: SmolStr,
    /// The raw value text (entities are not decoded).
    pub value: String,
    /// The original quoting.
    pub quote: Quote,
    /// Marked for removal at the end of the current element visit.
    pub deleted: bool,
}

impl Attribute {
    /// Creates a double-quoted synthetic attribute.
    pub fn new(name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        Self {
            span: Span::default(),
            name: name.into(),
            value: value.into(),
            quote: Quote::Double,
            deleted: false,
        }
    }
}

/// Text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// The span of the text.
    pub span: Span,
    /// The raw text.
    pub data: String,
}

/// A comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// The span including delimiters.
    pub span: Span,
    /// The text between `<!--` and `-->`.
    pub data: String,
}

/// A `<!...>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctype {
    /// The span including delimiters.
    pub span: Span,
    /// The text between `<!` and `>`.
    pub data: String,
}
