//! Vue directive recognition.

use smol_str::SmolStr;

/// A recognized directive attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `v-text`
    Text,
    /// `v-html`
    Html,
    /// `v-show`
    Show,
    /// `v-if`
    If,
    /// `v-else`
    Else,
    /// `v-else-if`
    ElseIf,
    /// `v-for`
    For,
    /// `v-model`
    Model,
    /// Bare `v-on` with an object of listeners.
    On,
    /// `v-pre`
    Pre,
    /// `v-cloak`
    Cloak,
    /// `v-once`
    Once,
    /// `@event` or `v-on:event`, modifiers included in `event`.
    Event { event: SmolStr },
    /// `:target` or `v-bind:target`, with an optional `.filter` suffix.
    Bind {
        target: SmolStr,
        filter: Option<SmolStr>,
    },
    /// Any other `v-` attribute.
    Unknown,
}

impl Directive {
    /// Recognizes an attribute name. Returns `None` for plain attributes.
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(event) = name.strip_prefix('@').or_else(|| name.strip_prefix("v-on:")) {
            return Some(Directive::Event {
                event: event.into(),
            });
        }
        if let Some(rest) = name.strip_prefix(':').or_else(|| name.strip_prefix("v-bind:")) {
            let (target, filter) = match rest.split_once('.') {
                Some((target, filter)) => (target, Some(filter.into())),
                None => (rest, None),
            };
            return Some(Directive::Bind {
                target: target.into(),
                filter,
            });
        }
        if !name.starts_with("v-") {
            return None;
        }

        Some(match name {
            "v-text" => Directive::Text,
            "v-html" => Directive::Html,
            "v-show" => Directive::Show,
            "v-if" => Directive::If,
            "v-else" => Directive::Else,
            "v-else-if" => Directive::ElseIf,
            "v-for" => Directive::For,
            "v-model" => Directive::Model,
            "v-on" => Directive::On,
            "v-pre" => Directive::Pre,
            "v-cloak" => Directive::Cloak,
            "v-once" => Directive::Once,
            _ => Directive::Unknown,
        })
    }

    /// The San attribute name for directives that only need renaming.
    pub fn renamed(&self) -> Option<&'static str> {
        match self {
            Directive::Text => Some("s-text"),
            Directive::Html => Some("s-html"),
            Directive::Show | Directive::If => Some("s-if"),
            Directive::Else => Some("s-else"),
            Directive::ElseIf => Some("s-else-if"),
            Directive::On => Some("s-on"),
            _ => None,
        }
    }

    /// Returns true for `:key` / `v-bind:key`.
    pub fn is_key(&self) -> bool {
        matches!(self, Directive::Bind { target, .. } if target == "key")
    }
}
