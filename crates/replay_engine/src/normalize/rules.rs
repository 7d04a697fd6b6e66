//! Fixed tables for the email-safe HTML profile.

/// Removed together with everything inside them.
pub const STRIP_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "iframe", "form", "input", "button", "select", "textarea", "noscript",
    "header", "footer", "aside", "svg", "canvas", "video", "audio", "object", "embed",
];

/// Tags kept by the sanitizer. Anything else is unwrapped, keeping its text.
pub const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "b", "blockquote", "br", "code", "dd", "del", "div", "dl", "dt", "em",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "li", "ol", "p", "pre", "q", "s", "span",
    "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "u", "ul",
    "figure", "figcaption", "cite", "mark", "small",
];

/// Attributes allowed on every kept tag.
pub const GLOBAL_ATTRS: &[&str] = &["class", "id", "style"];

/// Per-tag attribute additions to [`GLOBAL_ATTRS`].
pub const TAG_ATTRS: &[(&str, &[&str])] = &[
    ("a", &["href", "title", "target", "rel"]),
    ("img", &["src", "alt", "width", "height", "title"]),
    ("td", &["colspan", "rowspan", "align", "valign"]),
    ("th", &["colspan", "rowspan", "align", "valign"]),
    ("ol", &["start", "type"]),
    ("blockquote", &["cite"]),
];

/// Attributes holding a URL; their scheme must be in [`ALLOWED_PROTOCOLS`].
pub const URL_ATTRS: &[&str] = &["href", "src", "cite"];

pub const ALLOWED_PROTOCOLS: &[&str] = &["http", "https", "mailto"];

pub fn is_stripped_element(tag: &str) -> bool {
    STRIP_ELEMENTS.contains(&tag)
}

pub fn is_allowed_tag(tag: &str) -> bool {
    ALLOWED_TAGS.contains(&tag)
}

pub fn is_allowed_attr(tag: &str, attr: &str) -> bool {
    GLOBAL_ATTRS.contains(&attr)
        || TAG_ATTRS
            .iter()
            .any(|(name, attrs)| *name == tag && attrs.contains(&attr))
}

/// Relative references have no scheme and are always safe.
pub fn is_allowed_url(value: &str) -> bool {
    let trimmed = value.trim();
    let scheme_end = trimmed.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(idx) if trimmed[idx..].starts_with(':') => {
            let scheme = trimmed[..idx].to_ascii_lowercase();
            ALLOWED_PROTOCOLS.contains(&scheme.as_str())
        }
        _ => true,
    }
}
