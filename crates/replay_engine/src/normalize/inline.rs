use std::collections::HashMap;

use ego_tree::NodeId;
use scraper::{Html, Selector};

use super::dom::{from_scraper_children, serialize, Element, Node};
use super::sanitize::map_elements;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InlineError {
    #[error("stylesheet: {0}")]
    Stylesheet(String),
    #[error("selector `{selector}`: {message}")]
    Selector { selector: String, message: String },
}

/// Result of the inlining stage. `Degraded` still carries a usable tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Styled {
    Inlined(Vec<Node>),
    Degraded { nodes: Vec<Node>, error: InlineError },
}

impl Styled {
    pub fn into_nodes(self) -> Vec<Node> {
        match self {
            Styled::Inlined(nodes) | Styled::Degraded { nodes, .. } => nodes,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Styled::Degraded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: String,
    pub declarations: Vec<String>,
}

/// Move class-based rules from `stylesheet` into `style` attributes, then
/// drop `class`. Declarations already inline on an element win over rules.
pub fn inline_styles(nodes: Vec<Node>, stylesheet: Option<&str>) -> Styled {
    let rules = match stylesheet.map(parse_stylesheet).transpose() {
        Ok(rules) => rules.unwrap_or_default(),
        Err(error) => return Styled::Degraded { nodes, error },
    };
    if rules.is_empty() {
        return Styled::Inlined(map_elements(nodes, &mut drop_class));
    }

    // Stable sort: equal specificity keeps stylesheet order, and later
    // declarations override earlier ones.
    let mut ordered: Vec<&CssRule> = rules.iter().collect();
    ordered.sort_by_key(|rule| specificity(&rule.selector));

    let fragment = Html::parse_fragment(&serialize(&nodes));
    let mut additions: HashMap<NodeId, Vec<String>> = HashMap::new();
    for rule in ordered {
        let selector = match Selector::parse(&rule.selector) {
            Ok(selector) => selector,
            Err(err) => {
                let error = InlineError::Selector {
                    selector: rule.selector.clone(),
                    message: err.to_string(),
                };
                return Styled::Degraded { nodes, error };
            }
        };
        for el in fragment.select(&selector) {
            additions
                .entry(el.id())
                .or_default()
                .extend(rule.declarations.iter().cloned());
        }
    }

    let styled = from_scraper_children(*fragment.root_element(), &mut |id, el| {
        if let Some(declarations) = additions.remove(&id) {
            let mut style: Vec<String> = declarations;
            style.extend(el.attr("style").map(split_declarations).unwrap_or_default());
            el.set_attr("style", style.join("; "));
        }
        el.remove_attr("class");
    });
    Styled::Inlined(styled)
}

/// Selector specificity as `(ids, classes, types)`. Attributes and
/// pseudo-classes count as classes, pseudo-elements as types.
fn specificity(selector: &str) -> (u32, u32, u32) {
    let mut ids = 0;
    let mut classes = 0;
    let mut types = 0;
    let mut chars = selector.chars().peekable();
    let mut at_compound_start = true;
    while let Some(c) = chars.next() {
        match c {
            '#' => ids += 1,
            '.' => classes += 1,
            '[' => {
                classes += 1;
                for inner in chars.by_ref() {
                    if inner == ']' {
                        break;
                    }
                }
            }
            ':' => {
                if chars.peek() == Some(&':') {
                    chars.next();
                    types += 1;
                } else {
                    classes += 1;
                }
            }
            ' ' | '>' | '+' | '~' => {
                at_compound_start = true;
                continue;
            }
            c if at_compound_start && (c.is_alphabetic() || c == '*') => {
                if c != '*' {
                    types += 1;
                }
            }
            _ => {}
        }
        at_compound_start = false;
        // skip the rest of this identifier
        while chars
            .peek()
            .is_some_and(|next| next.is_alphanumeric() || matches!(next, '-' | '_'))
        {
            chars.next();
        }
    }
    (ids, classes, types)
}

fn drop_class(mut el: Element) -> Element {
    el.remove_attr("class");
    el
}

/// Flat `selector { declarations }` rules. Comments are skipped; at-rules and
/// unbalanced braces are errors.
pub fn parse_stylesheet(css: &str) -> Result<Vec<CssRule>, InlineError> {
    let css = strip_comments(css)?;
    let mut rules = Vec::new();
    let mut rest = css.as_str();
    while !rest.trim().is_empty() {
        let open = rest
            .find('{')
            .ok_or_else(|| InlineError::Stylesheet(format!("expected `{{` near `{}`", rest.trim())))?;
        let close = rest[open..]
            .find('}')
            .map(|idx| open + idx)
            .ok_or_else(|| InlineError::Stylesheet("unclosed rule block".into()))?;
        let selectors = rest[..open].trim();
        let body = &rest[open + 1..close];
        if selectors.starts_with('@') || body.contains('{') {
            return Err(InlineError::Stylesheet(format!("unsupported at-rule `{selectors}`")));
        }
        let declarations = split_declarations(body);
        for selector in selectors.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            rules.push(CssRule {
                selector: selector.to_string(),
                declarations: declarations.clone(),
            });
        }
        rest = &rest[close + 1..];
    }
    Ok(rules)
}

/// `a: b; c: d !important;` into `["a: b", "c: d"]`.
fn split_declarations(body: &str) -> Vec<String> {
    body.split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let value = value.trim().trim_end_matches("!important").trim();
            let property = property.trim();
            (!property.is_empty() && !value.is_empty()).then(|| format!("{property}: {value}"))
        })
        .collect()
}

fn strip_comments(css: &str) -> Result<String, InlineError> {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        let end = rest[start + 2..]
            .find("*/")
            .ok_or_else(|| InlineError::Stylesheet("unterminated comment".into()))?;
        rest = &rest[start + 2 + end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}
