use replay_core::ImageRef;
use url::Url;

use super::dom::{for_each_element, Element, Node};
use super::rules::{is_allowed_attr, is_allowed_tag, is_allowed_url, is_stripped_element, URL_ATTRS};

const ABSOLUTE_HREF_PREFIXES: &[&str] = &["http://", "https://", "mailto:", "#"];
const ABSOLUTE_SRC_PREFIXES: &[&str] = &["http://", "https://", "data:"];

/// Drop denylisted subtrees and every comment.
pub fn strip_denied(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            Node::Comment(_) => None,
            Node::Element(el) if is_stripped_element(&el.name) => None,
            Node::Element(mut el) => {
                el.children = strip_denied(el.children);
                Some(Node::Element(el))
            }
            text => Some(text),
        })
        .collect()
}

/// Resolve relative `a[href]` and `img[src]` against `base_url`. Rewritten
/// anchors open in a new tab.
pub fn absolutize(nodes: Vec<Node>, base_url: &str) -> Vec<Node> {
    let Ok(base) = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))) else {
        return nodes;
    };
    map_elements(nodes, &mut |mut el| {
        match el.name.as_str() {
            "a" => {
                let joined = el
                    .attr("href")
                    .filter(|href| !has_prefix(href, ABSOLUTE_HREF_PREFIXES))
                    .and_then(|href| base.join(href).ok());
                if let Some(url) = joined {
                    el.set_attr("href", url.as_str());
                    el.set_attr("target", "_blank");
                    el.set_attr("rel", "noopener noreferrer");
                }
            }
            "img" => {
                let joined = el
                    .attr("src")
                    .filter(|src| !has_prefix(src, ABSOLUTE_SRC_PREFIXES))
                    .and_then(|src| base.join(src).ok());
                if let Some(url) = joined {
                    el.set_attr("src", url.as_str());
                }
            }
            _ => {}
        }
        el
    })
}

/// Every `img[src]` in document order, skipping inline `data:` sources.
pub fn collect_images(nodes: &[Node]) -> Vec<ImageRef> {
    let mut images = Vec::new();
    for_each_element(nodes, &mut |el| {
        if el.name != "img" {
            return;
        }
        if let Some(src) = el.attr("src").filter(|src| !src.starts_with("data:")) {
            images.push(ImageRef {
                src: src.to_string(),
                alt: el.attr("alt").unwrap_or_default().to_string(),
            });
        }
    });
    images
}

/// Keep allow-listed tags and attributes. Other tags are unwrapped so their
/// text survives; comments go.
pub fn sanitize(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) => out.push(Node::Text(text)),
            Node::Comment(_) => {}
            Node::Element(el) if is_allowed_tag(&el.name) => {
                let Element {
                    name,
                    attrs,
                    children,
                } = el;
                let attrs = attrs
                    .into_iter()
                    .filter(|(attr, value)| {
                        is_allowed_attr(&name, attr)
                            && (!URL_ATTRS.contains(&attr.as_str()) || is_allowed_url(value))
                    })
                    .collect();
                out.push(Node::Element(Element {
                    name,
                    attrs,
                    children: sanitize(children),
                }));
            }
            Node::Element(el) => out.extend(sanitize(el.children)),
        }
    }
    out
}

/// Rebuild the tree bottom-up, passing each element through `f` after its
/// children have been mapped.
pub(crate) fn map_elements(nodes: Vec<Node>, f: &mut dyn FnMut(Element) -> Element) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Element(mut el) => {
                el.children = map_elements(el.children, f);
                Node::Element(f(el))
            }
            other => other,
        })
        .collect()
}

fn has_prefix(value: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| value.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::{absolutize, sanitize, strip_denied};
    use crate::normalize::dom::{parse_fragment, serialize};

    #[test]
    fn denied_subtrees_and_comments_vanish() {
        let nodes = strip_denied(parse_fragment(
            "<p>keep<!-- note --></p><script>x()</script><nav><a href='/'>home</a></nav>",
        ));
        assert_eq!(serialize(&nodes), "<p>keep</p>");
    }

    #[test]
    fn only_relative_anchors_get_new_tab_attributes() {
        let nodes = absolutize(
            parse_fragment(r##"<a href="post">p</a><a href="https://other.com/page">o</a><a href="#x">f</a>"##),
            "https://example.com/",
        );
        assert_eq!(
            serialize(&nodes),
            r##"<a href="https://example.com/post" target="_blank" rel="noopener noreferrer">p</a><a href="https://other.com/page">o</a><a href="#x">f</a>"##
        );
    }

    #[test]
    fn disallowed_tags_are_unwrapped_and_attributes_dropped() {
        let nodes = sanitize(parse_fragment(
            r#"<section onclick="x()"><p class="a" data-id="1">Hi <font color="red">there</font></p><a href="javascript:alert(1)" title="t">x</a></section>"#,
        ));
        assert_eq!(
            serialize(&nodes),
            r#"<p class="a">Hi there</p><a title="t">x</a>"#
        );
    }
}
