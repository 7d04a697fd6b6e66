use super::dom::Node;

/// Elements that begin and end their own line of plain text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "li", "ol", "p", "pre", "section", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "ul",
];

/// Plain-text rendering: one line per block, whitespace collapsed, blank
/// lines dropped.
pub fn plain_text(nodes: &[Node]) -> String {
    let mut builder = TextBuilder::default();
    builder.visit_all(nodes);
    builder.finish()
}

#[derive(Default)]
struct TextBuilder {
    buffer: String,
    last_char: Option<char>,
}

impl TextBuilder {
    fn visit_all(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Text(text) => self.append_text(text),
                Node::Comment(_) => {}
                Node::Element(el) if el.name == "br" => self.ensure_newline(),
                Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name.as_str()) => {
                    self.ensure_newline();
                    self.visit_all(&el.children);
                    self.ensure_newline();
                }
                Node::Element(el) => self.visit_all(&el.children),
            }
        }
    }

    fn append_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if matches!(self.last_char, None | Some(' ') | Some('\n')) {
                    continue;
                }
                self.push_char(' ');
            } else {
                self.push_char(ch);
            }
        }
    }

    fn ensure_newline(&mut self) {
        if matches!(self.last_char, None | Some('\n')) {
            return;
        }
        self.push_char('\n');
    }

    fn push_char(&mut self, ch: char) {
        self.buffer.push(ch);
        self.last_char = Some(ch);
    }

    fn finish(self) -> String {
        self.buffer
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
