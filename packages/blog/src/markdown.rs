//! Markdown to node translation.
//!
//! Covers the subset posts use: ATX headings, paragraphs, fenced code, lists,
//! block quotes and thematic breaks, with images, links, strong, emphasis and
//! inline code inside text. Raw HTML is kept as text.

use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use rsc_core::{Component, Error, Node, Props, PropsExt};

lazy_static! {
    static ref HEADING: Regex = Regex::new(r"^(#{1,6})\s+(.*?)(?:\s+#+)?\s*$").unwrap();
    static ref RULE: Regex = Regex::new(r"^(?:(?:-\s*){3,}|(?:\*\s*){3,}|(?:_\s*){3,})$").unwrap();
    static ref UNORDERED: Regex = Regex::new(r"^[-*+]\s+(.*)$").unwrap();
    static ref ORDERED: Regex = Regex::new(r"^(\d{1,9})[.)]\s+(.*)$").unwrap();
    static ref INLINE: Regex = Regex::new(concat!(
        r#"!\[(?P<img_alt>[^\]]*)\]\((?P<img_src>[^)\s]+)(?:\s+"(?P<img_title>[^"]*)")?\)"#,
        r#"|\[(?P<link_text>[^\]]+)\]\((?P<link_href>[^)\s]+)(?:\s+"(?P<link_title>[^"]*)")?\)"#,
        r"|\*\*(?P<strong>.+?)\*\*",
        r"|__(?P<strong_u>.+?)__",
        r"|\*(?P<em>[^*\s][^*]*)\*",
        r"|_(?P<em_u>[^_\s][^_]*)_",
        r"|`(?P<code>[^`]+)`",
    ))
    .unwrap();
}

const FENCES: [&str; 2] = ["```", "~~~"];

/// Renders the markdown held in its `children` prop.
///
/// The output is a group of block elements. Images become composite elements
/// of the configured image component, or plain `img` elements without one.
#[derive(Clone, Default)]
pub struct Markdown {
    image: Option<Arc<dyn Component>>,
}

impl Markdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `![alt](src)` through `component` instead of a bare `img`.
    pub fn with_image_component(mut self, component: Arc<dyn Component>) -> Self {
        self.image = Some(component);
        self
    }

    /// Translate markdown source to block nodes.
    pub fn to_nodes(&self, source: &str) -> Vec<Node> {
        let lines: Vec<&str> = source.lines().collect();
        self.blocks(&lines)
    }

    fn blocks(&self, lines: &[&str]) -> Vec<Node> {
        let mut out = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].trim();

            if line.is_empty() {
                i += 1;
                continue;
            }

            if let Some(fence) = FENCES.iter().find(|fence| line.starts_with(**fence)) {
                let lang = line[fence.len()..].trim();
                let mut body = Vec::new();
                i += 1;
                while i < lines.len() && !lines[i].trim_start().starts_with(fence) {
                    body.push(lines[i]);
                    i += 1;
                }
                // Skip the closing fence
                i += 1;
                out.push(code_block(lang, &body.join("\n")));
                continue;
            }

            if let Some(caps) = HEADING.captures(line) {
                let tag = format!("h{}", caps[1].len());
                out.push(Node::host(tag).children(self.inline(&caps[2])).build());
                i += 1;
                continue;
            }

            if RULE.is_match(line) {
                out.push(Node::host("hr").build());
                i += 1;
                continue;
            }

            if line.starts_with('>') {
                let mut quoted = Vec::new();
                while i < lines.len() {
                    let Some(rest) = lines[i].trim_start().strip_prefix('>') else {
                        break;
                    };
                    quoted.push(rest.strip_prefix(' ').unwrap_or(rest));
                    i += 1;
                }
                out.push(Node::host("blockquote").children(self.blocks(&quoted)).build());
                continue;
            }

            if UNORDERED.is_match(line) || ORDERED.is_match(line) {
                let (list, next) = self.list(lines, i);
                out.push(list);
                i = next;
                continue;
            }

            let mut paragraph = Vec::new();
            while i < lines.len() {
                let line = lines[i].trim();
                if line.is_empty() || (!paragraph.is_empty() && starts_block(line)) {
                    break;
                }
                paragraph.push(line);
                i += 1;
            }
            out.push(
                Node::host("p")
                    .children(self.inline(&paragraph.join("\n")))
                    .build(),
            );
        }

        out
    }

    /// Parse the list starting at `start`; returns the list and the index of
    /// the first line after it. Lines indented past the list's own items
    /// belong to the item above them.
    fn list(&self, lines: &[&str], start: usize) -> (Node, usize) {
        let base = indent(lines[start]);
        let ordered = ORDERED.is_match(lines[start].trim());
        let mut items: Vec<(String, Vec<&str>)> = Vec::new();
        let mut first_number = None;
        let mut i = start;

        while i < lines.len() {
            let raw = lines[i];
            let line = raw.trim();
            if line.is_empty() {
                break;
            }

            let nested = indent(raw) > base;
            let item = if nested {
                None
            } else if ordered {
                ORDERED.captures(line).map(|caps| {
                    first_number.get_or_insert_with(|| caps[1].parse::<i64>().unwrap_or(1));
                    caps[2].to_string()
                })
            } else {
                UNORDERED.captures(line).map(|caps| caps[1].to_string())
            };

            if let Some(item) = item {
                items.push((item, Vec::new()));
            } else if !nested {
                break;
            } else if let Some((_, rest)) = items.last_mut() {
                rest.push(raw);
            }
            i += 1;
        }

        let mut list = Node::host(if ordered { "ol" } else { "ul" });
        if let Some(n) = first_number.filter(|n| *n != 1) {
            list = list.prop("start", n);
        }
        let list = list.children(items.iter().map(|(text, rest)| self.list_item(text, rest)));
        (list.build(), i)
    }

    fn list_item(&self, text: &str, rest: &[&str]) -> Node {
        // Lines before the first nested block continue the item's text
        let split = rest
            .iter()
            .position(|line| starts_block(line.trim()))
            .unwrap_or(rest.len());
        let mut text = text.to_string();
        for line in &rest[..split] {
            text.push('\n');
            text.push_str(line.trim());
        }

        Node::host("li")
            .children(self.inline(&text))
            .children(self.blocks(&dedent(&rest[split..])))
            .build()
    }

    fn inline(&self, text: &str) -> Vec<Node> {
        let mut out = Vec::new();
        let mut last = 0;

        for caps in INLINE.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.start() > last {
                out.push(Node::from(&text[last..whole.start()]));
            }
            out.push(self.inline_span(&caps));
            last = whole.end();
        }

        if last < text.len() {
            out.push(Node::from(&text[last..]));
        }
        out
    }

    fn inline_span(&self, caps: &Captures<'_>) -> Node {
        if let Some(src) = caps.name("img_src") {
            let alt = caps.name("img_alt").map_or("", |m| m.as_str());
            let title = caps.name("img_title").map(|m| m.as_str());
            return self.image(src.as_str(), alt, title);
        }
        if let (Some(text), Some(href)) = (caps.name("link_text"), caps.name("link_href")) {
            let mut link = Node::host("a").prop("href", href.as_str());
            if let Some(title) = caps.name("link_title") {
                link = link.prop("title", title.as_str());
            }
            return link.children(self.inline(text.as_str())).build();
        }
        if let Some(inner) = caps.name("strong").or_else(|| caps.name("strong_u")) {
            return Node::host("strong")
                .children(self.inline(inner.as_str()))
                .build();
        }
        if let Some(inner) = caps.name("em").or_else(|| caps.name("em_u")) {
            return Node::host("em").children(self.inline(inner.as_str())).build();
        }
        if let Some(code) = caps.name("code") {
            return Node::host("code").child(code.as_str()).build();
        }
        Node::from(&caps[0])
    }

    fn image(&self, src: &str, alt: &str, title: Option<&str>) -> Node {
        let element = match &self.image {
            Some(component) => Node::composite(component.clone()),
            None => Node::host("img"),
        };
        let element = element.prop("src", src).prop("alt", alt);
        match title {
            Some(title) => element.prop("title", title).build(),
            None => element.build(),
        }
    }
}

fn starts_block(line: &str) -> bool {
    FENCES.iter().any(|fence| line.starts_with(fence))
        || HEADING.is_match(line)
        || RULE.is_match(line)
        || line.starts_with('>')
        || UNORDERED.is_match(line)
        || ORDERED.is_match(line)
}

/// Leading spaces and tabs, in bytes.
fn indent(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

fn dedent<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let width = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent(line))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| &line[width.min(indent(line))..])
        .collect()
}

fn code_block(lang: &str, body: &str) -> Node {
    let mut code = Node::host("code");
    if !lang.is_empty() {
        code = code.prop("className", format!("language-{}", lang));
    }
    Node::host("pre").child(code.child(body)).build()
}

#[async_trait]
impl Component for Markdown {
    fn name(&self) -> &str {
        "Markdown"
    }

    async fn render(&self, mut props: Props) -> Result<Node, Error> {
        let source = match props.take_children() {
            Node::Null => String::new(),
            Node::String(source) => source,
            other => {
                return Err(Error::invalid_props(
                    self.name(),
                    format!("children must be markdown text, found {}", other.kind()),
                ))
            }
        };
        Ok(Node::group(self.to_nodes(&source)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsc_core::component_fn;

    fn md(source: &str) -> Vec<Node> {
        Markdown::new().to_nodes(source)
    }

    fn el(tag: &str, children: Vec<Node>) -> Node {
        Node::host(tag).children(children).build()
    }

    #[test]
    fn headings_and_paragraphs() {
        let nodes = md("# Title\n\nFirst line\nsecond line\n\n## Sub ##\n");
        assert_eq!(
            nodes,
            vec![
                el("h1", vec!["Title".into()]),
                el("p", vec!["First line\nsecond line".into()]),
                el("h2", vec!["Sub".into()]),
            ]
        );
    }

    #[test]
    fn heading_keeps_hash_inside_text() {
        assert_eq!(md("# C#"), vec![el("h1", vec!["C#".into()])]);
        assert_eq!(md("#nospace"), vec![el("p", vec!["#nospace".into()])]);
    }

    #[test]
    fn heading_interrupts_paragraph() {
        let nodes = md("text\n# Head");
        assert_eq!(
            nodes,
            vec![el("p", vec!["text".into()]), el("h1", vec!["Head".into()])]
        );
    }

    #[test]
    fn unordered_list_with_continuation() {
        let nodes = md("- one\n- two\n  more\n\nafter");
        assert_eq!(
            nodes,
            vec![
                el(
                    "ul",
                    vec![
                        el("li", vec!["one".into()]),
                        el("li", vec!["two\nmore".into()]),
                    ]
                ),
                el("p", vec!["after".into()]),
            ]
        );
    }

    #[test]
    fn nested_lists_stay_inside_their_item() {
        let nodes = md("- fruit\n  - apple\n  - pear\n    sweet\n- veg\n\nafter");
        assert_eq!(
            nodes,
            vec![
                el(
                    "ul",
                    vec![
                        el(
                            "li",
                            vec![
                                "fruit".into(),
                                el(
                                    "ul",
                                    vec![
                                        el("li", vec!["apple".into()]),
                                        el("li", vec!["pear\nsweet".into()]),
                                    ]
                                ),
                            ]
                        ),
                        el("li", vec!["veg".into()]),
                    ]
                ),
                el("p", vec!["after".into()]),
            ]
        );
    }

    #[test]
    fn ordered_list_nested_in_unordered() {
        let nodes = md("- steps\n  1. mix\n  2. bake");
        let li = nodes[0].as_host().unwrap().children[0].as_host().unwrap();
        let inner = li.children[1].as_host().unwrap();
        assert_eq!(inner.tag, "ol");
        assert_eq!(inner.children.len(), 2);
    }

    #[test]
    fn ordered_list_keeps_start() {
        let nodes = md("3. three\n4. four");
        let list = nodes[0].as_host().unwrap();
        assert_eq!(list.tag, "ol");
        assert_eq!(list.props.get("start"), Some(&Node::from(3i64)));
        assert_eq!(list.children.len(), 2);

        let from_one = md("1. a");
        assert!(from_one[0].as_host().unwrap().props.get("start").is_none());
    }

    #[test]
    fn fenced_code_is_verbatim() {
        let nodes = md("```rust\nlet x = *y*;\n\nfn main() {}\n```\nafter");
        assert_eq!(
            nodes,
            vec![
                Node::host("pre")
                    .child(
                        Node::host("code")
                            .prop("className", "language-rust")
                            .child("let x = *y*;\n\nfn main() {}")
                    )
                    .build(),
                el("p", vec!["after".into()]),
            ]
        );
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        let nodes = md("~~~\ncode");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].as_host().unwrap().tag, "pre");
    }

    #[test]
    fn blockquote_and_rule() {
        let nodes = md("> quoted\n> # inner\n\n---");
        assert_eq!(
            nodes,
            vec![
                el(
                    "blockquote",
                    vec![el("p", vec!["quoted".into()]), el("h1", vec!["inner".into()])]
                ),
                Node::host("hr").build(),
            ]
        );
    }

    #[test]
    fn inline_spans() {
        let nodes = md("See [the **docs**](/docs), *now* or `later`.");
        assert_eq!(
            nodes,
            vec![el(
                "p",
                vec![
                    "See ".into(),
                    Node::host("a")
                        .prop("href", "/docs")
                        .child("the ")
                        .child(el("strong", vec!["docs".into()]))
                        .build(),
                    ", ".into(),
                    el("em", vec!["now".into()]),
                    " or ".into(),
                    el("code", vec!["later".into()]),
                    ".".into(),
                ]
            )]
        );
    }

    #[test]
    fn link_title_becomes_a_prop() {
        let nodes = md(r#"[home](/ "Go home")"#);
        assert_eq!(
            nodes,
            vec![el(
                "p",
                vec![Node::host("a")
                    .prop("href", "/")
                    .prop("title", "Go home")
                    .child("home")
                    .build()]
            )]
        );
    }

    #[test]
    fn lone_asterisk_is_text() {
        assert_eq!(md("2 * 3"), vec![el("p", vec!["2 * 3".into()])]);
    }

    #[test]
    fn image_without_component_is_img() {
        let nodes = md(r#"![a cat](/cat.png "Tom")"#);
        assert_eq!(
            nodes,
            vec![el(
                "p",
                vec![Node::host("img")
                    .prop("src", "/cat.png")
                    .prop("alt", "a cat")
                    .prop("title", "Tom")
                    .build()]
            )]
        );
    }

    #[test]
    fn image_with_component_is_composite() {
        let image = component_fn("Image", |_| Ok(Node::Null));
        let nodes = Markdown::new()
            .with_image_component(image.clone())
            .to_nodes("![x](x.png)");
        let paragraph = nodes[0].as_host().unwrap();
        assert_eq!(
            paragraph.children,
            vec![Node::composite(image)
                .prop("src", "x.png")
                .prop("alt", "x")
                .build()]
        );
    }

    #[tokio::test]
    async fn component_renders_group() {
        let mut props = Props::new();
        props.insert("children".to_string(), Node::from("# Hi"));
        let node = Markdown::new().render(props).await.unwrap();
        assert_eq!(node, Node::group(vec![el("h1", vec!["Hi".into()])]));
    }

    #[tokio::test]
    async fn component_rejects_non_text() {
        let mut props = Props::new();
        props.insert("children".to_string(), Node::from(3i64));
        let err = Markdown::new().render(props).await.unwrap_err();
        assert!(matches!(err, Error::InvalidProps { .. }));
    }
}
