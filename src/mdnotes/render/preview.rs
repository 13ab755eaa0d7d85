//! Themed, self-contained HTML rendering of a parsed document.

use crate::markup::Node;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const HLJS_BASE: &str = "https://cdn.jsdelivr.net/npm/highlight.js@11.9.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Colors threaded into the style sheet, in the order the template declares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeTokens {
    pub text: &'static str,
    pub text_muted: &'static str,
    pub bg_primary: &'static str,
    pub bg_secondary: &'static str,
    pub border: &'static str,
    pub code_bg: &'static str,
    pub pre_bg: &'static str,
    pub link: &'static str,
    /// highlight.js stylesheet name.
    pub highlight: &'static str,
}

const LIGHT: ThemeTokens = ThemeTokens {
    text: "#1f2328",
    text_muted: "#57606a",
    bg_primary: "#ffffff",
    bg_secondary: "#f6f8fa",
    border: "#d0d7de",
    code_bg: "#f2f2f2",
    pre_bg: "#f6f8fa",
    link: "#0969da",
    highlight: "github",
};

const DARK: ThemeTokens = ThemeTokens {
    text: "#e6e6e6",
    text_muted: "#b0b0b0",
    bg_primary: "#1e1e1e",
    bg_secondary: "#2a2a2a",
    border: "#3b3b3b",
    code_bg: "#2d2d2d",
    pre_bg: "#252526",
    link: "#4ea1ff",
    highlight: "github-dark",
};

impl Theme {
    pub fn tokens(self) -> &'static ThemeTokens {
        match self {
            Theme::Light => &LIGHT,
            Theme::Dark => &DARK,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}' (expected light or dark)", other)),
        }
    }
}

/// Render `doc` as a complete HTML document.
///
/// `base_href` is emitted as `<base href>` so relative image links resolve against the
/// note's folder. Highlighting is loaded from a CDN and degrades to plain code blocks
/// when offline.
pub fn render(doc: &Node, theme: Theme, base_href: &str) -> String {
    let mut body = String::new();
    write_node(doc, &mut body);

    let t = theme.tokens();
    let mut html = String::with_capacity(body.len() + 3072);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str(&format!("<base href=\"{}\">\n", escape_html(base_href)));
    html.push_str(&format!(
        "<link rel=\"stylesheet\" href=\"{}/styles/{}.min.css\">\n",
        HLJS_BASE, t.highlight
    ));
    html.push_str(&format!(
        "<script src=\"{}/lib/highlight.min.js\"></script>\n",
        HLJS_BASE
    ));
    html.push_str(
        "<script>\nwindow.onload = () => { if (window.hljs) { hljs.highlightAll(); } };\n</script>\n",
    );
    html.push_str("<style>\n");
    html.push_str(&format!(
        ":root {{\n  --text-normal: {};\n  --text-muted: {};\n  --bg-primary: {};\n  --bg-secondary: {};\n  --border-color: {};\n  --code-bg: {};\n  --pre-bg: {};\n  --link-color: {};\n}}\n",
        t.text, t.text_muted, t.bg_primary, t.bg_secondary, t.border, t.code_bg, t.pre_bg, t.link
    ));
    html.push_str(STYLE_RULES);
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str(&body);
    html.push_str("</body>\n</html>\n");
    html
}

const STYLE_RULES: &str = r#"body {
  font-family: "Inter", "Segoe UI", "Microsoft YaHei", Arial, sans-serif;
  padding: 22px;
  line-height: 1.7;
  background: var(--bg-primary);
  color: var(--text-normal);
}
h1, h2, h3, h4, h5, h6 { margin: 18px 0 8px; font-weight: 600; }
h1 { font-size: 1.8em; border-bottom: 1px solid var(--border-color); padding-bottom: 6px; }
h2 { font-size: 1.5em; border-bottom: 1px solid var(--border-color); padding-bottom: 4px; }
p { margin: 8px 0; }
a { color: var(--link-color); text-decoration: none; }
a:hover { text-decoration: underline; }
blockquote {
  margin: 10px 0;
  padding: 8px 12px;
  border-left: 4px solid var(--border-color);
  background: var(--bg-secondary);
  color: var(--text-muted);
}
hr { border: none; border-top: 1px solid var(--border-color); margin: 16px 0; }
ul, ol { padding-left: 22px; margin: 6px 0; }
li { margin: 4px 0; }
pre {
  background: var(--pre-bg);
  padding: 12px 14px;
  border-radius: 8px;
  overflow-x: auto;
}
pre code {
  font-family: "Fira Code", "JetBrains Mono", "Consolas", monospace;
  font-size: 0.95em;
}
code {
  background: var(--code-bg);
  padding: 2px 4px;
  border-radius: 4px;
}
table { border-collapse: collapse; margin: 8px 0; width: 100%; }
th, td { border: 1px solid var(--border-color); padding: 6px 10px; }
th { background: var(--bg-secondary); }
img { max-width: 100%; height: auto; border-radius: 6px; }
"#;

/// `file://` URL of a directory, with a trailing slash so relative references
/// resolve inside it.
pub fn directory_url(dir: &Path) -> String {
    let mut path = dir.to_string_lossy().replace('\\', "/");
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    if !path.ends_with('/') {
        path.push('/');
    }
    let mut url = String::from("file://");
    for c in path.chars() {
        match c {
            ' ' => url.push_str("%20"),
            '#' => url.push_str("%23"),
            '?' => url.push_str("%3F"),
            '%' => url.push_str("%25"),
            other => url.push(other),
        }
    }
    url
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Document(children) => write_all(children, out),
        Node::Heading { level, children } => {
            out.push_str(&format!("<h{}>", level));
            write_all(children, out);
            out.push_str(&format!("</h{}>\n", level));
        }
        Node::Paragraph(children) => wrap("p", children, out),
        Node::BulletList(items) => {
            out.push_str("<ul>\n");
            write_all(items, out);
            out.push_str("</ul>\n");
        }
        Node::OrderedList { start, items } => {
            if *start == 1 {
                out.push_str("<ol>\n");
            } else {
                out.push_str(&format!("<ol start=\"{}\">\n", start));
            }
            write_all(items, out);
            out.push_str("</ol>\n");
        }
        Node::ListItem(children) => {
            wrap("li", children, out);
        }
        Node::BlockQuote(children) => {
            out.push_str("<blockquote>\n");
            write_all(children, out);
            out.push_str("</blockquote>\n");
        }
        Node::CodeBlock { lang, text } => {
            match lang {
                Some(lang) => out.push_str(&format!(
                    "<pre><code class=\"language-{}\">",
                    escape_html(lang)
                )),
                None => out.push_str("<pre><code>"),
            }
            out.push_str(&escape_html(text));
            out.push_str("</code></pre>\n");
        }
        Node::ThematicBreak => out.push_str("<hr />\n"),
        Node::Html(raw) | Node::InlineHtml(raw) => out.push_str(raw),
        Node::Table(rows) => {
            out.push_str("<table>\n");
            let (head, body): (Vec<&Node>, Vec<&Node>) = rows
                .iter()
                .partition(|r| matches!(r, Node::TableRow { header: true, .. }));
            if !head.is_empty() {
                out.push_str("<thead>\n");
                head.into_iter().for_each(|r| write_node(r, out));
                out.push_str("</thead>\n");
            }
            if !body.is_empty() {
                out.push_str("<tbody>\n");
                body.into_iter().for_each(|r| write_node(r, out));
                out.push_str("</tbody>\n");
            }
            out.push_str("</table>\n");
        }
        Node::TableRow { header, cells } => {
            let cell_tag = if *header { "th" } else { "td" };
            out.push_str("<tr>");
            for cell in cells {
                wrap(cell_tag, cell.children(), out);
            }
            out.push_str("</tr>\n");
        }
        Node::TableCell(children) => wrap("td", children, out),
        Node::Text(text) => out.push_str(&escape_html(text)),
        Node::Strong(children) => wrap("strong", children, out),
        Node::Emphasis(children) => wrap("em", children, out),
        Node::Strikethrough(children) => wrap("del", children, out),
        Node::Code(code) => {
            out.push_str("<code>");
            out.push_str(&escape_html(code));
            out.push_str("</code>");
        }
        Node::Link {
            dest,
            title,
            children,
        } => {
            out.push_str(&format!("<a href=\"{}\"", escape_html(dest)));
            if !title.is_empty() {
                out.push_str(&format!(" title=\"{}\"", escape_html(title)));
            }
            out.push('>');
            write_all(children, out);
            out.push_str("</a>");
        }
        Node::Image { dest, title, alt } => {
            let alt_text: String = alt.iter().map(Node::plain_text).collect();
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\"",
                escape_html(dest),
                escape_html(&alt_text)
            ));
            if !title.is_empty() {
                out.push_str(&format!(" title=\"{}\"", escape_html(title)));
            }
            out.push_str(" />");
        }
        Node::SoftBreak => out.push('\n'),
        Node::HardBreak => out.push_str("<br />\n"),
    }
}

fn write_all(nodes: &[Node], out: &mut String) {
    nodes.iter().for_each(|n| write_node(n, out));
}

fn wrap(tag: &str, children: &[Node], out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    write_all(children, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
    if matches!(tag, "p" | "li") {
        out.push('\n');
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse;

    fn body_of(md: &str) -> String {
        let mut out = String::new();
        write_node(&parse(md), &mut out);
        out
    }

    #[test]
    fn renders_basic_blocks() {
        assert_eq!(
            body_of("# Title\n\n**bold** and *italic*\n"),
            "<h1>Title</h1>\n<p><strong>bold</strong> and <em>italic</em></p>\n"
        );
    }

    #[test]
    fn fenced_code_carries_language_class() {
        let html = body_of("```java\nif (a < b) {}\n```\n");
        assert_eq!(
            html,
            "<pre><code class=\"language-java\">if (a &lt; b) {}\n</code></pre>\n"
        );
    }

    #[test]
    fn lists_and_breaks() {
        assert_eq!(
            body_of("- a\n- b\n"),
            "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n"
        );
        assert_eq!(body_of("2. x\n"), "<ol start=\"2\">\n<li>x</li>\n</ol>\n");
        assert_eq!(body_of("a  \nb\n"), "<p>a<br />\nb</p>\n");
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(body_of("a & \"b\"\n"), "<p>a &amp; &quot;b&quot;</p>\n");
    }

    #[test]
    fn images_keep_relative_source() {
        assert_eq!(
            body_of("![a *b*](img/x.png)\n"),
            "<p><img src=\"img/x.png\" alt=\"a b\" /></p>\n"
        );
    }

    #[test]
    fn document_threads_theme_tokens() {
        let doc = parse("hi");
        let light = render(&doc, Theme::Light, "file:///notes/");
        assert!(light.contains("<base href=\"file:///notes/\">"));
        assert!(light.contains("--link-color: #0969da;"));
        assert!(light.contains("styles/github.min.css"));
        assert!(light.contains("<p>hi</p>"));

        let dark = render(&doc, Theme::Dark, "file:///notes/");
        assert!(dark.contains("--bg-primary: #1e1e1e;"));
        assert!(dark.contains("styles/github-dark.min.css"));
        assert!(dark.contains("hljs.highlightAll()"));
    }

    #[test]
    fn full_width_fence_renders_as_code() {
        let html = render(&parse("｀｀｀\ncode\n｀｀｀\n"), Theme::Light, "");
        assert!(html.contains("<pre><code>code\n</code></pre>"));
    }

    #[test]
    fn theme_parsing() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" light ".parse::<Theme>().unwrap(), Theme::Light);
        assert!("blue".parse::<Theme>().is_err());
    }

    #[test]
    fn directory_url_escapes_and_terminates() {
        assert_eq!(
            directory_url(Path::new("/srv/my notes")),
            "file:///srv/my%20notes/"
        );
    }
}
