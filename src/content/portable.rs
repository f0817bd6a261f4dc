//! Rich text bodies and their HTML rendering
//!
//! Post bodies are stored as a tree of blocks rather than markup. Each block
//! is a styled paragraph made of spans, an embedded image, or a code block.
//! Spans carry marks: decorators such as `strong`, and annotations that point
//! into the block's `markDefs` (links).

use serde::{Deserialize, Serialize};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::null_default;
use crate::cms::image::{AssetRef, ImageAsset};
use crate::cms::{ImageSource, ImageUrlBuilder};
use crate::helpers::{html_escape, is_safe_href};

/// One node of a rich text body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum BodyNode {
    #[serde(rename = "block")]
    Block(TextBlock),
    #[serde(rename = "image")]
    Image(ImageBlock),
    #[serde(rename = "code")]
    Code(CodeBlock),
    /// Custom block types this renderer does not know; skipped
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub children: Vec<Span>,
    #[serde(default, deserialize_with = "null_default")]
    pub mark_defs: Vec<MarkDef>,
    /// `bullet` or `number` when the block is a list item
    #[serde(default)]
    pub list_item: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Span {
    #[serde(default, deserialize_with = "null_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_default")]
    pub marks: Vec<String>,
}

/// Annotation referenced from a span's marks by key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key", default, deserialize_with = "null_default")]
    pub key: String,
    #[serde(rename = "_type", default, deserialize_with = "null_default")]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
    /// Open in a new tab
    #[serde(default)]
    pub blank: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageBlock {
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeBlock {
    #[serde(default, deserialize_with = "null_default")]
    pub code: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum ListKind {
    Bullet,
    Number,
}

impl ListKind {
    fn from_item(item: &str) -> Self {
        if item == "number" {
            ListKind::Number
        } else {
            ListKind::Bullet
        }
    }

    fn open(self) -> &'static str {
        match self {
            ListKind::Bullet => "<ul>",
            ListKind::Number => "<ol>",
        }
    }

    fn close(self) -> &'static str {
        match self {
            ListKind::Bullet => "</ul>",
            ListKind::Number => "</ol>",
        }
    }
}

/// Rich text renderer with syntax highlighting for code blocks
pub struct PortableTextRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    images: ImageUrlBuilder,
}

impl PortableTextRenderer {
    /// Create a new renderer
    pub fn new(images: ImageUrlBuilder) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: "base16-ocean.dark".to_string(),
            images,
        }
    }

    /// Render a body to HTML
    pub fn render(&self, body: &[BodyNode]) -> String {
        let mut html = String::new();
        let mut open_list: Option<ListKind> = None;

        for node in body {
            let list_kind = match node {
                BodyNode::Block(block) => block.list_item.as_deref().map(ListKind::from_item),
                _ => None,
            };

            if open_list != list_kind {
                if let Some(kind) = open_list {
                    html.push_str(kind.close());
                }
                if let Some(kind) = list_kind {
                    html.push_str(kind.open());
                }
                open_list = list_kind;
            }

            match node {
                BodyNode::Block(block) if list_kind.is_some() => {
                    html.push_str("<li>");
                    html.push_str(&self.render_spans(block));
                    html.push_str("</li>");
                }
                BodyNode::Block(block) => html.push_str(&self.render_block(block)),
                BodyNode::Image(image) => html.push_str(&self.render_image(image)),
                BodyNode::Code(code) => html.push_str(&self.render_code(code)),
                BodyNode::Unknown => {}
            }
        }

        if let Some(kind) = open_list {
            html.push_str(kind.close());
        }

        html
    }

    fn render_block(&self, block: &TextBlock) -> String {
        if block.children.iter().all(|span| span.text.is_empty()) {
            return String::new();
        }

        let tag = match block.style.as_deref() {
            Some(style @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6")) => style,
            Some("blockquote") => "blockquote",
            _ => "p",
        };

        format!("<{tag}>{}</{tag}>", self.render_spans(block))
    }

    fn render_spans(&self, block: &TextBlock) -> String {
        let mut out = String::new();

        for span in &block.children {
            let mut text = html_escape(&span.text).replace('\n', "<br>");

            for mark in span.marks.iter().rev() {
                text = match mark.as_str() {
                    "strong" => format!("<strong>{}</strong>", text),
                    "em" => format!("<em>{}</em>", text),
                    "code" => format!("<code>{}</code>", text),
                    "underline" => format!("<u>{}</u>", text),
                    "strike-through" => format!("<s>{}</s>", text),
                    key => match block.mark_defs.iter().find(|def| def.key == key) {
                        Some(def) => wrap_annotation(def, text),
                        None => text,
                    },
                };
            }

            out.push_str(&text);
        }

        out
    }

    fn render_image(&self, image: &ImageBlock) -> String {
        let source = ImageSource::Asset(ImageAsset {
            asset: image.asset.clone(),
            alt: image.alt.clone(),
            caption: image.caption.clone(),
        });

        let Some(src) = self.images.resolve(Some(&source)) else {
            return String::new();
        };

        let alt = image.alt.as_deref().unwrap_or("");
        let caption = image
            .caption
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| format!("<figcaption>{}</figcaption>", html_escape(c)))
            .unwrap_or_default();

        format!(
            r#"<figure class="post-image"><img src="{}" alt="{}" loading="lazy">{}</figure>"#,
            html_escape(&src),
            html_escape(alt),
            caption
        )
    }

    fn render_code(&self, block: &CodeBlock) -> String {
        let highlighted = self.highlight_code(&block.code, block.language.as_deref());
        match block.filename.as_deref().filter(|f| !f.is_empty()) {
            Some(filename) => format!(
                r#"<div class="code-block"><div class="code-filename">{}</div>{}</div>"#,
                html_escape(filename),
                highlighted
            ),
            None => highlighted,
        }
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.filter(|l| !l.is_empty()).unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                html_escape(lang),
                highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                html_escape(lang),
                html_escape(code)
            ),
        }
    }
}

/// Wrap text in a link annotation; unsafe or missing hrefs leave it bare
fn wrap_annotation(def: &MarkDef, text: String) -> String {
    if def.kind != "link" {
        return text;
    }

    let Some(href) = def.href.as_deref().map(str::trim).filter(|h| is_safe_href(h)) else {
        return text;
    };

    if def.blank.unwrap_or(false) {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            html_escape(href),
            text
        )
    } else {
        format!(r#"<a href="{}">{}</a>"#, html_escape(href), text)
    }
}
