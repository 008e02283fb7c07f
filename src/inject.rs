//! Textual injection of preview metadata into an HTML template.
//!
//! The template is never parsed. [`HtmlTemplate`] locates a handful of tags by
//! case-insensitive substring search, which keeps the matching strategy in one
//! place should it ever need to become a real parser.

use std::borrow::Cow;
use std::fmt::Write as _;

use thiserror::Error;

use crate::metadata::PageMetadata;

/// Global the hydration script assigns the page metadata to.
pub const INITIAL_DATA_GLOBAL: &str = "__INITIAL_DATA__";

const TWITTER_CARD: &str = "summary_large_image";

#[derive(Debug, Error)]
pub enum InjectError {
    #[error("failed to serialize hydration data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// An HTML document edited in place by substring matching.
#[derive(Clone, Debug)]
pub struct HtmlTemplate {
    html: String,
}

impl HtmlTemplate {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// Replaces the text of the first `<title>` inside the head.
    ///
    /// When the head has no title element one is inserted right before
    /// `</head>`. `text` is written verbatim, so callers escape it. Returns
    /// `false` only when neither a title nor `</head>` exists.
    pub fn set_title(&mut self, text: &str) -> bool {
        let lower = self.html.to_ascii_lowercase();
        // without </head> the head ends where the body starts
        let head_end = lower
            .find("</head>")
            .or_else(|| find_open_tag(&lower, "body").map(|(start, _)| start))
            .unwrap_or(lower.len());

        if let Some((_, open_end)) = find_open_tag(&lower[..head_end], "title") {
            if let Some(close) = lower[open_end..].find("</title>") {
                let close = open_end + close;
                self.html.replace_range(open_end..close, text);
                return true;
            }
        }

        self.insert_before_head_close(&format!("<title>{text}</title>"))
    }

    /// Inserts `fragment` right before the first `</head>`.
    pub fn insert_before_head_close(&mut self, fragment: &str) -> bool {
        let lower = self.html.to_ascii_lowercase();
        match lower.find("</head>") {
            Some(index) => {
                self.html.insert_str(index, fragment);
                true
            }
            None => false,
        }
    }

    /// Inserts `fragment` right after the first `<body>` or `<body ...>` tag.
    pub fn insert_after_body_open(&mut self, fragment: &str) -> bool {
        let lower = self.html.to_ascii_lowercase();
        match find_open_tag(&lower, "body") {
            Some((_, open_end)) => {
                self.html.insert_str(open_end, fragment);
                true
            }
            None => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }
}

/// Finds `<name>` or `<name attr...>` and returns the byte range of the whole
/// opening tag. `haystack` must already be lowercased.
fn find_open_tag(haystack: &str, name: &str) -> Option<(usize, usize)> {
    let needle = format!("<{name}");
    let mut from = 0;

    while let Some(found) = haystack[from..].find(&needle) {
        let start = from + found;
        let after = start + needle.len();
        match haystack.as_bytes().get(after) {
            Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0c') => {
                let close = haystack[after..].find('>')?;
                return Some((start, after + close + 1));
            }
            _ => from = after,
        }
    }

    None
}

/// Produces `template` with the title replaced, the Open Graph / Twitter Card
/// block added to the head and a hydration script opening the body.
///
/// A template without `</head>` or `<body>` simply skips the matching step.
pub fn inject(
    template: &str,
    metadata: &PageMetadata,
    canonical_url: &str,
) -> Result<String, InjectError> {
    let hydration = hydration_script(metadata)?;
    let mut document = HtmlTemplate::new(template);

    if !document.set_title(&html_escape(&metadata.title)) {
        tracing::debug!("template has no <title> or </head>; title left unset");
    }
    if !document.insert_before_head_close(&meta_tags(metadata, canonical_url)) {
        tracing::debug!("template has no </head>; meta tags skipped");
    }
    if !document.insert_after_body_open(&hydration) {
        tracing::debug!("template has no <body>; hydration data skipped");
    }

    Ok(document.into_string())
}

fn meta_tags(metadata: &PageMetadata, canonical_url: &str) -> String {
    let title = html_escape(&metadata.title);
    let description = html_escape(&metadata.description);
    let page_type = html_escape(&metadata.page_type);
    let image = metadata.image.as_str();
    // built from the request path and host headers, so never trusted
    let url = html_escape(canonical_url);

    let tags: [(&str, &str, &str); 10] = [
        ("property", "og:title", &*title),
        ("property", "og:description", &*description),
        ("property", "og:image", image),
        ("property", "og:url", &*url),
        ("property", "og:type", &*page_type),
        ("name", "twitter:card", TWITTER_CARD),
        ("name", "twitter:title", &*title),
        ("name", "twitter:description", &*description),
        ("name", "twitter:image", image),
        ("name", "description", &*description),
    ];

    let mut block = String::new();
    for (attr, key, content) in tags {
        let _ = write!(block, "\n    <meta {attr}=\"{key}\" content=\"{content}\">");
    }
    block.push('\n');
    block
}

fn hydration_script(metadata: &PageMetadata) -> Result<String, InjectError> {
    let json = serde_json::to_string(metadata)?;
    // keeps "</script>" and "<!--" inside string values from ending the element
    let json = json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026");
    Ok(format!(
        "\n    <script>window.{INITIAL_DATA_GLOBAL} = {json};</script>"
    ))
}

/// Escape HTML special characters, quotes included.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
#[inline]
pub fn html_escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}
