//! HTML cleaning and text extraction
//!
//! Strips markup, scripts, and navigation boilerplate from a raw HTML page
//! and produces the whitespace-collapsed text that downstream quality
//! scoring, extraction, and chunking operate on.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Elements whose entire subtree is boilerplate for our purposes
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "iframe", "svg", "form", "button",
];

/// Elements that end a block of text
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "li", "ul", "ol", "table", "tr", "br", "h1", "h2", "h3",
    "h4", "h5", "h6", "blockquote",
];

/// Cleaned textual representation of an HTML page
#[derive(Debug, Clone)]
pub struct CleanedPage {
    /// Page title, if present
    pub title: Option<String>,

    /// Whitespace-collapsed visible text with boilerplate removed
    pub text: String,
}

/// Extract cleaned text from raw HTML
pub fn clean_html(html: &str) -> CleanedPage {
    let document = Html::parse_document(html);

    let title = Selector::parse("title").ok().and_then(|selector| {
        document.select(&selector).next().map(|elem| {
            elem.text().collect::<String>().trim().to_string()
        })
    });
    let title = title.filter(|t| !t.is_empty());

    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);

    CleanedPage {
        title,
        text: normalize_whitespace(&raw),
    }
}

/// Collapse all whitespace runs to single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    static WS: OnceLock<Regex> = OnceLock::new();
    let ws = WS.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));
    ws.replace_all(text, " ").trim().to_string()
}

fn collect_text(element: ElementRef, out: &mut String) {
    let name = element.value().name();
    if SKIP_TAGS.contains(&name) || name == "title" {
        return;
    }

    for child in element.children() {
        if let Some(el) = ElementRef::wrap(child) {
            collect_text(el, out);
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }

    if BLOCK_TAGS.contains(&name) {
        out.push('\n');
    }
}
