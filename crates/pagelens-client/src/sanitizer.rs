use pagelens_core::models::{CleanedContent, MAX_BODY_CHARS, UNTITLED};
use pagelens_core::traits::Sanitizer;
use scraper::{ElementRef, Html, Selector};

/// Elements that never carry readable page content.
const STRIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "header", "footer", "nav", "link",
];

/// HTML-to-text sanitizer built on `scraper` (html5ever).
///
/// Drops non-content elements (script, style, nav, etc.) and everything
/// inside them, then flattens the remaining `<body>` text to a single line
/// bounded to [`MAX_BODY_CHARS`] characters. html5ever recovers from any
/// markup, so sanitizing never fails.
#[derive(Clone)]
pub struct ScraperSanitizer {
    title: Selector,
    body: Selector,
    max_chars: usize,
}

impl ScraperSanitizer {
    pub fn new() -> Self {
        Self {
            title: Selector::parse("title").expect("static selector"),
            body: Selector::parse("body").expect("static selector"),
            max_chars: MAX_BODY_CHARS,
        }
    }

    /// Override the body text bound. Values above [`MAX_BODY_CHARS`] are clamped.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.min(MAX_BODY_CHARS);
        self
    }

    fn title(&self, document: &Html) -> String {
        let mut raw = String::new();
        for title in document.select(&self.title).filter(|el| !is_stripped(el)) {
            collect_text(title, &mut raw);
        }
        let title = raw.trim();
        if title.is_empty() {
            UNTITLED.to_string()
        } else {
            title.to_string()
        }
    }

    fn body_text(&self, document: &Html) -> String {
        let mut raw = String::new();
        for body in document.select(&self.body) {
            collect_text(body, &mut raw);
        }
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        truncate_chars(&collapsed, self.max_chars).trim_end().to_string()
    }
}

impl Default for ScraperSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer for ScraperSanitizer {
    fn sanitize(&self, html: &str) -> CleanedContent {
        let document = Html::parse_document(html);
        CleanedContent {
            title: self.title(&document),
            body_text: self.body_text(&document),
        }
    }
}

/// Append the text under `element` in document order, skipping stripped
/// subtrees. Walks with an explicit stack; nesting depth is attacker-controlled.
fn collect_text(element: ElementRef<'_>, out: &mut String) {
    let mut stack = Vec::new();
    stack.extend(element.first_child());

    while let Some(node) = stack.pop() {
        stack.extend(node.next_sibling());
        if let Some(text) = node.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = node.value().as_element() {
            if !STRIPPED_TAGS.contains(&child.name()) {
                stack.extend(node.first_child());
            }
        }
    }
}

/// True if the element or any of its ancestors is a stripped tag.
fn is_stripped(element: &ElementRef<'_>) -> bool {
    STRIPPED_TAGS.contains(&element.value().name())
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| STRIPPED_TAGS.contains(&a.value().name()))
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
