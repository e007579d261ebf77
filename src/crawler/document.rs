//! Document query capability
//!
//! The extractors only need three things from a parsed page: elements matching
//! a selector, an element's text trimmed of a character set, and attribute
//! values. `Document` provides exactly that on top of `scraper`.
//!
//! `scraper::Html` is not `Send`, so a `Document` is always built and dropped
//! inside a synchronous extraction function, never held across an `.await`.

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML page
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// All elements matching `selector`, in document order
    pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> scraper::html::Select<'a, 'b> {
        self.html.select(selector)
    }

    /// First element matching `selector`, or the whole document when there is none
    ///
    /// Extraction is scoped to a page section when the section exists; shops
    /// that render without it are read from the root instead.
    pub fn scope(&self, selector: &Selector) -> ElementRef<'_> {
        match self.html.select(selector).next() {
            Some(element) => element,
            None => {
                tracing::trace!("Scope selector matched nothing, using document root");
                self.html.root_element()
            }
        }
    }
}

/// Trims every character of `chars` from both ends of `text`
pub fn strip_text<'a>(text: &'a str, chars: &str) -> &'a str {
    text.trim_matches(|c: char| chars.contains(c))
}

/// Text content of an element, trimmed of `chars`
pub fn element_text(element: ElementRef<'_>, chars: &str) -> String {
    let text = element.text().collect::<String>();
    strip_text(&text, chars).to_string()
}

/// Value of the attribute `name`, if present
pub fn attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name)
}

/// First descendant of `element` matching `selector`
pub fn first<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}
