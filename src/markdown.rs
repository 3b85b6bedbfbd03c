//! Markdown to HTML, with slugified heading ids.
//!
//! Headings without an explicit `{#id}` attribute get one derived from their
//! text: lower-cased, with every byte outside `[a-z0-9]` replaced by a
//! dash. Code blocks keep pulldown-cmark's `language-*` class.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

#[derive(Debug, Clone, Copy, Default)]
pub struct Markdown;

impl Markdown {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, text: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let mut events: Vec<Event> = Parser::new_ext(text, options).collect();
        assign_heading_ids(&mut events);

        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }
}

fn assign_heading_ids(events: &mut [Event]) {
    let mut i = 0;
    while i < events.len() {
        if let Event::Start(Tag::Heading { id: None, .. }) = &events[i] {
            let mut text = String::new();
            let mut j = i + 1;
            while j < events.len() && !matches!(events[j], Event::End(TagEnd::Heading(_))) {
                if let Event::Text(t) | Event::Code(t) = &events[j] {
                    text.push_str(t);
                }
                j += 1;
            }
            if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                *id = Some(CowStr::from(slugify(&text)));
            }
            i = j;
        }
        i += 1;
    }
}

/// `"Hello, World"` → `"hello--world"`
///
/// Works per byte, so a non-ASCII character becomes one `-` per UTF-8 byte
/// (`"Café"` → `"caf--"`). Existing fragment links depend on these ids.
pub fn slugify(heading: &str) -> String {
    heading
        .bytes()
        .map(|b| b.to_ascii_lowercase())
        .map(|b| if b.is_ascii_lowercase() || b.is_ascii_digit() { b as char } else { '-' })
        .collect()
}
