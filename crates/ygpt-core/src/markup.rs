//! Tiny inline markup used in canned answers: `**bold**`, `*italic*`,
//! `` `code` `` and `[label](https://link)`.
//!
//! This is cosmetic. Anything that doesn't close properly is kept as plain
//! text.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
    Link { label: String, url: String },
}

fn inline_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Order matters: bold before italic so `**` is not read as two `*`.
        // One pass, so styles never nest: `**bold *it***` is one bold run
        // with literal asterisks, not bold wrapping italic.
        Regex::new(
            r"\*\*(?P<bold>.+?)\*\*|\*(?P<italic>.+?)\*|`(?P<code>[^`]+?)`|\[(?P<label>.+?)\]\((?P<url>https?://[^\s)]+)\)",
        )
        .expect("inline markup pattern is valid")
    })
}

pub fn parse(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in inline_pattern().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            segments.push(Segment::Text(text[last..whole.start()].to_string()));
        }

        let segment = if let Some(m) = caps.name("bold") {
            Segment::Bold(m.as_str().to_string())
        } else if let Some(m) = caps.name("italic") {
            Segment::Italic(m.as_str().to_string())
        } else if let Some(m) = caps.name("code") {
            Segment::Code(m.as_str().to_string())
        } else {
            Segment::Link {
                label: caps.name("label").map_or("", |m| m.as_str()).to_string(),
                url: caps.name("url").map_or("", |m| m.as_str()).to_string(),
            }
        };
        segments.push(segment);
        last = whole.end();
    }

    if last < text.len() {
        segments.push(Segment::Text(text[last..].to_string()));
    }

    segments
}
