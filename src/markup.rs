//! Light markup recognized in coach replies
//!
//! Replies are plain text that may contain code fences, inline code, callouts
//! (`**Key Idea:**`, `**Important:**`, `**Note:**`) and complexity tags. This
//! splits a reply into segments; styling them is up to the front-end.

use regex::Regex;
use std::sync::LazyLock;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(.*?)```").expect("code fence regex must compile"));

static INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)`(?P<code>[^`\n]+)`|\*\*(?P<callout>key idea|important|note):\*\*(?P<body>[^*]+)|\b(?P<tag>time complexity:\s*O\([^)]+\)|space complexity:\s*O\([^)]+\)|algorithm:[^\n]+)",
    )
    .expect("inline markup regex must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalloutKind {
    KeyIdea,
    Important,
    Note,
}

impl CalloutKind {
    pub fn label(self) -> &'static str {
        match self {
            CalloutKind::KeyIdea => "Key Idea:",
            CalloutKind::Important => "Important:",
            CalloutKind::Note => "Note:",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    TimeComplexity,
    SpaceComplexity,
    Algorithm,
}

/// A run of reply text with uniform styling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    InlineCode(String),
    CodeBlock(String),
    Callout { kind: CalloutKind, body: String },
    Tag { kind: TagKind, text: String },
}

/// Split a reply into styled segments. Adjacent plain text is merged.
pub fn parse(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for fence in CODE_FENCE.captures_iter(text) {
        let Some(whole) = fence.get(0) else { continue };
        parse_inline(text.get(last..whole.start()).unwrap_or_default(), &mut segments);
        let code = fence.get(1).map_or("", |m| m.as_str());
        segments.push(Segment::CodeBlock(code.trim_matches('\n').to_string()));
        last = whole.end();
    }
    parse_inline(text.get(last..).unwrap_or_default(), &mut segments);

    segments
}

fn parse_inline(text: &str, segments: &mut Vec<Segment>) {
    let mut last = 0;

    for caps in INLINE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        push_text(text.get(last..whole.start()).unwrap_or_default(), segments);
        last = whole.end();

        if let Some(code) = caps.name("code") {
            segments.push(Segment::InlineCode(code.as_str().to_string()));
        } else if let Some(callout) = caps.name("callout") {
            let kind = match callout.as_str().to_ascii_lowercase().as_str() {
                "key idea" => CalloutKind::KeyIdea,
                "important" => CalloutKind::Important,
                _ => CalloutKind::Note,
            };
            let body = caps.name("body").map_or("", |m| m.as_str());
            let content = body.trim_end();
            segments.push(Segment::Callout {
                kind,
                body: content.trim_start().to_string(),
            });
            // The body runs up to the next `*`; keep the gap before it
            push_text(body.get(content.len()..).unwrap_or_default(), segments);
        } else if let Some(tag) = caps.name("tag") {
            let raw = tag.as_str();
            let text = raw.trim_end();
            let lowered = text.to_ascii_lowercase();
            let kind = if lowered.starts_with("time") {
                TagKind::TimeComplexity
            } else if lowered.starts_with("space") {
                TagKind::SpaceComplexity
            } else {
                TagKind::Algorithm
            };
            segments.push(Segment::Tag {
                kind,
                text: text.to_string(),
            });
            push_text(raw.get(text.len()..).unwrap_or_default(), segments);
        }
    }
    push_text(text.get(last..).unwrap_or_default(), segments);
}

fn push_text(text: &str, segments: &mut Vec<Segment>) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text(previous)) = segments.last_mut() {
        previous.push_str(text);
    } else {
        segments.push(Segment::Text(text.to_string()));
    }
}
