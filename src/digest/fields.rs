//! Per-field extractors for section block text.
//!
//! Each extractor is a pure function of one block's text. They don't depend
//! on each other or on the order they run in; a block can match several.
//! No match is `None`, never an error.

use std::sync::OnceLock;

use regex::Regex;

use super::labels::Label;
use crate::types::NoteSection;
use crate::util::decode_entities;

/// Bullet glyph plus the mojibake it turns into when the bot's UTF-8 output
/// is read as Windows-1252 or Latin-1 upstream.
const BULLETS: [&str; 3] = ["\u{2022}", "\u{e2}\u{20ac}\u{a2}", "\u{e2}\u{80}\u{a2}"];

/// A field recognised in one section block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    TitleLink { url: String, title: Option<String> },
    Scheduled(String),
    Participants(Vec<String>),
    Gist(String),
    Overview(Vec<String>),
    Notes(Vec<NoteSection>),
}

fn re_email() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap())
}

fn re_bullet() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let glyphs = BULLETS
            .iter()
            .map(|b| regex::escape(b))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"\n[ \t]*(?:{glyphs})")).unwrap()
    })
}

fn re_note_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `:shortcode: *Heading*` at the start of a line
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*:[\w+-]+:[ \t]*\*([^*\n]+)\*").unwrap())
}

/// Run every extractor over one block's text.
pub fn extract_fields(text: &str, view_link: &Regex) -> Vec<Field> {
    [
        extract_title_link(text, view_link),
        extract_scheduled(text),
        extract_participants(text),
        extract_gist(text),
        extract_overview(text),
        extract_notes(text),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// First view link in `text` that parses as an absolute URL.
pub fn find_view_link(text: &str, view_link: &Regex) -> Option<(String, usize)> {
    view_link
        .find_iter(text)
        .find(|m| url::Url::parse(m.as_str()).is_ok())
        .map(|m| (m.as_str().to_string(), m.end()))
}

/// `*Title:* <url|Label>` → url plus decoded label. Only links after the
/// marker count.
pub fn extract_title_link(text: &str, view_link: &Regex) -> Option<Field> {
    let rest = Label::Title.remainder(text)?;
    let (url, end) = find_view_link(rest, view_link)?;

    let title = rest[end..].strip_prefix('|').and_then(|rest| {
        let label = rest.split(['>', '\n']).next().unwrap_or(rest);
        let label = decode_entities(label.trim());
        if label.is_empty() {
            None
        } else {
            Some(label)
        }
    });

    Some(Field::TitleLink { url, title })
}

/// Value after the date/time label, up to the next bold marker or newline.
pub fn extract_scheduled(text: &str) -> Option<Field> {
    let rest = Label::DateAndTime.remainder(text)?.trim_start();
    let value = rest.split(['*', '\n']).next().unwrap_or_default().trim();
    if value.is_empty() {
        None
    } else {
        Some(Field::Scheduled(value.to_string()))
    }
}

/// Every email after the participants label, in order, duplicates kept.
pub fn extract_participants(text: &str) -> Option<Field> {
    let rest = Label::Participants.remainder(text)?;
    let emails = re_email()
        .find_iter(rest)
        .map(|m| m.as_str().to_string())
        .collect();
    Some(Field::Participants(emails))
}

/// Value after the gist label, up to the next bold marker.
pub fn extract_gist(text: &str) -> Option<Field> {
    let rest = Label::Gist.remainder(text)?;
    let value = rest.split('*').next().unwrap_or_default().trim();
    if value.is_empty() {
        None
    } else {
        Some(Field::Gist(value.to_string()))
    }
}

pub fn extract_overview(text: &str) -> Option<Field> {
    let rest = Label::Overview.remainder(text)?;
    Some(Field::Overview(split_bullets(rest)))
}

/// Notes split into `:shortcode: *Heading*` subsections.
pub fn extract_notes(text: &str) -> Option<Field> {
    let rest = Label::Notes.remainder(text)?;

    let headings: Vec<_> = re_note_heading().captures_iter(rest).collect();
    let mut sections = Vec::with_capacity(headings.len());

    for (i, caps) in headings.iter().enumerate() {
        let (Some(whole), Some(heading)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let body_end = headings
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(rest.len());

        sections.push(NoteSection {
            heading: heading.as_str().trim().to_string(),
            bullets: split_bullets(&rest[whole.end()..body_end]),
        });
    }

    Some(Field::Notes(sections))
}

/// Split on newline-plus-bullet boundaries; drop empty segments, trim the rest.
pub fn split_bullets(text: &str) -> Vec<String> {
    re_bullet()
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
