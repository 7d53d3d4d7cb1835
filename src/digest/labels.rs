//! Field labels and the dialects the meeting bot writes them in.
//!
//! Each label has a finite list of accepted names. One matcher per label
//! recognises any of those names in bold (`*Name:*`, `*Name*:`) or, where the
//! label allows it, as a plain `Name:` preceded by anything but a word
//! character (line start, an emoji, a short-code, a separator).

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Title,
    DateAndTime,
    Participants,
    Gist,
    Overview,
    Notes,
    ActionItems,
}

impl Label {
    pub const ALL: [Label; 7] = [
        Label::Title,
        Label::DateAndTime,
        Label::Participants,
        Label::Gist,
        Label::Overview,
        Label::Notes,
        Label::ActionItems,
    ];

    /// Accepted spellings of the label name.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            Label::Title => &["Title", "Meeting Title"],
            Label::DateAndTime => &["Date and Time", "Date & Time", "Date &amp; Time"],
            Label::Participants => &["Participants", "Attendees"],
            Label::Gist => &["Gist"],
            Label::Overview => &["Overview"],
            Label::Notes => &["Notes"],
            Label::ActionItems => &["Action Items"],
        }
    }

    /// Whether the unbolded `Name:` form is accepted. The title marker must be bold.
    fn allows_plain(self) -> bool {
        !matches!(self, Label::Title)
    }

    fn index(self) -> usize {
        Label::ALL
            .iter()
            .position(|l| *l == self)
            .unwrap_or_default()
    }

    fn pattern(self) -> String {
        let names = self
            .names()
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|");
        let bold = format!(r"\*(?:{names})(?::\*|\*:)");
        if self.allows_plain() {
            format!(r"(?im){bold}|(?:^|[^\w])(?:{names}):")
        } else {
            format!(r"(?i){bold}")
        }
    }

    fn regex(self) -> &'static Regex {
        static RES: OnceLock<Vec<Regex>> = OnceLock::new();
        let all = RES.get_or_init(|| {
            Label::ALL
                .iter()
                .map(|l| Regex::new(&l.pattern()).unwrap())
                .collect()
        });
        &all[self.index()]
    }

    /// Whether `text` contains this label anywhere.
    pub fn is_in(self, text: &str) -> bool {
        self.regex().is_match(text)
    }

    /// The text following the first occurrence of this label.
    pub fn remainder(self, text: &str) -> Option<&str> {
        self.regex().find(text).map(|m| &text[m.end()..])
    }
}
