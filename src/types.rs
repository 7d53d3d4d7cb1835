//! Meeting records produced by the digest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util::name_from_email;

/// One meeting summary, assembled from a single chat message.
///
/// Immutable once assembled. A record without a `url` is not a meeting
/// summary; see [`MeetingRecord::is_meeting_summary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub title: Option<String>,
    pub url: Option<String>,
    /// Free-text time window exactly as posted (not parsed).
    pub scheduled: Option<String>,
    /// Participant emails in order of appearance, duplicates kept.
    pub participants: Vec<String>,
    pub gist: Option<String>,
    pub overview: Vec<String>,
    pub notes: Vec<NoteSection>,
    pub action_items: Vec<ActionGroup>,
    /// Send time of the source message.
    pub received_at: DateTime<Utc>,
}

impl MeetingRecord {
    /// An empty record for a message sent at `received_at`.
    pub fn empty(received_at: DateTime<Utc>) -> Self {
        Self {
            title: None,
            url: None,
            scheduled: None,
            participants: Vec::new(),
            gist: None,
            overview: Vec::new(),
            notes: Vec::new(),
            action_items: Vec::new(),
            received_at,
        }
    }

    /// Callers keep only records that carry a view link.
    pub fn is_meeting_summary(&self) -> bool {
        self.url.is_some()
    }

    /// Display names for the participant emails, same order as `participants`.
    pub fn participant_names(&self) -> Vec<String> {
        self.participants
            .iter()
            .map(|email| name_from_email(email))
            .collect()
    }

    /// Last path segment of the view link, e.g. `abc123` for `.../view/abc123`.
    pub fn meeting_id(&self) -> Option<String> {
        let parsed = url::Url::parse(self.url.as_deref()?).ok()?;
        parsed
            .path_segments()?
            .filter(|s| !s.is_empty())
            .next_back()
            .map(String::from)
    }

    pub fn task_count(&self) -> usize {
        self.action_items.iter().map(|g| g.tasks.len()).sum()
    }
}

/// A heading plus its bullets from the notes field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSection {
    pub heading: String,
    pub bullets: Vec<String>,
}

/// One assignee's tasks within a single meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGroup {
    pub assignee: String,
    pub tasks: Vec<String>,
}

/// Append `group` to `groups`, merging into an existing group for the same
/// literal assignee name so each assignee appears at most once.
pub fn merge_action_group(groups: &mut Vec<ActionGroup>, group: ActionGroup) {
    match groups.iter_mut().find(|g| g.assignee == group.assignee) {
        Some(existing) => existing.tasks.extend(group.tasks),
        None => groups.push(group),
    }
}
