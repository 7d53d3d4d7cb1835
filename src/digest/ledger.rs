//! Cross-meeting action-item ledger, keyed by assignee.
//!
//! Names match exactly (no case folding). Tasks are never de-duplicated;
//! a meeting title is listed once per assignee, in order of first appearance.

use std::collections::HashMap;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::types::MeetingRecord;

/// A task with the meeting it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTask {
    pub task: String,
    #[serde(rename = "meeting")]
    pub meeting_title: String,
    #[serde(rename = "date")]
    pub meeting_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssigneeLedgerEntry {
    pub name: String,
    pub tasks: Vec<LedgerTask>,
    /// Meeting titles, de-duplicated, in order of first appearance.
    pub meetings: Vec<String>,
}

impl AssigneeLedgerEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tasks: Vec::new(),
            meetings: Vec::new(),
        }
    }

    fn note_meeting(&mut self, title: &str) {
        if !self.meetings.iter().any(|m| m == title) {
            self.meetings.push(title.to_string());
        }
    }
}

/// Assignee → entry, iterated in order of first appearance.
///
/// Serializes as a JSON object keyed by assignee name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssigneeLedger {
    entries: Vec<AssigneeLedgerEntry>,
    index: HashMap<String, usize>,
}

impl AssigneeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `records` in order. Records should already be filtered to
    /// meeting summaries.
    pub fn from_records<'a, I>(records: I, untitled_label: &str) -> Self
    where
        I: IntoIterator<Item = &'a MeetingRecord>,
    {
        let mut ledger = Self::new();
        for record in records {
            ledger.add_record(record, untitled_label);
        }
        ledger
    }

    pub fn add_record(&mut self, record: &MeetingRecord, untitled_label: &str) {
        let meeting_title = record.title.as_deref().unwrap_or(untitled_label);

        for group in &record.action_items {
            if group.tasks.is_empty() {
                continue;
            }
            let entry = self.entry_mut(&group.assignee);
            for task in &group.tasks {
                entry.tasks.push(LedgerTask {
                    task: task.clone(),
                    meeting_title: meeting_title.to_string(),
                    meeting_date: record.scheduled.clone(),
                });
                entry.note_meeting(meeting_title);
            }
        }
    }

    /// Merge a ledger built from a later shard of records.
    ///
    /// Equivalent to folding the shard's records after this ledger's.
    pub fn merge(&mut self, other: AssigneeLedger) {
        for incoming in other.entries {
            let entry = self.entry_mut(&incoming.name);
            entry.tasks.extend(incoming.tasks);
            for title in &incoming.meetings {
                entry.note_meeting(title);
            }
        }
    }

    fn entry_mut(&mut self, name: &str) -> &mut AssigneeLedgerEntry {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.entries.push(AssigneeLedgerEntry::new(name));
                let idx = self.entries.len() - 1;
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.entries[idx]
    }

    pub fn get(&self, name: &str) -> Option<&AssigneeLedgerEntry> {
        self.index.get(name).map(|&idx| &self.entries[idx])
    }

    pub fn entries(&self) -> &[AssigneeLedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn task_count(&self) -> usize {
        self.entries.iter().map(|e| e.tasks.len()).sum()
    }
}

impl Serialize for AssigneeLedger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, entry)?;
        }
        map.end()
    }
}
