//! Meeting record assembly.
//!
//! Field extraction and the action-item scan run independently over the same
//! blocks; their results are merged into one [`MeetingRecord`]. When no block
//! carries the title link, the message's plain-text body is searched for a
//! bare view link instead.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::actions::scan_action_items;
use super::blocks::ChannelMessage;
use super::fields::{extract_fields, find_view_link, Field};
use super::ledger::AssigneeLedger;
use super::Digest;
use crate::types::MeetingRecord;

/// Meeting summaries from a batch of messages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DigestReport {
    pub meetings: Vec<MeetingRecord>,
    /// Messages dropped because they carried no view link.
    pub filtered_out: usize,
}

impl DigestReport {
    pub fn ledger(&self, digest: &Digest) -> AssigneeLedger {
        AssigneeLedger::from_records(&self.meetings, &digest.config().untitled_label)
    }

    /// Most recently received meetings first.
    pub fn newest_first(mut self) -> Self {
        self.meetings.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        self
    }
}

impl Digest {
    /// Assemble a record from one message.
    ///
    /// Always returns a record; callers drop those without a url
    /// (see [`MeetingRecord::is_meeting_summary`]).
    pub fn extract(&self, message: &ChannelMessage) -> MeetingRecord {
        let received_at = message.received_at().unwrap_or_else(|e| {
            log::warn!("{}; using epoch for received_at", e);
            DateTime::<Utc>::UNIX_EPOCH
        });
        self.extract_at(message, received_at)
    }

    fn extract_at(&self, message: &ChannelMessage, received_at: DateTime<Utc>) -> MeetingRecord {
        let mut record = MeetingRecord::empty(received_at);

        for text in message.blocks.iter().filter_map(|b| b.section_text()) {
            for field in extract_fields(text, self.view_link()) {
                apply_field(&mut record, field);
            }
        }

        record.action_items = scan_action_items(&message.blocks);

        if record.url.is_none() {
            match find_view_link(&message.text, self.view_link()) {
                Some((url, _)) => record.url = Some(url),
                None => log::debug!("No view link in message at {}", received_at),
            }
        }

        record
    }

    /// Assemble every message and keep the meeting summaries.
    pub fn digest(&self, messages: &[ChannelMessage]) -> DigestReport {
        let mut report = DigestReport::default();

        for message in messages {
            let record = self.extract(message);
            if record.is_meeting_summary() {
                report.meetings.push(record);
            } else {
                report.filtered_out += 1;
            }
        }

        log::info!(
            "Digest: {} meeting summaries, {} other messages filtered out",
            report.meetings.len(),
            report.filtered_out
        );

        report
    }
}

/// Merge one field into the record. Scalars keep the first block's value;
/// lists extend in block order.
fn apply_field(record: &mut MeetingRecord, field: Field) {
    match field {
        Field::TitleLink { url, title } => {
            if record.url.is_none() {
                record.url = Some(url);
                record.title = title;
            }
        }
        Field::Scheduled(value) => {
            record.scheduled.get_or_insert(value);
        }
        Field::Gist(value) => {
            record.gist.get_or_insert(value);
        }
        Field::Participants(emails) => record.participants.extend(emails),
        Field::Overview(bullets) => record.overview.extend(bullets),
        Field::Notes(sections) => record.notes.extend(sections),
    }
}
