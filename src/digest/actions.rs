//! Action-item scanner.
//!
//! The bot posts action items as a run of blocks: a section carrying the
//! `Action Items` label opens the region, then for each person a section
//! holding only `*Name:*` followed by an actions block of checkboxes (or a
//! button when the person has a single task). A divider closes the region.
//!
//! The scan is a fold of [`ScanState::step`] over the blocks.

use std::sync::OnceLock;

use regex::Regex;

use super::blocks::{ActionElement, Block};
use super::labels::Label;
use crate::types::{merge_action_group, ActionGroup};
use crate::util::clean_text;

/// Where the scanner is relative to the action-items region.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Outside the region, before it opens or after a divider closed it.
    #[default]
    Idle,
    /// Inside the region, no one announced.
    InRegion,
    /// Inside the region, waiting for `assignee`'s actions block.
    AwaitingTasks { assignee: String },
}

fn re_assignee_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The whole block is `*Name:*` or `*Name*:`
    RE.get_or_init(|| Regex::new(r"^\*([^*\n]+?)(?::\*|\*:)$").unwrap())
}

/// Name from a block consisting of nothing but a bold `Name:` header.
pub fn assignee_header(text: &str) -> Option<String> {
    let caps = re_assignee_header().captures(text.trim())?;
    clean_text(caps.get(1)?.as_str())
}

/// Task labels from an actions block; blank labels are dropped.
pub fn collect_tasks(items: &[ActionElement]) -> Vec<String> {
    let labels = items.iter().flat_map(|item| match item {
        ActionElement::Checkbox { options } => {
            options.iter().map(String::as_str).collect::<Vec<_>>()
        }
        ActionElement::Button { label } => vec![label.as_str()],
    });
    labels
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

impl ScanState {
    pub fn in_region(&self) -> bool {
        !matches!(self, ScanState::Idle)
    }

    /// Advance over one block. Returns the next state and, when an announced
    /// assignee's tasks were consumed, their group.
    pub fn step(self, block: &Block) -> (ScanState, Option<ActionGroup>) {
        match (self, block) {
            // The label opens the region; an announced assignee survives it.
            (state, Block::Section { text }) if Label::ActionItems.is_in(text) => match state {
                ScanState::Idle => (ScanState::InRegion, None),
                other => (other, None),
            },
            (state, Block::Section { text }) if state.in_region() => match assignee_header(text) {
                Some(assignee) => (ScanState::AwaitingTasks { assignee }, None),
                None => (state, None),
            },
            (ScanState::AwaitingTasks { assignee }, Block::Actions { items }) => {
                let tasks = collect_tasks(items);
                if tasks.is_empty() {
                    (ScanState::AwaitingTasks { assignee }, None)
                } else {
                    (ScanState::InRegion, Some(ActionGroup { assignee, tasks }))
                }
            }
            (_, Block::Divider) => (ScanState::Idle, None),
            (state, _) => (state, None),
        }
    }
}

/// Scan a message's blocks for action items, one group per distinct assignee.
pub fn scan_action_items(blocks: &[Block]) -> Vec<ActionGroup> {
    let mut groups = Vec::new();
    let mut state = ScanState::default();

    for block in blocks {
        let (next, group) = state.step(block);
        if let Some(group) = group {
            merge_action_group(&mut groups, group);
        }
        state = next;
    }

    if let ScanState::AwaitingTasks { assignee } = state {
        log::debug!("Action items ended with '{}' announced but no tasks", assignee);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkboxes(options: &[&str]) -> Block {
        Block::Actions {
            items: vec![ActionElement::Checkbox {
                options: options.iter().map(|s| s.to_string()).collect(),
            }],
        }
    }

    fn button(label: &str) -> Block {
        Block::Actions {
            items: vec![ActionElement::Button {
                label: label.to_string(),
            }],
        }
    }

    fn group(assignee: &str, tasks: &[&str]) -> ActionGroup {
        ActionGroup {
            assignee: assignee.to_string(),
            tasks: tasks.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn header_pattern() {
        assert_eq!(assignee_header("*Jane Doe:*").as_deref(), Some("Jane Doe"));
        assert_eq!(assignee_header("  *Sam*:\n").as_deref(), Some("Sam"));
        assert_eq!(assignee_header("*Jane Doe:* and more"), None);
        assert_eq!(assignee_header("Jane Doe:"), None);
        assert_eq!(assignee_header("*Jane Doe*"), None);
        assert_eq!(assignee_header("*  :*"), None);
    }

    #[test]
    fn announce_then_checkboxes() {
        let blocks = vec![
            Block::section("*Action Items:*"),
            Block::section("*Jane Doe:*"),
            checkboxes(&["Send deck", "Book room"]),
            Block::Divider,
        ];
        assert_eq!(
            scan_action_items(&blocks),
            vec![group("Jane Doe", &["Send deck", "Book room"])]
        );
    }

    #[test]
    fn button_fallback() {
        let blocks = vec![
            Block::section(":white_check_mark: *Action Items:*"),
            Block::section("*Sam:*"),
            button("Follow up with client"),
        ];
        assert_eq!(
            scan_action_items(&blocks),
            vec![group("Sam", &["Follow up with client"])]
        );
    }

    #[test]
    fn no_label_means_no_items() {
        let blocks = vec![
            Block::section("*Jane Doe:*"),
            checkboxes(&["Send deck"]),
            Block::Divider,
        ];
        assert!(scan_action_items(&blocks).is_empty());
    }

    #[test]
    fn divider_closes_region() {
        let blocks = vec![
            Block::section("*Action Items:*"),
            Block::section("*Jane:*"),
            Block::Divider,
            checkboxes(&["Lost task"]),
            Block::section("*Sam:*"),
            checkboxes(&["Also lost"]),
        ];
        assert!(scan_action_items(&blocks).is_empty());
    }

    #[test]
    fn fresh_label_reopens_region() {
        let blocks = vec![
            Block::section("*Action Items:*"),
            Block::Divider,
            Block::section("*Action Items:*"),
            Block::section("*Sam:*"),
            checkboxes(&["Kept"]),
        ];
        assert_eq!(scan_action_items(&blocks), vec![group("Sam", &["Kept"])]);
    }

    #[test]
    fn same_assignee_twice_merges() {
        let blocks = vec![
            Block::section("*Action Items:*"),
            Block::section("*Jane:*"),
            checkboxes(&["One"]),
            Block::section("*Sam:*"),
            button("Two"),
            Block::section("*Jane:*"),
            checkboxes(&["Three", "Four"]),
            Block::Divider,
        ];
        assert_eq!(
            scan_action_items(&blocks),
            vec![group("Jane", &["One", "Three", "Four"]), group("Sam", &["Two"])]
        );
    }

    #[test]
    fn tasks_consumed_once_per_announcement() {
        let blocks = vec![
            Block::section("*Action Items:*"),
            Block::section("*Jane:*"),
            checkboxes(&["One"]),
            checkboxes(&["Orphan"]),
        ];
        assert_eq!(scan_action_items(&blocks), vec![group("Jane", &["One"])]);
    }

    #[test]
    fn empty_actions_keep_assignee() {
        let blocks = vec![
            Block::section("*Action Items:*"),
            Block::section("*Jane:*"),
            checkboxes(&["  ", ""]),
            Block::Other,
            checkboxes(&["Real task"]),
        ];
        assert_eq!(scan_action_items(&blocks), vec![group("Jane", &["Real task"])]);
    }

    #[test]
    fn consecutive_announcements_use_latest() {
        let blocks = vec![
            Block::section("*Action Items:*"),
            Block::section("*Jane:*"),
            Block::section("*Sam:*"),
            checkboxes(&["For Sam"]),
        ];
        assert_eq!(scan_action_items(&blocks), vec![group("Sam", &["For Sam"])]);
    }

    #[test]
    fn unrelated_sections_do_not_reset() {
        let blocks = vec![
            Block::section("*Action Items:*"),
            Block::section("*Jane:*"),
            Block::section("some commentary"),
            checkboxes(&["Still Jane's"]),
        ];
        assert_eq!(scan_action_items(&blocks), vec![group("Jane", &["Still Jane's"])]);
    }

    #[test]
    fn step_is_total() {
        let (s, g) = ScanState::Idle.step(&Block::Other);
        assert_eq!((s, g), (ScanState::Idle, None));

        let (s, g) = ScanState::InRegion.step(&checkboxes(&["x"]));
        assert_eq!((s, g), (ScanState::InRegion, None));

        let awaiting = ScanState::AwaitingTasks {
            assignee: "Jane".to_string(),
        };
        let (s, _) = awaiting.clone().step(&Block::section("*Action Items:*"));
        assert_eq!(s, awaiting);
        let (s, _) = awaiting.step(&Block::Divider);
        assert_eq!(s, ScanState::Idle);
    }
}
