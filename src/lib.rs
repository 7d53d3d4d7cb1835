//! Meeting summaries from a team chat channel.
//!
//! A transcription bot posts one rich-text message per meeting. [`Digest`]
//! turns those messages into [`MeetingRecord`]s and folds their action items
//! into a per-assignee [`AssigneeLedger`].

pub mod digest;
mod error;
pub mod types;
pub mod util;

pub use digest::assemble::DigestReport;
pub use digest::blocks::{parse_messages, ActionElement, Block, ChannelMessage};
pub use digest::ledger::{AssigneeLedger, AssigneeLedgerEntry, LedgerTask};
pub use digest::{default_config_path, Digest, DigestConfig};
pub use error::DigestError;
pub use types::{ActionGroup, MeetingRecord, NoteSection};
