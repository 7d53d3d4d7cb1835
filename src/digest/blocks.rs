//! Block model for meeting-bot chat messages.
//!
//! Raw payloads come from the chat platform's history API. Decoding is
//! tolerant: a block whose shape doesn't match its declared type becomes
//! [`Block::Other`] so later blocks still parse and indices stay stable.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::DigestError;

/// One structural element of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Section { text: String },
    Actions { items: Vec<ActionElement> },
    Divider,
    Other,
}

/// An interactive element inside an actions block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionElement {
    /// Each option label is one task.
    Checkbox { options: Vec<String> },
    /// A single task rendered as a button.
    Button { label: String },
}

impl Block {
    pub fn section(text: impl Into<String>) -> Self {
        Block::Section { text: text.into() }
    }

    pub fn section_text(&self) -> Option<&str> {
        match self {
            Block::Section { text } => Some(text),
            _ => None,
        }
    }

    /// Decode one raw block. Never fails; unknown or malformed blocks are `Other`.
    pub fn from_value(value: &Value) -> Self {
        let raw: RawBlock = match RawBlock::deserialize(value) {
            Ok(raw) => raw,
            Err(e) => {
                log::debug!("Skipping malformed block: {}", e);
                return Block::Other;
            }
        };

        match raw.kind.as_deref() {
            Some("section") => match raw.text {
                Some(RawText { text: Some(text) }) => Block::Section { text },
                _ => {
                    log::debug!("Section block without text, skipping");
                    Block::Other
                }
            },
            Some("actions") => Block::Actions {
                items: raw.elements.iter().filter_map(decode_element).collect(),
            },
            Some("divider") => Block::Divider,
            _ => Block::Other,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    #[serde(rename = "type")]
    kind: Option<String>,
    // Section text; rich_text and other block types carry no usable text here.
    #[serde(default, deserialize_with = "lenient")]
    text: Option<RawText>,
    #[serde(default)]
    elements: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawText {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    options: Vec<Value>,
    text: Option<RawText>,
}

/// Option label: either a bare string or a text object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawOptionText {
    Plain(String),
    Rich { text: String },
}

#[derive(Debug, Deserialize)]
struct RawOption {
    text: RawOptionText,
}

/// Deserialize a field that might have the wrong shape; a mismatch yields `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn decode_element(value: &Value) -> Option<ActionElement> {
    let raw = match RawElement::deserialize(value) {
        Ok(raw) => raw,
        Err(e) => {
            log::debug!("Skipping malformed action element: {}", e);
            return None;
        }
    };

    match raw.kind.as_deref() {
        Some("checkboxes") => {
            let options = raw
                .options
                .iter()
                .filter_map(|opt| RawOption::deserialize(opt).ok())
                .map(|opt| match opt.text {
                    RawOptionText::Plain(s) => s,
                    RawOptionText::Rich { text } => text,
                })
                .collect();
            Some(ActionElement::Checkbox { options })
        }
        Some("button") => raw
            .text
            .and_then(|t| t.text)
            .map(|label| ActionElement::Button { label }),
        _ => None,
    }
}

/// A message as fetched from the chat channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMessage {
    pub blocks: Vec<Block>,
    /// Plain-text fallback body.
    pub text: String,
    /// Send time in epoch seconds.
    pub ts: f64,
    /// Exact send time when `ts` arrived as a decimal string.
    sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    blocks: Vec<Value>,
    #[serde(default)]
    text: Option<String>,
    ts: RawTs,
}

/// The history API sends `ts` as a string; accept numbers too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTs {
    Number(f64),
    Text(String),
}

impl ChannelMessage {
    pub fn new(blocks: Vec<Block>, text: impl Into<String>, ts: f64) -> Self {
        Self {
            blocks,
            text: text.into(),
            ts,
            sent_at: None,
        }
    }

    /// Decode one raw message.
    pub fn from_value(value: &Value) -> Result<Self, DigestError> {
        let raw = RawMessage::deserialize(value)?;

        let (ts, sent_at) = match raw.ts {
            RawTs::Number(n) => (n, None),
            RawTs::Text(s) => {
                let s = s.trim();
                let invalid = || DigestError::InvalidTimestamp(s.to_string());
                let sent_at = parse_decimal_ts(s).ok_or_else(invalid)?;
                let ts = s.parse::<f64>().map_err(|_| invalid())?;
                (ts, Some(sent_at))
            }
        };
        if !ts.is_finite() || ts < 0.0 {
            return Err(DigestError::InvalidTimestamp(ts.to_string()));
        }

        Ok(Self {
            blocks: raw.blocks.iter().map(Block::from_value).collect(),
            text: raw.text.unwrap_or_default(),
            ts,
            sent_at,
        })
    }

    /// Send time as a UTC timestamp.
    ///
    /// String timestamps are exact; a float `ts` is rounded to the microsecond.
    pub fn received_at(&self) -> Result<DateTime<Utc>, DigestError> {
        if let Some(sent_at) = self.sent_at {
            return Ok(sent_at);
        }
        let secs = self.ts.trunc();
        let micros = ((self.ts - secs) * 1e6).round().min(999_999.0) as u32;
        let nanos = micros * 1_000;
        if !secs.is_finite() || secs < 0.0 || secs > i64::MAX as f64 {
            return Err(DigestError::InvalidTimestamp(self.ts.to_string()));
        }
        DateTime::from_timestamp(secs as i64, nanos)
            .ok_or_else(|| DigestError::InvalidTimestamp(self.ts.to_string()))
    }
}

/// `"1712345678.000100"` → seconds plus nanoseconds, without going through
/// a float. Fraction digits past the ninth are dropped.
fn parse_decimal_ts(s: &str) -> Option<DateTime<Utc>> {
    let (secs, frac) = s.split_once('.').unwrap_or((s, ""));
    if secs.is_empty()
        || !secs.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let secs = secs.parse::<i64>().ok()?;
    let nanos = format!("{:0<9}", &frac[..frac.len().min(9)])
        .parse::<u32>()
        .ok()?;
    DateTime::from_timestamp(secs, nanos)
}

/// Decode a batch of raw messages.
///
/// Accepts a JSON array of messages or a history page object with a
/// `messages` array. Messages that fail to decode are dropped with a warning.
pub fn parse_messages(json: &str) -> Result<Vec<ChannelMessage>, DigestError> {
    let root: Value = serde_json::from_str(json)?;

    let items = match &root {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get("messages") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(DigestError::ParseError(
                    "expected a `messages` array".to_string(),
                ))
            }
        },
        _ => {
            return Err(DigestError::ParseError(
                "expected an array of messages".to_string(),
            ))
        }
    };

    let mut messages = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match ChannelMessage::from_value(item) {
            Ok(msg) => messages.push(msg),
            Err(e) => log::warn!("Dropping message {}: {}", idx, e),
        }
    }

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_section_divider_and_other() {
        let section = json!({"type": "section", "text": {"type": "mrkdwn", "text": "*Gist:* hi"}});
        assert_eq!(Block::from_value(&section), Block::section("*Gist:* hi"));
        assert_eq!(Block::from_value(&json!({"type": "divider"})), Block::Divider);
        let header = json!({"type": "header", "text": {"text": "x"}});
        assert_eq!(Block::from_value(&header), Block::Other);
        assert_eq!(Block::from_value(&json!("not a block")), Block::Other);
    }

    #[test]
    fn malformed_section_is_other() {
        assert_eq!(Block::from_value(&json!({"type": "section"})), Block::Other);
        for malformed in [
            json!({"type": "section", "text": "bare"}),
            json!({"type": "section", "text": {"text": 42}}),
        ] {
            assert_eq!(Block::from_value(&malformed), Block::Other);
        }
    }

    #[test]
    fn decodes_checkboxes_with_both_option_shapes() {
        let block = Block::from_value(&json!({
            "type": "actions",
            "elements": [{
                "type": "checkboxes",
                "options": [
                    {"text": {"type": "mrkdwn", "text": "Send deck"}, "value": "0"},
                    {"text": "Book room"},
                    {"value": "no text"}
                ]
            }]
        }));
        assert_eq!(
            block,
            Block::Actions {
                items: vec![ActionElement::Checkbox {
                    options: vec!["Send deck".to_string(), "Book room".to_string()]
                }]
            }
        );
    }

    #[test]
    fn decodes_buttons_and_skips_bad_elements() {
        let block = Block::from_value(&json!({
            "type": "actions",
            "elements": [
                {"type": "button", "text": {"type": "plain_text", "text": "Follow up with client"}},
                {"type": "button"},
                {"type": "datepicker"},
                17
            ]
        }));
        assert_eq!(
            block,
            Block::Actions {
                items: vec![ActionElement::Button {
                    label: "Follow up with client".to_string()
                }]
            }
        );
    }

    #[test]
    fn message_ts_accepts_string_and_number() {
        let m = ChannelMessage::from_value(&json!({"ts": "1712345678.000100", "text": "hi"}))
            .unwrap();
        assert_eq!(m.text, "hi");
        assert!(m.blocks.is_empty());
        assert_eq!(m.received_at().unwrap().timestamp(), 1_712_345_678);

        let m = ChannelMessage::from_value(&json!({"ts": 1712345678.5, "blocks": []})).unwrap();
        assert_eq!(m.text, "");
        assert_eq!(m.received_at().unwrap().timestamp_subsec_millis(), 500);
    }

    #[test]
    fn string_ts_keeps_exact_fraction() {
        let m = ChannelMessage::from_value(&json!({"ts": "1712345678.000100"})).unwrap();
        let at = m.received_at().unwrap();
        assert_eq!(at.timestamp(), 1_712_345_678);
        assert_eq!(at.timestamp_subsec_nanos(), 100_000);

        let m = ChannelMessage::from_value(&json!({"ts": "1712345678"})).unwrap();
        assert_eq!(m.received_at().unwrap().timestamp_subsec_nanos(), 0);

        let m = ChannelMessage::from_value(&json!({"ts": "1.1234567891"})).unwrap();
        assert_eq!(m.received_at().unwrap().timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn float_ts_rounds_to_microseconds() {
        let m = ChannelMessage::new(vec![], "", 1_712_345_678.000_1);
        assert_eq!(m.received_at().unwrap().timestamp_subsec_nanos(), 100_000);
    }

    #[test]
    fn message_with_bad_ts_is_rejected() {
        let err = ChannelMessage::from_value(&json!({"ts": "yesterday"})).unwrap_err();
        assert!(matches!(err, DigestError::InvalidTimestamp(_)));
        for bad in ["-5.0", "1.2e3", ".5", "12.3.4"] {
            assert!(ChannelMessage::from_value(&json!({ "ts": bad })).is_err(), "{}", bad);
        }
        assert!(ChannelMessage::from_value(&json!({"text": "no ts"})).is_err());
    }

    #[test]
    fn parse_messages_drops_bad_entries() {
        let page = json!({
            "ok": true,
            "messages": [
                {"ts": "1712345678.0", "text": "one"},
                {"text": "missing ts"},
                {"ts": 1712345679, "text": "two"}
            ]
        });
        let messages = parse_messages(&page.to_string()).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].text, "two");

        let bare = parse_messages(r#"[{"ts": "1.0"}]"#).unwrap();
        assert_eq!(bare.len(), 1);
    }

    #[test]
    fn parse_messages_rejects_wrong_root() {
        assert!(parse_messages("42").is_err());
        assert!(parse_messages(r#"{"ok": false}"#).is_err());
        assert!(parse_messages("not json").is_err());
    }
}
