//! Email domain types and the Gmail-side collaborator seam.
//!
//! The engine never talks to Gmail directly — every mailbox side effect goes
//! through the [`GmailApi`] trait. The crate ships only a local fixture
//! implementation; real API bindings are an external collaborator.

pub mod fixture;

pub use fixture::FixtureGmail;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Gmail system label vocabulary (closed enumeration).
///
/// The engine does not validate label names — the tool implementation does.
pub const LABELS: &[&str] = &[
    "INBOX",
    "UNREAD",
    "IMPORTANT",
    "STARRED",
    "SPAM",
    "CATEGORY_PERSONAL",
    "CATEGORY_SOCIAL",
    "CATEGORY_PROMOTIONS",
    "CATEGORY_UPDATES",
    "CATEGORY_FORUMS",
];

/// One fetched email, as written to a paged record file (one per line).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailRecord {
    pub id: String,
    pub subject: String,
    pub from: String,
    pub to: String,
    pub date: String,
    pub snippet: String,
    pub labels: Vec<String>,
}

/// One executed side-effecting action, appended to `actions.jsonl`.
///
/// Produced exactly once per acted-upon email; the sole evidence the Report
/// node consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRecord {
    pub email_id: String,
    pub subject: String,
    pub from: String,
    pub action: String,
}

/// Mailbox operations the engine's Gmail tools delegate to.
///
/// Implementations own retry policy and label validation; the engine
/// propagates failures verbatim as `ToolError::ExecutionFailed`.
#[async_trait]
pub trait GmailApi: Send + Sync {
    /// Fetch up to `max_count` inbox emails.
    async fn fetch_inbox(&self, max_count: usize) -> Result<Vec<EmailRecord>, ToolError>;

    /// Modify labels on a batch of messages in one call.
    async fn batch_modify(
        &self,
        message_ids: &[String],
        add_labels: &[String],
        remove_labels: &[String],
    ) -> Result<(), ToolError>;

    /// Modify labels on a single message.
    async fn modify(
        &self,
        message_id: &str,
        add_labels: &[String],
        remove_labels: &[String],
    ) -> Result<(), ToolError>;

    /// Move a single message to trash. Gmail has no batch form for this.
    async fn trash(&self, message_id: &str) -> Result<(), ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_record_line_schema() {
        let record = EmailRecord {
            id: "m1".into(),
            subject: "Sale ends tonight".into(),
            from: "promo@shop.example".into(),
            to: "user@example.com".into(),
            date: "2026-08-27T09:00:00Z".into(),
            snippet: "Last chance...".into(),
            labels: vec!["INBOX".into(), "CATEGORY_PROMOTIONS".into()],
        };
        let json = serde_json::to_value(&record).unwrap();
        for key in ["id", "subject", "from", "to", "date", "snippet", "labels"] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
    }

    #[test]
    fn action_record_round_trips() {
        let record = ActionRecord {
            email_id: "m1".into(),
            subject: "Sale ends tonight".into(),
            from: "promo@shop.example".into(),
            action: "trash".into(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: ActionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn label_vocabulary_is_closed() {
        assert_eq!(LABELS.len(), 10);
        assert!(LABELS.contains(&"CATEGORY_PROMOTIONS"));
    }
}
