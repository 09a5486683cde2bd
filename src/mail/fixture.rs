//! In-memory Gmail fixture.
//!
//! Backs the binary's demo mode and the integration tests: a mailbox seeded
//! from a list of [`EmailRecord`]s, with label changes and trashing applied
//! in memory. Also records every mutating call so tests can assert on call
//! shape (one batched call vs. N single calls).

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ToolError;
use crate::mail::{EmailRecord, GmailApi};

/// A recorded mutating call against the fixture mailbox.
#[derive(Debug, Clone, PartialEq)]
pub enum MailboxCall {
    BatchModify {
        message_ids: Vec<String>,
        add_labels: Vec<String>,
        remove_labels: Vec<String>,
    },
    Modify {
        message_id: String,
        add_labels: Vec<String>,
        remove_labels: Vec<String>,
    },
    Trash {
        message_id: String,
    },
}

#[derive(Debug, Default)]
struct Inner {
    emails: Vec<EmailRecord>,
    trashed: Vec<String>,
    calls: Vec<MailboxCall>,
}

/// Fixture mailbox with interior mutability (the `GmailApi` trait takes `&self`).
#[derive(Debug, Default)]
pub struct FixtureGmail {
    inner: Mutex<Inner>,
}

impl FixtureGmail {
    pub fn new(emails: Vec<EmailRecord>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                emails,
                ..Default::default()
            }),
        }
    }

    /// An empty mailbox.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All mutating calls made so far, in call order.
    pub fn calls(&self) -> Vec<MailboxCall> {
        self.inner.lock().expect("fixture lock").calls.clone()
    }

    /// Ids of messages moved to trash.
    pub fn trashed(&self) -> Vec<String> {
        self.inner.lock().expect("fixture lock").trashed.clone()
    }

    /// Current labels of a message, if it exists and is not trashed.
    pub fn labels_of(&self, message_id: &str) -> Option<Vec<String>> {
        let inner = self.inner.lock().expect("fixture lock");
        inner
            .emails
            .iter()
            .find(|e| e.id == message_id)
            .map(|e| e.labels.clone())
    }

    fn apply_labels(email: &mut EmailRecord, add: &[String], remove: &[String]) {
        for label in add {
            if !email.labels.contains(label) {
                email.labels.push(label.clone());
            }
        }
        email.labels.retain(|l| !remove.contains(l));
    }

    fn unknown(message_id: &str) -> ToolError {
        ToolError::ExecutionFailed {
            tool: "gmail".to_string(),
            reason: format!("unknown message id: {}", message_id),
        }
    }
}

#[async_trait]
impl GmailApi for FixtureGmail {
    async fn fetch_inbox(&self, max_count: usize) -> Result<Vec<EmailRecord>, ToolError> {
        let inner = self.inner.lock().expect("fixture lock");
        Ok(inner.emails.iter().take(max_count).cloned().collect())
    }

    async fn batch_modify(
        &self,
        message_ids: &[String],
        add_labels: &[String],
        remove_labels: &[String],
    ) -> Result<(), ToolError> {
        let mut inner = self.inner.lock().expect("fixture lock");
        for id in message_ids {
            if !inner.emails.iter().any(|e| &e.id == id) {
                return Err(Self::unknown(id));
            }
        }
        for email in inner.emails.iter_mut() {
            if message_ids.contains(&email.id) {
                Self::apply_labels(email, add_labels, remove_labels);
            }
        }
        inner.calls.push(MailboxCall::BatchModify {
            message_ids: message_ids.to_vec(),
            add_labels: add_labels.to_vec(),
            remove_labels: remove_labels.to_vec(),
        });
        Ok(())
    }

    async fn modify(
        &self,
        message_id: &str,
        add_labels: &[String],
        remove_labels: &[String],
    ) -> Result<(), ToolError> {
        let mut inner = self.inner.lock().expect("fixture lock");
        let email = inner
            .emails
            .iter_mut()
            .find(|e| e.id == message_id)
            .ok_or_else(|| Self::unknown(message_id))?;
        Self::apply_labels(email, add_labels, remove_labels);
        inner.calls.push(MailboxCall::Modify {
            message_id: message_id.to_string(),
            add_labels: add_labels.to_vec(),
            remove_labels: remove_labels.to_vec(),
        });
        Ok(())
    }

    async fn trash(&self, message_id: &str) -> Result<(), ToolError> {
        let mut inner = self.inner.lock().expect("fixture lock");
        let pos = inner
            .emails
            .iter()
            .position(|e| e.id == message_id)
            .ok_or_else(|| Self::unknown(message_id))?;
        inner.emails.remove(pos);
        inner.trashed.push(message_id.to_string());
        inner.calls.push(MailboxCall::Trash {
            message_id: message_id.to_string(),
        });
        Ok(())
    }
}
