//! Built-in tools: paged data access and Gmail operations.

pub mod data;
pub mod gmail;

use std::sync::Arc;

use crate::mail::GmailApi;
use crate::tools::registry::ToolRegistry;

impl ToolRegistry {
    /// Register the paged-data tools (`load_data`, `append_data`).
    pub fn register_data_tools(&self, default_page_limit: usize) {
        self.register_sync(Arc::new(data::LoadDataTool::new(default_page_limit)));
        self.register_sync(Arc::new(data::AppendDataTool::new()));
    }

    /// Register the Gmail-side tools against a mailbox implementation.
    pub fn register_gmail_tools(&self, gmail: Arc<dyn GmailApi>) {
        self.register_sync(Arc::new(gmail::BulkFetchEmailsTool::new(Arc::clone(&gmail))));
        self.register_sync(Arc::new(gmail::BatchModifyTool::new(Arc::clone(&gmail))));
        self.register_sync(Arc::new(gmail::ModifyMessageTool::new(Arc::clone(&gmail))));
        self.register_sync(Arc::new(gmail::TrashMessageTool::new(gmail)));
    }
}
