//! The inbox-management pipeline: Intake → Fetch Emails → Classify and Act → Report.
//!
//! Pure configuration. The instruction texts are data handed to the
//! decision-maker verbatim; the engine only reads the declared keys and
//! tool whitelists.

use crate::config::EngineConfig;
use crate::graph::spec::{NodeSpec, NodeType, PipelineSpec};
use crate::graph::state::StateStore;

/// Canonical empty-result marker for `actions_taken`.
///
/// Kept as the source's literal `"[]"` so downstream consumers agree on one
/// value; always compare through [`is_no_actions`], never against ad-hoc
/// strings.
pub const NO_ACTIONS: &str = "[]";

/// Whether an `actions_taken` value is the empty-result marker.
pub fn is_no_actions(value: &str) -> bool {
    value.trim() == NO_ACTIONS
}

/// Build the seed store for one run: `rules` as given, `max_emails`
/// defaulting from config when absent.
pub fn seed_store(rules: &str, max_emails: Option<&str>, config: &EngineConfig) -> StateStore {
    let max_emails = max_emails
        .map(String::from)
        .unwrap_or_else(|| config.default_max_emails.to_string());
    StateStore::seeded([
        ("rules".to_string(), rules.to_string()),
        ("max_emails".to_string(), max_emails),
    ])
}

const INTAKE_PROMPT: &str = "\
You are an inbox management assistant. The user has provided rules for managing their emails.

**STEP 1 — Respond to the user (text only, NO tool calls):**

Read the user's rules from the input context. Present a clear summary of what you will do \
with their emails based on their rules.

The following Gmail actions are available — map the user's rules to whichever apply:
- **Trash** emails
- **Mark as spam**
- **Mark as important** / unmark important
- **Mark as read** / mark as unread
- **Star** / unstar emails
- **Add/remove Gmail labels** (INBOX, UNREAD, IMPORTANT, STARRED, SPAM, CATEGORY_PERSONAL, \
CATEGORY_SOCIAL, CATEGORY_PROMOTIONS, CATEGORY_UPDATES, CATEGORY_FORUMS)

Present the rules back to the user in plain language. Do NOT refuse rules — if the user asks \
for any of the above actions, confirm you will do it.

Also confirm the batch size (max_emails). If max_emails is not provided, default to 100.

Ask the user to confirm: \"Does this look right? I'll proceed once you confirm.\"

**STEP 2 — After the user confirms, call set_output:**

- set_output(\"rules\", <the confirmed rules as a clear text description>)
- set_output(\"max_emails\", <the confirmed max_emails as a string number, e.g. \"100\">)
";

const FETCH_PROMPT: &str = "\
You are a data pipeline step. Your ONLY job is to fetch emails from Gmail by calling the \
bulk_fetch_emails tool.

**Execute these exact steps:**

1. Read the \"max_emails\" value from the input context.
2. Call bulk_fetch_emails with max_emails set to that value.
3. The tool returns a JSON object with a \"filename\" key (e.g. {\"filename\": \"emails.jsonl\"}).
4. Call set_output(\"emails\", <the filename value from the tool result>).

Do NOT add commentary or explanation. Do NOT call any other tools. Execute the steps above exactly.
";

const CLASSIFY_PROMPT: &str = "\
You are an inbox management assistant. Apply the user's rules to their emails and execute \
Gmail actions.

**YOUR TOOLS:**
- load_data(filename, limit, offset) — Read emails from a local file. This is how you access \
the emails.
- append_data(filename, data) — Append a line to a file. Use this to record actions taken.
- gmail_batch_modify_messages(message_ids, add_labels, remove_labels) — Modify Gmail labels \
in batch. ALWAYS prefer this.
- gmail_modify_message(message_id, add_labels, remove_labels) — Modify a single message's labels.
- gmail_trash_message(message_id) — Move a message to trash. No batch version; call per email.
- set_output(key, value) — Set an output value. Call ONLY after all actions are executed.

**CONTEXT:**
- \"rules\" = the user's rule to apply (e.g. \"mark all as unread\")
- \"emails\" = a filename (e.g. \"emails.jsonl\") containing the fetched emails as JSONL. \
Each line has: id, subject, from, to, date, snippet, labels.

**STEP 1 — LOAD EMAILS (your first tool call MUST be load_data):**
Call load_data(filename=<the \"emails\" value from context>) to read the email data.
- If the result is empty, call set_output(\"actions_taken\", \"[]\") and stop.
- If has_more=true, load more pages with load_data(filename=..., offset=...) until all \
emails are loaded.

**STEP 2 — DETERMINE STRATEGY:**
- **Blanket rule** (same action for ALL emails, e.g. \"mark all as unread\"): Collect all \
message IDs, then execute ONE gmail_batch_modify_messages call.
- **Classification rule** (different actions for different emails): Classify each email, \
group by action, execute batch operations per group.

**STEP 3 — EXECUTE ACTIONS:**
Call the appropriate Gmail tool(s) with the real message IDs from the loaded emails. Then \
record each action:
- append_data(filename=\"actions.jsonl\", data=<JSON of {email_id, subject, from, action}>)

**STEP 4 — FINISH:**
After ALL actions are executed, call set_output(\"actions_taken\", \"actions.jsonl\").

**GMAIL LABEL REFERENCE:**
- MARK AS UNREAD — add_labels=[\"UNREAD\"]
- MARK AS READ — remove_labels=[\"UNREAD\"]
- MARK IMPORTANT — add_labels=[\"IMPORTANT\"]
- REMOVE IMPORTANT — remove_labels=[\"IMPORTANT\"]
- STAR — add_labels=[\"STARRED\"]
- UNSTAR — remove_labels=[\"STARRED\"]
- ARCHIVE — remove_labels=[\"INBOX\"]
- MARK AS SPAM — add_labels=[\"SPAM\"], remove_labels=[\"INBOX\"]
- TRASH — use gmail_trash_message(message_id) per email

**CRITICAL RULES:**
- Your FIRST tool call MUST be load_data. Do NOT skip this.
- You MUST call Gmail tools to execute real actions. Do NOT just report what should be done.
- Do NOT call set_output until all Gmail actions are executed.
- Pass ONLY the filename \"actions.jsonl\" to set_output, NOT raw data.
";

const REPORT_PROMPT: &str = "\
You are an inbox management assistant. Your job is to generate a clear summary report of \
the actions taken on the user's emails.

**LOADING ACTIONS:**
The \"actions_taken\" value from context is a filename (e.g. \"actions.jsonl\"), NOT raw \
action data.
- If it equals \"[]\", there are no actions — generate a report stating no emails were \
processed and call set_output.
- Otherwise, call load_data(filename=<the actions_taken value>) to read the action records.
- The file is in JSONL format: each line is one JSON object with: email_id, subject, from, \
action.
- If load_data returns has_more=true, call it again with the next offset to get more records.
- Read ALL records before generating the report.

**GENERATE a summary report:**

1. **Overview** — Total emails processed, breakdown by action type.

2. **By Action** — Group emails by action taken. For each action group, list the emails \
with subject and sender.

3. **No Action Taken** — Any emails that didn't match any rules (if applicable).

Format the report as clean, readable text (not JSON).

After generating the report, call:
- set_output(\"summary_report\", <the formatted report text>)
";

/// The four-node inbox-management pipeline.
pub fn inbox_pipeline() -> PipelineSpec {
    PipelineSpec {
        name: "inbox-management".to_string(),
        nodes: vec![
            NodeSpec {
                id: "intake".into(),
                name: "Intake".into(),
                description: "Receive and validate input parameters: rules and max_emails. \
                              Present the interpreted rules back to the user for confirmation."
                    .into(),
                node_type: NodeType::EventLoop,
                client_facing: true,
                input_keys: vec!["rules".into(), "max_emails".into()],
                output_keys: vec!["rules".into(), "max_emails".into()],
                system_prompt: INTAKE_PROMPT.into(),
                tools: vec![],
            },
            NodeSpec {
                id: "fetch-emails".into(),
                name: "Fetch Emails".into(),
                description: "Fetch emails from the Gmail inbox up to the configured batch \
                              limit and write them as JSONL to the run's data directory."
                    .into(),
                node_type: NodeType::EventLoop,
                client_facing: false,
                input_keys: vec!["rules".into(), "max_emails".into()],
                output_keys: vec!["emails".into()],
                system_prompt: FETCH_PROMPT.into(),
                tools: vec!["bulk_fetch_emails".into()],
            },
            NodeSpec {
                id: "classify-and-act".into(),
                name: "Classify and Act".into(),
                description: "Apply the user's rules to each email and execute the \
                              appropriate Gmail actions."
                    .into(),
                node_type: NodeType::EventLoop,
                client_facing: false,
                input_keys: vec!["rules".into(), "emails".into()],
                output_keys: vec!["actions_taken".into()],
                system_prompt: CLASSIFY_PROMPT.into(),
                tools: vec![
                    "gmail_trash_message".into(),
                    "gmail_modify_message".into(),
                    "gmail_batch_modify_messages".into(),
                    "load_data".into(),
                    "append_data".into(),
                ],
            },
            NodeSpec {
                id: "report".into(),
                name: "Report".into(),
                description: "Generate a summary report of all actions taken on the emails."
                    .into(),
                node_type: NodeType::EventLoop,
                client_facing: false,
                input_keys: vec!["actions_taken".into()],
                output_keys: vec!["summary_report".into()],
                system_prompt: REPORT_PROMPT.into(),
                tools: vec!["load_data".into()],
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_is_structurally_valid() {
        inbox_pipeline().validate().unwrap();
    }

    #[test]
    fn only_intake_is_client_facing() {
        let pipeline = inbox_pipeline();
        let client_facing: Vec<_> = pipeline
            .nodes
            .iter()
            .filter(|n| n.client_facing)
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(client_facing, vec!["intake"]);
    }

    #[test]
    fn report_cannot_mutate_the_mailbox() {
        let pipeline = inbox_pipeline();
        let report = pipeline.nodes.iter().find(|n| n.id == "report").unwrap();
        assert_eq!(report.tools, vec!["load_data".to_string()]);
    }

    #[test]
    fn nodes_chain_through_declared_keys() {
        let pipeline = inbox_pipeline();
        // Every non-seed input key is some earlier node's output key.
        let mut available: Vec<&str> = vec!["rules", "max_emails"];
        for node in &pipeline.nodes {
            for key in &node.input_keys {
                assert!(
                    available.contains(&key.as_str()),
                    "node {} reads {} before any producer",
                    node.id,
                    key
                );
            }
            for key in &node.output_keys {
                if !available.contains(&key.as_str()) {
                    available.push(key);
                }
            }
        }
    }

    #[test]
    fn seed_store_defaults_max_emails() {
        let config = EngineConfig::default();
        let store = seed_store("trash promos", None, &config);
        assert_eq!(store.get("max_emails"), Some("100"));

        let store = seed_store("trash promos", Some("50"), &config);
        assert_eq!(store.get("max_emails"), Some("50"));
    }

    #[test]
    fn no_actions_marker() {
        assert!(is_no_actions("[]"));
        assert!(is_no_actions(" [] "));
        assert!(!is_no_actions("actions.jsonl"));
    }
}
