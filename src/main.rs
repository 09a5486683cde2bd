use std::sync::Arc;

use anyhow::Context as _;
use inbox_pilot::channels::{ClientChannel, CliChannel};
use inbox_pilot::config::EngineConfig;
use inbox_pilot::error::ConfigError;
use inbox_pilot::context::RunContext;
use inbox_pilot::graph::PipelineExecutor;
use inbox_pilot::llm::OpenAiReasoner;
use inbox_pilot::mail::{EmailRecord, FixtureGmail};
use inbox_pilot::pipeline::{inbox_pipeline, seed_store};
use inbox_pilot::tools::{ToolGateway, ToolRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = EngineConfig::from_env()?;

    // The rules to apply come from the command line; max_emails optionally too.
    let mut args = std::env::args().skip(1);
    let rules = args
        .next()
        .context("usage: inbox-pilot <rules> [max_emails]")?;
    let max_emails = args.next();

    // Decision-maker: any OpenAI-compatible endpoint.
    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))
        .context("export OPENAI_API_KEY=sk-...")?;
    let base_url =
        std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com".to_string());
    let model = std::env::var("INBOX_PILOT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

    eprintln!("{} v{}", config.name, env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", model);
    eprintln!("   Rules: {}", rules);

    let reasoner = Arc::new(OpenAiReasoner::new(
        base_url,
        secrecy::SecretString::from(api_key),
        model,
    ));

    // Mailbox: a local JSONL fixture (real Gmail bindings are an external
    // collaborator wired in the same way).
    let gmail = match std::env::var("INBOX_PILOT_FIXTURE") {
        Ok(path) => {
            let emails = load_fixture(&path).await?;
            eprintln!("   Mailbox: {} ({} emails)", path, emails.len());
            Arc::new(FixtureGmail::new(emails))
        }
        Err(_) => {
            eprintln!("   Mailbox: empty fixture (set INBOX_PILOT_FIXTURE to a JSONL file)");
            Arc::new(FixtureGmail::empty())
        }
    };

    // ── Tools ──────────────────────────────────────────────────────
    let registry = Arc::new(ToolRegistry::new());
    registry.register_data_tools(config.default_page_limit);
    registry.register_gmail_tools(gmail);
    eprintln!("   Tools: {} registered", registry.count());

    let gateway = Arc::new(ToolGateway::new(registry));
    let channel: Arc<dyn ClientChannel> = Arc::new(CliChannel::new());

    let executor = PipelineExecutor::new(&config, reasoner, gateway, Some(channel));

    let ctx = RunContext::new(&config.data_root);
    eprintln!("   Run: {} ({})\n", ctx.run_id, ctx.data_dir.display());

    let pipeline = inbox_pipeline();
    let seed = seed_store(&rules, max_emails.as_deref(), &config);

    let state = executor.run(&pipeline, seed, &ctx).await?;

    if let Some(report) = state.get("summary_report") {
        println!("\n{}", report);
    }
    Ok(())
}

/// Read a JSONL file of email records into the fixture mailbox.
async fn load_fixture(path: &str) -> anyhow::Result<Vec<EmailRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading fixture {}", path))?;
    let mut emails = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let email: EmailRecord = serde_json::from_str(line)
            .with_context(|| format!("parsing fixture {}:{}", path, idx + 1))?;
        emails.push(email);
    }
    Ok(emails)
}
