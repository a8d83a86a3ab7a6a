//! provider-hub: inspect and drive the configured LLM provider from a shell.
//!
//! Usage:
//!   provider-hub [--config <file>] models                       List selectable models
//!   provider-hub [--config <file>] select "<model> --- [<config>]"
//!   provider-hub [--config <file>] current                      Show the selected model
//!   provider-hub [--config <file>] invoke <capability> [arg]    Call one capability
//!   provider-hub [--config <file>] predict <template> <prompt> [prompt-template]

use ai_provider_hub::config::FileConfig;
use ai_provider_hub::notify::{CompositeNotifier, InMemoryNotifier, TracingNotifier};
use ai_provider_hub::provider::{Capability, CapabilityRequest, PredictRequest};
use ai_provider_hub::{DispatchOutcome, ModelChoice, ProviderService};
use anyhow::{bail, Context};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "provider-hub.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config_path, args) = split_config_flag(std::env::args().skip(1).collect());
    let Some(command) = args.first() else {
        print_usage();
        std::process::exit(1);
    };

    match command.as_str() {
        "version" | "--version" | "-V" => {
            cmd_version();
            return Ok(());
        }
        "help" | "--help" | "-h" => {
            print_usage();
            return Ok(());
        }
        _ => {}
    }

    let failures = Arc::new(InMemoryNotifier::default());
    let service = ProviderService::builder()
        .config(Arc::new(FileConfig::new(&config_path)))
        .notifier(Arc::new(
            CompositeNotifier::new()
                .add_sink(Arc::new(TracingNotifier))
                .add_sink(failures.clone()),
        ))
        .tag("provider-hub")
        .build()?;

    let rest = &args[1..];
    let result = match command.as_str() {
        "models" => cmd_models(&service).await,
        "select" => cmd_select(&service, rest).await,
        "current" => cmd_current(&service).await,
        "invoke" => cmd_invoke(&service, rest).await,
        "predict" => cmd_predict(&service, rest).await,
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    for notification in failures.notifications() {
        eprintln!("{}: {}", notification.message, notification.error);
    }
    result.with_context(|| format!("config file: {}", config_path.display()))
}

/// Pull `--config <file>` out of the argument list.
fn split_config_flag(args: Vec<String>) -> (PathBuf, Vec<String>) {
    let mut config = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            config = iter.next();
        } else if let Some(path) = arg.strip_prefix("--config=") {
            config = Some(path.to_string());
        } else {
            rest.push(arg);
        }
    }
    let path = config
        .or_else(|| std::env::var("PROVIDER_HUB_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    (PathBuf::from(path), rest)
}

fn print_usage() {
    println!(
        r#"provider-hub: LLM provider selection and dispatch

USAGE:
    provider-hub [--config <file>] <COMMAND> [ARGS]

COMMANDS:
    models                                   List models of every configured integration
    select "<model> --- [<config>]"          Select a model and store its integration uid
    current                                  Show the selected model
    invoke <capability> [arg]                Call one capability (e.g. getPrompts 0)
    predict <template> <prompt> [template-id]
    version                                  Show version information
    help                                     Show this help message

CAPABILITIES:
{}

ENVIRONMENT:
    PROVIDER_HUB_CONFIG                      Settings file (default: provider-hub.yaml)
    PROVIDER_HUB_HTTP_TIMEOUT_SECS           HTTP timeout in seconds (default: 60)
    OPENAI_API_KEY                           Fallback API key for the OpenAI provider
    RUST_LOG                                 Log filter (default: warn)"#,
        Capability::ALL
            .iter()
            .map(|c| format!("    {:<40} {}", c.method_name(), c.description()))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn cmd_version() {
    println!(
        "provider-hub {} (ai-provider-hub {})",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_VERSION"),
    );
}

async fn cmd_models(service: &ProviderService) -> anyhow::Result<()> {
    let choices = service.list_model_names().await?;
    if choices.is_empty() {
        println!("No models available.");
    }
    for choice in choices {
        println!("{}", choice.label());
    }
    Ok(())
}

async fn cmd_select(service: &ProviderService, args: &[String]) -> anyhow::Result<()> {
    if args.is_empty() {
        bail!("select requires a model label, e.g. \"gpt-4 --- [openai]\"");
    }
    let choice = ModelChoice::parse_label(&args.join(" "))?;
    let selected = service.select_model(&choice).await?;
    println!("{}", selected);
    Ok(())
}

async fn cmd_current(service: &ProviderService) -> anyhow::Result<()> {
    println!("{}", service.current_model_name().await?);
    Ok(())
}

async fn cmd_invoke(service: &ProviderService, args: &[String]) -> anyhow::Result<()> {
    let Some(name) = args.first() else {
        bail!("invoke requires a capability name");
    };
    let capability: Capability = name.parse()?;
    let request = CapabilityRequest::from_parts(capability, args.get(1).map(String::as_str))?;
    print_outcome(service.invoke(request).await)
}

async fn cmd_predict(service: &ProviderService, args: &[String]) -> anyhow::Result<()> {
    let (Some(template), Some(prompt)) = (args.first(), args.get(1)) else {
        bail!("predict requires <template> <prompt>");
    };
    let template = serde_json::from_str::<Value>(template)
        .ok()
        .filter(Value::is_object)
        .unwrap_or_else(|| Value::String(template.clone()));
    let mut request = PredictRequest::new(template, prompt.as_str());
    if let Some(id) = args.get(2) {
        request = request.with_prompt_template(id.as_str());
    }
    print_outcome(service.predict(request).await)
}

fn print_outcome(outcome: DispatchOutcome) -> anyhow::Result<()> {
    match outcome {
        DispatchOutcome::Completed(Value::String(text)) => println!("{}", text),
        DispatchOutcome::Completed(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        DispatchOutcome::Unsupported(message) => println!("{}", message),
        DispatchOutcome::Failed(message) => bail!(message),
    }
    Ok(())
}
