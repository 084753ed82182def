//! gqa - Gemini QA Agent
//!
//! CLI entry point. With no subcommand, serves MCP on stdin/stdout.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use eyre::{Context, Result, eyre};
use tracing::{debug, info, warn};

use gemini_qa::assistant::CliInvoker;
use gemini_qa::cli::{Cli, Command, OutputFormat, Preflight, check_version, generate_after_help, parse_version};
use gemini_qa::config::Config;
use gemini_qa::mcp::{QaServer, serve_stdio};
use gemini_qa::prompts::PromptLoader;
use gemini_qa::tools::{ToolContext, ToolDefinition, ToolExecutor, validate_args};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // stdout carries the protocol, so logs only ever go to a file
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gemini-qa")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("gqa.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // After-help reports whether the assistant resolves with the default search paths
    let cmd = Cli::command().after_help(generate_after_help(&Config::default().assistant));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("gqa loaded config: assistant={}", config.assistant.executable_name);

    let command = cli.command.unwrap_or(Command::Serve);
    debug!(?command, "main: dispatching command");
    match command {
        Command::Serve => cmd_serve(config).await,
        Command::Tools { format } => cmd_tools(format),
        Command::Call { name, args } => cmd_call(config, &name, args.as_deref()).await,
        Command::Doctor { prompt } => cmd_doctor(&config, prompt).await,
    }
}

fn tool_context(config: Config) -> Result<ToolContext> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(ToolContext::from_config(config, PromptLoader::new(cwd)))
}

async fn cmd_serve(config: Config) -> Result<()> {
    let invoker = CliInvoker::from_config(&config.assistant);
    let timeout = Duration::from_secs(config.timeouts.version_check);
    match check_version(&invoker, timeout).await {
        Ok(version) => info!("Gemini CLI is available: version {}", parse_version(&version)),
        Err(e) => warn!("Gemini CLI check failed: {}", e),
    }

    let ctx = tool_context(config)?;
    serve_stdio(QaServer::new(ToolExecutor::standard(), ctx)).await
}

fn print_definition(def: &ToolDefinition) {
    println!("{}", def.name.bold());
    println!("  {}", def.description);

    let schema = &def.input_schema;
    let required: Vec<&str> = schema["required"]
        .as_array()
        .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    if let Some(properties) = schema["properties"].as_object() {
        for (name, prop) in properties {
            let kind = prop["type"].as_str().unwrap_or("any");
            let description = prop["description"].as_str().unwrap_or("");
            let marker = if required.contains(&name.as_str()) {
                "required".yellow().to_string()
            } else {
                match prop.get("default") {
                    Some(default) => format!("default: {}", default).dimmed().to_string(),
                    None => "optional".dimmed().to_string(),
                }
            };
            println!("    {} ({}, {}) {}", name.cyan(), kind, marker, description);
        }
    }
}

fn cmd_tools(format: OutputFormat) -> Result<()> {
    let definitions = ToolExecutor::standard().definitions();
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&definitions).context("Failed to serialize tool list")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for def in &definitions {
                print_definition(def);
                println!();
            }
        }
    }
    Ok(())
}

async fn cmd_call(config: Config, name: &str, args: Option<&str>) -> Result<()> {
    let input: serde_json::Value = match args {
        Some(raw) => serde_json::from_str(raw).context("--args must be a JSON object")?,
        None => serde_json::json!({}),
    };

    let executor = ToolExecutor::standard();
    let params = executor.params(name).ok_or_else(|| eyre!("Unknown tool: {}", name))?;
    validate_args(params, &input).map_err(|e| eyre!("Invalid arguments for {}: {}", name, e))?;

    let ctx = tool_context(config)?;
    let result = executor.execute(name, &input, &ctx).await.map_err(|e| eyre!(e))?;

    println!("{}", result.content);
    if result.is_error {
        std::process::exit(1);
    }
    Ok(())
}

async fn cmd_doctor(config: &Config, prompt: bool) -> Result<()> {
    let invoker = CliInvoker::from_config(&config.assistant);
    let timeout = Duration::from_secs(config.timeouts.version_check);
    let prompt_timeout = prompt.then(|| Duration::from_secs(config.timeouts.prompt_check));
    let preflight = Preflight::run(&invoker, timeout, prompt_timeout).await;

    print!("{}", preflight.render());
    if preflight.is_ready() {
        println!("\n{} Ready to serve", "✓".green());
        Ok(())
    } else {
        println!("\n{} Not ready", "✗".red());
        std::process::exit(1);
    }
}
