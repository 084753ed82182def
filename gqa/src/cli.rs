//! CLI command definitions and preflight checks

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::assistant::{AssistantInvoker, CliInvoker, InvokeRequest, ProcessResult, is_executable};
use crate::config::AssistantConfig;

/// Gemini QA Agent - code QA operations over MCP
#[derive(Parser)]
#[command(
    name = "gqa",
    about = "MCP server exposing code review, test generation and audits backed by the Gemini CLI",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (default: serve)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the MCP server on stdin/stdout
    Serve,

    /// List the available QA operations
    Tools {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run one operation and print its result
    Call {
        /// Operation name (e.g. review_code)
        name: String,

        /// Arguments as a JSON object
        #[arg(short, long)]
        args: Option<String>,
    },

    /// Check that the assistant CLI can be found and run
    Doctor {
        /// Also send a short prompt and wait for the reply
        #[arg(long)]
        prompt: bool,
    },
}

/// Result of resolving the assistant executable
pub struct AssistantCheck {
    pub name: String,
    pub path: Option<PathBuf>,
}

impl AssistantCheck {
    /// Resolve without running anything
    pub fn check(config: &AssistantConfig) -> Self {
        debug!(executable = %config.executable_name, "AssistantCheck::check: called");
        let invoker = CliInvoker::from_config(config);
        let path = invoker.resolve().ok();
        debug!(?path, "AssistantCheck::check: resolved");
        Self {
            name: config.executable_name.clone(),
            path,
        }
    }
}

/// Parse version from command output (extracts first version-like string)
pub fn parse_version(output: &str) -> String {
    debug!(%output, "parse_version: called");
    for word in output.split_whitespace() {
        let word = word.trim_start_matches('v');
        if word.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            let version: String = word.chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect();
            if !version.is_empty() {
                return version;
            }
        }
    }
    "unknown".to_string()
}

/// Run `<assistant> --version`
///
/// Returns the trimmed stdout, or a description of what went wrong.
pub async fn check_version(invoker: &dyn AssistantInvoker, timeout: Duration) -> Result<String, String> {
    debug!(?timeout, "check_version: called");
    let request = InvokeRequest::new(vec!["--version".to_string()], timeout);
    match invoker.invoke(request).await {
        Ok(result) if result.success() => Ok(result.stdout.trim().to_string()),
        Ok(result) => Err(failure_text(&result)),
        Err(e) => Err(e.to_string()),
    }
}

fn failure_text(result: &ProcessResult) -> String {
    if result.stderr.trim().is_empty() {
        format!("exited with {:?}", result.exit_code)
    } else {
        result.stderr.trim().to_string()
    }
}

/// Prompt sent by the round-trip check
pub const ROUND_TRIP_PROMPT: &str = "Reply with the single word: ready";

/// Send `ROUND_TRIP_PROMPT` and return a preview of the reply
pub async fn round_trip_prompt(invoker: &dyn AssistantInvoker, timeout: Duration) -> Result<String, String> {
    debug!(?timeout, "round_trip_prompt: called");
    match invoker.invoke(InvokeRequest::prompt(ROUND_TRIP_PROMPT, timeout)).await {
        Ok(result) if result.success() => {
            let reply = result.stdout.trim();
            if reply.is_empty() {
                Err("empty response".to_string())
            } else {
                Ok(reply.chars().take(100).collect())
            }
        }
        Ok(result) => Err(failure_text(&result)),
        Err(e) => Err(e.to_string()),
    }
}

/// Run `<assistant> --help` and check that it accepts `--prompt`
pub async fn check_prompt_flag(invoker: &dyn AssistantInvoker, timeout: Duration) -> Result<bool, String> {
    debug!(?timeout, "check_prompt_flag: called");
    let request = InvokeRequest::new(vec!["--help".to_string()], timeout);
    match invoker.invoke(request).await {
        Ok(result) => Ok(result.stdout.contains("--prompt") || result.stderr.contains("--prompt")),
        Err(e) => Err(e.to_string()),
    }
}

/// One configured location of the assistant executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateStatus {
    pub path: PathBuf,
    pub exists: bool,
    pub executable: bool,
}

impl CandidateStatus {
    pub fn inspect(path: PathBuf) -> Self {
        let exists = path.exists();
        let executable = exists && is_executable(&path);
        Self {
            path,
            exists,
            executable,
        }
    }
}

/// Outcome of `gqa doctor`
pub struct Preflight {
    pub candidates: Vec<CandidateStatus>,
    pub executable: Result<PathBuf, String>,
    pub version: Result<String, String>,
    pub prompt_flag: Result<bool, String>,
    /// Round-trip reply, when requested
    pub prompt: Option<Result<String, String>>,
    pub search_path: String,
}

impl Preflight {
    /// Run the checks; `prompt_timeout` enables the round-trip prompt
    pub async fn run(invoker: &CliInvoker, timeout: Duration, prompt_timeout: Option<Duration>) -> Self {
        debug!(prompt = prompt_timeout.is_some(), "Preflight::run: called");
        let candidates = invoker
            .resolver()
            .candidates()
            .into_iter()
            .map(CandidateStatus::inspect)
            .collect();

        let search_path = match invoker.search_path() {
            Ok(Some(path)) => path.to_string_lossy().to_string(),
            Ok(None) => "(unset)".to_string(),
            Err(e) => e.to_string(),
        };

        let executable = invoker.resolve().map_err(|e| e.to_string());
        let (version, prompt_flag, prompt) = match &executable {
            Ok(_) => {
                let version = check_version(invoker, timeout).await;
                let prompt_flag = check_prompt_flag(invoker, timeout).await;
                let prompt = match prompt_timeout {
                    Some(t) => Some(round_trip_prompt(invoker, t).await),
                    None => None,
                };
                (version, prompt_flag, prompt)
            }
            Err(e) => (
                Err(e.clone()),
                Err(e.clone()),
                prompt_timeout.map(|_| Err(e.clone())),
            ),
        };

        Self {
            candidates,
            executable,
            version,
            prompt_flag,
            prompt,
            search_path,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.executable.is_ok()
            && self.version.is_ok()
            && matches!(self.prompt_flag, Ok(true))
            && !matches!(self.prompt, Some(Err(_)))
    }

    pub fn render(&self) -> String {
        fn icon(ok: bool) -> &'static str {
            if ok { "\u{2705}" } else { "\u{274C}" }
        }

        let mut out = String::from("Candidate locations:\n");
        for c in &self.candidates {
            let state = match (c.exists, c.executable) {
                (true, true) => "exists & executable",
                (true, false) => "exists, not executable",
                _ => "missing",
            };
            out.push_str(&format!("  {} {}: {}\n", icon(c.executable), c.path.display(), state));
        }
        out.push('\n');

        match &self.executable {
            Ok(path) => out.push_str(&format!("{} executable  {}\n", icon(true), path.display())),
            Err(e) => out.push_str(&format!("{} executable  {}\n", icon(false), e)),
        }
        match &self.version {
            Ok(v) => out.push_str(&format!("{} version     {}\n", icon(true), v)),
            Err(e) => out.push_str(&format!("{} version     {}\n", icon(false), e)),
        }
        match &self.prompt_flag {
            Ok(true) => out.push_str(&format!("{} --prompt    supported\n", icon(true))),
            Ok(false) => out.push_str(&format!("{} --prompt    not mentioned in --help\n", icon(false))),
            Err(e) => out.push_str(&format!("{} --prompt    {}\n", icon(false), e)),
        }
        match &self.prompt {
            Some(Ok(reply)) => out.push_str(&format!("{} round-trip  {}\n", icon(true), reply)),
            Some(Err(e)) => out.push_str(&format!("{} round-trip  {}\n", icon(false), e)),
            None => {}
        }
        out.push_str(&format!("\nSearch path: {}\n", self.search_path));
        out
    }
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gemini-qa")
        .join("logs")
        .join("gqa.log")
}

/// Generate the after_help text with the assistant check and log location
pub fn generate_after_help(config: &AssistantConfig) -> String {
    debug!("generate_after_help: called");
    let check = AssistantCheck::check(config);

    let mut help = String::new();
    help.push_str("Assistant:\n");
    match &check.path {
        Some(path) => help.push_str(&format!("  \u{2705} {:<10} {}\n", check.name, path.display())),
        None => help.push_str(&format!("  \u{274C} {:<10} not found\n", check.name)),
    }

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}

/// Output format for listings
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
