//! gemini-qa-agent configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// External assistant discovery and launch settings
    pub assistant: AssistantConfig,

    /// Per-operation timeouts
    pub timeouts: TimeoutConfig,

    /// Where generated artifacts are written
    pub output: OutputConfig,

    /// Security audit limits
    pub audit: AuditConfig,

    /// Quality report context limits
    pub report: ReportConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .gqa.yml
        let local_config = PathBuf::from(".gqa.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/gemini-qa/gqa.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("gemini-qa").join("gqa.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed: a broken config file is reported properly by
    /// `Config::load` once logging exists.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".gqa.yml")];
                if let Some(config_dir) = dirs::config_dir() {
                    paths.push(config_dir.join("gemini-qa").join("gqa.yml"));
                }
                paths
            }
        };

        candidates
            .iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// How to find and launch the external assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Executable file name looked up in each search path
    #[serde(rename = "executable-name")]
    pub executable_name: String,

    /// Candidate directories, checked in order and prepended to PATH
    #[serde(rename = "search-paths")]
    pub search_paths: Vec<String>,

    /// Working directory used when the home directory does not exist
    #[serde(rename = "default-working-dir")]
    pub default_working_dir: PathBuf,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            executable_name: "gemini".to_string(),
            search_paths: vec![
                "~/.npm-global/bin".to_string(),
                "/usr/local/bin".to_string(),
                "/usr/bin".to_string(),
                "/bin".to_string(),
                "~/.local/bin".to_string(),
            ],
            default_working_dir: std::env::temp_dir(),
        }
    }
}

impl AssistantConfig {
    /// Expand search paths (resolve ~/)
    pub fn expanded_search_paths(&self) -> Vec<PathBuf> {
        self.search_paths.iter().filter_map(|p| expand_home(p)).collect()
    }
}

/// Expand a leading `~/` to the home directory
///
/// Returns `None` when the path needs a home directory and there is none.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    if path == "~" {
        dirs::home_dir()
    } else if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir().map(|home| home.join(rest))
    } else {
        Some(PathBuf::from(path))
    }
}

/// Per-operation timeouts in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    #[serde(rename = "review-code")]
    pub review_code: u64,

    #[serde(rename = "generate-tests")]
    pub generate_tests: u64,

    /// Applied to each file separately
    #[serde(rename = "security-audit-per-file")]
    pub security_audit_per_file: u64,

    #[serde(rename = "performance-analysis")]
    pub performance_analysis: u64,

    #[serde(rename = "code-quality-report")]
    pub code_quality_report: u64,

    #[serde(rename = "ask-gemini")]
    pub ask_gemini: u64,

    /// Startup and doctor checks (`--version`, `--help`)
    #[serde(rename = "version-check")]
    pub version_check: u64,

    /// Round-trip prompt sent by `gqa doctor --prompt`
    #[serde(rename = "prompt-check")]
    pub prompt_check: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            review_code: 90,
            generate_tests: 120,
            security_audit_per_file: 60,
            performance_analysis: 90,
            code_quality_report: 150,
            ask_gemini: 120,
            version_check: 10,
            prompt_check: 30,
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving generated test files
    #[serde(rename = "tests-dir")]
    pub tests_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            tests_dir: PathBuf::from("tests"),
        }
    }
}

/// Security audit limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    #[serde(rename = "quick-max-files")]
    pub quick_max_files: usize,

    #[serde(rename = "deep-max-files")]
    pub deep_max_files: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            quick_max_files: 10,
            deep_max_files: 20,
        }
    }
}

/// Limits on the project context gathered for quality reports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Maximum lines in the structure listing
    #[serde(rename = "max-structure-entries")]
    pub max_structure_entries: usize,

    /// Files listed per directory
    #[serde(rename = "max-files-per-dir")]
    pub max_files_per_dir: usize,

    /// Manifest/documentation files read into the prompt
    #[serde(rename = "max-key-files")]
    pub max_key_files: usize,

    /// Characters kept from each key file
    #[serde(rename = "max-key-file-chars")]
    pub max_key_file_chars: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_structure_entries: 100,
            max_files_per_dir: 10,
            max_key_files: 5,
            max_key_file_chars: 2000,
        }
    }
}
