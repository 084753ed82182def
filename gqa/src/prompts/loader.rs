//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;

/// Kind of code review requested by `review_code`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewType {
    Security,
    Performance,
    Style,
    /// Also used for any unrecognized label
    #[default]
    General,
}

impl ReviewType {
    /// Map a caller-supplied label; unknown labels fall back to General
    pub fn from_label(label: &str) -> Self {
        debug!(%label, "ReviewType::from_label: called");
        match label.trim().to_lowercase().as_str() {
            "security" => Self::Security,
            "performance" => Self::Performance,
            "style" => Self::Style,
            _ => Self::General,
        }
    }

    /// Get the template name for this review type
    pub fn template_name(&self) -> &'static str {
        match self {
            Self::Security => "review-security",
            Self::Performance => "review-performance",
            Self::Style => "review-style",
            Self::General => "review-general",
        }
    }
}

/// Context for the review-* templates
#[derive(Debug, Clone, Serialize)]
pub struct ReviewContext<'a> {
    pub file_path: &'a str,
    pub code: &'a str,
}

/// Context for the generate-tests template
#[derive(Debug, Clone, Serialize)]
pub struct TestGenContext<'a> {
    pub source_file: &'a str,
    pub test_framework: &'a str,
    pub coverage_level: &'a str,
    pub code: &'a str,
}

/// Context for the performance-analysis template
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceContext<'a> {
    pub file_path: &'a str,
    pub language: &'a str,
    pub code: &'a str,
}

/// A manifest or documentation file quoted in the quality report prompt
#[derive(Debug, Clone, Serialize)]
pub struct KeyFile {
    pub path: String,
    pub content: String,
}

/// Context for the code-quality-report template
#[derive(Debug, Clone, Serialize)]
pub struct QualityReportContext<'a> {
    pub project_path: &'a str,
    pub include_metrics: bool,
    pub structure: &'a str,
    pub key_files: &'a [KeyFile],
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `~/.config/gemini-qa/prompts/`)
    user_dir: Option<PathBuf>,
    /// Project directory (e.g., `.gqa/prompts/`)
    project_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader
    ///
    /// # Arguments
    /// * `project_root` - Directory holding an optional `.gqa/prompts/`
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        let project_root = project_root.as_ref();
        debug!(?project_root, "PromptLoader::new: called");
        let user_dir = dirs::config_dir()
            .map(|d| d.join("gemini-qa").join("prompts"))
            .filter(|d| d.exists());
        let project_dir = Some(project_root.join(".gqa").join("prompts")).filter(|d| d.exists());
        debug!(?user_dir, ?project_dir, "PromptLoader::new: override directories");

        Self {
            hbs: Self::engine(),
            user_dir,
            project_dir,
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
            project_dir: None,
        }
    }

    /// Create a loader with an explicit override directory
    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            hbs: Self::engine(),
            user_dir: Some(dir.into()),
            project_dir: None,
        }
    }

    /// Source code is substituted verbatim, so HTML escaping is disabled
    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `~/.config/gemini-qa/prompts/{name}.pmt`
    /// 2. Project override: `.gqa/prompts/{name}.pmt`
    /// 3. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        for dir in [&self.user_dir, &self.project_dir].into_iter().flatten() {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        info!("Rendering template '{}'", template_name);

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}
