//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for each QA operation.
//!
//! Template loading chain:
//! 1. `~/.config/gemini-qa/prompts/{name}.pmt` (user override)
//! 2. `.gqa/prompts/{name}.pmt` (project override)
//! 3. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{
    KeyFile, PerformanceContext, PromptLoader, QualityReportContext, ReviewContext, ReviewType, TestGenContext,
};
