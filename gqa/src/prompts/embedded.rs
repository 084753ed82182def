//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

pub const REVIEW_SECURITY: &str = include_str!("../../prompts/review-security.pmt");
pub const REVIEW_PERFORMANCE: &str = include_str!("../../prompts/review-performance.pmt");
pub const REVIEW_STYLE: &str = include_str!("../../prompts/review-style.pmt");
pub const REVIEW_GENERAL: &str = include_str!("../../prompts/review-general.pmt");
pub const GENERATE_TESTS: &str = include_str!("../../prompts/generate-tests.pmt");
pub const SECURITY_AUDIT: &str = include_str!("../../prompts/security-audit.pmt");
pub const PERFORMANCE_ANALYSIS: &str = include_str!("../../prompts/performance-analysis.pmt");
pub const CODE_QUALITY_REPORT: &str = include_str!("../../prompts/code-quality-report.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    let template = match name {
        "review-security" => REVIEW_SECURITY,
        "review-performance" => REVIEW_PERFORMANCE,
        "review-style" => REVIEW_STYLE,
        "review-general" => REVIEW_GENERAL,
        "generate-tests" => GENERATE_TESTS,
        "security-audit" => SECURITY_AUDIT,
        "performance-analysis" => PERFORMANCE_ANALYSIS,
        "code-quality-report" => CODE_QUALITY_REPORT,
        _ => {
            debug!("get_embedded: no match found");
            return None;
        }
    };
    Some(template)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_reviews() {
        assert!(get_embedded("review-security").unwrap().contains("security review"));
        assert!(get_embedded("review-performance").unwrap().contains("performance issues"));
        assert!(get_embedded("review-style").unwrap().contains("style, readability"));
        assert!(get_embedded("review-general").unwrap().contains("comprehensive code review"));
    }

    #[test]
    fn test_get_embedded_operations() {
        assert!(get_embedded("generate-tests").unwrap().contains("{{test_framework}}"));
        assert!(get_embedded("security-audit").unwrap().contains("SQL injection"));
        assert!(get_embedded("performance-analysis").unwrap().contains("{{language}}"));
        assert!(get_embedded("code-quality-report").unwrap().contains("Risk Assessment"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }
}
