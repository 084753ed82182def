//! Built-in QA tools

mod ask_gemini;
mod code_quality_report;
mod performance_analysis;
mod review_code;
mod security_audit;

pub use ask_gemini::AskGeminiTool;
pub use code_quality_report::CodeQualityReportTool;
pub use generate_tests::GenerateTestsTool;
pub use performance_analysis::PerformanceAnalysisTool;
pub use review_code::ReviewCodeTool;
pub use security_audit::SecurityAuditTool;
