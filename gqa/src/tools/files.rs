//! Filesystem helpers shared by the QA tools

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use super::ToolError;
use crate::config::ReportConfig;
use crate::prompts::KeyFile;

/// Source extensions expanded when auditing a directory, in order
pub const AUDIT_EXTENSIONS: &[&str] = &["js", "py", "ts", "jsx", "tsx", "java", "php", "rb", "go"];

/// Directory names skipped by the project structure walk
pub const EXCLUDED_DIRS: &[&str] = &[".git", "node_modules", "__pycache__", ".venv", "venv", "build", "dist"];

/// Manifest file names quoted in quality reports, in order
pub const KEY_FILE_NAMES: &[&str] = &["package.json", "requirements.txt", "pom.xml", "Cargo.toml", "go.mod"];

/// Documentation extension considered after the manifests
pub const DOC_EXTENSION: &str = "md";

/// Read a file as UTF-8
///
/// `kind` names the file in the not-found message ("File", "Source file").
pub async fn read_source(path: &Path, kind: &'static str) -> Result<String, ToolError> {
    debug!(?path, "read_source: called");
    if !path.is_file() {
        return Err(ToolError::NotFound {
            kind,
            path: path.display().to_string(),
        });
    }

    let bytes = tokio::fs::read(path).await?;
    String::from_utf8(bytes).map_err(|_| ToolError::Decode {
        path: path.display().to_string(),
    })
}

/// Name of the generated test file for a source file
///
/// `.js/.ts/.jsx/.tsx` → `<base>.test<ext>`, `.py` → `test_<base>.py`,
/// `.java` → `<base>Test.java`, anything else → `<base>_test<ext>`.
pub fn test_file_name(source: &Path) -> String {
    let base = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = source.extension().and_then(OsStr::to_str);

    match ext {
        Some(ext @ ("js" | "ts" | "jsx" | "tsx")) => format!("{}.test.{}", base, ext),
        Some("py") => format!("test_{}.py", base),
        Some("java") => format!("{}Test.java", base),
        Some(ext) => format!("{}_test.{}", base, ext),
        None => format!("{}_test", base),
    }
}

/// Hidden entries below the walk root (`.git`, `.cache`, dotfiles)
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().as_encoded_bytes().starts_with(b".")
}

/// Regular files under `root`, depth-first in file name order, skipping hidden entries
fn visible_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(%err, "visible_files: skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.path().is_file())
        .map(DirEntry::into_path)
        .collect()
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension() == Some(OsStr::new(ext))
}

/// Source files to audit under a directory
///
/// Extensions are expanded in `AUDIT_EXTENSIONS` order, so a cap keeps
/// earlier extensions first.
pub fn collect_audit_files(root: &Path, max_files: usize) -> Vec<PathBuf> {
    debug!(?root, max_files, "collect_audit_files: called");
    let all = visible_files(root);
    let files: Vec<PathBuf> = AUDIT_EXTENSIONS
        .iter()
        .flat_map(|ext| all.iter().filter(move |p| has_extension(p, ext)))
        .take(max_files)
        .cloned()
        .collect();
    debug!(count = files.len(), "collect_audit_files: done");
    files
}

fn is_excluded(name: &OsStr) -> bool {
    name.to_str().map(|n| EXCLUDED_DIRS.contains(&n)).unwrap_or(false)
}

/// Indented listing of the project tree
///
/// Each directory line is followed by up to `max_files_per_dir` of its files.
/// Once more than `max_structure_entries` files are listed the walk stops
/// with a truncation marker, and the listing is capped at that many lines.
pub fn project_structure(root: &Path, limits: &ReportConfig) -> String {
    debug!(?root, "project_structure: called");
    let walker = WalkDir::new(root)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(e.file_type().is_dir() && is_excluded(e.file_name())));

    let mut lines = Vec::new();
    let mut file_count = 0;
    let mut files_in_dir = 0;
    let mut current_dir_depth: Option<usize> = None;
    let mut truncated = false;

    for entry in walker.filter_map(|e| e.ok()) {
        let depth = entry.depth();
        if entry.file_type().is_dir() {
            if let Some(dir_depth) = current_dir_depth
                && file_count > limits.max_structure_entries
            {
                lines.push(format!("{}... (truncated)", "  ".repeat(dir_depth + 1)));
                truncated = true;
                break;
            }
            let name = if depth == 0 {
                root.file_name().unwrap_or(root.as_os_str()).to_string_lossy().to_string()
            } else {
                entry.file_name().to_string_lossy().to_string()
            };
            lines.push(format!("{}{}/", "  ".repeat(depth), name));
            current_dir_depth = Some(depth);
            files_in_dir = 0;
        } else if files_in_dir < limits.max_files_per_dir {
            lines.push(format!("{}{}", "  ".repeat(depth), entry.file_name().to_string_lossy()));
            files_in_dir += 1;
            file_count += 1;
        }
    }

    if !truncated
        && let Some(dir_depth) = current_dir_depth
        && file_count > limits.max_structure_entries
    {
        lines.push(format!("{}... (truncated)", "  ".repeat(dir_depth + 1)));
    }

    lines.truncate(limits.max_structure_entries);
    lines.join("\n")
}

/// Manifest and documentation files quoted in the quality report
///
/// Unreadable or non-UTF-8 files are skipped but still count toward the cap.
pub fn key_files(root: &Path, limits: &ReportConfig) -> Vec<KeyFile> {
    debug!(?root, "key_files: called");
    let all = visible_files(root);
    let manifests = KEY_FILE_NAMES
        .iter()
        .flat_map(|name| all.iter().filter(move |p| p.file_name() == Some(OsStr::new(name))));
    let docs = all.iter().filter(|p| has_extension(p, DOC_EXTENSION));

    manifests
        .chain(docs)
        .take(limits.max_key_files)
        .filter_map(|path| match std::fs::read_to_string(path) {
            Ok(content) => Some(KeyFile {
                path: path.display().to_string(),
                content: content.chars().take(limits.max_key_file_chars).collect(),
            }),
            Err(e) => {
                debug!(?path, %e, "key_files: skipping unreadable file");
                None
            }
        })
        .collect()
}
