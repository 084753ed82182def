//! Executable discovery
//!
//! The assistant is often installed in a user-local package directory that
//! is missing from PATH when the server is launched by a GUI host that never
//! sources a login profile. Discovery therefore walks an ordered list of
//! candidate directories before falling back to PATH lookups.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use nix::unistd::{AccessFlags, access};
use tracing::debug;

use super::InvokeError;

/// Prepend candidate directories to a PATH value
///
/// Directories already present are skipped, so applying this twice yields
/// the same value. Candidates keep their configured order and are never
/// duplicated. Empty entries in `current` are dropped. Returns `None` when
/// there is no directory at all, since an empty PATH would still name the
/// current directory.
pub fn augmented_search_path(
    candidates: &[PathBuf],
    current: Option<&OsStr>,
) -> Result<Option<OsString>, InvokeError> {
    debug!(candidate_count = candidates.len(), "augmented_search_path: called");
    let existing: Vec<PathBuf> = current
        .map(|p| std::env::split_paths(p).filter(|e| !e.as_os_str().is_empty()).collect())
        .unwrap_or_default();

    let mut prepend: Vec<PathBuf> = Vec::new();
    for dir in candidates {
        if dir.as_os_str().is_empty() || existing.contains(dir) || prepend.contains(dir) {
            continue;
        }
        prepend.push(dir.clone());
    }
    debug!(prepended = prepend.len(), "augmented_search_path: prepending directories");

    if prepend.is_empty() && existing.is_empty() {
        return Ok(None);
    }
    Ok(Some(std::env::join_paths(prepend.iter().chain(existing.iter()))?))
}

/// Whether a path is a regular file the current user may execute
pub fn is_executable(path: &Path) -> bool {
    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}

/// Look up an executable by name in a PATH value
pub fn find_in_path(name: &str, search_path: &OsStr) -> Option<PathBuf> {
    debug!(%name, "find_in_path: called");
    std::env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

/// Resolves the assistant executable from configured locations
#[derive(Debug, Clone)]
pub struct ExecutableResolver {
    executable_name: String,
    search_dirs: Vec<PathBuf>,
}

impl ExecutableResolver {
    pub fn new(executable_name: impl Into<String>, search_dirs: Vec<PathBuf>) -> Self {
        let executable_name = executable_name.into();
        debug!(%executable_name, ?search_dirs, "ExecutableResolver::new: called");
        Self {
            executable_name,
            search_dirs,
        }
    }

    pub fn executable_name(&self) -> &str {
        &self.executable_name
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Candidate locations in priority order
    ///
    /// An executable name containing a path separator is taken as a direct
    /// path and is the only candidate.
    pub fn candidates(&self) -> Vec<PathBuf> {
        if self.is_direct_path() {
            return vec![PathBuf::from(&self.executable_name)];
        }
        self.search_dirs.iter().map(|dir| dir.join(&self.executable_name)).collect()
    }

    fn is_direct_path(&self) -> bool {
        Path::new(&self.executable_name).components().count() > 1
    }

    /// Resolve the executable
    ///
    /// Order: configured candidates, then the ambient PATH, then the
    /// augmented PATH. The first existing and executable file wins.
    pub fn resolve(&self, ambient_path: Option<&OsStr>, augmented_path: Option<&OsStr>) -> Result<PathBuf, InvokeError> {
        debug!(name = %self.executable_name, "ExecutableResolver::resolve: called");
        let candidates = self.candidates();

        if let Some(found) = candidates.iter().find(|c| is_executable(c)) {
            debug!(?found, "ExecutableResolver::resolve: matched configured candidate");
            return Ok(found.clone());
        }

        let is_bare_name = !self.is_direct_path();
        if is_bare_name {
            if let Some(path) = ambient_path
                && let Some(found) = find_in_path(&self.executable_name, path)
            {
                debug!(?found, "ExecutableResolver::resolve: matched ambient PATH");
                return Ok(found);
            }

            if let Some(path) = augmented_path
                && let Some(found) = find_in_path(&self.executable_name, path)
            {
                debug!(?found, "ExecutableResolver::resolve: matched augmented PATH");
                return Ok(found);
            }
        }

        debug!("ExecutableResolver::resolve: no candidate matched");
        let mut searched: Vec<String> = candidates.iter().map(|c| c.display().to_string()).collect();
        if is_bare_name {
            searched.push("$PATH".to_string());
        }
        Err(InvokeError::NotFound {
            name: self.executable_name.clone(),
            searched: searched.join(", "),
        })
    }
}
