//! AssistantInvoker trait and the CLI-backed implementation

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::InvokeError;
use super::resolver::{ExecutableResolver, augmented_search_path};
use crate::config::AssistantConfig;

/// One run of the assistant executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    /// Arguments, excluding the executable itself
    pub args: Vec<String>,

    /// Working directory; `None` means the user's home directory
    pub working_dir: Option<PathBuf>,

    /// Wall-clock budget for the child process
    pub timeout: Duration,
}

impl InvokeRequest {
    pub fn new(args: Vec<String>, timeout: Duration) -> Self {
        Self {
            args,
            working_dir: None,
            timeout,
        }
    }

    /// `--prompt <text>`
    pub fn prompt(prompt: impl Into<String>, timeout: Duration) -> Self {
        Self::new(vec!["--prompt".to_string(), prompt.into()], timeout)
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

/// Captured outcome of a child process that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs the external assistant
///
/// Implementations return `Ok` for every process that ran, whatever its exit
/// code. Only resolution failures, timeouts and launch errors are `Err`.
#[async_trait]
pub trait AssistantInvoker: Send + Sync {
    async fn invoke(&self, request: InvokeRequest) -> Result<ProcessResult, InvokeError>;
}

/// Invokes the assistant as a child process
#[derive(Debug, Clone)]
pub struct CliInvoker {
    resolver: ExecutableResolver,
    default_working_dir: PathBuf,
}

impl CliInvoker {
    pub fn new(resolver: ExecutableResolver, default_working_dir: PathBuf) -> Self {
        debug!(?default_working_dir, "CliInvoker::new: called");
        Self {
            resolver,
            default_working_dir,
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        debug!(executable = %config.executable_name, "CliInvoker::from_config: called");
        let resolver = ExecutableResolver::new(&config.executable_name, config.expanded_search_paths());
        Self::new(resolver, config.default_working_dir.clone())
    }

    pub fn resolver(&self) -> &ExecutableResolver {
        &self.resolver
    }

    /// PATH for the child: search directories prepended to the ambient PATH
    ///
    /// `None` when there is no directory to search; the child then runs
    /// without PATH.
    pub fn search_path(&self) -> Result<Option<OsString>, InvokeError> {
        augmented_search_path(self.resolver.search_dirs(), std::env::var_os("PATH").as_deref())
    }

    /// Resolve the executable the next invocation would run
    pub fn resolve(&self) -> Result<PathBuf, InvokeError> {
        let search_path = self.search_path()?;
        self.resolver
            .resolve(std::env::var_os("PATH").as_deref(), search_path.as_deref())
    }

    /// Requested directory, else home, else the configured fallback
    fn working_dir(&self, requested: Option<&Path>) -> PathBuf {
        if let Some(dir) = requested {
            return dir.to_path_buf();
        }
        match dirs::home_dir() {
            Some(home) if home.exists() => home,
            _ => {
                debug!(fallback = ?self.default_working_dir, "CliInvoker::working_dir: home missing");
                self.default_working_dir.clone()
            }
        }
    }
}

#[async_trait]
impl AssistantInvoker for CliInvoker {
    async fn invoke(&self, request: InvokeRequest) -> Result<ProcessResult, InvokeError> {
        debug!(arg_count = request.args.len(), timeout = ?request.timeout, "CliInvoker::invoke: called");
        let search_path = self.search_path()?;
        let executable = match self
            .resolver
            .resolve(std::env::var_os("PATH").as_deref(), search_path.as_deref())
        {
            Ok(path) => path,
            Err(e) => {
                error!("{}", e);
                error!(
                    "Current PATH: {}",
                    search_path.as_deref().map(OsStr::to_string_lossy).unwrap_or_default()
                );
                return Err(e);
            }
        };
        let working_dir = self.working_dir(request.working_dir.as_deref());

        info!(
            "Executing assistant command: {} {}... (truncated for security)",
            executable.display(),
            request.args.first().map(String::as_str).unwrap_or("")
        );
        info!("Working directory: {}", working_dir.display());

        let mut command = tokio::process::Command::new(&executable);
        command
            .args(&request.args)
            .current_dir(&working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        match &search_path {
            Some(path) => command.env("PATH", path),
            None => command.env_remove("PATH"),
        };

        let output = match tokio::time::timeout(request.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                error!(error = %source, path = %executable.display(), "CliInvoker::invoke: launch failed");
                return Err(InvokeError::Spawn {
                    path: executable,
                    source,
                });
            }
            Err(_) => {
                error!("Assistant command timed out after {} seconds", request.timeout.as_secs());
                return Err(InvokeError::Timeout {
                    timeout: request.timeout,
                });
            }
        };

        let result = ProcessResult {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        info!("Assistant command completed with return code: {:?}", result.exit_code);
        if !result.success() && !result.stderr.is_empty() {
            let preview: String = result.stderr.chars().take(200).collect();
            warn!("Assistant stderr: {}...", preview);
        }

        Ok(result)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::{TempDir, tempdir};

    fn fake_assistant(body: &str) -> (TempDir, CliInvoker) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gemini");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        let resolver = ExecutableResolver::new("gemini", vec![dir.path().to_path_buf()]);
        let invoker = CliInvoker::new(resolver, std::env::temp_dir());
        (dir, invoker)
    }

    #[test]
    fn test_prompt_request_args() {
        let req = InvokeRequest::prompt("hello", Duration::from_secs(5)).with_arg("--all_files");
        assert_eq!(req.args, vec!["--prompt", "hello", "--all_files"]);
        assert!(req.working_dir.is_none());
    }

    #[test]
    fn test_process_result_success() {
        let ok = ProcessResult {
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        };
        let signalled = ProcessResult { exit_code: None, ..ok.clone() };
        let failed = ProcessResult {
            exit_code: Some(2),
            ..ok.clone()
        };

        assert!(ok.success());
        assert!(!signalled.success());
        assert!(!failed.success());
    }

    #[tokio::test]
    async fn test_invoke_captures_stdout() {
        let (_dir, invoker) = fake_assistant("echo \"args: $@\"");

        let result = invoker
            .invoke(InvokeRequest::prompt("ping", Duration::from_secs(10)))
            .await
            .unwrap();

        assert!(result.success());
        assert!(result.stdout.contains("args: --prompt ping"));
    }

    #[tokio::test]
    async fn test_invoke_nonzero_exit_is_not_an_error() {
        let (_dir, invoker) = fake_assistant("echo boom >&2\nexit 3");

        let result = invoker
            .invoke(InvokeRequest::new(vec![], Duration::from_secs(10)))
            .await
            .unwrap();

        assert_eq!(result.exit_code, Some(3));
        assert!(result.stderr.contains("boom"));
    }

    #[tokio::test]
    async fn test_invoke_timeout() {
        let (_dir, invoker) = fake_assistant("sleep 5");

        let err = invoker
            .invoke(InvokeRequest::new(vec![], Duration::from_millis(200)))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_invoke_uses_working_dir() {
        let (_dir, invoker) = fake_assistant("pwd");
        let work = tempdir().unwrap();

        let result = invoker
            .invoke(InvokeRequest::new(vec![], Duration::from_secs(10)).with_working_dir(work.path()))
            .await
            .unwrap();

        let reported = PathBuf::from(result.stdout.trim());
        assert_eq!(reported.canonicalize().unwrap(), work.path().canonicalize().unwrap());
    }

    #[tokio::test]
    async fn test_invoke_child_sees_search_dirs_on_path() {
        let (dir, invoker) = fake_assistant("echo \"$PATH\"");

        let result = invoker
            .invoke(InvokeRequest::new(vec![], Duration::from_secs(10)))
            .await
            .unwrap();

        let first = result.stdout.trim().split(':').next().unwrap().to_string();
        assert_eq!(PathBuf::from(first), dir.path().to_path_buf());
    }

    #[tokio::test]
    async fn test_invoke_not_found() {
        let empty = tempdir().unwrap();
        let resolver = ExecutableResolver::new("gqa-missing-assistant", vec![empty.path().to_path_buf()]);
        let invoker = CliInvoker::new(resolver, std::env::temp_dir());

        let err = invoker
            .invoke(InvokeRequest::prompt("ping", Duration::from_secs(1)))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_mock_invoker_records_requests() {
        let mock = mock::MockInvoker::succeeding("done");

        let result = mock
            .invoke(InvokeRequest::prompt("review this", Duration::from_secs(1)))
            .await
            .unwrap();

        assert_eq!(result.stdout, "done");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.prompt(0).as_deref(), Some("review this"));
    }
}
