//! External assistant invocation
//!
//! Locates the assistant executable and runs it as a bounded child process.
//! Every call is independent: the environment is rebuilt and the executable
//! re-resolved each time.

mod error;
pub mod invoker;
pub mod resolver;

pub use error::InvokeError;
pub use invoker::{AssistantInvoker, CliInvoker, InvokeRequest, ProcessResult};
pub use resolver::{ExecutableResolver, augmented_search_path, find_in_path, is_executable};
