//! Allow-listed process execution.
//!
//! The gateway only ever launches programs from a fixed allow-list that maps
//! a logical command name to its literal argument vector. Caller-supplied
//! arguments are accepted into the request model but never interpolated into
//! the executed argv, so there is nothing to inject into. Execution happens
//! on a dedicated single-worker task: overlapping submissions queue instead
//! of running in parallel, and blocking on a child never stalls the owner
//! thread.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("the command '{0}' is not allowed")]
    NotWhitelisted(String),

    #[error("IO error executing command: {0}")]
    Io(String),

    #[error("command execution interrupted")]
    Interrupted,
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Fully materialized output of a finished child process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Immutable mapping of logical command names to fixed argument vectors.
pub struct AllowList {
    entries: HashMap<String, Vec<String>>,
}

impl AllowList {
    /// The built-in allow-list: `pwd` and `ls`, both without arguments.
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        entries.insert("pwd".to_string(), vec!["pwd".to_string()]);
        entries.insert("ls".to_string(), vec!["ls".to_string()]);
        Self { entries }
    }

    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace an entry. `argv` must be non-empty.
    pub fn with_entry(mut self, key: &str, argv: &[&str]) -> Self {
        assert!(!argv.is_empty(), "allow-list argv must name a program");
        self.entries
            .insert(key.to_string(), argv.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn resolve(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

struct Job {
    argv: Vec<String>,
    reply: oneshot::Sender<Result<ProcessResult, ExecError>>,
}

/// Runs allow-listed programs on a single background worker.
///
/// Cloning the gateway shares the same worker and allow-list. Must be
/// constructed inside a tokio runtime.
#[derive(Clone)]
pub struct ProcessGateway {
    allow_list: Arc<AllowList>,
    jobs: mpsc::Sender<Job>,
}

impl ProcessGateway {
    pub fn new(allow_list: AllowList) -> Self {
        let (jobs, mut rx) = mpsc::channel::<Job>(16);
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let result = run_argv(&job.argv).await;
                // The submitter may have gone away; nothing to do then.
                let _ = job.reply.send(result);
            }
        });
        Self {
            allow_list: Arc::new(allow_list),
            jobs,
        }
    }

    /// Execute the allow-listed command behind `command_key`.
    ///
    /// `supplied_args` are part of the request model but are deliberately not
    /// interpolated into the executed argv; the allow-list vector is
    /// authoritative.
    pub async fn run(
        &self,
        command_key: &str,
        supplied_args: &[String],
    ) -> Result<ProcessResult, ExecError> {
        let argv = self
            .allow_list
            .resolve(command_key)
            .ok_or_else(|| ExecError::NotWhitelisted(command_key.to_string()))?;

        if !supplied_args.is_empty() {
            log::warn!(
                "ignoring {} caller-supplied argument(s) for '{}'",
                supplied_args.len(),
                command_key
            );
        }

        let (tx, rx) = oneshot::channel();
        self.jobs
            .send(Job {
                argv: argv.to_vec(),
                reply: tx,
            })
            .await
            .map_err(|_| ExecError::Interrupted)?;

        rx.await.map_err(|_| ExecError::Interrupted)?
    }
}

/// Launch `argv` with no shell interpretation and capture its output to
/// completion.
async fn run_argv(argv: &[String]) -> Result<ProcessResult, ExecError> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| ExecError::Io("empty argument vector".to_string()))?;

    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ExecError::Io(e.to_string()))?;

    Ok(ProcessResult {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        // Terminated by signal: no exit code to report.
        exit_code: output.status.code().unwrap_or(-1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unlisted_command_is_rejected() {
        let gateway = ProcessGateway::new(AllowList::builtin());
        let err = gateway
            .run("rm", &["-rf".to_string(), "/".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::NotWhitelisted(ref key) if key == "rm"));
    }

    #[tokio::test]
    async fn pwd_round_trips_the_working_directory() {
        let gateway = ProcessGateway::new(AllowList::builtin());
        let result = gateway.run("pwd", &[]).await.unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(
            result.stdout.trim(),
            std::env::current_dir().unwrap().to_str().unwrap()
        );
        assert!(result.stderr.is_empty());
    }

    #[tokio::test]
    async fn supplied_args_are_not_interpolated() {
        let gateway = ProcessGateway::new(AllowList::builtin());
        // If "--bogus-flag" reached the child, pwd would exit non-zero.
        let result = gateway
            .run("pwd", &["--bogus-flag".to_string()])
            .await
            .unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(
            result.stdout.trim(),
            std::env::current_dir().unwrap().to_str().unwrap()
        );
    }

    #[tokio::test]
    async fn missing_binary_reports_io_failure() {
        let allow_list =
            AllowList::empty().with_entry("ghost", &["/nonexistent/definitely-not-a-binary"]);
        let gateway = ProcessGateway::new(allow_list);
        let err = gateway.run("ghost", &[]).await.unwrap_err();
        assert!(matches!(err, ExecError::Io(_)));
    }

    #[tokio::test]
    async fn nonzero_exit_is_reported_not_an_error() {
        let allow_list = AllowList::empty().with_entry("false", &["false"]);
        let gateway = ProcessGateway::new(allow_list);
        let result = gateway.run("false", &[]).await.unwrap();
        assert_ne!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn overlapping_calls_complete_independently() {
        let gateway = ProcessGateway::new(AllowList::builtin());

        let a = {
            let gateway = gateway.clone();
            tokio::spawn(async move { gateway.run("ls", &[]).await })
        };
        let b = {
            let gateway = gateway.clone();
            tokio::spawn(async move { gateway.run("ls", &[]).await })
        };

        let first = a.await.unwrap().unwrap();
        let second = b.await.unwrap().unwrap();

        assert_eq!(first.exit_code, 0);
        assert_eq!(second.exit_code, 0);
        // Same directory, same listing, no interleaving between the calls.
        assert_eq!(first.stdout, second.stdout);
    }

    #[test]
    fn builtin_allow_list_contents() {
        let allow_list = AllowList::builtin();
        assert_eq!(allow_list.resolve("pwd"), Some(&["pwd".to_string()][..]));
        assert_eq!(allow_list.resolve("ls"), Some(&["ls".to_string()][..]));
        assert!(!allow_list.contains("rm"));
        assert!(!allow_list.contains("sh"));
    }
}
