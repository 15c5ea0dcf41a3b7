//! Synchronisation of the state repository with its remote.
//!
//! Policy: pull before reading, commit and push after writing. Conflicts are
//! resolved in favour of whoever pushes last:
//! - a failed pull falls back to `fetch` + `reset --hard origin/<branch>`;
//! - a rejected push is retried once as `fetch` + `push --force`.
//!
//! Nothing is merged.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

use crate::config::RepoConfig;

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("git i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("git {args} failed: {stderr}")]
    Command { args: String, stderr: String },

    #[error("push rejected after forced retry: {0}")]
    PushRejected(String),
}

/// Result of a commit-and-push cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The working tree had no changes; nothing was committed or pushed.
    NothingToCommit,
    Pushed,
    /// The first push was rejected and the forced retry went through.
    ForcePushed,
    /// No remote is configured.
    LocalOnly,
}

/// Keeps the on-disk state repository in step with its remote.
#[async_trait]
pub trait RepoSync: Send + Sync {
    /// Brings the working tree up to date with the remote.
    async fn pull(&self) -> Result<(), GitError>;

    /// Stages everything, commits with `message` and pushes.
    async fn commit_and_push(&self, message: &str) -> Result<PushOutcome, GitError>;
}

/// Used when no remote is configured: the repository directory is plain local storage.
pub struct LocalOnly;

#[async_trait]
impl RepoSync for LocalOnly {
    async fn pull(&self) -> Result<(), GitError> {
        Ok(())
    }

    async fn commit_and_push(&self, _message: &str) -> Result<PushOutcome, GitError> {
        Ok(PushOutcome::LocalOnly)
    }
}

/// `git` CLI backed repository.
pub struct GitRepo {
    config: RepoConfig,
    dir: PathBuf,
}

impl GitRepo {
    pub fn new(config: RepoConfig) -> Self {
        let dir = PathBuf::from(&config.dir);
        Self { config, dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Clones the remote when the working directory does not exist yet and
    /// makes sure a commit identity is configured.
    pub async fn ensure_cloned(&self) -> Result<(), GitError> {
        if !self.dir.join(".git").exists() {
            tracing::info!(dir = %self.dir.display(), url = %self.config.url, "cloning state repository");
            let output = Command::new("git")
                .env("GIT_TERMINAL_PROMPT", "0")
                .arg("clone")
                .arg("--depth")
                .arg("1")
                .arg("--branch")
                .arg(&self.config.branch)
                .arg(self.authenticated_url())
                .arg(&self.dir)
                .output()
                .await?;
            // The token must not leak into logs or errors.
            check(output, "clone").map_err(|e| self.redact(e))?;
        }

        if self.git(&["config", "user.email"]).await?.status.success() {
            return Ok(());
        }
        self.git_checked(&["config", "user.name", &self.config.user_name]).await?;
        self.git_checked(&["config", "user.email", &self.config.user_email]).await?;
        Ok(())
    }

    fn authenticated_url(&self) -> String {
        let token = self.config.token.trim();
        match self.config.url.strip_prefix("https://") {
            Some(rest) if !token.is_empty() => format!("https://{token}@{rest}"),
            _ => self.config.url.clone(),
        }
    }

    fn redact(&self, err: GitError) -> GitError {
        let token = self.config.token.trim();
        if token.is_empty() {
            return err;
        }
        match err {
            GitError::Command { args, stderr } => GitError::Command {
                args,
                stderr: stderr.replace(token, "***"),
            },
            other => other,
        }
    }

    async fn git(&self, args: &[&str]) -> Result<Output, GitError> {
        Ok(Command::new("git")
            .env("GIT_TERMINAL_PROMPT", "0")
            .arg("-C")
            .arg(&self.dir)
            .args(args)
            .output()
            .await?)
    }

    async fn git_checked(&self, args: &[&str]) -> Result<Output, GitError> {
        let output = self.git(args).await?;
        check(output, &args.join(" ")).map_err(|e| self.redact(e))
    }
}

fn check(output: Output, args: &str) -> Result<Output, GitError> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(GitError::Command {
            args: args.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[async_trait]
impl RepoSync for GitRepo {
    async fn pull(&self) -> Result<(), GitError> {
        let branch = self.config.branch.as_str();
        match self.git_checked(&["pull", "--no-rebase", "origin", branch]).await {
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::warn!(error = %err, "pull failed, resetting to remote");
                let remote_ref = format!("origin/{branch}");
                let reset = async {
                    self.git_checked(&["fetch", "origin", branch]).await?;
                    self.git_checked(&["reset", "--hard", &remote_ref]).await
                };
                if let Err(reset_err) = reset.await {
                    // The local tree is still usable; keep going with what we have.
                    tracing::warn!(error = %reset_err, "reset to remote failed");
                }
                Ok(())
            }
        }
    }

    async fn commit_and_push(&self, message: &str) -> Result<PushOutcome, GitError> {
        let branch = self.config.branch.as_str();

        self.git_checked(&["add", "-A"]).await?;

        // Exit status 1 means the index differs from HEAD.
        let staged = self.git(&["diff", "--cached", "--quiet"]).await?;
        if staged.status.success() {
            tracing::info!("no changes to commit");
            return Ok(PushOutcome::NothingToCommit);
        }

        self.git_checked(&["commit", "-m", message]).await?;
        tracing::info!(message, "commit created");

        match self.git_checked(&["push", "origin", branch]).await {
            Ok(_) => {
                tracing::info!("push completed");
                Ok(PushOutcome::Pushed)
            }
            Err(push_err) => {
                tracing::error!(error = %push_err, "push rejected, retrying with force");
                let retry = async {
                    self.git_checked(&["fetch", "origin", branch]).await?;
                    self.git_checked(&["push", "--force", "origin", branch]).await
                };
                match retry.await {
                    Ok(_) => {
                        tracing::info!("forced push completed");
                        Ok(PushOutcome::ForcePushed)
                    }
                    Err(retry_err) => {
                        tracing::error!(error = %retry_err, "forced push failed");
                        Err(GitError::PushRejected(retry_err.to_string()))
                    }
                }
            }
        }
    }
}

/// Builds the synchroniser for a repository configuration.
pub async fn connect(config: &RepoConfig) -> Result<Box<dyn RepoSync>, GitError> {
    if !config.is_remote() {
        tracing::info!(dir = %config.dir, "no remote configured, running local-only");
        std::fs::create_dir_all(&config.dir)?;
        return Ok(Box::new(LocalOnly));
    }
    let repo = GitRepo::new(config.clone());
    repo.ensure_cloned().await?;
    Ok(Box::new(repo))
}
