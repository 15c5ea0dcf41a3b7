//! Application configuration loaded from environment variables.
//!
//! `AppConfig` is read once at start-up (after loading `.env` through `dotenvy`)
//! and split into one section per component. Each section is handed to the
//! component that needs it at construction time, so the classifier, the
//! grader, the storage layer and the git synchroniser can all be built in
//! tests from synthetic values without touching the process environment.

use chrono::{DateTime, FixedOffset, Utc};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::str::FromStr;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// HTTP server and logging settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub env: String,
    pub project_name: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
}

/// The assignment currently accepting submissions.
#[derive(Debug, Clone)]
pub struct AssignmentConfig {
    /// Identifier written into every history row, e.g. `Chapter 2`.
    pub id: String,
    /// Column of the registry holding delivery and award markers.
    pub column: String,
    /// Folder name used under `uploads/` and `solutions/`.
    pub folder: String,
    pub deadline: DateTime<FixedOffset>,
    /// Filename prefix before the assignment number (`cap` in `cap2-alice.zip`).
    pub filename_prefix: String,
    /// Exercise statement embedded in the grading prompt. `None` uses the built-in one.
    pub exercise_statement: Option<String>,
}

impl AssignmentConfig {
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline.with_timezone(&Utc)
    }
}

/// Location of the shared state repository and the tables inside it.
#[derive(Debug, Clone)]
pub struct RepoConfig {
    /// Remote URL. Empty means local-only mode: nothing is pulled or pushed.
    pub url: String,
    pub dir: String,
    pub branch: String,
    pub token: String,
    pub user_name: String,
    pub user_email: String,
    /// Registry (roster + status table), relative to `dir`.
    pub registry_path: String,
    /// Submission history, relative to `dir`.
    pub history_path: String,
}

impl RepoConfig {
    pub fn is_remote(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Candidate URLs for the reference notebook, tried in order.
#[derive(Debug, Clone)]
pub struct ReferenceConfig {
    pub urls: Vec<String>,
    pub timeout_secs: u64,
}

/// Hosted language model used to grade notebooks.
#[derive(Debug, Clone)]
pub struct GraderConfig {
    /// Keys tried in order; the next one is used when a key is rejected or exhausted.
    pub api_keys: Vec<String>,
    pub endpoint: String,
    pub model: String,
    pub max_attempts: u32,
    /// Base wait after a rate-limit reply; attempt `n` waits `n * backoff_secs`.
    pub backoff_secs: u64,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Bounds applied when opening uploaded archives.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveLimits {
    pub max_uncompressed_size: u64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_uncompressed_size: 100_000_000,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub assignment: AssignmentConfig,
    pub repo: RepoConfig,
    pub reference: ReferenceConfig,
    pub grader: GraderConfig,
    pub archive: ArchiveLimits,
}

pub const DEFAULT_GRADER_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_GRADER_MODEL: &str = "llama-3.3-70b-versatile";

impl AppConfig {
    /// Loads `.env` (if present) and reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an explicit key/value map.
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| values.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup: &lookup };

        let server = ServerConfig {
            env: vars.or("APP_ENV", "development"),
            project_name: vars.or("PROJECT_NAME", "notebook-portal"),
            host: vars.or("HOST", "127.0.0.1"),
            port: vars.parse("PORT", 3000)?,
            log_level: vars.or("LOG_LEVEL", "api=info,marker=info,util=info,db=info"),
            log_file: vars.or("LOG_FILE", "api.log"),
            log_to_stdout: vars.or("LOG_TO_STDOUT", "false") == "true",
        };

        let assignment_id = vars.required("ASSIGNMENT_ID")?;
        let deadline_raw = vars.required("ASSIGNMENT_DEADLINE")?;
        let deadline = DateTime::parse_from_rfc3339(&deadline_raw).map_err(|e| {
            ConfigError::Invalid {
                key: "ASSIGNMENT_DEADLINE",
                value: deadline_raw.clone(),
                reason: e.to_string(),
            }
        })?;

        let exercise_statement = match vars.get("EXERCISE_STATEMENT_PATH") {
            Some(path) => Some(fs::read_to_string(&path).map_err(|e| ConfigError::Invalid {
                key: "EXERCISE_STATEMENT_PATH",
                value: path.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };

        let assignment = AssignmentConfig {
            column: vars.or("ASSIGNMENT_COLUMN", &assignment_id),
            folder: vars.or("ASSIGNMENT_FOLDER", &folder_slug(&assignment_id)),
            id: assignment_id,
            deadline,
            filename_prefix: vars.or("FILENAME_PREFIX", "cap"),
            exercise_statement,
        };

        let repo = RepoConfig {
            url: vars.or("REPO_URL", ""),
            dir: vars.or("REPO_DIR", "repo_state"),
            branch: vars.or("REPO_BRANCH", "main"),
            token: vars.or("GITHUB_TOKEN", ""),
            user_name: vars.or("GIT_USER_NAME", "Portal Bot"),
            user_email: vars.or("GIT_USER_EMAIL", "bot@portal.local"),
            registry_path: vars.or("REGISTRY_PATH", "uploads/submission_registry.csv"),
            history_path: vars.or("HISTORY_PATH", "evaluations/submission_history.csv"),
        };

        let reference = ReferenceConfig {
            urls: split_list(&vars.or("REFERENCE_URLS", "")),
            timeout_secs: vars.parse("REFERENCE_TIMEOUT_SECS", 30)?,
        };

        let mut api_keys = split_list(&vars.or("GRADER_API_KEYS", ""));
        if api_keys.is_empty() {
            api_keys = ["GROQ_API_KEY", "GROQ_API_KEY_2"]
                .iter()
                .filter_map(|key| vars.get(key))
                .collect();
        }

        let grader = GraderConfig {
            api_keys,
            endpoint: vars.or("GRADER_ENDPOINT", DEFAULT_GRADER_ENDPOINT),
            model: vars.or("GRADER_MODEL", DEFAULT_GRADER_MODEL),
            max_attempts: vars.parse("GRADER_MAX_ATTEMPTS", 3)?,
            backoff_secs: vars.parse("GRADER_BACKOFF_SECS", 30)?,
            timeout_secs: vars.parse("GRADER_TIMEOUT_SECS", 60)?,
            temperature: vars.parse("GRADER_TEMPERATURE", 0.1)?,
            max_tokens: vars.parse("GRADER_MAX_TOKENS", 1000)?,
        };

        let archive = ArchiveLimits {
            max_uncompressed_size: vars.parse(
                "MAX_UNCOMPRESSED_SIZE",
                ArchiveLimits::default().max_uncompressed_size,
            )?,
        };

        Ok(Self {
            server,
            assignment,
            repo,
            reference,
            grader,
            archive,
        })
    }
}

struct Vars<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl Vars<'_> {
    /// Non-empty value of `key`, if any.
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn parse<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `Chapter 2` → `chapter_2`.
fn folder_slug(id: &str) -> String {
    id.trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
