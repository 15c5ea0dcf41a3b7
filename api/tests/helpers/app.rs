use api::{routes::routes, state::AppState};
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use db::models::{Registry, SubmissionRecord};
use db::repositories::{HistoryRepository, RegistryRepository};
use marker::Assessor;
use marker::error::MarkerError;
use marker::grading::{Evaluation, EvaluationSource, SubScores};
use marker::notebook::Notebook;
use marker::traits::grader::Grader;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;
use util::config::AppConfig;
use util::git::{GitError, PushOutcome, RepoSync};
use util::http::reference_client;
use util::paths::repo_file;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::reference_notebook;

pub const ASSIGNMENT: &str = "Chapter 2";
pub const ROSTER: [&str; 3] = ["Alice", "Bob", "Carol"];

/// Grader returning the same evaluation every time.
pub struct StubGrader {
    pub calls: AtomicUsize,
}

impl StubGrader {
    pub fn evaluation() -> Evaluation {
        Evaluation::from_parts(
            SubScores {
                exploration: 1.5,
                preprocessing: 1.5,
                modeling: 2.0,
                evaluation: 1.5,
                documentation: 1.0,
            },
            "Solid analysis.",
            vec!["Clear plots".to_string()],
            vec!["Tune hyperparameters".to_string()],
            EvaluationSource::Model,
        )
    }
}

#[async_trait]
impl Grader for StubGrader {
    async fn grade(&self, _notebook: &Notebook) -> Result<Evaluation, MarkerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::evaluation())
    }
}

/// Records commit messages instead of talking to a remote.
#[derive(Default)]
pub struct RecordingSync {
    pub pulls: AtomicUsize,
    pub commits: Mutex<Vec<String>>,
    pub fail_push: bool,
}

#[async_trait]
impl RepoSync for RecordingSync {
    async fn pull(&self) -> Result<(), GitError> {
        self.pulls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn commit_and_push(&self, message: &str) -> Result<PushOutcome, GitError> {
        self.commits.lock().unwrap().push(message.to_string());
        if self.fail_push {
            Err(GitError::PushRejected("remote unavailable".into()))
        } else {
            Ok(PushOutcome::Pushed)
        }
    }
}

pub struct TestOptions {
    /// Deadline relative to now.
    pub deadline_in: Duration,
    pub fail_push: bool,
    pub reference_available: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            deadline_in: Duration::days(7),
            fail_push: false,
            reference_available: true,
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub repo: TempDir,
    pub config: AppConfig,
    pub sync: Arc<RecordingSync>,
    pub grader: Arc<StubGrader>,
    pub state: AppState,
    _reference: MockServer,
}

impl TestApp {
    pub fn repo_path(&self, relative: &str) -> PathBuf {
        self.repo.path().join(relative)
    }

    pub fn history(&self) -> HistoryRepository {
        HistoryRepository::new(repo_file(self.repo.path(), &self.config.repo.history_path))
    }

    pub fn registry(&self) -> RegistryRepository {
        RegistryRepository::new(repo_file(self.repo.path(), &self.config.repo.registry_path))
    }

    pub fn commits(&self) -> Vec<String> {
        self.sync.commits.lock().unwrap().clone()
    }

    pub fn seed_history(&self, records: &[SubmissionRecord]) {
        let history = self.history();
        let registry_repo = self.registry();
        let mut registry = registry_repo.load().unwrap();
        for record in records {
            history.append(record).unwrap();
            registry.mark_delivered(&record.submitter, ASSIGNMENT).unwrap();
        }
        registry_repo.save(&registry).unwrap();
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_empty(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap())
            .await
    }
}

pub async fn make_test_app() -> TestApp {
    make_test_app_with(TestOptions::default()).await
}

pub async fn make_test_app_with(options: TestOptions) -> TestApp {
    let repo = util::test_helpers::temp_repo_dir();

    let reference = MockServer::start().await;
    let template = if options.reference_available {
        ResponseTemplate::new(200).set_body_json(reference_notebook())
    } else {
        ResponseTemplate::new(503)
    };
    Mock::given(method("GET"))
        .and(path("/reference.ipynb"))
        .respond_with(template)
        .mount(&reference)
        .await;

    let deadline = (Utc::now() + options.deadline_in).to_rfc3339();
    let vars: HashMap<String, String> = [
        ("ASSIGNMENT_ID", ASSIGNMENT.to_string()),
        ("ASSIGNMENT_DEADLINE", deadline),
        ("REPO_DIR", repo.path().display().to_string()),
        ("REFERENCE_URLS", format!("{}/reference.ipynb", reference.uri())),
        ("REFERENCE_TIMEOUT_SECS", "5".to_string()),
        ("GRADER_API_KEYS", "test-key".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    let config = AppConfig::from_map(&vars).unwrap();

    seed_registry(repo.path(), &config);

    let sync = Arc::new(RecordingSync {
        fail_push: options.fail_push,
        ..RecordingSync::default()
    });
    let grader = Arc::new(StubGrader {
        calls: AtomicUsize::new(0),
    });

    let state = AppState::new(
        config.clone(),
        Assessor::new(grader.clone()),
        sync.clone(),
        reference_client(5).unwrap(),
    );
    let router = Router::new().nest("/api", routes(state.clone()));

    TestApp {
        router,
        repo,
        config,
        sync,
        grader,
        state,
        _reference: reference,
    }
}

fn seed_registry(repo_dir: &Path, config: &AppConfig) {
    let mut registry = Registry::with_names("Name", ROSTER);
    registry.ensure_column(ASSIGNMENT);
    RegistryRepository::new(repo_file(repo_dir, &config.repo.registry_path))
        .save(&registry)
        .unwrap();
}
