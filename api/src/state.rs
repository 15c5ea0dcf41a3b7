use std::path::Path;
use std::sync::Arc;

use db::repositories::{HistoryRepository, RegistryRepository};
use marker::Assessor;
use marker::awards::AwardWeights;
use tokio::sync::Mutex;
use util::config::AppConfig;
use util::git::RepoSync;
use util::paths::repo_file;

/// Shared state handed to every handler.
///
/// Cheap to clone: everything sits behind an `Arc`. `write_lock` serialises
/// every access to the state repository that starts with a pull, so a
/// reader never pulls into a working tree an upload is halfway through
/// rewriting.
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    assessor: Arc<Assessor>,
    sync: Arc<dyn RepoSync>,
    http: reqwest::Client,
    write_lock: Arc<Mutex<()>>,
    weights: AwardWeights,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        assessor: Assessor,
        sync: Arc<dyn RepoSync>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            config: Arc::new(config),
            assessor: Arc::new(assessor),
            sync,
            http,
            write_lock: Arc::new(Mutex::new(())),
            weights: AwardWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: AwardWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn assessor(&self) -> &Assessor {
        &self.assessor
    }

    pub fn sync(&self) -> &dyn RepoSync {
        self.sync.as_ref()
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn write_lock(&self) -> &Mutex<()> {
        &self.write_lock
    }

    pub fn weights(&self) -> &AwardWeights {
        &self.weights
    }

    pub fn repo_dir(&self) -> &Path {
        Path::new(&self.config.repo.dir)
    }

    pub fn history(&self) -> HistoryRepository {
        HistoryRepository::new(repo_file(self.repo_dir(), &self.config.repo.history_path))
    }

    pub fn registry(&self) -> RegistryRepository {
        RegistryRepository::new(repo_file(self.repo_dir(), &self.config.repo.registry_path))
    }
}
