pub mod history_repository;
pub mod registry_repository;

pub use history_repository::HistoryRepository;
pub use registry_repository::RegistryRepository;
