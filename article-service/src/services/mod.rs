pub mod generator;
pub mod metrics;
pub mod prompts;
pub mod providers;
pub mod staging;
pub mod storage;

pub use generator::ArticleGenerator;
pub use staging::DownloadStager;
pub use storage::{LocalStorage, MemoryStorage, Storage};
