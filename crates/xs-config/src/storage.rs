use std::env;
use std::path::PathBuf;

/// Where avatar uploads land and how they are addressed publicly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    pub base_dir: PathBuf,
    pub base_url: String,
    pub max_file_size: usize,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            base_dir: env::var("FILE_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("storage/uploads")),
            base_url: env::var("FILE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/files".to_string()),
            max_file_size: crate::env_or("FILE_MAX_SIZE_BYTES", 5 * 1024 * 1024),
        }
    }
}
