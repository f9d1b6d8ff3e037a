#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to read registry store (path: {path}): {source}", path = path.display())]
    StorageRead {
        path: std::path::PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to write registry store (path: {path}): {source}", path = path.display())]
    StorageWrite {
        path: std::path::PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to read form file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write form file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("translation error: {0}")]
    Translation(String),
}

impl RegistryError {
    pub(crate) fn storage_read(
        path: &std::path::Path,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        RegistryError::StorageRead {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    pub(crate) fn storage_write(
        path: &std::path::Path,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        RegistryError::StorageWrite {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
