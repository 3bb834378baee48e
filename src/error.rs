use thiserror::Error;

pub type AppResult<T> = Result<T, PluginError>;

/// Failure of a lifecycle operation (enable, reload)
#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Infra(#[from] InfraError),
}

#[derive(Debug, Error)]
pub enum ConfigErrorKind {
    #[error("failed to read file: {0}")]
    Read(std::io::Error),

    #[error("failed to write file: {0}")]
    Write(std::io::Error),

    #[error("failed to parse file: {0}")]
    Parse(serde_yaml::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(serde_yaml::Error),

    #[error("failed to parse settings: {0}")]
    Settings(toml::de::Error),

    #[error("top-level document is not a mapping")]
    NotAMapping,
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: std::path::PathBuf,
        #[source]
        source: ConfigErrorKind,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl InfraError {
    pub fn config(path: impl Into<std::path::PathBuf>, source: ConfigErrorKind) -> Self {
        InfraError::Config {
            path: path.into(),
            source,
        }
    }
}

/// Failures reported by the host's own accessors. These never abort event
/// handling; callers log them and carry on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("item metadata unavailable: {0}")]
    MetaUnavailable(String),

    #[error("slot {slot} out of range (size {size})")]
    SlotOutOfRange { slot: usize, size: usize },

    #[error("slot {0} is not accessible")]
    SlotUnavailable(usize),
}
