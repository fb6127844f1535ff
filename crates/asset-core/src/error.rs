//! Error types for asset-core

/// Result type for asset-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while declaring, resolving or rendering assets
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Impossible or illegal configuration, such as a duplicate resource path
    /// or a declaration made after the registry was prepared
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// An asset in one library depends on a library that depends back on it
    #[error(
        "Library dependency cycle detected in {asset}: library '{library}' and library '{other}' depend on each other"
    )]
    LibraryDependencyCycle {
        asset: String,
        library: String,
        other: String,
    },

    /// An asset would (transitively) depend on itself
    #[error("Dependency cycle: {asset} cannot depend on {dependency}")]
    DependencyCycle { asset: String, dependency: String },

    /// A slot was filled incorrectly, or a required slot was left empty
    #[error("Slot error: {message}")]
    Slot { message: String },

    /// No renderer is registered for the extension of a resource
    #[error("Unknown resource extension '{extension}' for {asset}")]
    UnknownExtension { extension: String, asset: String },

    /// A resource refers to a file that does not exist
    #[error("Unknown resource: {message}")]
    UnknownResource { message: String },

    /// A mode resource depends on something its parent does not
    #[error("Mode '{mode}' of {asset} has dependencies that are not a subset of its parent's")]
    ModeDependency { asset: String, mode: String },

    /// Filesystem error from asset-fs
    #[error(transparent)]
    Fs(#[from] asset_fs::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn slot(message: impl Into<String>) -> Self {
        Self::Slot {
            message: message.into(),
        }
    }
}
