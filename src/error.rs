//! Error types for the dependency resolver
//!
//! Every fallible operation in this crate returns a [`Result`] carrying a
//! single [`Error`] variant. Resolution never partially succeeds: the first
//! error encountered aborts the call and is returned to the caller, who
//! decides how (or whether) to present it.

use thiserror::Error;

use crate::meta::ComponentRef;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("component {0:?} is missing a required field (name or version)")]
    MissingField(String),

    #[error("component {ref_}: version {version:?} is not valid semver: {reason}")]
    BadVersion {
        ref_: String,
        version: String,
        reason: String,
    },

    #[error("component {0}: more than one Requirements object is embedded in it")]
    DuplicateRequirements(ComponentRef),

    #[error("universe contains two components with the same reference {0}")]
    DuplicateComponent(ComponentRef),

    #[error("request names component {0:?} more than once among its roots")]
    DuplicateRoot(String),

    #[error("requested component {0} is not present in the universe")]
    UnknownComponent(ComponentRef),

    #[error("{requiring} requires {target}, which is not present in the universe")]
    UnknownDependency {
        requiring: ComponentRef,
        target: String,
    },

    #[error("no version of {0:?} satisfies the configured matcher")]
    NoMatchingLatest(String),

    #[error("{0}: no earlier matching version exists to downgrade to")]
    NoPreviousVersion(ComponentRef),

    #[error("{0}: a downgrade is required, but this version was pinned by the caller")]
    CannotDowngradeFixed(ComponentRef),

    #[error(
        "{0}: the only earlier matching version would still fall below the accumulated minimum required version"
    )]
    DowngradeBelowMinRequired(ComponentRef),

    #[error("{child} is not visible to {parent}")]
    NotVisible {
        parent: ComponentRef,
        child: ComponentRef,
    },

    #[error("{0}: current version is already below the accumulated minimum required version")]
    UnsatisfiableMinRequirement(ComponentRef),

    #[error("resolution was cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}
