use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Ledger snapshot error at {path}: {message}")]
    Snapshot { path: PathBuf, message: String },

    #[error("Invalid artifact {name}: {message}")]
    InvalidArtifact { name: String, message: String },

    #[error("Artifact for {name} not found at {path}")]
    ArtifactNotFound { name: String, path: PathBuf },

    #[error("Deployment of {name} rejected: {message}")]
    Rejected { name: String, message: String },

    #[error("Cannot derive contract address: {0}")]
    AddressDerivation(String),

    #[error("Contract {name} already exists at {address}")]
    AddressTaken { name: String, address: String },

    #[error("Network {network} has no signers")]
    NoSigners { network: String },
}

pub type Result<T> = std::result::Result<T, DeployError>;
