//! Deploys the token contract to a Soroban development network and exports
//! its address and artifact for the frontend.

pub mod artifact;
pub mod config;
pub mod deploy;
pub mod error;
pub mod logger;
pub mod network;

pub use artifact::Artifact;
pub use config::DeployConfig;
pub use deploy::{deploy, deploy_and_export, run, write_frontend_files, ContractFactory, Deployment, WasmFactory};
pub use error::{DeployError, Result};
pub use network::{Network, Signer, EPHEMERAL_NETWORK};
