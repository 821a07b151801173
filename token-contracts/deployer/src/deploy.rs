use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use soroban_sdk::{Address, Env};

use crate::artifact::Artifact;
use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::network::{address_to_strkey, catch_host_panic, Network};

pub const ADDRESS_FILE: &str = "contract-address.json";

/// Creates instances of one named contract.
pub trait ContractFactory {
    fn contract_name(&self) -> &str;

    /// Register a new instance at `address`, passing `owner` to its
    /// constructor. The host panics if it rejects the deployment.
    fn instantiate(&self, env: &Env, address: &Address, owner: &Address);
}

/// Deploys the wasm bytecode of a compiled artifact.
#[derive(Debug)]
pub struct WasmFactory {
    artifact: Artifact,
    wasm: Vec<u8>,
}

impl WasmFactory {
    pub fn new(artifact: Artifact) -> Result<Self> {
        let wasm = artifact.wasm()?;
        Ok(Self { artifact, wasm })
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }
}

impl ContractFactory for WasmFactory {
    fn contract_name(&self) -> &str {
        &self.artifact.contract_name
    }

    fn instantiate(&self, env: &Env, address: &Address, owner: &Address) {
        env.register_at(address, self.wasm.as_slice(), (owner.clone(),));
    }
}

#[derive(Debug, Clone)]
pub struct Deployment {
    pub contract_name: String,
    pub address: Address,
    pub deployer: Address,
}

impl Deployment {
    pub fn address_strkey(&self) -> String {
        address_to_strkey(&self.address)
    }
}

/// Deploy one instance from the network's default signer. Returns once the
/// host has executed the deployment and constructor.
///
/// Never replaces a contract: an occupied address is an error.
pub fn deploy(network: &mut Network, factory: &dyn ContractFactory) -> Result<Deployment> {
    let deployer = network.default_signer()?.address.clone();
    let address = network.next_contract_address(&deployer)?;
    if network.contract_exists(&address) {
        return Err(DeployError::AddressTaken {
            name: factory.contract_name().to_string(),
            address: address_to_strkey(&address),
        });
    }

    let env = network.env();
    catch_host_panic(|| factory.instantiate(env, &address, &deployer)).map_err(|message| {
        DeployError::Rejected {
            name: factory.contract_name().to_string(),
            message,
        }
    })?;

    Ok(Deployment {
        contract_name: factory.contract_name().to_string(),
        address,
        deployer,
    })
}

/// Write `contract-address.json` and `<Contract>.json` into `dir`,
/// creating it if needed. Existing files are overwritten.
pub fn write_frontend_files(dir: &Path, deployment: &Deployment, artifact: &Artifact) -> Result<()> {
    fs::create_dir_all(dir)?;

    let mut addresses = BTreeMap::new();
    addresses.insert(deployment.contract_name.as_str(), deployment.address_strkey());
    fs::write(
        dir.join(ADDRESS_FILE),
        serde_json::to_string_pretty(&addresses)?,
    )?;

    fs::write(
        dir.join(format!("{}.json", deployment.contract_name)),
        serde_json::to_string_pretty(artifact)?,
    )?;

    tracing::debug!("Wrote frontend contract files to {}", dir.display());
    Ok(())
}

/// Deploy through `factory`, save the network state and export the
/// frontend files.
pub fn deploy_and_export(
    network: &mut Network,
    factory: &dyn ContractFactory,
    artifact: &Artifact,
    frontend_dir: &Path,
) -> Result<Deployment> {
    let deployment = deploy(network, factory)?;
    tracing::info!(
        "{} address: {}",
        deployment.contract_name,
        deployment.address_strkey()
    );

    network.persist()?;
    write_frontend_files(frontend_dir, &deployment, artifact)?;
    Ok(deployment)
}

pub fn run(config: &DeployConfig) -> Result<Deployment> {
    if config.is_ephemeral() {
        tracing::warn!(
            "You are trying to deploy a contract to the {} network, which gets \
             automatically created and destroyed every time. Use the option \
             '--network localhost' to keep its state.",
            config.network
        );
    }

    let mut network = Network::open(&config.network, &config.networks_dir)?;
    let signer = network.default_signer()?;
    tracing::info!("Deploying contracts with the account: {}", signer.strkey());
    tracing::info!("Account balance: {}", network.balance(&signer.address));

    let artifact = Artifact::load(&config.artifacts_dir, &config.contract)?;
    let factory = WasmFactory::new(artifact)?;

    deploy_and_export(&mut network, &factory, factory.artifact(), &config.frontend_dir)
}
