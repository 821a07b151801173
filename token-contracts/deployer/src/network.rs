//! Development networks backed by the Soroban host.
//!
//! `sandbox` lives only for the current process. Every other network name
//! is persisted under `<networks_dir>/<name>/` as a ledger snapshot plus
//! the list of prefunded signer accounts, so deployments survive restarts.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use soroban_sdk::testutils::{Address as _, EnvTestConfig};
use soroban_sdk::token::{StellarAssetClient, TokenClient};
use soroban_sdk::xdr::{Hash, ScAddress};
use soroban_sdk::{Address, Bytes, Env, String as SorobanString, TryFromVal};

use crate::error::{DeployError, Result};

/// Name of the in-memory network that is discarded when the process exits.
pub const EPHEMERAL_NETWORK: &str = "sandbox";

/// Accounts created on a fresh network.
pub const DEV_ACCOUNT_COUNT: usize = 20;

/// Native asset funded to every dev account (10_000 units, 7 decimals).
pub const DEV_ACCOUNT_BALANCE: i128 = 10_000 * 10_000_000;

const LEDGER_FILE: &str = "ledger.json";
const ACCOUNTS_FILE: &str = "accounts.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountsFile {
    native_asset: String,
    signers: Vec<String>,
    /// Contracts deployed so far; seeds the next contract address.
    #[serde(default)]
    deploy_nonce: u64,
}

/// An account able to authorize transactions on a network.
#[derive(Debug, Clone)]
pub struct Signer {
    pub address: Address,
}

impl Signer {
    pub fn strkey(&self) -> String {
        address_to_strkey(&self.address)
    }
}

pub struct Network {
    name: String,
    env: Env,
    native_asset: Address,
    signers: Vec<Signer>,
    deploy_nonce: u64,
    state_dir: Option<PathBuf>,
}

impl Network {
    /// A fresh in-memory network that is never written to disk.
    pub fn ephemeral() -> Self {
        Self::fresh(EPHEMERAL_NETWORK, None)
    }

    /// Open `name`, loading its saved state if any. A network without
    /// saved state starts fresh and is written on the first `persist`.
    pub fn open(name: &str, networks_dir: &Path) -> Result<Self> {
        if name == EPHEMERAL_NETWORK {
            return Ok(Self::ephemeral());
        }

        let state_dir = networks_dir.join(name);
        if state_dir.join(LEDGER_FILE).is_file() && state_dir.join(ACCOUNTS_FILE).is_file() {
            tracing::debug!("Loading network {} from {}", name, state_dir.display());
            Self::load(name, state_dir)
        } else {
            tracing::debug!("Creating network {} at {}", name, state_dir.display());
            Ok(Self::fresh(name, Some(state_dir)))
        }
    }

    fn fresh(name: &str, state_dir: Option<PathBuf>) -> Self {
        let env = Env::new_with_config(EnvTestConfig {
            capture_snapshot_at_drop: false,
        });
        // Dev networks sign on behalf of their own accounts.
        env.mock_all_auths();

        let issuer = Address::generate(&env);
        let native_asset = env.register_stellar_asset_contract_v2(issuer).address();
        let minter = StellarAssetClient::new(&env, &native_asset);

        let signers = (0..DEV_ACCOUNT_COUNT)
            .map(|_| {
                let address = Address::generate(&env);
                minter.mint(&address, &DEV_ACCOUNT_BALANCE);
                Signer { address }
            })
            .collect();

        Self {
            name: name.to_string(),
            env,
            native_asset,
            signers,
            deploy_nonce: 0,
            state_dir,
        }
    }

    fn load(name: &str, state_dir: PathBuf) -> Result<Self> {
        let accounts: AccountsFile =
            serde_json::from_str(&fs::read_to_string(state_dir.join(ACCOUNTS_FILE))?)?;

        let ledger_path = state_dir.join(LEDGER_FILE);
        let mut env = catch_host_panic(|| Env::from_ledger_snapshot_file(&ledger_path)).map_err(
            |message| DeployError::Snapshot {
                path: ledger_path.clone(),
                message,
            },
        )?;
        env.set_config(EnvTestConfig {
            capture_snapshot_at_drop: false,
        });
        env.mock_all_auths();

        let accounts_path = state_dir.join(ACCOUNTS_FILE);
        let (native_asset, signers) = catch_host_panic(|| {
            let native_asset = strkey_to_address(&env, &accounts.native_asset);
            let signers: Vec<Signer> = accounts
                .signers
                .iter()
                .map(|strkey| Signer {
                    address: strkey_to_address(&env, strkey),
                })
                .collect();
            (native_asset, signers)
        })
        .map_err(|message| DeployError::Snapshot {
            path: accounts_path,
            message,
        })?;

        Ok(Self {
            name: name.to_string(),
            env,
            native_asset,
            signers,
            deploy_nonce: accounts.deploy_nonce,
            state_dir: Some(state_dir),
        })
    }

    /// Write the ledger and account list. No-op for the ephemeral network.
    pub fn persist(&self) -> Result<()> {
        let Some(state_dir) = &self.state_dir else {
            return Ok(());
        };
        fs::create_dir_all(state_dir)?;

        let ledger_path = state_dir.join(LEDGER_FILE);
        catch_host_panic(|| self.env.to_ledger_snapshot_file(&ledger_path)).map_err(
            |message| DeployError::Snapshot {
                path: ledger_path.clone(),
                message,
            },
        )?;

        let accounts = AccountsFile {
            native_asset: address_to_strkey(&self.native_asset),
            signers: self.signers.iter().map(Signer::strkey).collect(),
            deploy_nonce: self.deploy_nonce,
        };
        fs::write(
            state_dir.join(ACCOUNTS_FILE),
            serde_json::to_string_pretty(&accounts)?,
        )?;

        tracing::debug!("Persisted network {} to {}", self.name, state_dir.display());
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_ephemeral(&self) -> bool {
        self.state_dir.is_none()
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn signers(&self) -> &[Signer] {
        &self.signers
    }

    /// The account deployments are sent from.
    pub fn default_signer(&self) -> Result<&Signer> {
        self.signers.first().ok_or_else(|| DeployError::NoSigners {
            network: self.name.clone(),
        })
    }

    /// Reserve the address of the next contract deployed by `deployer`.
    ///
    /// The address is `sha256(deployer strkey || nonce)`, and the nonce is
    /// saved with the network, so a reloaded network never hands out an
    /// address it has already used.
    pub fn next_contract_address(&mut self, deployer: &Address) -> Result<Address> {
        let mut preimage = Bytes::from_slice(&self.env, address_to_strkey(deployer).as_bytes());
        preimage.extend_from_array(&self.deploy_nonce.to_be_bytes());
        let id = self.env.crypto().sha256(&preimage).to_array();

        let address = Address::try_from_val(&self.env, &ScAddress::Contract(Hash(id)))
            .map_err(|err| DeployError::AddressDerivation(format!("{err:?}")))?;
        self.deploy_nonce += 1;
        Ok(address)
    }

    /// Whether a contract instance is stored at `address`.
    pub fn contract_exists(&self, address: &Address) -> bool {
        self.env
            .host()
            .get_contract_instance_live_until_ledger(address.to_object())
            .is_ok()
    }

    pub fn deploy_nonce(&self) -> u64 {
        self.deploy_nonce
    }

    /// Native asset balance of `address`.
    pub fn balance(&self, address: &Address) -> i128 {
        TokenClient::new(&self.env, &self.native_asset).balance(address)
    }
}

pub fn address_to_strkey(address: &Address) -> String {
    let strkey = address.to_string();
    let mut buf = vec![0u8; strkey.len() as usize];
    strkey.copy_into_slice(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn strkey_to_address(env: &Env, strkey: &str) -> Address {
    Address::from_string(&SorobanString::from_str(env, strkey))
}

/// Run `f`, turning a host panic into its message.
pub(crate) fn catch_host_panic<T>(f: impl FnOnce() -> T) -> std::result::Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        if let Some(message) = payload.downcast_ref::<&str>() {
            message.to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "host panicked".to_string()
        }
    })
}
