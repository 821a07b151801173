use std::fs;

use serde_json::Value;
use soroban_sdk::{Address, Env};
use token::{DataKey, Token, TokenClient, TOTAL_SUPPLY};
use token_deployer::artifact::{AbiEntry, AbiParam, ARTIFACT_FORMAT};
use token_deployer::{
    deploy_and_export, run, Artifact, ContractFactory, DeployConfig, DeployError, Network,
};

struct NativeTokenFactory;

impl ContractFactory for NativeTokenFactory {
    fn contract_name(&self) -> &str {
        "Token"
    }

    fn instantiate(&self, env: &Env, address: &Address, owner: &Address) {
        env.register_at(address, Token, (owner.clone(),));
    }
}

fn sample_artifact() -> Artifact {
    Artifact {
        format: ARTIFACT_FORMAT.to_string(),
        contract_name: "Token".to_string(),
        source_name: "token.wasm".to_string(),
        abi: vec![AbiEntry::Function {
            name: "balance_of".to_string(),
            inputs: vec![AbiParam {
                name: "account".to_string(),
                ty: "address".to_string(),
            }],
            outputs: vec!["i128".to_string()],
        }],
        bytecode: "0061736d01000000".to_string(),
    }
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_deploy_writes_address_and_artifact_files() {
    let dir = tempfile::tempdir().unwrap();
    let frontend = dir.path().join("frontend").join("src").join("contracts");
    let mut network = Network::ephemeral();
    let artifact = sample_artifact();

    let deployment = deploy_and_export(&mut network, &NativeTokenFactory, &artifact, &frontend).unwrap();

    // Directory is created on demand.
    assert!(frontend.is_dir());

    let addresses = read_json(&frontend.join("contract-address.json"));
    assert_eq!(addresses, serde_json::json!({ "Token": deployment.address_strkey() }));

    let written: Artifact = serde_json::from_str(
        &fs::read_to_string(frontend.join("Token.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(written, artifact);

    let raw = read_json(&frontend.join("Token.json"));
    assert_eq!(raw["_format"], ARTIFACT_FORMAT);
    assert_eq!(raw["contractName"], "Token");
    assert_eq!(raw["abi"][0]["type"], "function");
    assert_eq!(raw["abi"][0]["inputs"][0]["type"], "address");
}

#[test]
fn test_deployed_token_belongs_to_deployer() {
    let dir = tempfile::tempdir().unwrap();
    let mut network = Network::ephemeral();

    let deployment =
        deploy_and_export(&mut network, &NativeTokenFactory, &sample_artifact(), dir.path()).unwrap();

    let token = TokenClient::new(network.env(), &deployment.address);
    assert_eq!(token.owner(), deployment.deployer);
    assert_eq!(token.balance_of(&deployment.deployer), TOTAL_SUPPLY);
}

#[test]
fn test_redeploy_overwrites_frontend_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut network = Network::ephemeral();
    let artifact = sample_artifact();

    let first =
        deploy_and_export(&mut network, &NativeTokenFactory, &artifact, dir.path()).unwrap();
    let second =
        deploy_and_export(&mut network, &NativeTokenFactory, &artifact, dir.path()).unwrap();
    assert_ne!(first.address_strkey(), second.address_strkey());

    let addresses = read_json(&dir.path().join("contract-address.json"));
    assert_eq!(addresses["Token"], second.address_strkey());
}

#[test]
fn test_persistent_network_saves_state_after_deploy() {
    let dir = tempfile::tempdir().unwrap();
    let networks = dir.path().join(".networks");
    let frontend = dir.path().join("contracts");

    let mut network = Network::open("localhost", &networks).unwrap();
    deploy_and_export(&mut network, &NativeTokenFactory, &sample_artifact(), &frontend).unwrap();

    assert!(networks.join("localhost").join("ledger.json").is_file());
    assert!(networks.join("localhost").join("accounts.json").is_file());
}

fn stored_balance(env: &Env, token: &Address, account: &Address) -> i128 {
    env.as_contract(token, || {
        env.storage()
            .persistent()
            .get(&DataKey::Balance(account.clone()))
            .unwrap_or(0)
    })
}

#[test]
fn test_redeploys_on_persisted_network_keep_earlier_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let networks = dir.path().join(".networks");
    let frontend = dir.path().join("contracts");
    let artifact = sample_artifact();

    let mut deployed: Vec<Address> = Vec::new();
    for _ in 0..3 {
        let mut network = Network::open("localhost", &networks).unwrap();
        let deployment =
            deploy_and_export(&mut network, &NativeTokenFactory, &artifact, &frontend).unwrap();
        assert!(!deployed.contains(&deployment.address));

        let signers: Vec<Address> = network
            .signers()
            .iter()
            .map(|signer| signer.address.clone())
            .collect();
        let token = TokenClient::new(network.env(), &deployment.address);
        token.transfer(&signers[0], &signers[1], &100);

        let held: i128 = signers.iter().map(|signer| token.balance_of(signer)).sum();
        assert_eq!(held, token.total_supply());
        network.persist().unwrap();

        deployed.push(deployment.address);
    }

    // Every earlier token still holds its own post-transfer balances.
    let network = Network::open("localhost", &networks).unwrap();
    let env = network.env();
    for token in &deployed {
        let held: i128 = network
            .signers()
            .iter()
            .map(|signer| stored_balance(env, token, &signer.address))
            .sum();
        assert_eq!(held, TOTAL_SUPPLY);
        assert_eq!(stored_balance(env, token, &network.signers()[1].address), 100);
        assert_eq!(
            stored_balance(env, token, &network.signers()[0].address),
            TOTAL_SUPPLY - 100
        );
    }
}

#[test]
fn test_run_fails_without_compiled_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let frontend = dir.path().join("frontend");
    let config = DeployConfig {
        network: "sandbox".to_string(),
        networks_dir: dir.path().join(".networks"),
        artifacts_dir: dir.path().join("target"),
        frontend_dir: frontend.clone(),
        contract: "Token".to_string(),
        verbose: false,
    };

    let err = run(&config).unwrap_err();
    assert!(matches!(err, DeployError::ArtifactNotFound { .. }));
    assert!(!frontend.exists());
}

#[test]
fn test_run_fails_on_corrupt_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = dir.path().join("target");
    fs::create_dir_all(&artifacts).unwrap();
    fs::write(artifacts.join("token.wasm"), b"not wasm").unwrap();

    let config = DeployConfig {
        network: "sandbox".to_string(),
        networks_dir: dir.path().join(".networks"),
        artifacts_dir: artifacts,
        frontend_dir: dir.path().join("frontend"),
        contract: "Token".to_string(),
        verbose: false,
    };

    let err = run(&config).unwrap_err();
    assert!(matches!(err, DeployError::InvalidArtifact { .. }));
}
