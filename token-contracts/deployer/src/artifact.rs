//! Compiled contract artifacts: wasm bytecode plus the interface decoded
//! from its `contractspecv0` custom section.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use soroban_sdk::xdr::{ScSpecEntry, ScSpecTypeDef};
use soroban_spec::read::FromWasmError;

use crate::error::{DeployError, Result};

pub const ARTIFACT_FORMAT: &str = "soroban-artifact-1";

const WASM_MAGIC: &[u8; 4] = b"\0asm";
const SPEC_SECTION: &str = "contractspecv0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(rename = "_format")]
    pub format: String,
    pub contract_name: String,
    pub source_name: String,
    pub abi: Vec<AbiEntry>,
    /// Hex-encoded wasm.
    pub bytecode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AbiEntry {
    Function {
        name: String,
        inputs: Vec<AbiParam>,
        outputs: Vec<String>,
    },
    Error {
        name: String,
        cases: Vec<AbiErrorCase>,
    },
    Type {
        name: String,
        kind: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiErrorCase {
    pub name: String,
    pub value: u32,
}

impl Artifact {
    /// Read `<artifacts_dir>/<contract>.wasm`, where the file stem is the
    /// snake_case form of `contract_name` (`Token` -> `token.wasm`).
    pub fn load(artifacts_dir: &Path, contract_name: &str) -> Result<Self> {
        let path = wasm_path(artifacts_dir, contract_name);
        if !path.is_file() {
            return Err(DeployError::ArtifactNotFound {
                name: contract_name.to_string(),
                path,
            });
        }

        let wasm = fs::read(&path)?;
        tracing::debug!("Read {} bytes of wasm from {}", wasm.len(), path.display());
        Self::from_wasm(contract_name, &path.to_string_lossy(), &wasm)
    }

    pub fn from_wasm(contract_name: &str, source_name: &str, wasm: &[u8]) -> Result<Self> {
        let invalid = |message: &str| DeployError::InvalidArtifact {
            name: contract_name.to_string(),
            message: message.to_string(),
        };

        if wasm.len() < 8 || &wasm[..4] != WASM_MAGIC {
            return Err(invalid("not a wasm module"));
        }

        let spec = soroban_spec::read::from_wasm(wasm).map_err(|err| match err {
            FromWasmError::NotFound => invalid(&format!("missing {SPEC_SECTION} section")),
            FromWasmError::Read(err) => invalid(&format!("malformed module: {err}")),
            FromWasmError::Parse(err) => invalid(&format!("malformed {SPEC_SECTION} section: {err}")),
        })?;

        Ok(Self {
            format: ARTIFACT_FORMAT.to_string(),
            contract_name: contract_name.to_string(),
            source_name: source_name.to_string(),
            abi: decode_spec(spec),
            bytecode: hex::encode(wasm),
        })
    }

    pub fn wasm(&self) -> Result<Vec<u8>> {
        hex::decode(&self.bytecode).map_err(|err| DeployError::InvalidArtifact {
            name: self.contract_name.clone(),
            message: format!("bytecode is not valid hex: {err}"),
        })
    }

    pub fn function_names(&self) -> Vec<&str> {
        self.abi
            .iter()
            .filter_map(|entry| match entry {
                AbiEntry::Function { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

pub fn wasm_path(artifacts_dir: &Path, contract_name: &str) -> PathBuf {
    artifacts_dir.join(format!("{}.wasm", snake_case(contract_name)))
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == '-' {
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}

fn decode_spec(spec: Vec<ScSpecEntry>) -> Vec<AbiEntry> {
    let mut abi = Vec::new();

    for entry in spec {
        let entry = match entry {
            ScSpecEntry::FunctionV0(function) => {
                // Constructors are not callable after deployment.
                let name = function.name.0.to_utf8_string_lossy();
                if name == "__constructor" {
                    continue;
                }
                AbiEntry::Function {
                    name,
                    inputs: function
                        .inputs
                        .iter()
                        .map(|input| AbiParam {
                            name: input.name.to_utf8_string_lossy(),
                            ty: type_name(&input.type_),
                        })
                        .collect(),
                    outputs: function.outputs.iter().map(type_name).collect(),
                }
            }
            ScSpecEntry::UdtErrorEnumV0(error) => AbiEntry::Error {
                name: error.name.to_utf8_string_lossy(),
                cases: error
                    .cases
                    .iter()
                    .map(|case| AbiErrorCase {
                        name: case.name.to_utf8_string_lossy(),
                        value: case.value,
                    })
                    .collect(),
            },
            ScSpecEntry::UdtStructV0(udt) => AbiEntry::Type {
                name: udt.name.to_utf8_string_lossy(),
                kind: "struct".to_string(),
            },
            ScSpecEntry::UdtUnionV0(udt) => AbiEntry::Type {
                name: udt.name.to_utf8_string_lossy(),
                kind: "union".to_string(),
            },
            ScSpecEntry::UdtEnumV0(udt) => AbiEntry::Type {
                name: udt.name.to_utf8_string_lossy(),
                kind: "enum".to_string(),
            },
            #[allow(unreachable_patterns)]
            _ => continue,
        };
        abi.push(entry);
    }

    abi
}

fn type_name(ty: &ScSpecTypeDef) -> String {
    match ty {
        ScSpecTypeDef::Udt(udt) => udt.name.to_utf8_string_lossy(),
        ScSpecTypeDef::Option(inner) => format!("option<{}>", type_name(&inner.value_type)),
        ScSpecTypeDef::Vec(inner) => format!("vec<{}>", type_name(&inner.element_type)),
        ScSpecTypeDef::Result(inner) => format!(
            "result<{}, {}>",
            type_name(&inner.ok_type),
            type_name(&inner.error_type)
        ),
        ScSpecTypeDef::BytesN(bytes) => format!("bytes{}", bytes.n),
        other => other.name().to_lowercase(),
    }
}
