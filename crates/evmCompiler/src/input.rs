//! JSON description of the contracts to compile.
//!
//! ```json
//! { "contracts": [ { "id": 2, "code": "0x6001", "storage": { "0x00": "0x01" } } ] }
//! ```

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};

use alloy_primitives::U256;
use avm_isa::ContractId;
use serde::Deserialize;

use crate::{Contract, InputError};

#[derive(Debug, Clone, Deserialize)]
pub struct ContractsFile {
    pub contracts: Vec<ContractSource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractSource {
    pub id: ContractId,
    /// Hex-encoded runtime code, with or without a `0x` prefix.
    pub code: String,
    #[serde(default)]
    pub storage: BTreeMap<String, String>,
}

impl ContractSource {
    pub fn into_contract(self) -> Result<Contract, InputError> {
        let code = decode_hex(self.id, "code", &self.code)?;
        let storage = self
            .storage
            .iter()
            .map(|(key, value)| -> Result<_, InputError> {
                Ok((
                    parse_word(self.id, "storage key", key)?,
                    parse_word(self.id, "storage value", value)?,
                ))
            })
            .collect::<Result<BTreeMap<_, _>, InputError>>()?;
        Ok(Contract::from_code(self.id, code).with_storage(storage))
    }
}

pub fn parse_contracts(json: &str) -> Result<Vec<Contract>, InputError> {
    let file: ContractsFile = serde_json::from_str(json)?;
    let mut seen = BTreeSet::new();
    file.contracts
        .into_iter()
        .map(|source| {
            if !seen.insert(source.id) {
                return Err(InputError::DuplicateContract(source.id));
            }
            source.into_contract()
        })
        .collect()
}

pub fn read_contracts(path: impl AsRef<Path>) -> Result<Vec<Contract>, InputError> {
    parse_contracts(&fs::read_to_string(path)?)
}

fn strip_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

fn decode_hex(contract: ContractId, field: &'static str, text: &str) -> Result<Vec<u8>, InputError> {
    let digits = strip_prefix(text);
    let padded = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    hex::decode(padded).map_err(|source| InputError::Hex {
        contract,
        field,
        source,
    })
}

fn parse_word(contract: ContractId, field: &'static str, text: &str) -> Result<U256, InputError> {
    let bytes = decode_hex(contract, field, text)?;
    if bytes.len() > 32 {
        return Err(InputError::WordTooWide {
            contract,
            value: text.to_string(),
        });
    }
    Ok(U256::from_be_slice(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_contracts() {
        let json = r#"{
            "contracts": [
                { "id": 7, "code": "0x5b600056", "storage": { "0x0": "0x2a" } },
                { "id": 2, "code": "00" }
            ]
        }"#;
        let contracts = parse_contracts(json).unwrap();
        assert_eq!(contracts.len(), 2);
        assert_eq!(contracts[0].id, 7);
        assert_eq!(&contracts[0].code[..], &[0x5b, 0x60, 0x00, 0x56]);
        assert_eq!(contracts[0].instructions.len(), 3);
        assert_eq!(
            contracts[0].storage,
            BTreeMap::from([(U256::ZERO, U256::from(0x2a))])
        );
        assert!(contracts[1].storage.is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let json = r#"{ "contracts": [ { "id": 3, "code": "00" }, { "id": 3, "code": "00" } ] }"#;
        assert!(matches!(
            parse_contracts(json),
            Err(InputError::DuplicateContract(3))
        ));
    }

    #[test]
    fn test_bad_hex_names_the_field() {
        let json = r#"{ "contracts": [ { "id": 3, "code": "0xzz" } ] }"#;
        let error = parse_contracts(json).unwrap_err();
        assert!(error.to_string().contains("code"));
    }

    #[test]
    fn test_oversized_storage_word() {
        let key = format!("0x{}", "11".repeat(33));
        let json = format!(r#"{{ "contracts": [ {{ "id": 3, "code": "", "storage": {{ "{key}": "0x1" }} }} ] }}"#);
        assert!(matches!(
            parse_contracts(&json),
            Err(InputError::WordTooWide { contract: 3, .. })
        ));
    }
}
