//! Execution receipts and abort decoding
//!
//! Signing and submission live outside this crate. Whatever submits a batch
//! implements [`TransactionExecutor`] and hands back an [`ExecutionReceipt`],
//! which can name the Move abort that rolled the batch back.

use std::future::Future;

use navi_core::{Address, ObjectId, RpcError};
use serde::{Deserialize, Serialize};
use sui_ptb::ProgrammableTransaction;

use crate::{Result, SuiClient};

/// Submits a finished batch on behalf of `sender`
pub trait TransactionExecutor {
    fn execute(
        &self,
        transaction: &ProgrammableTransaction,
        sender: &Address,
    ) -> impl Future<Output = navi_core::Result<ExecutionReceipt>> + Send;
}

/// Execution outcome reported by the fullnode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

/// Receipt of an executed batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub digest: String,
    pub status: ExecutionStatus,
}

impl ExecutionReceipt {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// The Move abort behind a failure, if the failure was one
    pub fn abort(&self) -> Option<MoveAbort> {
        match &self.status {
            ExecutionStatus::Failure { error } => MoveAbort::parse(error),
            ExecutionStatus::Success => None,
        }
    }

    /// Build a receipt from a `sui_getTransactionBlock` response
    pub fn from_response(value: &serde_json::Value) -> Result<Self> {
        let digest = value["digest"]
            .as_str()
            .ok_or_else(|| RpcError::ParseError("transaction block has no digest".into()))?
            .to_string();
        let status: ExecutionStatus = serde_json::from_value(value["effects"]["status"].clone())
            .map_err(|e| RpcError::ParseError(format!("effects status: {}", e)))?;
        Ok(Self { digest, status })
    }
}

/// A decoded `MoveAbort` failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAbort {
    pub package: ObjectId,
    pub module: String,
    pub function: Option<String>,
    pub code: u64,
    /// Index of the failing command in the batch
    pub command: Option<u16>,
}

impl MoveAbort {
    /// Parse the fullnode's rendering of a Move abort, e.g.
    /// `MoveAbort(MoveLocation { module: ModuleId { address: 0xab.., name:
    /// Identifier("slippage") }, function: 1, instruction: 20, function_name:
    /// Some("check_slippage_v2") }, 18) in command 7`
    pub fn parse(error: &str) -> Option<Self> {
        let start = error.find("MoveAbort(")?;
        let body = &error[start..];

        let address = between(body, "address: ", ",")?.trim();
        let package = if address.starts_with("0x") {
            ObjectId::new(address)
        } else {
            ObjectId::new(format!("0x{}", address))
        };
        let module = between(body, "name: Identifier(\"", "\"")?.to_string();
        let function = between(body, "function_name: Some(\"", "\"").map(str::to_string);

        let location_end = body.find("instruction:")?;
        let after_location = &body[location_end..];
        let code_start = after_location.find("}, ")? + 3;
        let code = leading_digits(&after_location[code_start..])?;

        let command = body
            .find("in command ")
            .and_then(|i| leading_digits(&body[i + "in command ".len()..]))
            .and_then(|c| u16::try_from(c).ok());

        Some(Self {
            package,
            module,
            function,
            code,
            command,
        })
    }

    /// Whether the abort came from `module` of `package`
    pub fn is_from(&self, package: &ObjectId, module: &str) -> bool {
        &self.package == package && self.module == module
    }
}

fn between<'a>(haystack: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = haystack.find(open)? + open.len();
    let rest = &haystack[start..];
    let end = rest.find(close)?;
    Some(&rest[..end])
}

fn leading_digits(s: &str) -> Option<u64> {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

impl SuiClient {
    /// Fetch the receipt of an executed transaction
    pub async fn transaction_receipt(&self, digest: &str) -> Result<ExecutionReceipt> {
        let value: serde_json::Value = self
            .call(
                "sui_getTransactionBlock",
                serde_json::json!([digest, { "showEffects": true }]),
            )
            .await?;
        let receipt = ExecutionReceipt::from_response(&value)?;

        if let Some(abort) = receipt.abort() {
            tracing::info!(
                digest = %receipt.digest,
                module = %abort.module,
                code = abort.code,
                "Transaction aborted"
            );
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABORT: &str = "MoveAbort(MoveLocation { module: ModuleId { address: 88dfe5e893bc9fa984d121e4d0d5b2e873dc70ae430cf5b3228ae6cb199cb32b, name: Identifier(\"slippage\") }, function: 1, instruction: 20, function_name: Some(\"check_slippage_v2\") }, 18) in command 12";

    #[test]
    fn test_parse_move_abort() {
        let abort = MoveAbort::parse(ABORT).unwrap();
        assert_eq!(
            abort.package,
            ObjectId::new("0x88dfe5e893bc9fa984d121e4d0d5b2e873dc70ae430cf5b3228ae6cb199cb32b")
        );
        assert_eq!(abort.module, "slippage");
        assert_eq!(abort.function.as_deref(), Some("check_slippage_v2"));
        assert_eq!(abort.code, 18);
        assert_eq!(abort.command, Some(12));
    }

    #[test]
    fn test_parse_abort_without_function_name() {
        let error = "MoveAbort(MoveLocation { module: ModuleId { address: 0x2, name: Identifier(\"balance\") }, function: 3, instruction: 9, function_name: None }, 2) in command 4";
        let abort = MoveAbort::parse(error).unwrap();
        assert_eq!(abort.module, "balance");
        assert_eq!(abort.function, None);
        assert_eq!(abort.code, 2);
        assert!(abort.is_from(&ObjectId::new("0x2"), "balance"));
    }

    #[test]
    fn test_non_abort_failure() {
        assert!(MoveAbort::parse("InsufficientGas").is_none());
    }

    #[test]
    fn test_receipt_from_response() {
        let value = serde_json::json!({
            "digest": "5Vwd3PYJXSz2gZ7m6Ykz7wP1hkbVjXgVw7vsJN8cZqAu",
            "effects": {
                "status": { "status": "failure", "error": ABORT }
            }
        });
        let receipt = ExecutionReceipt::from_response(&value).unwrap();
        assert!(!receipt.is_success());
        assert_eq!(receipt.abort().map(|a| a.code), Some(18));

        let ok = serde_json::json!({
            "digest": "abc",
            "effects": { "status": { "status": "success" } }
        });
        let receipt = ExecutionReceipt::from_response(&ok).unwrap();
        assert!(receipt.is_success());
        assert!(receipt.abort().is_none());
    }
}
