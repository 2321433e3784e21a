//! Virtual transactions
//!
//! A submission wrapped in simulated settlement: it pays a gas price, waits
//! in the pending set, is included at a block boundary, and confirms after a
//! minimum depth. Gas fields are wide unsigned integers and arithmetic
//! never narrows them.

use serde::{Deserialize, Serialize};
use types::{CancelResult, Command, SubmitResult, TxId};

/// Transaction lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Pending,
    Included,
    Confirmed,
    Failed,
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Confirmed | TxStatus::Failed)
    }
}

/// What executing the payload produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutcome {
    Submit(SubmitResult),
    Cancel(CancelResult),
}

/// One virtual transaction. Snapshots handed to callers are clones; the
/// mempool keeps the only mutable copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualTransaction {
    pub tx_id: TxId,
    pub status: TxStatus,
    pub submitted_at_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included_block_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_block_number: Option<u64>,
    pub gas_price: u128,
    pub max_priority_fee_per_gas: u128,
    pub required_confirmations: u32,
    pub payload: Command,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CommandOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Arrival order; final tie-break for block inclusion.
    pub submission_index: u64,
}

impl VirtualTransaction {
    /// Inclusion priority: `gas_price + max_priority_fee_per_gas`.
    pub fn effective_gas(&self) -> u128 {
        self.gas_price.saturating_add(self.max_priority_fee_per_gas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::OrderId;

    fn tx(gas: u128, tip: u128) -> VirtualTransaction {
        VirtualTransaction {
            tx_id: TxId::from_string("vtx-1"),
            status: TxStatus::Pending,
            submitted_at_ms: 0,
            included_block_number: None,
            confirmed_block_number: None,
            gas_price: gas,
            max_priority_fee_per_gas: tip,
            required_confirmations: 1,
            payload: Command::cancel(OrderId::from_string("ord-1"), None, None),
            result: None,
            error: None,
            submission_index: 0,
        }
    }

    #[test]
    fn test_effective_gas_sums() {
        assert_eq!(tx(1_000, 200).effective_gas(), 1_200);
    }

    #[test]
    fn test_effective_gas_never_narrows() {
        let t = tx(u128::MAX, u128::MAX);
        assert_eq!(t.effective_gas(), u128::MAX);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!TxStatus::Pending.is_terminal());
        assert!(!TxStatus::Included.is_terminal());
        assert!(TxStatus::Confirmed.is_terminal());
        assert!(TxStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_serde_form() {
        assert_eq!(
            serde_json::to_string(&TxStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&TxStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
    }
}
