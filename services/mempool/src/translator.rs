//! Onchain action translator
//!
//! Decodes records drained from an external onchain action queue into
//! mempool submissions. Wide integers arrive string-encoded. Malformed
//! actions are counted and skipped — one bad record never aborts a batch,
//! mirroring the command log's tolerance for corrupt lines.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;
use types::{
    Command, OrderId, OrderKind, Price, Quantity, Side, SubmitOrderRequest, Symbol,
};

use crate::pool::VirtualMempool;
use serde::Deserialize;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("undecodable action: {0}")]
    Decode(String),

    #[error("unknown action type: {action_type}")]
    UnknownActionType { action_type: String },

    #[error("missing field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid field {field}: {detail}")]
    InvalidField { field: &'static str, detail: String },
}

// ── Wire shape ──────────────────────────────────────────────────────

/// Raw action as drained from the queue.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnchainAction {
    pub action_type: String,
    pub user: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    /// String-encoded wide integer.
    pub gas_price: String,
    /// String-encoded wide integer.
    pub max_priority_fee_per_gas: String,
    #[serde(default)]
    pub confirmations: Option<u32>,
}

/// A decoded action ready for the mempool.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedAction {
    pub command: Command,
    pub gas_price: u128,
    pub max_priority_fee_per_gas: u128,
    pub confirmations: Option<u32>,
}

/// Batch outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    pub translated: u64,
    pub submitted: u64,
    pub malformed: u64,
}

// ── Translation ─────────────────────────────────────────────────────

/// Decode one raw queue record into a command plus gas fields.
pub fn translate(value: &serde_json::Value) -> Result<TranslatedAction, TranslateError> {
    let action: OnchainAction = serde_json::from_value(value.clone())
        .map_err(|e| TranslateError::Decode(e.to_string()))?;

    let gas_price = parse_wide("gasPrice", &action.gas_price)?;
    let max_priority_fee_per_gas =
        parse_wide("maxPriorityFeePerGas", &action.max_priority_fee_per_gas)?;

    let command = match action.action_type.as_str() {
        "limit_order" => {
            let price = parse_price(action.price.as_deref())?;
            Command::submit(order_request(&action, OrderKind::Limit, Some(price))?)
        }
        "market_order" => Command::submit(order_request(&action, OrderKind::Market, None)?),
        "cancel_order" => {
            let order_id = action
                .order_id
                .as_deref()
                .ok_or(TranslateError::MissingField { field: "orderId" })?;
            let symbol = match action.symbol.as_deref() {
                Some(s) => Some(Symbol::try_new(s).ok_or(TranslateError::InvalidField {
                    field: "symbol",
                    detail: "empty".into(),
                })?),
                None => None,
            };
            Command::cancel(
                OrderId::from_string(order_id),
                Some(action.user.clone()),
                symbol,
            )
        }
        other => {
            return Err(TranslateError::UnknownActionType {
                action_type: other.to_string(),
            })
        }
    };

    Ok(TranslatedAction {
        command,
        gas_price,
        max_priority_fee_per_gas,
        confirmations: action.confirmations,
    })
}

/// Translate a batch and feed it through the mempool. Handles are dropped:
/// onchain submitters observe progress through the update stream instead.
pub fn drain_into(
    actions: &[serde_json::Value],
    mempool: &mut VirtualMempool,
    now_ms: i64,
) -> DrainReport {
    let mut report = DrainReport::default();
    for value in actions {
        match translate(value) {
            Ok(action) => {
                report.translated += 1;
                let _ = mempool.submit(
                    action.command,
                    action.gas_price,
                    action.max_priority_fee_per_gas,
                    action.confirmations,
                    now_ms,
                );
                report.submitted += 1;
            }
            Err(err) => {
                tracing::warn!(%err, "skipping malformed onchain action");
                report.malformed += 1;
            }
        }
    }
    report
}

// ── Field parsers ───────────────────────────────────────────────────

fn order_request(
    action: &OnchainAction,
    kind: OrderKind,
    price: Option<Price>,
) -> Result<SubmitOrderRequest, TranslateError> {
    let symbol = action
        .symbol
        .as_deref()
        .ok_or(TranslateError::MissingField { field: "symbol" })?;
    let symbol = Symbol::try_new(symbol).ok_or(TranslateError::InvalidField {
        field: "symbol",
        detail: "empty".into(),
    })?;
    let side = match action
        .side
        .as_deref()
        .ok_or(TranslateError::MissingField { field: "side" })?
    {
        "buy" => Side::Buy,
        "sell" => Side::Sell,
        other => {
            return Err(TranslateError::InvalidField {
                field: "side",
                detail: other.to_string(),
            })
        }
    };
    let quantity = action
        .quantity
        .as_deref()
        .ok_or(TranslateError::MissingField { field: "quantity" })?;
    let quantity = Decimal::from_str(quantity)
        .ok()
        .and_then(Quantity::try_new)
        .ok_or_else(|| TranslateError::InvalidField {
            field: "quantity",
            detail: quantity.to_string(),
        })?;

    Ok(SubmitOrderRequest {
        id: None,
        client_order_id: None,
        symbol,
        user_id: action.user.clone(),
        side,
        kind,
        quantity,
        price,
        time_in_force: None,
        min_quantity: None,
        iceberg_display_quantity: None,
        self_trade_prevention: None,
    })
}

fn parse_price(raw: Option<&str>) -> Result<Price, TranslateError> {
    let raw = raw.ok_or(TranslateError::MissingField { field: "price" })?;
    Decimal::from_str(raw)
        .ok()
        .and_then(Price::try_new)
        .ok_or_else(|| TranslateError::InvalidField {
            field: "price",
            detail: raw.to_string(),
        })
}

fn parse_wide(field: &'static str, raw: &str) -> Result<u128, TranslateError> {
    raw.parse::<u128>()
        .map_err(|e| TranslateError::InvalidField {
            field,
            detail: e.to_string(),
        })
}

// ── Tests ───────────────────────────────────────────────────────────
