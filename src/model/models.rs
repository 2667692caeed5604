//! Aggregate entities, organized by domain sections.
//!
//! Every metric field is either cumulative (only grows across the event
//! sequence) or point-in-time (overwritten by the latest event). Snapshot
//! records additionally carry bucket-scoped totals that start at zero when
//! the bucket is first touched and are never reset afterwards.

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use crate::helpers::SnapshotPeriod;

// =============================================================================
// POSITION DOMAIN
// =============================================================================

/// A single collateralized debt position. Closing a position zeroes its
/// balances, the record itself is never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub owner: Option<String>,
    pub collateral: BigDecimal,
    pub debt: BigDecimal,
}

impl Position {
    pub fn new(id: &str, owner: Option<&str>) -> Self {
        Self {
            id: id.to_owned(),
            owner: owner.map(str::to_owned),
            collateral: BigDecimal::zero(),
            debt: BigDecimal::zero(),
        }
    }

    pub fn is_open(&self) -> bool {
        !self.collateral.is_zero() || !self.debt.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub position_count: u64,
}

// =============================================================================
// TOKEN DOMAIN
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub last_price_usd: Option<BigDecimal>,
    pub last_price_block_number: Option<u64>,
}

// =============================================================================
// MARKET DOMAIN
// =============================================================================

/// Balance and revenue metrics shared by a market and its snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketMetrics {
    pub total_value_locked_usd: BigDecimal,
    pub cumulative_supply_side_revenue_usd: BigDecimal,
    pub cumulative_protocol_side_revenue_usd: BigDecimal,
    pub cumulative_total_revenue_usd: BigDecimal,
    pub total_deposit_balance_usd: BigDecimal,
    pub cumulative_deposit_usd: BigDecimal,
    pub total_borrow_balance_usd: BigDecimal,
    pub cumulative_borrow_usd: BigDecimal,
    pub cumulative_liquidate_usd: BigDecimal,
    pub input_token_balance: BigDecimal,
    pub input_token_price_usd: BigDecimal,
    pub output_token_supply: BigDecimal,
    pub output_token_price_usd: BigDecimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionCounts {
    pub position_count: u64,
    pub open_position_count: u64,
    pub closed_position_count: u64,
    pub lending_position_count: u64,
    pub borrowing_position_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub id: String,
    pub protocol: String,
    pub name: String,
    pub is_active: bool,
    pub can_use_as_collateral: bool,
    pub can_borrow_from: bool,
    pub maximum_ltv: BigDecimal,
    pub liquidation_threshold: BigDecimal,
    pub liquidation_penalty: BigDecimal,
    pub input_token: String,
    pub created_timestamp: u64,
    pub created_block_number: u64,
    #[serde(flatten)]
    pub metrics: MarketMetrics,
    #[serde(flatten)]
    pub positions: PositionCounts,
}

/// Totals accumulated over a single bucket (`daily_*` / `hourly_*`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub supply_side_revenue_usd: BigDecimal,
    pub protocol_side_revenue_usd: BigDecimal,
    pub total_revenue_usd: BigDecimal,
    pub deposit_usd: BigDecimal,
    pub borrow_usd: BigDecimal,
    pub liquidate_usd: BigDecimal,
    pub withdraw_usd: BigDecimal,
    pub repay_usd: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub id: String,
    pub period: SnapshotPeriod,
    pub protocol: String,
    pub market: String,
    pub block_number: u64,
    pub timestamp: u64,
    #[serde(flatten)]
    pub metrics: MarketMetrics,
    pub period_totals: PeriodTotals,
}

// =============================================================================
// PROTOCOL DOMAIN
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Network {
    Mainnet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtocolType {
    Lending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LendingType {
    Cdp,
    Pooled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionType {
    Permissionless,
    Whitelist,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskType {
    Global,
    Isolated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollateralizationType {
    OverCollateralized,
    UnderCollateralized,
    Uncollateralized,
}

/// Balance and revenue metrics shared by the protocol and its financial
/// snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtocolMetrics {
    pub total_value_locked_usd: BigDecimal,
    pub protocol_controlled_value_usd: BigDecimal,
    pub cumulative_supply_side_revenue_usd: BigDecimal,
    pub cumulative_protocol_side_revenue_usd: BigDecimal,
    pub cumulative_total_revenue_usd: BigDecimal,
    pub total_deposit_balance_usd: BigDecimal,
    pub cumulative_deposit_usd: BigDecimal,
    pub total_borrow_balance_usd: BigDecimal,
    pub cumulative_borrow_usd: BigDecimal,
    pub cumulative_liquidate_usd: BigDecimal,
    pub minted_token_supplies: Vec<BigDecimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtocolUsage {
    pub cumulative_unique_users: u64,
    pub cumulative_unique_depositors: u64,
    pub cumulative_unique_borrowers: u64,
    pub cumulative_unique_liquidators: u64,
    pub cumulative_unique_liquidatees: u64,
    pub total_pool_count: u64,
    pub open_position_count: u64,
    pub cumulative_position_count: u64,
    pub transaction_count: u64,
    pub deposit_count: u64,
    pub withdraw_count: u64,
    pub borrow_count: u64,
    pub repay_count: u64,
    pub liquidation_count: u64,
    pub transfer_count: u64,
    pub flashloan_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingProtocol {
    pub id: String,
    pub protocol: String,
    pub name: String,
    pub slug: String,
    pub network: Network,
    pub protocol_type: ProtocolType,
    pub lending_type: LendingType,
    pub lender_permission_type: PermissionType,
    pub borrower_permission_type: PermissionType,
    pub pool_creator_permission_type: PermissionType,
    pub risk_type: RiskType,
    pub collateralization_type: CollateralizationType,
    pub minted_tokens: Vec<String>,
    pub schema_version: String,
    pub indexer_version: String,
    pub methodology_version: String,
    #[serde(flatten)]
    pub metrics: ProtocolMetrics,
    #[serde(flatten)]
    pub usage: ProtocolUsage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialsDailySnapshot {
    pub id: String,
    pub protocol: String,
    pub block_number: u64,
    pub timestamp: u64,
    #[serde(flatten)]
    pub metrics: ProtocolMetrics,
    pub period_totals: PeriodTotals,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_position_open_state() {
        let mut position = Position::new("0x01", None);
        assert!(!position.is_open());

        position.debt = BigDecimal::from(5);
        assert!(position.is_open());

        position.debt = BigDecimal::zero();
        position.collateral = BigDecimal::from_str("0.1").unwrap();
        assert!(position.is_open());
    }

    #[test]
    fn test_flattened_metrics_survive_json() {
        let snapshot = MarketSnapshot {
            id: String::from("active-pool-1"),
            period: SnapshotPeriod::Daily,
            protocol: String::from("cdp-manager"),
            market: String::from("active-pool"),
            block_number: 7,
            timestamp: 86_500,
            metrics: MarketMetrics {
                total_value_locked_usd: BigDecimal::from_str("6000.5")
                    .unwrap(),
                ..MarketMetrics::default()
            },
            period_totals: PeriodTotals::default(),
        };

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["total_value_locked_usd"], "6000.5");

        let decoded: MarketSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, snapshot);
    }
}
