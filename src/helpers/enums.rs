use std::{fmt, io, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventsType {
    PositionUpdated,
    CollateralBalanceUpdated,
    DebtUpdated,
    CollateralPriceUpdated,
}

impl EventsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventsType::PositionUpdated => "position_updated",
            EventsType::CollateralBalanceUpdated => {
                "collateral_balance_updated"
            },
            EventsType::DebtUpdated => "debt_updated",
            EventsType::CollateralPriceUpdated => "collateral_price_updated",
        }
    }
}

impl fmt::Display for EventsType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventsType {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<EventsType, Self::Err> {
        match value {
            "position_updated" => Ok(EventsType::PositionUpdated),
            "collateral_balance_updated" => {
                Ok(EventsType::CollateralBalanceUpdated)
            },
            "debt_updated" => Ok(EventsType::DebtUpdated),
            "collateral_price_updated" => {
                Ok(EventsType::CollateralPriceUpdated)
            },
            _ => Err(io::Error::other("Event type not supported")),
        }
    }
}

/// Which metric fields the aggregates maintain. `Full` keeps the usage
/// counters up to date; `Minimal` only maintains balances and prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricProfile {
    Full,
    Minimal,
}

impl MetricProfile {
    pub fn tracks_usage(&self) -> bool {
        matches!(self, MetricProfile::Full)
    }
}

impl FromStr for MetricProfile {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<MetricProfile, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "full" => Ok(MetricProfile::Full),
            "minimal" => Ok(MetricProfile::Minimal),
            _ => Err(io::Error::other("Metric profile not supported")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Postgres,
}

impl FromStr for StoreKind {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<StoreKind, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "postgres" => Ok(StoreKind::Postgres),
            _ => Err(io::Error::other("Store not supported")),
        }
    }
}
