use std::{fmt, io, str::FromStr};

use serde::Serialize;
use serde_json::Value;

use crate::{
    error::Error,
    helpers::SnapshotPeriod,
    model::{
        Account, FinancialsDailySnapshot, LendingProtocol, Market,
        MarketSnapshot, Position, Token,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Position,
    Account,
    Token,
    Market,
    MarketDailySnapshot,
    MarketHourlySnapshot,
    Protocol,
    FinancialsDailySnapshot,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Position => "position",
            EntityKind::Account => "account",
            EntityKind::Token => "token",
            EntityKind::Market => "market",
            EntityKind::MarketDailySnapshot => "market_daily_snapshot",
            EntityKind::MarketHourlySnapshot => "market_hourly_snapshot",
            EntityKind::Protocol => "protocol",
            EntityKind::FinancialsDailySnapshot => "financials_daily_snapshot",
        }
    }

    pub fn market_snapshot(period: SnapshotPeriod) -> Self {
        match period {
            SnapshotPeriod::Daily => EntityKind::MarketDailySnapshot,
            SnapshotPeriod::Hourly => EntityKind::MarketHourlySnapshot,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<EntityKind, Self::Err> {
        match value {
            "position" => Ok(EntityKind::Position),
            "account" => Ok(EntityKind::Account),
            "token" => Ok(EntityKind::Token),
            "market" => Ok(EntityKind::Market),
            "market_daily_snapshot" => Ok(EntityKind::MarketDailySnapshot),
            "market_hourly_snapshot" => Ok(EntityKind::MarketHourlySnapshot),
            "protocol" => Ok(EntityKind::Protocol),
            "financials_daily_snapshot" => {
                Ok(EntityKind::FinancialsDailySnapshot)
            },
            _ => Err(io::Error::other("Entity kind not supported")),
        }
    }
}

/// Storage envelope: every persisted record is one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Position(Position),
    Account(Account),
    Token(Token),
    Market(Market),
    MarketSnapshot(MarketSnapshot),
    Protocol(LendingProtocol),
    FinancialsDailySnapshot(FinancialsDailySnapshot),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Position(_) => EntityKind::Position,
            Entity::Account(_) => EntityKind::Account,
            Entity::Token(_) => EntityKind::Token,
            Entity::Market(_) => EntityKind::Market,
            Entity::MarketSnapshot(s) => EntityKind::market_snapshot(s.period),
            Entity::Protocol(_) => EntityKind::Protocol,
            Entity::FinancialsDailySnapshot(_) => {
                EntityKind::FinancialsDailySnapshot
            },
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entity::Position(e) => &e.id,
            Entity::Account(e) => &e.id,
            Entity::Token(e) => &e.id,
            Entity::Market(e) => &e.id,
            Entity::MarketSnapshot(e) => &e.id,
            Entity::Protocol(e) => &e.id,
            Entity::FinancialsDailySnapshot(e) => &e.id,
        }
    }

    pub fn to_json(&self) -> Result<Value, Error> {
        let value = match self {
            Entity::Position(e) => serde_json::to_value(e)?,
            Entity::Account(e) => serde_json::to_value(e)?,
            Entity::Token(e) => serde_json::to_value(e)?,
            Entity::Market(e) => serde_json::to_value(e)?,
            Entity::MarketSnapshot(e) => serde_json::to_value(e)?,
            Entity::Protocol(e) => serde_json::to_value(e)?,
            Entity::FinancialsDailySnapshot(e) => serde_json::to_value(e)?,
        };
        Ok(value)
    }

    pub fn from_json(kind: EntityKind, value: Value) -> Result<Entity, Error> {
        let entity = match kind {
            EntityKind::Position => {
                Entity::Position(serde_json::from_value(value)?)
            },
            EntityKind::Account => Entity::Account(serde_json::from_value(value)?),
            EntityKind::Token => Entity::Token(serde_json::from_value(value)?),
            EntityKind::Market => Entity::Market(serde_json::from_value(value)?),
            EntityKind::MarketDailySnapshot
            | EntityKind::MarketHourlySnapshot => {
                Entity::MarketSnapshot(serde_json::from_value(value)?)
            },
            EntityKind::Protocol => {
                Entity::Protocol(serde_json::from_value(value)?)
            },
            EntityKind::FinancialsDailySnapshot => {
                Entity::FinancialsDailySnapshot(serde_json::from_value(value)?)
            },
        };

        if entity.kind() != kind {
            return Err(Error::EntityMismatch {
                expected: kind,
                found: entity.kind(),
            });
        }

        Ok(entity)
    }
}

impl Serialize for Entity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Entity::Position(e) => e.serialize(serializer),
            Entity::Account(e) => e.serialize(serializer),
            Entity::Token(e) => e.serialize(serializer),
            Entity::Market(e) => e.serialize(serializer),
            Entity::MarketSnapshot(e) => e.serialize(serializer),
            Entity::Protocol(e) => e.serialize(serializer),
            Entity::FinancialsDailySnapshot(e) => e.serialize(serializer),
        }
    }
}

/// A concrete entity type that can travel through the store as an [`Entity`].
pub trait Record:
    Clone + Send + Sync + Into<Entity> + TryFrom<Entity, Error = Error>
{
    fn id(&self) -> &str;

    fn kind(&self) -> EntityKind;
}

macro_rules! impl_record {
    ($($record:ident => $variant:ident),+ $(,)?) => {
        $(
            impl From<$record> for Entity {
                fn from(value: $record) -> Self {
                    Entity::$variant(value)
                }
            }

            impl TryFrom<Entity> for $record {
                type Error = Error;

                fn try_from(value: Entity) -> Result<Self, Self::Error> {
                    match value {
                        Entity::$variant(record) => Ok(record),
                        other => Err(Error::EntityMismatch {
                            expected: EntityKind::$variant,
                            found: other.kind(),
                        }),
                    }
                }
            }

            impl Record for $record {
                fn id(&self) -> &str {
                    &self.id
                }

                fn kind(&self) -> EntityKind {
                    EntityKind::$variant
                }
            }
        )+
    };
}

impl_record![
    Position => Position,
    Account => Account,
    Token => Token,
    Market => Market,
    LendingProtocol => Protocol,
    FinancialsDailySnapshot => FinancialsDailySnapshot,
];

impl From<MarketSnapshot> for Entity {
    fn from(value: MarketSnapshot) -> Self {
        Entity::MarketSnapshot(value)
    }
}

impl TryFrom<Entity> for MarketSnapshot {
    type Error = Error;

    fn try_from(value: Entity) -> Result<Self, Self::Error> {
        match value {
            Entity::MarketSnapshot(record) => Ok(record),
            other => Err(Error::EntityMismatch {
                expected: EntityKind::MarketDailySnapshot,
                found: other.kind(),
            }),
        }
    }
}

impl Record for MarketSnapshot {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> EntityKind {
        EntityKind::market_snapshot(self.period)
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use super::*;

    #[test]
    fn test_entity_kind_names_parse_back() {
        for kind in [
            EntityKind::Position,
            EntityKind::Account,
            EntityKind::Token,
            EntityKind::Market,
            EntityKind::MarketDailySnapshot,
            EntityKind::MarketHourlySnapshot,
            EntityKind::Protocol,
            EntityKind::FinancialsDailySnapshot,
        ] {
            assert_eq!(EntityKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_from_json_checks_kind() {
        let position = Position {
            id: String::from("0xabc"),
            owner: Some(String::from("0xowner")),
            collateral: BigDecimal::from(2),
            debt: BigDecimal::from(1),
        };
        let value = Entity::from(position.clone()).to_json().unwrap();

        let entity = Entity::from_json(EntityKind::Position, value).unwrap();
        assert_eq!(Position::try_from(entity).unwrap(), position);
    }

    #[test]
    fn test_try_from_wrong_variant() {
        let account = Entity::Account(Account {
            id: String::from("0xowner"),
            position_count: 1,
        });
        let result = Position::try_from(account);
        assert!(matches!(
            result,
            Err(Error::EntityMismatch {
                expected: EntityKind::Position,
                found: EntityKind::Account
            })
        ));
    }
}
