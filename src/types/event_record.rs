use serde::{Deserialize, Serialize};

use crate::helpers::EventsType;

/// One decoded log from the upstream feed, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub block_number: u64,
    pub block_timestamp: u64,
    pub log_index: u64,
    #[serde(default)]
    pub tx_hash: Option<String>,
    pub event: EventPayload,
}

/// Amounts are raw integers in decimal string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    PositionUpdated {
        position_id: String,
        #[serde(default)]
        owner: Option<String>,
        collateral: String,
        debt: String,
    },
    CollateralBalanceUpdated {
        balance: String,
    },
    DebtUpdated {
        debt: String,
    },
    CollateralPriceUpdated {
        price: String,
    },
}

impl EventPayload {
    pub fn event_type(&self) -> EventsType {
        match self {
            EventPayload::PositionUpdated { .. } => EventsType::PositionUpdated,
            EventPayload::CollateralBalanceUpdated { .. } => {
                EventsType::CollateralBalanceUpdated
            },
            EventPayload::DebtUpdated { .. } => EventsType::DebtUpdated,
            EventPayload::CollateralPriceUpdated { .. } => {
                EventsType::CollateralPriceUpdated
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_position_updated() {
        let line = r#"{"block_number":17,"block_timestamp":1700000000,"log_index":3,"event":{"type":"position_updated","position_id":"0xcdp","owner":"0xalice","collateral":"5000000000000000000","debt":"1000000000000000000"}}"#;
        let record: EventRecord = serde_json::from_str(line).unwrap();

        assert_eq!(record.block_number, 17);
        assert_eq!(record.tx_hash, None);
        assert_eq!(record.event.event_type(), EventsType::PositionUpdated);
        assert_eq!(
            record.event,
            EventPayload::PositionUpdated {
                position_id: String::from("0xcdp"),
                owner: Some(String::from("0xalice")),
                collateral: String::from("5000000000000000000"),
                debt: String::from("1000000000000000000"),
            }
        );
    }

    #[test]
    fn test_event_tag_matches_type_name() {
        let record = EventRecord {
            block_number: 1,
            block_timestamp: 2,
            log_index: 0,
            tx_hash: Some(String::from("0xtx")),
            event: EventPayload::CollateralBalanceUpdated {
                balance: String::from("1"),
            },
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value["event"]["type"],
            EventsType::CollateralBalanceUpdated.as_str()
        );
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let line = r#"{"block_number":1,"block_timestamp":1,"log_index":0,"event":{"type":"liquidation","amount":"1"}}"#;
        assert!(serde_json::from_str::<EventRecord>(line).is_err());
    }
}
