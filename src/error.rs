use actix_web::{http::StatusCode, ResponseError};
use bigdecimal::ParseBigDecimalError as BIG_DECIMAL_ERROR;
use reqwest::Error as REQWEST_ERROR;
use serde_json::Error as JSON_ERROR;
use std::{
    io::Error as IO_ERROR, num::ParseIntError,
    str::ParseBoolError as PARSE_BOOL_ERROR,
};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;

use crate::model::EntityKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    INT(#[from] ParseIntError),

    #[error("{0}")]
    TokioJoinError(#[from] JoinError),

    #[error("{0}")]
    BigDecimalError(#[from] BIG_DECIMAL_ERROR),

    #[error("{0}")]
    JsonError(#[from] JSON_ERROR),

    #[error("{0}")]
    ReqwestError(#[from] REQWEST_ERROR),

    #[error("{0}")]
    ParseBoolError(#[from] PARSE_BOOL_ERROR),

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Parse message error: {0}")]
    ParseMessage(String),

    #[error("Invalid raw amount: {0}")]
    InvalidAmount(String),

    #[error("No price available for asset {asset}")]
    MissingPrice { asset: String },

    #[error("Malformed bucket key: {0}")]
    MalformedBucketKey(String),

    #[error("Store {operation} failed: {reason}")]
    StoreFailure { operation: String, reason: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Expected {expected} record, found {found}")]
    EntityMismatch {
        expected: EntityKind,
        found: EntityKind,
    },

    #[error(
        "Event out of order: ({block_number}, {log_index}) received after ({last_block_number}, {last_log_index})"
    )]
    OutOfOrderEvent {
        block_number: u64,
        log_index: u64,
        last_block_number: u64,
        last_log_index: u64,
    },

    #[error("Event {event} at block {block_number} (log {log_index}) failed: {source}")]
    EventFailed {
        block_number: u64,
        log_index: u64,
        event: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn store_failure(operation: &str, reason: impl ToString) -> Self {
        Error::StoreFailure {
            operation: operation.to_owned(),
            reason: reason.to_string(),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::MalformedBucketKey(_) | Error::INT(_) => {
                StatusCode::BAD_REQUEST
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
