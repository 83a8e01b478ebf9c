//! Errors - エラー型と分類
//!
//! - `HostError`: ports（ホスト側の協調者）が返す失敗
//! - `ExpiryError`: このクレートの操作が呼び出し元に返す失敗
//!
//! リトライはしない。失敗はすべて同期的に呼び出し元へ返す。

use thiserror::Error;

use super::{HookName, ItemId, TimestampError};

/// Failure reported by a host collaborator behind a port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("{service} unavailable: {message}")]
    Unavailable {
        service: &'static str,
        message: String,
    },

    #[error("{0}")]
    Rejected(String),
}

impl HostError {
    pub fn unavailable(service: &'static str, message: impl Into<String>) -> Self {
        HostError::Unavailable {
            service,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExpiryError {
    /// The submitted date could not be turned into a timestamp. Nothing was changed.
    #[error("invalid expiry date: {0}")]
    InvalidTimestamp(#[source] TimestampError),

    /// The edit guard refused the save. Nothing was changed.
    #[error("not allowed to edit {0}")]
    AuthorizationFailure(ItemId),

    /// Registering or retiring a deferred callback failed.
    ///
    /// Metadata written before the failure is kept; a reconciliation sweep can
    /// repair the missing registration.
    #[error("scheduler unavailable for {item}")]
    SchedulerUnavailable {
        item: ItemId,
        #[source]
        source: HostError,
    },

    #[error("metadata store failed for {item}")]
    Metadata {
        item: ItemId,
        #[source]
        source: HostError,
    },

    #[error("taxonomy failed")]
    Taxonomy(#[source] HostError),

    #[error("host failed")]
    Host(#[source] HostError),

    /// The stored expiry of an item is not in the persisted layout.
    #[error("stored expiry of {item} is corrupt")]
    CorruptRecord {
        item: ItemId,
        #[source]
        source: TimestampError,
    },

    #[error("handler not found for hook={0}")]
    HookNotFound(HookName),

    #[error("duplicate handler for hook={0}")]
    DuplicateHook(HookName),
}

impl From<TimestampError> for ExpiryError {
    fn from(err: TimestampError) -> Self {
        ExpiryError::InvalidTimestamp(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_item() {
        let err = ExpiryError::SchedulerUnavailable {
            item: ItemId::new(42),
            source: HostError::unavailable("scheduler", "connection refused"),
        };
        assert_eq!(err.to_string(), "scheduler unavailable for item-42");

        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "scheduler unavailable: connection refused");
    }

    #[test]
    fn timestamp_errors_become_invalid_timestamp() {
        let err: ExpiryError = TimestampError::Unrecognized("soon".into()).into();
        assert!(matches!(err, ExpiryError::InvalidTimestamp(_)));
        assert!(err.to_string().contains("soon"));
    }
}
