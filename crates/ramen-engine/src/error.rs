//! # Engine Error Types
//!
//! Composes the business rule errors from ramen-core with the database
//! errors from ramen-db, and adds the one failure only the orchestration
//! layer can observe: stock decremented but the sale never recorded.

use thiserror::Error;

use ramen_core::CoreError;
use ramen_db::DbError;

/// Errors raised by the fulfillment engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Business rule violation (insufficient stock, bad transition, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database operation failure.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Stock was deducted and committed, but appending the sale record
    /// failed afterwards. The ledgers disagree until an operator
    /// reconciles them; stock is NOT restored automatically, because a
    /// blind compensating increment could itself fail or double-restore.
    #[error(
        "stock deducted for {item_name} x{quantity} but the sale record \
         could not be written: {source}"
    )]
    StockDecrementedUnrecorded {
        item_name: String,
        quantity: i64,
        #[source]
        source: DbError,
    },
}

impl EngineError {
    /// True when the error is a business rule rejection rather than an
    /// infrastructure failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, EngineError::Core(_))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_are_rejections() {
        let err: EngineError = CoreError::ItemNotFound("ramen-1".to_string()).into();
        assert!(err.is_rejection());

        let err: EngineError = DbError::PoolExhausted.into();
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_unrecorded_message_names_the_sale() {
        let err = EngineError::StockDecrementedUnrecorded {
            item_name: "Shoyu Ramen".to_string(),
            quantity: 2,
            source: DbError::PoolExhausted,
        };
        assert!(err.to_string().contains("Shoyu Ramen x2"));
    }
}
