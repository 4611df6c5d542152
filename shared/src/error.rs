use chrono::NaiveDate;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::pooled_connection::PoolError;

use crate::ids::RoomTypeId;
use crate::order::{OrderAction, OrderStatus};

/// Failure taxonomy of the booking engine.
///
/// `Validation` and `NotFound` are raised before any side effect. `StateConflict`
/// and `InsufficientInventory` are business outcomes handed back to the caller.
/// `Busy` means a lock could not be taken in time and nothing was written.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("cannot {action} an order that is {from}")]
    StateConflict { from: OrderStatus, action: OrderAction },

    #[error("no capacity left for room type {room_type_id} on {date}")]
    InsufficientInventory { room_type_id: RoomTypeId, date: NaiveDate },

    #[error("resource busy: {0}")]
    Busy(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl BookingError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable name of the variant.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::StateConflict { .. } => "state_conflict",
            Self::InsufficientInventory { .. } => "insufficient_inventory",
            Self::Busy(_) => "busy",
            Self::Storage(_) => "storage",
        }
    }

    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy(_))
    }

    /// True when the same input may succeed later: lock contention or an
    /// infrastructure failure. Consumers redeliver such messages instead of
    /// acknowledging them.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Busy(_) | Self::Storage(_))
    }

    /// HTTP status the service APIs answer with.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 422,
            Self::NotFound { .. } => 404,
            Self::StateConflict { .. } | Self::InsufficientInventory { .. } => 409,
            Self::Busy(_) => 503,
            Self::Storage(_) => 500,
        }
    }
}

impl From<DieselError> for BookingError {
    fn from(e: DieselError) -> Self {
        match &e {
            DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, info) => {
                Self::Busy(info.message().to_string())
            }
            // lock_timeout surfaces as SQLSTATE 55P03, which diesel neither
            // classifies nor exposes, so the server message is matched instead.
            // This assumes the server reports in English (lc_messages = 'C' or
            // 'en_*'); other locales degrade these errors to Storage, which is
            // still redelivered by the consumers.
            DieselError::DatabaseError(_, info)
                if info.message().contains("lock timeout")
                    || info.message().contains("could not obtain lock") =>
            {
                Self::Busy(info.message().to_string())
            }
            _ => Self::Storage(e.to_string()),
        }
    }
}

impl From<bb8::RunError<PoolError>> for BookingError {
    fn from(e: bb8::RunError<PoolError>) -> Self {
        match e {
            bb8::RunError::TimedOut => Self::Busy("timed out waiting for a database connection".into()),
            bb8::RunError::User(e) => Self::Storage(e.to_string()),
        }
    }
}
