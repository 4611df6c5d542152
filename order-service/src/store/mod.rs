mod memory;
mod pg;

pub use memory::MemoryOrderStore;
pub use pg::PgOrderStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::{BookingError, Order, OrderAction, OrderId, RoomNumber};

/// Persistence for orders. `confirm` is the only write that touches the
/// inventory ledger, and it does so in the same atomic unit as the status
/// change: either both land or neither does.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<(), BookingError>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>, BookingError>;

    /// Applies a transition that has no ledger effect (`Pay`, `Complete`).
    async fn advance(&self, id: OrderId, action: OrderAction, now: DateTime<Utc>) -> Result<Order, BookingError>;

    /// `PendingConfirmation -> PendingCheckIn` plus the ledger decrement for
    /// every night of the stay.
    async fn confirm(&self, id: OrderId, room: RoomNumber, now: DateTime<Utc>) -> Result<Order, BookingError>;

    /// Orders in `PendingCheckIn` whose check-out is on or before `today`.
    async fn due_for_completion(&self, today: NaiveDate) -> Result<Vec<OrderId>, BookingError>;
}

pub(crate) fn apply_ledger_free(order: &mut Order, action: OrderAction, now: DateTime<Utc>) -> Result<(), BookingError> {
    match action {
        OrderAction::Pay => order.pay(now),
        OrderAction::Complete => order.complete(now),
        OrderAction::Confirm => Err(BookingError::Validation(
            "confirmation requires a room number".into(),
        )),
    }
}

pub(crate) fn order_not_found(id: OrderId) -> BookingError {
    BookingError::not_found("order", id)
}
