use chrono::NaiveDate;
use shared::{
    BookingError, Catalog, Clock, GuestContact, Order, OrderAction, OrderDetail, OrderId, OrderRequest, RoomNumber,
    StayRange, UserDirectory,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::store::OrderStore;

/// Entry point for every order operation. Validation happens here, before
/// the store is touched; state changes and the ledger are the store's job.
pub struct OrderService {
    catalog: Arc<dyn Catalog>,
    users: Arc<dyn UserDirectory>,
    store: Arc<dyn OrderStore>,
    clock: Arc<dyn Clock>,
}

impl OrderService {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        users: Arc<dyn UserDirectory>,
        store: Arc<dyn OrderStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            users,
            store,
            clock,
        }
    }

    /// Creates a `PendingPayment` order priced at the room type's nightly
    /// rate times the number of nights. Does not reserve inventory.
    pub async fn create_order(&self, request: OrderRequest) -> Result<Order, BookingError> {
        let stay = StayRange::new(request.check_in, request.check_out)?;
        let guest = GuestContact::new(&request.guest_name, &request.guest_phone)?;

        let hotel = self.catalog.require_hotel(request.hotel_id).await?;
        if !hotel.sellable {
            return Err(BookingError::Validation(format!("hotel {} is not open for booking", hotel.id)));
        }
        let room_type = self.catalog.require_room_type(request.room_type_id).await?;
        if room_type.hotel_id != hotel.id {
            return Err(BookingError::Validation(format!(
                "room type {} does not belong to hotel {}",
                room_type.id, hotel.id
            )));
        }
        if !self.users.user_exists(request.user_id).await? {
            return Err(BookingError::not_found("user", request.user_id));
        }

        let order = Order::new(
            hotel.id,
            room_type.id,
            request.user_id,
            stay,
            guest,
            &room_type.price,
            self.clock.now(),
        );
        self.store.insert(&order).await?;
        info!(order_id = %order.id, room_type_id = %order.room_type_id, %stay, total = %order.total_price, "order created");
        Ok(order)
    }

    pub async fn pay_order(&self, id: OrderId) -> Result<Order, BookingError> {
        let order = self.store.advance(id, OrderAction::Pay, self.clock.now()).await?;
        info!(order_id = %id, "order paid");
        Ok(order)
    }

    /// Assigns `room_number` and takes one unit of inventory for every night.
    /// On any failure the order stays `PendingConfirmation` and the ledger is
    /// unchanged.
    pub async fn confirm_order(&self, id: OrderId, room_number: &str) -> Result<Order, BookingError> {
        let room = RoomNumber::parse(room_number)?;
        match self.store.confirm(id, room, self.clock.now()).await {
            Ok(order) => {
                info!(order_id = %id, room = room_number.trim(), %order.stay, "order confirmed");
                Ok(order)
            }
            Err(e) => {
                warn!(order_id = %id, kind = e.kind(), "order confirmation rejected: {}", e);
                Err(e)
            }
        }
    }

    pub async fn get_order_detail(&self, id: OrderId) -> Result<OrderDetail, BookingError> {
        self.store
            .get(id)
            .await?
            .map(|order| order.detail())
            .ok_or_else(|| BookingError::not_found("order", id))
    }

    /// Completes every checked-in order whose check-out date has arrived.
    /// Returns how many were completed.
    pub async fn complete_checked_out(&self, today: NaiveDate) -> Result<usize, BookingError> {
        let due = self.store.due_for_completion(today).await?;
        let mut completed = 0;
        for id in due {
            match self.store.advance(id, OrderAction::Complete, self.clock.now()).await {
                Ok(_) => completed += 1,
                // Completed by a concurrent sweep.
                Err(BookingError::StateConflict { .. }) => {}
                Err(e) if e.is_retryable() => {
                    warn!(order_id = %id, "order busy, completion deferred: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
        if completed > 0 {
            info!(%today, completed, "checked-out orders completed");
        }
        Ok(completed)
    }
}
