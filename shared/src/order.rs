use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BookingError;
use crate::ids::{HotelId, OrderId, RoomTypeId, UserId};
use crate::stay::StayRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingPayment,
    PendingConfirmation,
    PendingCheckIn,
    Completed,
}

/// Caller- or scheduler-driven event that moves an order forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    Pay,
    Confirm,
    Complete,
}

impl OrderStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingPayment => "pending_payment",
            Self::PendingConfirmation => "pending_confirmation",
            Self::PendingCheckIn => "pending_check_in",
            Self::Completed => "completed",
        }
    }

    /// The lifecycle transition table. Anything not listed is a conflict.
    pub fn apply(self, action: OrderAction) -> Result<Self, BookingError> {
        match (self, action) {
            (Self::PendingPayment, OrderAction::Pay) => Ok(Self::PendingConfirmation),
            (Self::PendingConfirmation, OrderAction::Confirm) => Ok(Self::PendingCheckIn),
            (Self::PendingCheckIn, OrderAction::Complete) => Ok(Self::Completed),
            (from, action) => Err(BookingError::StateConflict { from, action }),
        }
    }

    /// True once the ledger has been charged for this order.
    pub const fn holds_inventory(self) -> bool {
        matches!(self, Self::PendingCheckIn | Self::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payment" => Ok(Self::PendingPayment),
            "pending_confirmation" => Ok(Self::PendingConfirmation),
            "pending_check_in" => Ok(Self::PendingCheckIn),
            "completed" => Ok(Self::Completed),
            other => Err(BookingError::Storage(format!("unknown order status {other:?}"))),
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pay => "pay",
            Self::Confirm => "confirm",
            Self::Complete => "complete",
        })
    }
}

/// Physical room handed to the guest at confirmation. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomNumber(String);

impl RoomNumber {
    pub fn parse(raw: &str) -> Result<Self, BookingError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BookingError::Validation("room number must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestContact {
    pub name: String,
    pub phone: String,
}

impl GuestContact {
    pub fn new(name: &str, phone: &str) -> Result<Self, BookingError> {
        let (name, phone) = (name.trim(), phone.trim());
        if name.is_empty() {
            return Err(BookingError::Validation("guest name is required".into()));
        }
        if phone.is_empty() {
            return Err(BookingError::Validation("guest phone is required".into()));
        }
        Ok(Self {
            name: name.to_string(),
            phone: phone.to_string(),
        })
    }
}

/// Guest input for `create_order`, before catalog validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub hotel_id: HotelId,
    pub room_type_id: RoomTypeId,
    pub user_id: UserId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_name: String,
    pub guest_phone: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub hotel_id: HotelId,
    pub room_type_id: RoomTypeId,
    pub user_id: UserId,
    pub stay: StayRange,
    pub guest: GuestContact,
    pub total_price: BigDecimal,
    pub status: OrderStatus,
    pub assigned_room_number: Option<RoomNumber>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        hotel_id: HotelId,
        room_type_id: RoomTypeId,
        user_id: UserId,
        stay: StayRange,
        guest: GuestContact,
        nightly_price: &BigDecimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            hotel_id,
            room_type_id,
            user_id,
            stay,
            guest,
            total_price: nightly_price * BigDecimal::from(stay.nights()),
            status: OrderStatus::PendingPayment,
            assigned_room_number: None,
            confirmed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn nights(&self) -> u32 {
        self.stay.nights()
    }

    pub fn pay(&mut self, now: DateTime<Utc>) -> Result<(), BookingError> {
        self.status = self.status.apply(OrderAction::Pay)?;
        self.updated_at = now;
        Ok(())
    }

    /// Moves the order to `PendingCheckIn`. The caller owns the ledger side.
    pub fn confirm(&mut self, room: RoomNumber, now: DateTime<Utc>) -> Result<(), BookingError> {
        self.status = self.status.apply(OrderAction::Confirm)?;
        self.assigned_room_number = Some(room);
        self.confirmed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), BookingError> {
        self.status = self.status.apply(OrderAction::Complete)?;
        self.updated_at = now;
        Ok(())
    }

    pub fn detail(&self) -> OrderDetail {
        let confirmed = self.status.holds_inventory();
        OrderDetail {
            id: self.id,
            hotel_id: self.hotel_id,
            room_type_id: self.room_type_id,
            user_id: self.user_id,
            check_in: self.stay.check_in(),
            check_out: self.stay.check_out(),
            nights: self.nights(),
            guest_name: self.guest.name.clone(),
            guest_phone: self.guest.phone.clone(),
            total_price: self.total_price.clone(),
            status: self.status,
            assigned_room_number: self.assigned_room_number.clone().filter(|_| confirmed),
            confirmation_timestamp: self.confirmed_at.filter(|_| confirmed),
            created_at: self.created_at,
        }
    }
}

/// Read view of an order. Confirmation fields are omitted until the order
/// reaches `PendingCheckIn`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: OrderId,
    pub hotel_id: HotelId,
    pub room_type_id: RoomTypeId,
    pub user_id: UserId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: u32,
    pub guest_name: String,
    pub guest_phone: String,
    pub total_price: BigDecimal,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_room_number: Option<RoomNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
