use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use shared::{BookingError, GuestContact, Order, RoomNumber, StayRange};
use uuid::Uuid;

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct OrderRow {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub room_type_id: Uuid,
    pub user_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i32,
    pub guest_name: String,
    pub guest_phone: String,
    pub total_price: BigDecimal,
    pub status: String,
    pub assigned_room_number: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_uuid(),
            hotel_id: order.hotel_id.as_uuid(),
            room_type_id: order.room_type_id.as_uuid(),
            user_id: order.user_id.as_uuid(),
            check_in: order.stay.check_in(),
            check_out: order.stay.check_out(),
            nights: order.nights() as i32,
            guest_name: order.guest.name.clone(),
            guest_phone: order.guest.phone.clone(),
            total_price: order.total_price.clone(),
            status: order.status.as_str().to_string(),
            assigned_room_number: order.assigned_room_number.as_ref().map(|r| r.as_str().to_string()),
            confirmed_at: order.confirmed_at,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = BookingError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let corrupt = |what: &str, e: BookingError| BookingError::Storage(format!("order {} has invalid {what}: {e}", row.id));

        let stay = StayRange::new(row.check_in, row.check_out).map_err(|e| corrupt("stay", e))?;
        let status = row.status.parse().map_err(|e| corrupt("status", e))?;
        let assigned_room_number = row
            .assigned_room_number
            .as_deref()
            .map(RoomNumber::parse)
            .transpose()
            .map_err(|e| corrupt("room number", e))?;

        Ok(Self {
            id: row.id.into(),
            hotel_id: row.hotel_id.into(),
            room_type_id: row.room_type_id.into(),
            user_id: row.user_id.into(),
            stay,
            guest: GuestContact {
                name: row.guest_name,
                phone: row.guest_phone,
            },
            total_price: row.total_price,
            status,
            assigned_room_number,
            confirmed_at: row.confirmed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
