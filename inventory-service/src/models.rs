use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use shared::InventoryDay;
use uuid::Uuid;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::inventory_days)]
pub struct InventoryDayRow {
    pub room_type_id: Uuid,
    pub stay_date: NaiveDate,
    pub total: i32,
    pub available: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::inventory_days)]
pub struct NewInventoryDay {
    pub room_type_id: Uuid,
    pub stay_date: NaiveDate,
    pub total: i32,
    pub available: i32,
}

impl From<InventoryDayRow> for InventoryDay {
    fn from(row: InventoryDayRow) -> Self {
        Self {
            room_type_id: row.room_type_id.into(),
            date: row.stay_date,
            total: row.total,
            available: row.available,
        }
    }
}

impl From<&InventoryDay> for NewInventoryDay {
    fn from(day: &InventoryDay) -> Self {
        Self {
            room_type_id: day.room_type_id.as_uuid(),
            stay_date: day.date,
            total: day.total,
            available: day.available,
        }
    }
}
