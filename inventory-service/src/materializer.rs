use chrono::NaiveDate;
use serde::Serialize;
use shared::{BookingError, Catalog, Clock, HotelId, InventoryDay, RoomTypeId, RoomTypeView, StayRange};
use std::sync::Arc;
use tracing::{error, info};

use crate::ledger::InventoryLedger;

pub const DEFAULT_HORIZON_DAYS: u32 = 180;
/// Two years of nights per room type.
pub const MAX_HORIZON_DAYS: u32 = 730;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    pub room_type_id: RoomTypeId,
    pub from: NaiveDate,
    pub horizon_days: u32,
    pub inserted: usize,
    pub already_present: usize,
}

/// Creates the ledger rows that make a room type bookable.
///
/// Rows are inserted only where missing, starting today, so re-running after
/// a re-approval backfills new nights without touching sold capacity or the
/// past.
pub struct Materializer {
    catalog: Arc<dyn Catalog>,
    ledger: Arc<dyn InventoryLedger>,
    clock: Arc<dyn Clock>,
}

impl Materializer {
    pub fn new(catalog: Arc<dyn Catalog>, ledger: Arc<dyn InventoryLedger>, clock: Arc<dyn Clock>) -> Self {
        Self { catalog, ledger, clock }
    }

    pub async fn materialize_room_type(
        &self,
        room_type_id: RoomTypeId,
        horizon_days: u32,
    ) -> Result<MaterializeReport, BookingError> {
        self.materialize_room_type_if_sellable(room_type_id, horizon_days)
            .await?
            .ok_or_else(|| {
                BookingError::Validation(format!(
                    "room type {room_type_id} belongs to a hotel that is not approved for sale"
                ))
            })
    }

    /// Returns `Ok(None)` instead of failing when the owning hotel is not
    /// sellable.
    pub async fn materialize_room_type_if_sellable(
        &self,
        room_type_id: RoomTypeId,
        horizon_days: u32,
    ) -> Result<Option<MaterializeReport>, BookingError> {
        check_horizon(horizon_days)?;
        let room_type = self.catalog.require_room_type(room_type_id).await?;
        let hotel = self.catalog.require_hotel(room_type.hotel_id).await?;
        if !hotel.sellable {
            return Ok(None);
        }
        self.materialize(&room_type, horizon_days).await.map(Some)
    }

    /// Materializes every room type of a freshly (re-)approved hotel.
    pub async fn materialize_hotel(
        &self,
        hotel_id: HotelId,
        horizon_days: u32,
    ) -> Result<Vec<MaterializeReport>, BookingError> {
        self.materialize_hotel_if_sellable(hotel_id, horizon_days)
            .await?
            .ok_or_else(|| BookingError::Validation(format!("hotel {hotel_id} is not approved for sale")))
    }

    /// Every room type is attempted even when an earlier one fails; the first
    /// failure is returned after the rest have been materialized.
    pub async fn materialize_hotel_if_sellable(
        &self,
        hotel_id: HotelId,
        horizon_days: u32,
    ) -> Result<Option<Vec<MaterializeReport>>, BookingError> {
        check_horizon(horizon_days)?;
        let hotel = self.catalog.require_hotel(hotel_id).await?;
        if !hotel.sellable {
            return Ok(None);
        }

        let mut reports = Vec::new();
        let mut first_failure = None;
        for room_type in self.catalog.room_types_of(hotel_id).await? {
            match self.materialize(&room_type, horizon_days).await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!(%hotel_id, room_type_id = %room_type.id, "room type not materialized: {}", e);
                    first_failure.get_or_insert(e);
                }
            }
        }
        match first_failure {
            Some(e) => Err(e),
            None => Ok(Some(reports)),
        }
    }

    async fn materialize(&self, room_type: &RoomTypeView, horizon_days: u32) -> Result<MaterializeReport, BookingError> {
        if room_type.total_capacity < 0 {
            return Err(BookingError::Validation(format!(
                "room type {} has negative capacity {}",
                room_type.id, room_type.total_capacity
            )));
        }

        let horizon = StayRange::starting_at(self.clock.today(), horizon_days)?;
        let days = horizon
            .dates()
            .map(|date| InventoryDay::fresh(room_type.id, date, room_type.total_capacity))
            .collect();
        let inserted = self.ledger.insert_missing(days).await?;

        let report = MaterializeReport {
            room_type_id: room_type.id,
            from: horizon.check_in(),
            horizon_days,
            inserted,
            already_present: horizon_days as usize - inserted,
        };
        info!(
            room_type_id = %report.room_type_id,
            from = %report.from,
            inserted = report.inserted,
            already_present = report.already_present,
            "inventory materialized"
        );
        Ok(report)
    }
}

fn check_horizon(horizon_days: u32) -> Result<(), BookingError> {
    if horizon_days == 0 {
        return Err(BookingError::Validation("horizon must cover at least one day".into()));
    }
    if horizon_days > MAX_HORIZON_DAYS {
        return Err(BookingError::Validation(format!(
            "horizon of {horizon_days} days exceeds the maximum of {MAX_HORIZON_DAYS}"
        )));
    }
    Ok(())
}
