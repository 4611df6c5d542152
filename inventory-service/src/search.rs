use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{BookingError, Catalog, HotelId, HotelView, InventoryDay, RoomTypeId, StayRange};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::ledger::InventoryLedger;

/// Catalog-level narrowing applied after the capacity check.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFilters {
    pub hotel_ids: Option<Vec<HotelId>>,
    pub max_price: Option<BigDecimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelAvailability {
    pub hotel: HotelView,
    /// Cheapest nightly price among the room types that cover every night.
    pub min_price: BigDecimal,
    pub room_type_ids: Vec<RoomTypeId>,
}

pub struct AvailabilitySearch {
    catalog: Arc<dyn Catalog>,
    ledger: Arc<dyn InventoryLedger>,
}

impl AvailabilitySearch {
    pub fn new(catalog: Arc<dyn Catalog>, ledger: Arc<dyn InventoryLedger>) -> Self {
        Self { catalog, ledger }
    }

    /// Hotels with at least one room type that has capacity on every night of
    /// `[check_in, check_out)`, best rated first, then cheapest.
    ///
    /// Reads whatever the ledger holds right now; confirmation re-checks.
    pub async fn search(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        filters: &SearchFilters,
    ) -> Result<Vec<HotelAvailability>, BookingError> {
        let stay = StayRange::new(check_in, check_out)?;
        let days = self.ledger.days_with_capacity(&stay).await?;
        let covered = fully_covered_room_types(&stay, &days);

        let mut by_hotel: HashMap<HotelId, (BigDecimal, Vec<RoomTypeId>)> = HashMap::new();
        for room_type_id in covered {
            let Some(room_type) = self.catalog.get_room_type(room_type_id).await? else {
                continue;
            };
            if let Some(allowed) = &filters.hotel_ids {
                if !allowed.contains(&room_type.hotel_id) {
                    continue;
                }
            }
            let entry = by_hotel
                .entry(room_type.hotel_id)
                .or_insert_with(|| (room_type.price.clone(), Vec::new()));
            if room_type.price < entry.0 {
                entry.0 = room_type.price.clone();
            }
            entry.1.push(room_type_id);
        }

        let mut results = Vec::with_capacity(by_hotel.len());
        for (hotel_id, (min_price, room_type_ids)) in by_hotel {
            let Some(hotel) = self.catalog.get_hotel(hotel_id).await? else {
                continue;
            };
            if !hotel.sellable {
                continue;
            }
            if filters.max_price.as_ref().is_some_and(|max| &min_price > max) {
                continue;
            }
            results.push(HotelAvailability {
                hotel,
                min_price,
                room_type_ids,
            });
        }

        results.sort_by(|a, b| {
            b.hotel
                .rating
                .total_cmp(&a.hotel.rating)
                .then_with(|| a.min_price.cmp(&b.min_price))
                .then_with(|| a.hotel.id.cmp(&b.hotel.id))
        });
        debug!(%stay, hotels = results.len(), "availability searched");
        Ok(results)
    }
}

/// Room types with capacity on every night of `stay`, given the ledger rows.
pub fn fully_covered_room_types(stay: &StayRange, days: &[InventoryDay]) -> BTreeSet<RoomTypeId> {
    let mut nights: BTreeMap<RoomTypeId, BTreeSet<NaiveDate>> = BTreeMap::new();
    for day in days.iter().filter(|d| stay.contains(d.date) && d.has_capacity()) {
        nights.entry(day.room_type_id).or_default().insert(day.date);
    }

    let wanted = stay.nights() as usize;
    nights
        .into_iter()
        .filter(|(_, dates)| dates.len() == wanted)
        .map(|(room_type_id, _)| room_type_id)
        .collect()
}
