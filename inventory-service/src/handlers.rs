use futures::StreamExt;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::BorrowedMessage;
use rdkafka::{Message, Offset};
use shared::{BookingError, CatalogEvent};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::materializer::{MaterializeReport, Materializer};

/// Consumes catalog events and materializes inventory for whatever became sellable.
pub struct CatalogEventHandler {
    materializer: Arc<Materializer>,
    horizon_days: u32,
    redelivery_backoff: Duration,
}

impl CatalogEventHandler {
    pub fn new(materializer: Arc<Materializer>, horizon_days: u32, redelivery_backoff: Duration) -> Self {
        Self {
            materializer,
            horizon_days,
            redelivery_backoff,
        }
    }

    /// Offsets are committed once an event is applied or has failed for
    /// good. Transient failures rewind the partition so the event comes back.
    pub async fn run(&self, consumer: StreamConsumer) {
        let mut message_stream = consumer.stream();

        while let Some(message) = message_stream.next().await {
            match message {
                Ok(m) => {
                    if self.process(&m).await {
                        if let Err(e) = consumer.commit_message(&m, CommitMode::Async) {
                            error!("Error committing message: {}", e);
                        }
                    } else {
                        if let Err(e) = consumer.seek(m.topic(), m.partition(), Offset::Offset(m.offset()), Duration::from_secs(5)) {
                            error!("Error rewinding to offset {}: {}", m.offset(), e);
                        }
                        tokio::time::sleep(self.redelivery_backoff).await;
                    }
                }
                Err(e) => error!("Error receiving message: {}", e),
            }
        }
    }

    /// Returns whether the message is done with.
    async fn process(&self, m: &BorrowedMessage<'_>) -> bool {
        let Some(payload) = m.payload_view::<str>() else {
            return true;
        };
        let event = match payload.map_err(|e| e.to_string()).and_then(|json| {
            serde_json::from_str::<CatalogEvent>(json).map_err(|e| e.to_string())
        }) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping malformed catalog event: {}", e);
                return true;
            }
        };

        match self.handle_event(event.clone()).await {
            Ok(_) => true,
            Err(e) if e.is_transient() => {
                warn!(?event, "catalog event will be redelivered: {}", e);
                false
            }
            Err(e) => {
                error!(?event, kind = e.kind(), "Error handling catalog event: {}", e);
                true
            }
        }
    }

    /// Materialization is insert-if-absent, so redelivered events are harmless.
    /// Events for hotels that are not sellable are skipped.
    pub async fn handle_event(&self, event: CatalogEvent) -> Result<Vec<MaterializeReport>, BookingError> {
        let applied = match &event {
            CatalogEvent::HotelApproved { hotel_id } => {
                self.materializer
                    .materialize_hotel_if_sellable(*hotel_id, self.horizon_days)
                    .await?
            }
            CatalogEvent::RoomTypeCreated { room_type_id, .. } => self
                .materializer
                .materialize_room_type_if_sellable(*room_type_id, self.horizon_days)
                .await?
                .map(|report| vec![report]),
        };

        match applied {
            Some(reports) => {
                let inserted: usize = reports.iter().map(|r| r.inserted).sum();
                info!(?event, room_types = reports.len(), inserted, "catalog event applied");
                Ok(reports)
            }
            // A room type added to an unapproved hotel waits for the approval event.
            None => {
                info!(?event, "catalog event skipped, hotel not sellable");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{InventoryLedger, MemoryLedger};
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use shared::{FixedClock, HotelId, HotelView, MemoryCatalog, RoomTypeId, RoomTypeView, StayRange};
    use std::time::Duration;

    #[tokio::test]
    async fn room_type_waits_for_hotel_approval() {
        let catalog = Arc::new(MemoryCatalog::new());
        let ledger = Arc::new(MemoryLedger::new(Duration::from_secs(1)));
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let handler = CatalogEventHandler::new(
            Arc::new(Materializer::new(
                catalog.clone(),
                ledger.clone(),
                Arc::new(FixedClock::on(today)),
            )),
            30,
            Duration::from_millis(10),
        );

        let hotel_id = HotelId::new();
        let room_type_id = RoomTypeId::new();
        catalog
            .put_hotel(HotelView {
                id: hotel_id,
                name: "Old Mill".into(),
                rating: 4.1,
                sellable: false,
            })
            .await;
        catalog
            .put_room_type(RoomTypeView {
                id: room_type_id,
                hotel_id,
                name: "Loft".into(),
                total_capacity: 2,
                price: BigDecimal::from(95),
            })
            .await;

        let created = CatalogEvent::RoomTypeCreated { hotel_id, room_type_id };
        assert!(handler.handle_event(created.clone()).await.unwrap().is_empty());

        catalog.set_sellable(hotel_id, true).await;
        let reports = handler
            .handle_event(CatalogEvent::HotelApproved { hotel_id })
            .await
            .unwrap();
        assert_eq!(reports[0].inserted, 30);

        let redelivered = handler.handle_event(created).await.unwrap();
        assert_eq!(redelivered[0].inserted, 0);

        let days = ledger
            .days_for(room_type_id, &StayRange::starting_at(today, 30).unwrap())
            .await
            .unwrap();
        assert_eq!(days.len(), 30);
    }

    #[tokio::test]
    async fn unknown_hotel_is_reported() {
        let handler = CatalogEventHandler::new(
            Arc::new(Materializer::new(
                Arc::new(MemoryCatalog::new()),
                Arc::new(MemoryLedger::new(Duration::from_secs(1))),
                Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())),
            )),
            30,
            Duration::from_millis(10),
        );
        let err = handler
            .handle_event(CatalogEvent::HotelApproved { hotel_id: HotelId::new() })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn misconfigured_room_type_is_reported() {
        let catalog = Arc::new(MemoryCatalog::new());
        let handler = CatalogEventHandler::new(
            Arc::new(Materializer::new(
                catalog.clone(),
                Arc::new(MemoryLedger::new(Duration::from_secs(1))),
                Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())),
            )),
            30,
            Duration::from_millis(10),
        );
        let hotel_id = HotelId::new();
        let room_type_id = RoomTypeId::new();
        catalog
            .put_hotel(HotelView {
                id: hotel_id,
                name: "Crooked".into(),
                rating: 3.9,
                sellable: true,
            })
            .await;
        catalog
            .put_room_type(RoomTypeView {
                id: room_type_id,
                hotel_id,
                name: "Broken".into(),
                total_capacity: -2,
                price: BigDecimal::from(50),
            })
            .await;

        let err = handler
            .handle_event(CatalogEvent::RoomTypeCreated { hotel_id, room_type_id })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
        assert!(!err.is_transient());
    }
}
