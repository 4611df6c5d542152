pub mod api;
pub mod handlers;
pub mod ledger;
pub mod materializer;
pub mod models;
pub mod schema;
pub mod search;

pub use ledger::{InventoryLedger, MemoryLedger, PgLedger};
pub use materializer::{MaterializeReport, Materializer, DEFAULT_HORIZON_DAYS, MAX_HORIZON_DAYS};
pub use search::{AvailabilitySearch, HotelAvailability, SearchFilters};
