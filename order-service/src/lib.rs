pub mod api;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod schema;
pub mod store;
pub mod sweeper;

pub use handlers::PaymentEventHandler;
pub use lifecycle::OrderService;
pub use store::{MemoryOrderStore, OrderStore, PgOrderStore};
pub use sweeper::CompletionSweeper;
