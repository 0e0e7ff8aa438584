pub mod bus;
pub mod error;
pub mod event;
pub mod pull;
pub mod registry;
pub mod schema;
pub mod telemetry;
pub mod time;
