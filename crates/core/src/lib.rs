pub mod config;
pub mod consts;
pub mod error;
pub mod inventory;
pub mod model;
pub mod segment;
pub mod sink;
pub mod time;

pub use error::{Result, SpantopoError};
