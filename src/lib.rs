pub mod config;
pub mod core;
pub mod error;
pub mod log;
pub mod render;
pub mod store;
pub mod util;

pub use error::{Error, Result};
pub use store::ReactiveStore;
