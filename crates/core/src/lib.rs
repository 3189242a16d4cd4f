pub mod config;
pub mod error;
pub mod event;
pub mod record;
pub mod series;

pub use config::EngineConfig;
pub use error::*;
pub use event::*;
pub use record::*;
pub use series::*;
