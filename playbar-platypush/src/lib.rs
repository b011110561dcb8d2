pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod events;

pub use backend::PlatypushBackend;
pub use client::PlatypushClient;
pub use config::{CONFIG_TEMPLATE as PLATYPUSH_CONFIG_TEMPLATE, PlatypushConfig, PROVIDER_NAME};
pub use error::PlatypushError;
pub use events::{parse_event, EventListener};
