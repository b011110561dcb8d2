pub mod backend;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod panels;
pub mod paths;
pub mod playback;
pub mod time;
pub mod view;
pub mod widget;

#[cfg(test)]
mod testing;

pub use backend::{EventSubscription, PlayerBackend, EVENT_CHANNEL_CAPACITY};
pub use clock::{progress_percent, ClockEstimator, ClockReading, TICK_PERIOD};
pub use config::{
    build_config_template, BackendConfig, BackendSource, LoggingConfig, PlaybarConfig,
    ProvidersConfig, WidgetConfig,
};
pub use dispatcher::EventDispatcher;
pub use error::CoreError;
pub use event::{EventKind, PlayerEvent};
pub use panels::PanelVisibility;
pub use paths::{log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME};
pub use playback::{PlaybackStatus, PlayerState, Track, UNTITLED};
pub use time::{format_time, DurationExt, UNKNOWN_TIME};
pub use view::{Notification, NotificationIcon, WidgetView};
pub use widget::{Widget, WidgetOptions};
