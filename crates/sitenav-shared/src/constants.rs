//! Application-wide constants

pub const MAX_MENU_NAME_LENGTH: usize = 100;
pub const MAX_MENU_URL_LENGTH: usize = 500;
pub const MAX_MENU_ICON_LENGTH: usize = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;
