//! Build information reported by the admin `healthz` route and stamped
//! onto every log record.

pub const NAME: &str = "booking";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const REVISION: Option<&str> = option_env!("BOOKING_REVISION");

pub const BUILD_TIMESTAMP: Option<&str> = option_env!("BUILD_TIMESTAMP");
