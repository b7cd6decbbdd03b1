use std::sync::Arc;

use log::Logger;
use time::{Date, UtcOffset};

use crate::dates;
use crate::db::Db;
use crate::urls::Urls;

/// Supplies the date that separates past shows from upcoming ones.
pub type Clock = dyn Fn() -> Date + Send + Sync;

#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub db: Arc<dyn Db + Send + Sync>,
    pub urls: Arc<Urls>,
    pub clock: Arc<Clock>,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        db: Arc<dyn Db + Send + Sync>,
        urls: Arc<Urls>,
        clock: Arc<Clock>,
    ) -> Self {
        Self {
            logger,
            db,
            urls,
            clock,
        }
    }

    /// Returns the current date according to the clock.
    pub fn today(&self) -> Date {
        (self.clock)()
    }
}

/// A clock following the system time at the given offset.
pub fn system_clock(offset: UtcOffset) -> Arc<Clock> {
    Arc::new(move || dates::today(offset))
}

/// A clock stuck on one date.
pub fn fixed_clock(date: Date) -> Arc<Clock> {
    Arc::new(move || date)
}
