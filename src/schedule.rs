//! Daily re-run loop.
//!
//! The loop wakes once a minute and fires when the local time has reached the
//! trigger time and no run has happened yet today. A wake-up that lands late
//! (suspended machine, long previous run) still fires the same day; a day
//! that is missed entirely is not made up. Starting after today's trigger
//! time waits for tomorrow.

use crate::downloader::Downloader;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::time::Duration;
use tracing::{error, info, instrument};

pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
    last_run: Option<NaiveDate>,
}

impl DailySchedule {
    pub fn new(at: NaiveTime) -> Self {
        Self { at, last_run: None }
    }

    /// A schedule created at `now`: if today's trigger time has already
    /// passed, the first run is tomorrow.
    pub fn starting_at(at: NaiveTime, now: NaiveDateTime) -> Self {
        let mut schedule = Self::new(at);
        if now.time() > at {
            schedule.mark_run(now.date());
        }
        schedule
    }

    pub fn last_run(&self) -> Option<NaiveDate> {
        self.last_run
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now.time() >= self.at && self.last_run != Some(now.date())
    }

    pub fn mark_run(&mut self, date: NaiveDate) {
        self.last_run = Some(date);
    }
}

/// Runs the full sync once a day, forever.
///
/// Errors from a single run are logged and the loop keeps going.
#[instrument(skip(downloader))]
pub async fn run_daily(downloader: &Downloader, at: NaiveTime) {
    let mut schedule = DailySchedule::starting_at(at, Local::now().naive_local());
    info!("Waiting for daily run at {}", at.format("%H:%M"));

    loop {
        let now = Local::now().naive_local();
        if schedule.is_due(now) {
            schedule.mark_run(now.date());
            if let Err(e) = downloader.run_once().await {
                error!("Scheduled run failed: {}", e);
            }
            info!("Next run tomorrow at {}", at.format("%H:%M"));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
