//! Tick task
//!
//! Drives [`Reminder::step`](pipli_core::Reminder::step) at the configured
//! period.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use crate::channels::TICK_SIGNAL;

#[embassy_executor::task]
pub async fn tick_task(tick_ms: u32) {
    info!("Tick task started ({} ms)", tick_ms);

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(tick_ms)));

    loop {
        ticker.next().await;
        TICK_SIGNAL.signal(Instant::now().as_millis());
    }
}
