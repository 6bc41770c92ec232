//! Main controller task
//!
//! Owns the [`Reminder`] and is the only place it is touched. Link events
//! are applied as they arrive; ticks advance the state machine.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::uart::BufferedUartTx;
use embassy_time::Delay;

use pipli_core::Reminder;
use pipli_hal_rp2040::clock::EmbassyClock;
use pipli_hal_rp2040::flash::Rp2040FlashStorage;
use pipli_hal_rp2040::gpio::{Rp2040Input, Rp2040Output};
use pipli_hal_rp2040::link::BleUartLink;

use crate::channels::{LINK_EVENTS, TICK_SIGNAL};

/// The reminder wired to this board's peripherals
pub type BoardReminder = Reminder<
    EmbassyClock,
    Rp2040FlashStorage<'static>,
    Rp2040Output<'static>,
    Rp2040Input<'static>,
    BleUartLink<BufferedUartTx>,
    Delay,
>;

#[embassy_executor::task]
pub async fn controller_task(mut reminder: BoardReminder) {
    info!(
        "Controller task started in {:?}, session origin {}",
        reminder.state(),
        reminder.session_origin()
    );

    let mut last_state = reminder.state();

    loop {
        match select(LINK_EVENTS.receive(), TICK_SIGNAL.wait()).await {
            Either::First(event) => {
                reminder.handle_link_event(event);
            }
            Either::Second(_now_ms) => {
                reminder.step();
            }
        }

        let state = reminder.state();
        if state != last_state {
            debug!("State: {:?} -> {:?}", last_state, state);
            last_state = state;
        }
    }
}
