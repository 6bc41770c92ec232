//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod controller;
pub mod led;
pub mod link_rx;
pub mod link_state;
pub mod tick;

pub use controller::{controller_task, BoardReminder};
pub use led::led_task;
pub use link_rx::link_rx_task;
pub use link_state::link_state_task;
pub use tick::tick_task;
