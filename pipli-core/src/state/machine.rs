//! State machine definition
//!
//! Actuator and transport behavior is a function of the current state
//! and an event.

use super::events::Event;

/// Reminder states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// No schedule, or nothing to do until the link comes back
    Idle,
    /// Looking for the next due slot each tick
    Processing,
    /// Vibration motor running for a due slot
    Alerting,
    /// Motor off, waiting for the button
    AwaitingResponse,
    /// Sending the completed schedule back
    Reporting,
}

impl State {
    /// Initial state after boot
    pub fn initial(schedule_restored: bool) -> Self {
        if schedule_restored {
            State::Processing
        } else {
            State::Idle
        }
    }

    /// Check if this state drives the actuator
    pub fn actuator_on(&self) -> bool {
        matches!(self, State::Alerting)
    }

    /// Check if this state holds an active slot
    pub fn has_active_slot(&self) -> bool {
        matches!(self, State::Alerting | State::AwaitingResponse)
    }

    /// Process an event and return the next state
    ///
    /// This is the core state transition logic.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // A new schedule supersedes whatever was in progress
            (_, ScheduleAccepted) => Processing,
            (_, SlotLost) => Idle,

            // Idle transitions
            (Idle, LinkRestored) => Processing,

            // Processing transitions
            (Processing, SlotDue) => Alerting,
            (Processing, NothingDue) => Processing,
            (Processing, AllRespondedOnline) => Reporting,
            (Processing, AllRespondedOffline) => Idle,

            // Alerting transitions
            (Alerting, AlertElapsed) => AwaitingResponse,

            // AwaitingResponse transitions
            (AwaitingResponse, Acknowledged) => Processing,
            (AwaitingResponse, ResponseTimedOut) => Processing,

            // Reporting transitions
            (Reporting, ReportFinished) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
