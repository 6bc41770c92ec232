//! Events that trigger state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Link events
    /// A new schedule was ingested
    ScheduleAccepted,
    /// Connection came up while a schedule is loaded
    LinkRestored,

    // Selector events
    /// The earliest outstanding slot is due
    SlotDue,
    /// An outstanding slot exists but is not due yet
    NothingDue,
    /// Every slot answered and the link is up
    AllRespondedOnline,
    /// Every slot answered and the link is down
    AllRespondedOffline,

    // Timing events
    /// Alert ran for the configured duration
    AlertElapsed,
    /// Response window closed without a press
    ResponseTimedOut,

    // User events
    /// Button pressed while waiting for a response
    Acknowledged,

    // Report events
    /// Report send attempt completed (sent or link unavailable)
    ReportFinished,

    // Failure events
    /// Active slot no longer resolves
    SlotLost,
}
