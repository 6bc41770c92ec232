//! Reminder context
//!
//! Owns the schedule, the state machine and every collaborator. The
//! firmware's controller task is its only caller: it calls [`Reminder::step`]
//! on every tick and [`Reminder::handle_link_event`] for each queued link
//! event, so all mutation happens in one place.
//!
//! ```text
//!  Idle ──ScheduleAccepted──► Processing ──SlotDue──► Alerting
//!   ▲  ◄──AllRespondedOffline──┘  │  ▲                  │ AlertElapsed
//!   │                  AllResp.   │  └──Ack/TimedOut── AwaitingResponse
//!   └──ReportFinished── Reporting ◄┘
//! ```

use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;
use pipli_hal::{Clock, FlashStorage, InputPin, LinkError, OutputPin, StorageKey, Transport};
use pipli_protocol::{classify, encode_report, EncodeError, Inbound, ReportChunks};

use crate::config::DeviceConfig;
use crate::journal;
use crate::reconcile::reconcile;
use crate::schedule::{
    persist, restore, select, IndexError, Millis, ScheduleStore, SlotRef,
};
use crate::state::{Event, State};

/// Something that happened on the wireless link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Connected,
    Disconnected,
    /// One complete inbound payload
    Payload(Vec<u8>),
}

/// Report could not be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// No schedule loaded
    NoSchedule,
    /// Link down before or during the send; try again later
    TransportUnavailable,
    /// Report serialization failed
    Encode(EncodeError),
    /// Link rejected a chunk
    Link(LinkError),
}

impl From<EncodeError> for ReportError {
    fn from(e: EncodeError) -> Self {
        ReportError::Encode(e)
    }
}

impl From<LinkError> for ReportError {
    fn from(e: LinkError) -> Self {
        match e {
            LinkError::NotConnected => ReportError::TransportUnavailable,
            e => ReportError::Link(e),
        }
    }
}

/// Hardware the reminder drives
pub struct Devices<C, S, A, B, T, D> {
    /// Free-running millisecond clock
    pub clock: C,
    /// Schedule and checkpoint storage
    pub storage: S,
    /// Vibration motor
    pub actuator: A,
    /// Acknowledge button, high while pressed
    pub button: B,
    /// Outbound link
    pub transport: T,
    /// Inter-chunk pause
    pub delay: D,
}

/// The reminder scheduler
pub struct Reminder<C, S, A, B, T, D> {
    config: DeviceConfig,
    devices: Devices<C, S, A, B, T, D>,
    store: ScheduleStore,
    state: State,
    /// Origin used for due times this boot
    session_origin: Millis,
    /// Slot being alerted or awaiting a response
    active: Option<SlotRef>,
    /// When the current Alerting/AwaitingResponse phase began
    phase_started: Millis,
    last_checkpoint: Millis,
    /// Button level at the previous AwaitingResponse tick
    button_was_pressed: bool,
}

impl<C, S, A, B, T, D> Reminder<C, S, A, B, T, D>
where
    C: Clock,
    S: FlashStorage,
    A: OutputPin,
    B: InputPin,
    T: Transport,
    D: DelayNs,
{
    /// Restore the persisted schedule, reconcile it with the current boot
    /// and pick the initial state
    pub fn start(config: DeviceConfig, mut devices: Devices<C, S, A, B, T, D>) -> Self {
        devices.actuator.set_low();
        let now = millis(&devices.clock);
        let mut store = ScheduleStore::new();
        let mut session_origin = now;

        if !devices.storage.exists(StorageKey::Schedule) {
            info!("no stored schedule");
        } else {
            match restore(&mut devices.storage) {
                Ok(doc) => {
                    let last_known = journal::load(&mut devices.storage);
                    let r = reconcile(doc.origin_receive_time, last_known, now);
                    if r.stale_checkpoint {
                        warn!(
                            "checkpoint {} predates origin {}, assuming no elapsed time",
                            last_known,
                            doc.origin_receive_time
                        );
                    }
                    info!(
                        "schedule restored: {} doses outstanding, {} ms elapsed before reboot",
                        doc.outstanding(),
                        r.elapsed
                    );
                    session_origin = r.session_origin;
                    store.load(doc);
                }
                Err(e) => warn!("stored schedule rejected: {}", e),
            }
        }

        Self {
            config,
            devices,
            state: State::initial(store.is_loaded()),
            store,
            session_origin,
            active: None,
            phase_started: now,
            last_checkpoint: now,
            button_was_pressed: false,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn session_origin(&self) -> Millis {
        self.session_origin
    }

    pub fn store(&self) -> &ScheduleStore {
        &self.store
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn devices(&self) -> &Devices<C, S, A, B, T, D> {
        &self.devices
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut ScheduleStore {
        &mut self.store
    }

    /// Advance the machine by one tick
    pub fn step(&mut self) -> State {
        let now = self.now();

        if self.store.is_loaded()
            && now - self.last_checkpoint >= Millis::from(self.config.reminder.checkpoint_interval_ms)
        {
            self.checkpoint(now);
        }

        let event = match self.state {
            State::Idle => None,
            State::Processing => Some(self.select_next(now)),
            State::Alerting => self.check_alert(now),
            State::AwaitingResponse => self.check_response(now),
            State::Reporting => Some(self.finish_report()),
        };

        if let Some(event) = event {
            self.fire(event);
        }
        self.state
    }

    /// Apply one link event
    pub fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Connected => {
                info!("link connected");
                if self.state == State::Idle && self.store.is_loaded() {
                    self.fire(Event::LinkRestored);
                }
            }
            LinkEvent::Disconnected => info!("link disconnected"),
            LinkEvent::Payload(bytes) => self.handle_payload(&bytes),
        }
    }

    /// Send the current schedule to the app
    ///
    /// Returns the number of chunks sent. The link is checked before every
    /// chunk; a drop aborts with [`ReportError::TransportUnavailable`].
    pub fn send_report(&mut self) -> Result<usize, ReportError> {
        let doc = self.store.document().ok_or(ReportError::NoSchedule)?;
        let payload = encode_report(&doc.to_report())?;
        let chunks = ReportChunks::new(&payload, usize::from(self.config.link.chunk_size));

        let mut sent = 0;
        for chunk in chunks {
            if sent > 0 {
                self.devices.delay.delay_ms(self.config.link.chunk_pause_ms);
            }
            if !self.devices.transport.is_connected() {
                return Err(ReportError::TransportUnavailable);
            }
            self.devices.transport.send_chunk(chunk)?;
            sent += 1;
        }

        debug!("report: {} bytes in {} chunks", payload.len(), sent);
        Ok(sent)
    }

    fn handle_payload(&mut self, bytes: &[u8]) {
        match classify(bytes, self.config.link.update_token.as_str()) {
            Inbound::UpdateRequest => match self.send_report() {
                Ok(chunks) => info!("update request answered ({} chunks)", chunks),
                Err(e) => warn!("update request not answered: {}", e),
            },
            Inbound::Schedule(raw) => {
                let now = self.now();
                match self.store.ingest(raw, now) {
                    Ok(doc) => info!(
                        "schedule accepted: {} medications, {} doses",
                        doc.medications.len(),
                        doc.outstanding()
                    ),
                    Err(e) => {
                        warn!("schedule rejected: {}", e);
                        return;
                    }
                }
                self.session_origin = now;
                self.save(now);
                self.fire(Event::ScheduleAccepted);
            }
        }
    }

    fn select_next(&mut self, now: Millis) -> Event {
        let Some(doc) = self.store.document() else {
            return Event::SlotLost;
        };

        match select(doc, self.session_origin) {
            Some(due) if due.is_due(now) => {
                info!(
                    "dose due: medication {} slot {} (+{} s)",
                    due.medication,
                    due.slot,
                    due.offset_s
                );
                self.active = Some(self.store.slot_ref(due.medication, due.slot));
                self.phase_started = now;
                self.devices.actuator.set_high();
                Event::SlotDue
            }
            Some(_) => Event::NothingDue,
            None if self.devices.transport.is_connected() => Event::AllRespondedOnline,
            None => {
                info!("all doses answered, report deferred until connected");
                Event::AllRespondedOffline
            }
        }
    }

    fn check_alert(&mut self, now: Millis) -> Option<Event> {
        if let Err(e) = self.active_slot() {
            warn!("active slot lost while alerting: {}", e);
            return Some(Event::SlotLost);
        }
        if now - self.phase_started < Millis::from(self.config.reminder.alert_duration_ms) {
            return None;
        }
        self.devices.actuator.set_low();
        self.phase_started = now;
        // A press already held when the window opens does not count
        self.button_was_pressed = self.devices.button.is_high();
        Some(Event::AlertElapsed)
    }

    fn check_response(&mut self, now: Millis) -> Option<Event> {
        let slot = match self.active_slot() {
            Ok(slot) => slot,
            Err(e) => {
                warn!("active slot lost while awaiting response: {}", e);
                return Some(Event::SlotLost);
            }
        };

        let pressed = self.devices.button.is_high();
        let new_press = pressed && !self.button_was_pressed;
        self.button_was_pressed = pressed;

        let (value, event) = if new_press {
            (true, Event::Acknowledged)
        } else if now - self.phase_started >= Millis::from(self.config.reminder.response_window_ms) {
            (false, Event::ResponseTimedOut)
        } else {
            return None;
        };

        if let Err(e) = self.store.record_response(slot, value) {
            warn!("could not record response: {}", e);
            return Some(Event::SlotLost);
        }
        info!("response recorded: {}", value);
        self.save(now);
        Some(event)
    }

    fn finish_report(&mut self) -> Event {
        match self.send_report() {
            Ok(chunks) => info!("report sent ({} chunks)", chunks),
            Err(ReportError::TransportUnavailable) => info!("link lost, report deferred"),
            Err(e) => warn!("report failed: {}", e),
        }
        Event::ReportFinished
    }

    fn active_slot(&self) -> Result<SlotRef, IndexError> {
        let slot = self.active.ok_or(IndexError::NoDocument)?;
        if self.store.resolve(slot)?.is_outstanding() {
            Ok(slot)
        } else {
            Err(IndexError::AlreadyResponded)
        }
    }

    fn fire(&mut self, event: Event) {
        let next = self.state.transition(event);
        if next != self.state {
            debug!("{} -> {} on {}", self.state, next, event);
        }
        self.state = next;

        if !next.actuator_on() {
            self.devices.actuator.set_low();
        }
        if !next.has_active_slot() {
            self.active = None;
        }
    }

    /// Persist the document and checkpoint the clock
    ///
    /// Failures are logged; the in-memory state is kept either way.
    fn save(&mut self, now: Millis) {
        if let Some(doc) = self.store.document() {
            if let Err(e) = persist(&mut self.devices.storage, doc) {
                error!("schedule not persisted: {}", e);
            }
        }
        self.checkpoint(now);
    }

    /// Checkpoint the clock in the schedule's origin frame
    fn checkpoint(&mut self, now: Millis) {
        let Some(doc) = self.store.document() else {
            return;
        };
        let ticks = now - self.session_origin + doc.origin_receive_time;
        let ticks = u64::try_from(ticks).unwrap_or(0);

        if let Err(e) = journal::checkpoint(&mut self.devices.storage, ticks) {
            warn!("checkpoint failed: {}", e);
        }
        self.last_checkpoint = now;
    }

    fn now(&self) -> Millis {
        millis(&self.devices.clock)
    }
}

fn millis<C: Clock>(clock: &C) -> Millis {
    Millis::try_from(clock.now_ms()).unwrap_or(Millis::MAX)
}
