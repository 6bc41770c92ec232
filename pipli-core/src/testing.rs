//! In-memory collaborators for host tests

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use pipli_hal::{Clock, FlashError, FlashStorage, InputPin, LinkError, OutputPin, StorageKey, Transport};

/// Flash backed by a shared map
#[derive(Clone, Default)]
pub struct MemFlash {
    pub entries: Rc<RefCell<BTreeMap<u8, Vec<u8>>>>,
    /// Fail every write
    pub fail_writes: Rc<Cell<bool>>,
    /// Store only the first half of every write
    pub tear_writes: Rc<Cell<bool>>,
}

impl MemFlash {
    pub fn get(&self, key: StorageKey) -> Option<Vec<u8>> {
        self.entries.borrow().get(&key.as_u8()).cloned()
    }

    pub fn put(&self, key: StorageKey, data: &[u8]) {
        self.entries.borrow_mut().insert(key.as_u8(), data.to_vec());
    }
}

impl FlashStorage for MemFlash {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let entries = self.entries.borrow();
        let data = entries.get(&key.as_u8()).ok_or(FlashError::NotFound)?;
        if data.len() > buffer.len() {
            return Err(FlashError::BufferTooSmall);
        }
        buffer[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if self.fail_writes.get() {
            return Err(FlashError::Flash);
        }
        let stored = if self.tear_writes.get() {
            &data[..data.len() / 2]
        } else {
            data
        };
        self.put(key, stored);
        Ok(())
    }

    fn exists(&mut self, key: StorageKey) -> bool {
        self.entries.borrow().contains_key(&key.as_u8())
    }

    fn erase_all(&mut self) -> Result<(), FlashError> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}

/// Clock the test advances by hand
#[derive(Clone, Default)]
pub struct FakeClock(pub Rc<Cell<u64>>);

impl FakeClock {
    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// Output pin that records its level
#[derive(Clone, Default)]
pub struct FakePin(pub Rc<Cell<bool>>);

impl OutputPin for FakePin {
    fn set_high(&mut self) {
        self.0.set(true);
    }

    fn set_low(&mut self) {
        self.0.set(false);
    }

    fn is_set_high(&self) -> bool {
        self.0.get()
    }
}

impl InputPin for FakePin {
    fn is_high(&self) -> bool {
        self.0.get()
    }
}

#[derive(Default)]
pub struct LinkState {
    pub connected: bool,
    pub chunks: Vec<Vec<u8>>,
    /// Drop the connection after this many chunks
    pub drop_after: Option<usize>,
}

/// Transport that collects sent chunks
#[derive(Clone, Default)]
pub struct FakeTransport(pub Rc<RefCell<LinkState>>);

impl FakeTransport {
    pub fn set_connected(&self, connected: bool) {
        self.0.borrow_mut().connected = connected;
    }

    /// Everything sent so far, concatenated
    pub fn received(&self) -> Vec<u8> {
        self.0.borrow().chunks.concat()
    }

    pub fn chunk_count(&self) -> usize {
        self.0.borrow().chunks.len()
    }
}

impl Transport for FakeTransport {
    fn is_connected(&self) -> bool {
        self.0.borrow().connected
    }

    fn send_chunk(&mut self, chunk: &[u8]) -> Result<(), LinkError> {
        let mut link = self.0.borrow_mut();
        if !link.connected {
            return Err(LinkError::NotConnected);
        }
        link.chunks.push(chunk.to_vec());
        if link.drop_after == Some(link.chunks.len()) {
            link.connected = false;
        }
        Ok(())
    }
}

/// Delay that only counts requested time
#[derive(Clone, Default)]
pub struct FakeDelay(pub Rc<Cell<u64>>);

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.set(self.0.get() + u64::from(ns));
    }
}
