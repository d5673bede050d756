//! Recording hardware services for tests and for hosts without the hardware.
//!
//! The real services are IPC proxies to processes that only exist on the
//! target device. These stand-ins keep an in-memory journal of every call
//! instead, shared between clones, so a test can hand one clone to the
//! bridge and inspect the journal through another.
//!
//! `set_failing(true)` makes every call return a remote-call error, which is
//! how the error paths of the callers are exercised.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::{BridgeError, PassthroughError};
use crate::hid::HidService;
use crate::video::{TvInputService, VideoInput};

/// One recorded call on [`MockHidService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HidCall {
    HubOpen,
    HubClose,
    WriteMode(u8),
    Touch(i32, i32, i32),
}

#[derive(Default)]
struct HidJournal {
    calls: Vec<HidCall>,
    failing: bool,
}

/// In-memory [`HidService`].
#[derive(Clone, Default)]
pub struct MockHidService {
    inner: Arc<Mutex<HidJournal>>,
}

impl MockHidService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().failing = failing;
    }

    pub fn calls(&self) -> Vec<HidCall> {
        self.inner.lock().calls.clone()
    }

    pub fn count(&self, call: &HidCall) -> usize {
        self.inner.lock().calls.iter().filter(|c| *c == call).count()
    }

    /// Forwarded touch triples, in order.
    pub fn touches(&self) -> Vec<(i32, i32, i32)> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                HidCall::Touch(a, x, y) => Some((*a, *x, *y)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HidCall, name: &'static str) -> Result<(), BridgeError> {
        let mut journal = self.inner.lock();
        // Failed calls are still journaled so tests can see they were attempted.
        journal.calls.push(call);
        if journal.failing {
            return Err(BridgeError::remote(name, "mock failure"));
        }
        Ok(())
    }
}

impl HidService for MockHidService {
    fn hub_open(&mut self) -> Result<(), BridgeError> {
        self.record(HidCall::HubOpen, "hubOpen")
    }

    fn hub_close(&mut self) -> Result<(), BridgeError> {
        self.record(HidCall::HubClose, "hubClose")
    }

    fn hub_write_mode(&mut self, mode: u8) -> Result<(), BridgeError> {
        self.record(HidCall::WriteMode(mode), "hubWriteMode")
    }

    fn write_touch_event(&mut self, active: i32, x: i32, y: i32) -> Result<(), BridgeError> {
        self.record(HidCall::Touch(active, x, y), "writeTouchEvent")
    }
}

/// One recorded call on [`MockTvInputService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TvCall {
    ListInputs,
    Tune(String, String),
    Reset,
}

#[derive(Default)]
struct TvJournal {
    inputs: Vec<VideoInput>,
    calls: Vec<TvCall>,
    failing: bool,
}

/// In-memory [`TvInputService`].
#[derive(Clone, Default)]
pub struct MockTvInputService {
    inner: Arc<Mutex<TvJournal>>,
}

impl MockTvInputService {
    pub fn with_inputs(inputs: Vec<VideoInput>) -> Self {
        let mock = Self::default();
        mock.inner.lock().inputs = inputs;
        mock
    }

    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().failing = failing;
    }

    pub fn calls(&self) -> Vec<TvCall> {
        self.inner.lock().calls.clone()
    }

    pub fn count(&self, call: &TvCall) -> usize {
        self.inner.lock().calls.iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: TvCall, name: &'static str) -> Result<(), PassthroughError> {
        let mut journal = self.inner.lock();
        journal.calls.push(call);
        if journal.failing {
            return Err(PassthroughError::remote(name, "mock failure"));
        }
        Ok(())
    }
}

impl TvInputService for MockTvInputService {
    fn list_inputs(&mut self) -> Result<Vec<VideoInput>, PassthroughError> {
        self.record(TvCall::ListInputs, "listInputs")?;
        Ok(self.inner.lock().inputs.clone())
    }

    fn tune(&mut self, input_id: &str, channel_uri: &str) -> Result<(), PassthroughError> {
        self.record(
            TvCall::Tune(input_id.to_string(), channel_uri.to_string()),
            "tune",
        )
    }

    fn reset(&mut self) -> Result<(), PassthroughError> {
        self.record(TvCall::Reset, "reset")
    }
}
