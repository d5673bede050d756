//! Property tests for HID handle pairing under arbitrary call sequences.

use passthrough_hal::mock::{HidCall, MockHidService};
use passthrough_hal::{
    BridgeError, HidEventSample, HidPassthroughBridge, HidService, TouchPhase,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Open,
    Close,
    Write(i32, i32),
    Fail(bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Open),
        3 => Just(Op::Close),
        3 => (0..1920i32, 0..1080i32).prop_map(|(x, y)| Op::Write(x, y)),
        1 => any::<bool>().prop_map(Op::Fail),
    ]
}

fn bridge_with(mock: &MockHidService) -> HidPassthroughBridge {
    let service = mock.clone();
    HidPassthroughBridge::new(move || -> Result<Box<dyn HidService>, BridgeError> {
        Ok(Box::new(service.clone()))
    })
}

proptest! {
    /// hub open/close calls alternate strictly and balance once the bridge is gone.
    #[test]
    fn hub_open_close_alternate(ops in prop::collection::vec(op(), 0..64)) {
        let mock = MockHidService::new();
        {
            let mut bridge = bridge_with(&mock);
            for op in ops {
                match op {
                    Op::Open => { let _ = bridge.open(); }
                    Op::Close => { let _ = bridge.close(); }
                    Op::Write(x, y) => {
                        let _ = bridge.write_event(HidEventSample::new(TouchPhase::Move, x, y));
                    }
                    Op::Fail(f) => mock.set_failing(f),
                }
            }
        }

        // A failed hubOpen holds no handle, so only count successful opens:
        // an open is successful when the next hub call is the unmute.
        let calls = mock.calls();
        let mut open = false;
        for (i, call) in calls.iter().enumerate() {
            match call {
                HidCall::HubOpen => {
                    let succeeded = matches!(calls.get(i + 1), Some(HidCall::WriteMode(0)));
                    if succeeded {
                        prop_assert!(!open, "double open at call {}", i);
                        open = true;
                    }
                }
                HidCall::HubClose => {
                    prop_assert!(open, "close without open at call {}", i);
                    open = false;
                }
                HidCall::Touch(..) => prop_assert!(open, "touch forwarded while closed"),
                HidCall::WriteMode(_) => {}
            }
        }
        prop_assert!(!open, "handle leaked");
    }
}
