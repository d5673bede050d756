use passthrough_hal::{HidEventSample, TouchPhase};
use platform_input::{TouchAction, TouchBridgeListener, TouchEvent};
use proptest::prelude::*;

fn gesture() -> impl Strategy<Value = Vec<TouchEvent>> {
    let point = (0i32..2000, 0i32..1200);
    (
        point.clone(),
        prop::collection::vec(point.clone(), 0..12),
        point,
        any::<bool>(),
    )
        .prop_map(|((dx, dy), moves, (ux, uy), cancel)| {
            let mut events = vec![TouchEvent::new(TouchAction::Down, dx, dy)];
            events.extend(
                moves
                    .into_iter()
                    .map(|(x, y)| TouchEvent::new(TouchAction::Move, x, y)),
            );
            let end = if cancel {
                TouchAction::Cancel
            } else {
                TouchAction::Up
            };
            events.push(TouchEvent::new(end, ux, uy));
            events
        })
}

proptest! {
    /// Every gesture yields active samples followed by exactly one inactive one.
    #[test]
    fn gesture_samples_end_inactive(gestures in prop::collection::vec(gesture(), 1..6)) {
        let mut listener = TouchBridgeListener::new();
        for events in gestures {
            let samples: Vec<HidEventSample> = events
                .iter()
                .filter_map(|e| listener.on_touch(*e).sample)
                .collect();

            prop_assert_eq!(samples.len(), events.len());
            let (last, rest) = samples.split_last().unwrap();
            prop_assert_eq!(last.phase, TouchPhase::Up);
            prop_assert_eq!(last.active(), 0);
            prop_assert!(rest.iter().all(|s| s.active() == 1));
            prop_assert!(!listener.in_gesture());
        }
    }
}

#[test]
fn cancelled_gesture_is_never_consumed() {
    let mut listener = TouchBridgeListener::new();
    listener.on_touch(TouchEvent::new(TouchAction::Down, 10, 10));
    let outcome = listener.on_touch(TouchEvent::new(TouchAction::Cancel, 10, 10));
    assert!(!outcome.consumed);
}
