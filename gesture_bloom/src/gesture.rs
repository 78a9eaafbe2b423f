//! Gesture recognition — from hand-tracking hardware or keyboard simulation.
//!
//! The public interface is [`GestureEvent`] delivered over an `mpsc` channel;
//! consumers don't care whether observations came from real hardware or the
//! keyboard simulator. Both sources follow the emit-on-change discipline: the
//! same label is never sent twice in a row, so the store downstream only ever
//! sees gesture *changes*.

use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use bloom_engine::Gesture;

// ════════════════════════════════════════════════════════════════════════════
// GestureEvent
// ════════════════════════════════════════════════════════════════════════════

/// An event emitted by a gesture source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    /// The classifier's label changed. Labels other than open palm and
    /// closed fist collapse to [`Gesture::None`] before this point.
    Observed(Gesture),
    /// Quit the application.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`GestureEvent`]s over a channel.
pub trait GestureSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<GestureEvent>);
}

/// Spawn a gesture source on its own thread and return the receiving end.
pub fn spawn_gesture_source<G: GestureSource>(source: G) -> Receiver<GestureEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimGestureSource — keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window. The visualizer's event loop
/// sends these; the translator below turns them into [`GestureEvent`]s, which
/// keeps gesture logic out of the window loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    KeyDown(SimKey),
}

/// Simulated key codes (mapped from minifb keys by the visualizer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    OpenPalm,   // O
    ClosedFist, // F
    Neutral,    // N
    Quit,       // Q
}

pub struct SimGestureSource {
    pub rx: Receiver<SimInput>,
}

impl GestureSource for SimGestureSource {
    fn run(self: Box<Self>, tx: Sender<GestureEvent>) {
        let mut last = Gesture::None;
        for input in self.rx {
            let observed = match input {
                SimInput::KeyDown(SimKey::OpenPalm) => Gesture::OpenPalm,
                SimInput::KeyDown(SimKey::ClosedFist) => Gesture::ClosedFist,
                SimInput::KeyDown(SimKey::Neutral) => Gesture::None,
                SimInput::KeyDown(SimKey::Quit) => {
                    let _ = tx.send(GestureEvent::Quit);
                    return;
                }
            };
            if observed == last {
                continue;
            }
            last = observed;
            if tx.send(GestureEvent::Observed(observed)).is_err() {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapGestureSource — real hand tracking (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Gesture source backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// # Classification
///
/// Only the first detected hand is consulted, per polled frame:
///
/// * **OpenPalm**: at least four digits extended (tip far from the
///   metacarpal base relative to finger length).
/// * **ClosedFist**: at most one digit extended.
/// * Everything else → `None`.
///
/// A label must hold for `HOLD_FRAMES` consecutive frames before it is
/// emitted, and it is emitted only when it differs from the previous one.
/// Poll errors are logged and skipped; the loop continues on the next frame.
/// Clearing `enabled` pauses polling and resets the reported gesture to
/// `None` (the camera-off path).
pub struct LeapGestureSource {
    pub enabled: Arc<AtomicBool>,
}

#[cfg(feature = "leap")]
impl GestureSource for LeapGestureSource {
    fn run(self: Box<Self>, tx: Sender<GestureEvent>) {
        use leaprs::*;
        use std::sync::atomic::Ordering;
        use std::time::Duration;

        const HOLD_FRAMES: u32 = 3;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c) => c,
            Err(e) => {
                log::error!("hand tracking unavailable, LeapC connection failed: {:?}", e);
                return;
            }
        };
        if let Err(e) = connection.open() {
            log::error!("hand tracking unavailable, device open failed: {:?}", e);
            return;
        }
        log::info!("hand tracking connected");

        let mut last_sent = Gesture::None;
        let mut candidate = Gesture::None;
        let mut held = 0u32;

        loop {
            if !self.enabled.load(Ordering::Relaxed) {
                if last_sent != Gesture::None {
                    last_sent = Gesture::None;
                    candidate = Gesture::None;
                    held = 0;
                    if tx.send(GestureEvent::Observed(Gesture::None)).is_err() {
                        return;
                    }
                }
                thread::sleep(Duration::from_millis(100));
                continue;
            }

            let msg = match connection.poll(100) {
                Ok(m) => m,
                Err(e) => {
                    // Transient per-frame inference failure: skip, keep going.
                    log::debug!("tracking poll error: {:?}", e);
                    continue;
                }
            };

            if let Event::Tracking(frame) = msg.event() {
                let raw = classify_hands(&frame);
                if raw == candidate {
                    held = held.saturating_add(1);
                } else {
                    candidate = raw;
                    held = 1;
                }
                if held >= HOLD_FRAMES && candidate != last_sent {
                    last_sent = candidate;
                    if tx.send(GestureEvent::Observed(candidate)).is_err() {
                        return;
                    }
                }
            }
        }
    }
}

/// Map a tracking frame to a discrete gesture from the first detected hand.
#[cfg(feature = "leap")]
fn classify_hands(frame: &leaprs::TrackingEvent) -> Gesture {
    let hands: Vec<_> = frame.hands().collect();
    let hand = match hands.first() {
        Some(h) => h,
        None => return Gesture::None,
    };

    let fingers: Vec<_> = hand.digits().collect();
    if fingers.len() < 5 {
        return Gesture::None;
    }

    let extended = fingers.iter().filter(|d| finger_extension(d) > 0.7).count();
    match extended {
        4.. => Gesture::OpenPalm,
        0 | 1 => Gesture::ClosedFist,
        _ => Gesture::None,
    }
}

/// Ratio of (tip – metacarpal base) distance to a typical finger length.
/// 1.0 = fully extended, ~0.0 = fully curled.
#[cfg(feature = "leap")]
fn finger_extension(digit: &leaprs::Digit) -> f32 {
    let base = digit.metacarpal().prev_joint();
    let tip = digit.distal().next_joint();
    let dx = tip.x - base.x;
    let dy = tip.y - base.y;
    let dz = tip.z - base.z;
    let dist = (dx * dx + dy * dy + dz * dz).sqrt();
    (dist / 80.0).clamp(0.0, 1.0)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
