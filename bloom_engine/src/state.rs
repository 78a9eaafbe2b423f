//! Application state store and the phase transition rule.
//!
//! The transition rule is a pure function so it can be tested exhaustively;
//! [`SceneStore`] wraps it with the change-only gesture discipline the
//! upstream classifier also follows.

// ════════════════════════════════════════════════════════════════════════════
// Phase / Gesture
// ════════════════════════════════════════════════════════════════════════════

/// Top-level visual mode of the scene. `Tree` and `Nebula` are stable;
/// `Blooming` and `Collapsing` are transient and exit on progress thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Tree,
    Blooming,
    Nebula,
    Collapsing,
}

/// Discrete hand-shape classification consumed as user input. Anything the
/// classifier reports beyond the two labels of interest collapses to `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    None,
    OpenPalm,
    ClosedFist,
}

/// The phase transition table. Returns the next phase, or `None` when the
/// gesture has no effect in the current phase — an open palm mid-bloom or a
/// fist mid-collapse is deliberately ignored.
pub fn transition(phase: Phase, gesture: Gesture) -> Option<Phase> {
    match (phase, gesture) {
        (Phase::Tree, Gesture::OpenPalm) => Some(Phase::Blooming),
        (Phase::Nebula, Gesture::ClosedFist) => Some(Phase::Collapsing),
        _ => None,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SceneStore
// ════════════════════════════════════════════════════════════════════════════

/// Shared mutable application state: current phase, last observed gesture,
/// camera toggle, and the focused photo (if any). Mutated only from the main
/// render/input thread.
#[derive(Debug)]
pub struct SceneStore {
    phase: Phase,
    gesture: Gesture,
    camera_enabled: bool,
    focused_photo: Option<usize>,
}

impl Default for SceneStore {
    fn default() -> Self {
        SceneStore {
            phase: Phase::Tree,
            gesture: Gesture::None,
            camera_enabled: true,
            focused_photo: None,
        }
    }
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn camera_enabled(&self) -> bool {
        self.camera_enabled
    }

    pub fn focused_photo(&self) -> Option<usize> {
        self.focused_photo
    }

    /// Force a phase directly. Used by the animation engine for the
    /// progress-threshold auto-exits.
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Record a new gesture observation and evaluate the transition table.
    ///
    /// Re-observing the current gesture is a no-op: only *changes* are
    /// transition-worthy, so a classifier that re-emits the same label every
    /// frame cannot retrigger a transition.
    pub fn set_gesture(&mut self, gesture: Gesture) {
        if gesture == self.gesture {
            return;
        }
        self.gesture = gesture;
        if let Some(next) = transition(self.phase, gesture) {
            self.phase = next;
        }
    }

    /// Toggle the camera. Disabling it also clears the gesture, since the
    /// classifier's frame loop halts with it.
    pub fn toggle_camera(&mut self) {
        self.camera_enabled = !self.camera_enabled;
        if !self.camera_enabled {
            self.gesture = Gesture::None;
        }
    }

    /// Focus a photo, or clear the focus when the already-focused photo is
    /// selected again.
    pub fn toggle_photo(&mut self, index: usize) {
        if self.focused_photo == Some(index) {
            self.focused_photo = None;
        } else {
            self.focused_photo = Some(index);
        }
    }

    pub fn clear_photo(&mut self) {
        self.focused_photo = None;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PHASES: [Phase; 4] = [Phase::Tree, Phase::Blooming, Phase::Nebula, Phase::Collapsing];
    const ALL_GESTURES: [Gesture; 3] = [Gesture::None, Gesture::OpenPalm, Gesture::ClosedFist];

    #[test]
    fn transition_table_exhaustive() {
        for phase in ALL_PHASES {
            for gesture in ALL_GESTURES {
                let next = transition(phase, gesture);
                match (phase, gesture) {
                    (Phase::Tree, Gesture::OpenPalm) => assert_eq!(next, Some(Phase::Blooming)),
                    (Phase::Nebula, Gesture::ClosedFist) => {
                        assert_eq!(next, Some(Phase::Collapsing))
                    }
                    _ => assert_eq!(next, None, "{:?} + {:?} should be ignored", phase, gesture),
                }
            }
        }
    }

    #[test]
    fn open_palm_blooms_from_tree() {
        let mut store = SceneStore::new();
        store.set_gesture(Gesture::OpenPalm);
        assert_eq!(store.phase(), Phase::Blooming);
    }

    #[test]
    fn fist_collapses_from_nebula() {
        let mut store = SceneStore::new();
        store.set_phase(Phase::Nebula);
        store.set_gesture(Gesture::ClosedFist);
        assert_eq!(store.phase(), Phase::Collapsing);
    }

    #[test]
    fn repeated_gesture_does_not_retrigger() {
        let mut store = SceneStore::new();
        store.set_phase(Phase::Nebula);
        store.set_gesture(Gesture::OpenPalm);
        assert_eq!(store.phase(), Phase::Nebula);
        // Same label again, repeatedly: still no effect.
        for _ in 0..5 {
            store.set_gesture(Gesture::OpenPalm);
            assert_eq!(store.phase(), Phase::Nebula);
        }
    }

    #[test]
    fn fist_mid_bloom_is_ignored() {
        let mut store = SceneStore::new();
        store.set_gesture(Gesture::OpenPalm);
        assert_eq!(store.phase(), Phase::Blooming);
        store.set_gesture(Gesture::ClosedFist);
        assert_eq!(store.phase(), Phase::Blooming);
    }

    #[test]
    fn gesture_change_through_none_still_transitions() {
        let mut store = SceneStore::new();
        store.set_gesture(Gesture::OpenPalm);
        store.set_phase(Phase::Nebula);
        store.set_gesture(Gesture::None);
        store.set_gesture(Gesture::ClosedFist);
        assert_eq!(store.phase(), Phase::Collapsing);
    }

    #[test]
    fn camera_off_resets_gesture() {
        let mut store = SceneStore::new();
        store.set_gesture(Gesture::OpenPalm);
        store.toggle_camera();
        assert!(!store.camera_enabled());
        assert_eq!(store.gesture(), Gesture::None);
        store.toggle_camera();
        assert!(store.camera_enabled());
    }

    #[test]
    fn photo_focus_toggles() {
        let mut store = SceneStore::new();
        store.toggle_photo(3);
        assert_eq!(store.focused_photo(), Some(3));
        store.toggle_photo(7);
        assert_eq!(store.focused_photo(), Some(7));
        store.toggle_photo(7);
        assert_eq!(store.focused_photo(), None);
    }
}
