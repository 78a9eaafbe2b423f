//! # gesture_bloom
//!
//! Gesture-controlled holiday scene: a particle Christmas tree that blooms
//! into a rotating nebula of photos, with a carol playing over MIDI and
//! timed lyrics in the overlay.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | In phase | Action |
//! |---|---|---|
//! | Open palm | Tree | Start the bloom (tree scatters into the nebula) |
//! | Open palm | Nebula | Spin the nebula faster while held |
//! | Closed fist | Nebula | Start the collapse (back to the tree) |
//! | anything else | — | Ignored |
//!
//! Clicking a photo in the nebula focuses it (click again to release); the
//! nebula's rotation freezes while a photo is focused.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: keyboard keys stand in for gestures.
//! * `leap` — **Hardware mode**: classifies real hands via LeapC.
//!
//! ### Keyboard
//!
//! | Key | Effect |
//! |---|---|
//! | `O` | Open palm |
//! | `F` | Closed fist |
//! | `N` | Neutral (no gesture) |
//! | `C` | Toggle the camera (gesture input on/off) |
//! | `M` / `Space` | Toggle music |
//! | `Q` / `Escape` | Quit |

pub mod app;
pub mod gesture;
pub mod player;
pub mod visualizer;
