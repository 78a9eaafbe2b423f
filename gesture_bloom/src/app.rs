//! Top-level application loop.
//!
//! `run` owns the window, the scene, the store, and the carol player, and
//! drives the gesture → store → scene → render pipeline at ~60 fps. Gesture
//! events arrive over a channel from the keyboard simulator (always) and the
//! hand-tracking thread (with the `leap` feature).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use bloom_engine::{Gesture, Phase, Scene, SceneConfig, SceneStore};
use carol_track::{Carol, LyricSheet, WE_WISH_YOU_LYRICS};

use crate::gesture::{GestureEvent, GestureSource, SimGestureSource, SimInput};
use crate::player::Player;
use crate::visualizer::{Visualizer, VisualizerError};

#[cfg(feature = "leap")]
use crate::gesture::LeapGestureSource;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct AppConfig {
    pub scene: SceneConfig,
    pub tempo_bpm: u32,
    /// GM program for the carol (default 9 = glockenspiel).
    pub instrument: u8,
    pub velocity: u8,
    pub channel: u8,
    /// When false, the player thread is never started.
    pub music: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            scene: SceneConfig::default(),
            tempo_bpm: 120,
            instrument: 9,
            velocity: 100,
            channel: 0,
            music: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Visualizer(#[from] VisualizerError),
}

// ════════════════════════════════════════════════════════════════════════════
// Lyric clock
// ════════════════════════════════════════════════════════════════════════════

/// Tracks the playback position for lyric lookup. The player reports the
/// start position of each note it plays; between notes the clock extrapolates
/// with wall time so the overlay doesn't stutter on long notes.
struct LyricClock {
    playing: bool,
    position: f32,
    anchor: Instant,
}

impl LyricClock {
    fn new() -> Self {
        LyricClock {
            playing: false,
            position: 0.0,
            anchor: Instant::now(),
        }
    }

    fn set_playing(&mut self, playing: bool) {
        if playing && !self.playing {
            self.anchor = Instant::now();
        }
        if !playing && self.playing {
            // Freeze the extrapolated position so resume picks up close by.
            self.position = self.secs();
        }
        self.playing = playing;
    }

    fn on_note(&mut self, position_secs: f32) {
        self.position = position_secs;
        self.anchor = Instant::now();
    }

    fn secs(&self) -> f32 {
        if self.playing {
            self.position + self.anchor.elapsed().as_secs_f32()
        } else {
            self.position
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// This is the entry point called from `main.rs`. It creates the visualizer,
/// the gesture sources (simulation always, hardware with `--features leap`),
/// the carol player, and drives the event/render loop.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    // ── Gesture sources feeding one channel ───────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let (gesture_tx, gesture_rx) = mpsc::channel::<GestureEvent>();

    {
        let tx = gesture_tx.clone();
        thread::spawn(move || Box::new(SimGestureSource { rx: sim_rx }).run(tx));
    }

    let camera_enabled = Arc::new(AtomicBool::new(true));
    #[cfg(feature = "leap")]
    {
        let tx = gesture_tx.clone();
        let enabled = camera_enabled.clone();
        thread::spawn(move || Box::new(LeapGestureSource { enabled }).run(tx));
    }
    drop(gesture_tx);

    // ── Window, scene, store ──────────────────────────────────────────────
    let mut vis = Visualizer::new(sim_tx)?;
    let mut store = SceneStore::new();
    let mut scene = Scene::new(cfg.scene, StdRng::from_entropy());

    // ── Music ─────────────────────────────────────────────────────────────
    let carol = Carol::we_wish_you();
    let carol_name = carol.name();
    let player = cfg.music.then(|| {
        Player::spawn(carol, cfg.tempo_bpm, cfg.instrument, cfg.velocity, cfg.channel)
    });
    let sheet = LyricSheet::parse(WE_WISH_YOU_LYRICS);
    let mut clock = LyricClock::new();
    let mut music_on = false;
    let mut music_started = false;

    let mut last_frame = Instant::now();

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Window input
        let input = vis.poll_input();
        if input.quit {
            break;
        }

        // Music can't start before an interaction, so the session opens in
        // silence and the first key or click brings the carol in.
        if let Some(ref player) = player {
            if input.any_interaction && !music_started {
                player.play();
                music_started = true;
                music_on = true;
                clock.set_playing(true);
                log::info!("music started: {}", carol_name);
            } else if input.toggle_music {
                music_on = !music_on;
                if music_on {
                    player.play();
                } else {
                    player.pause();
                }
                clock.set_playing(music_on);
            }
        }

        if input.toggle_camera {
            store.toggle_camera();
            log::debug!("camera enabled: {}", store.camera_enabled());
        }
        // The tracking thread pauses itself while this is false.
        camera_enabled.store(store.camera_enabled(), Ordering::Relaxed);

        // Photo picking is only meaningful once the nebula is up.
        if let Some((x, y)) = input.clicked {
            if store.phase() == Phase::Nebula {
                if let Some(idx) = vis.pick_photo(x, y) {
                    store.toggle_photo(idx);
                }
            }
        }

        // 2. Drain gesture events
        loop {
            match gesture_rx.try_recv() {
                Ok(GestureEvent::Quit) => {
                    if let Some(ref player) = player {
                        player.quit();
                    }
                    return Ok(());
                }
                Ok(GestureEvent::Observed(g)) => {
                    if store.camera_enabled() {
                        store.set_gesture(g);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }

        // 3. Playback position → lyric
        if let Some(ref player) = player {
            if let Some(last) = player.drain_notes().last() {
                clock.on_note(last.position_secs);
            }
        }
        let lyric = if music_started && music_on {
            sheet.cue_at(clock.secs())
        } else {
            None
        };

        // 4. Advance the scene
        let now = Instant::now();
        let dt = (now - last_frame).as_secs_f32().min(0.1);
        last_frame = now;
        scene.tick(dt, &mut store);

        // 5. Render
        let status = status_line(&store, &scene);
        vis.render(&scene, &store, lyric, &status, music_on);
    }

    if let Some(player) = player {
        player.quit();
    }
    Ok(())
}

fn status_line(store: &SceneStore, scene: &Scene) -> String {
    let phase = match store.phase() {
        Phase::Tree => "tree",
        Phase::Blooming => "blooming",
        Phase::Nebula => "nebula",
        Phase::Collapsing => "collapsing",
    };
    let gesture = match store.gesture() {
        Gesture::None => "-",
        Gesture::OpenPalm => "open palm",
        Gesture::ClosedFist => "closed fist",
    };
    let camera = if store.camera_enabled() { "on" } else { "off" };
    let mut s = format!(
        "phase: {}  {:.0}%   gesture: {}   camera: {}",
        phase,
        scene.progress() * 100.0,
        gesture,
        camera,
    );
    if let Some(idx) = store.focused_photo() {
        s.push_str(&format!("   photo {} focused", idx + 1));
    }
    s
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn default_config_is_playable() {
        let cfg = AppConfig::default();
        assert!(cfg.music);
        assert_eq!(cfg.tempo_bpm, 120);
        assert!(cfg.velocity <= 127);
        assert_eq!(cfg.scene.photo_count, 24);
    }

    #[test]
    fn lyric_clock_extrapolates_while_playing() {
        let mut clock = LyricClock::new();
        clock.set_playing(true);
        clock.on_note(5.0);
        std::thread::sleep(Duration::from_millis(30));
        let secs = clock.secs();
        assert!(secs >= 5.0, "clock went backwards: {}", secs);
        assert!(secs < 6.0);
    }

    #[test]
    fn lyric_clock_freezes_when_paused() {
        let mut clock = LyricClock::new();
        clock.set_playing(true);
        clock.on_note(3.0);
        clock.set_playing(false);
        let frozen = clock.secs();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(clock.secs(), frozen);
    }

    #[test]
    fn status_line_shows_phase_and_progress() {
        let store = SceneStore::new();
        let scene = Scene::new(
            SceneConfig {
                particle_count: 10,
                ornament_count: 5,
                photo_count: 2,
                snowflake_count: 3,
                ..SceneConfig::default()
            },
            rand::rngs::StdRng::seed_from_u64(7),
        );
        let s = status_line(&store, &scene);
        assert!(s.contains("tree"));
        assert!(s.contains("0%"));
        assert!(s.contains("camera: on"));
    }
}
