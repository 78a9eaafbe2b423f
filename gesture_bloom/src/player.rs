//! Real-time MIDI playback thread for the carol.
//!
//! The melody loops for the whole session, the way the scene's soundtrack
//! should. Playback is started and paused via commands; every note played is
//! reported back with its position in the piece so the overlay can sync the
//! lyric sheet against it.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use carol_track::{beats_to_ms, Carol};

// ════════════════════════════════════════════════════════════════════════════
// PlayerCommand — sent to the playback thread
// ════════════════════════════════════════════════════════════════════════════

pub enum PlayerCommand {
    /// Begin (or resume) streaming notes.
    Play,
    /// Pause after the current note, keeping the position.
    Pause,
    /// Terminate the thread.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// NoteEvent — reported back for lyric sync
// ════════════════════════════════════════════════════════════════════════════

/// Emitted for each note played. `position_secs` is the note's start time
/// within the (looping) piece — the lyric overlay scans its cue list with it.
#[derive(Clone, Copy, Debug)]
pub struct NoteEvent {
    pub position_secs: f32,
    pub pitch: u8,
    pub duration_ms: u64,
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null (for machines with no synth)
// ════════════════════════════════════════════════════════════════════════════

trait MidiOut: Send {
    fn program_change(&mut self, channel: u8, program: u8);
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn program_change(&mut self, channel: u8, program: u8) {
        let _ = self.conn.send(&[0xC0 | (channel & 0x0F), program]);
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&[0x90 | (channel & 0x0F), note, velocity]);
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&[0x80 | (channel & 0x0F), note, 0]);
    }
}

/// Silent fallback, used when no MIDI port is available. The scene stays
/// fully functional; only the sound is missing.
struct NullOut;
impl MidiOut for NullOut {
    fn program_change(&mut self, _ch: u8, _p: u8) {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8) {}
    fn note_off(&mut self, _ch: u8, _n: u8) {}
}

/// Open the first available MIDI output port, preferring a softsynth when
/// one is visible. Falls back to the null output with a warning.
fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("gesture_bloom_player") {
        Ok(m) => m,
        Err(e) => {
            log::warn!("MIDI init error: {} — music disabled", e);
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        log::warn!("no MIDI output ports found — music disabled");
        log::warn!("install a synthesiser, e.g. `timidity -iA` or `fluidsynth` on Linux");
        return Box::new(NullOut);
    }

    let port_idx = ports
        .iter()
        .enumerate()
        .find(|(_, p)| {
            midi_out
                .port_name(p)
                .map(|n| {
                    let n = n.to_lowercase();
                    n.contains("fluid")
                        || n.contains("timidity")
                        || n.contains("microsoft")
                        || n.contains("synth")
                })
                .unwrap_or(false)
        })
        .map(|(i, _)| i)
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out
        .port_name(port)
        .unwrap_or_else(|_| "Unknown".to_string());
    log::info!("opening MIDI port: {}", name);

    match midi_out.connect(port, "bloom-play") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e) => {
            log::warn!("MIDI connect failed: {} — music disabled", e);
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Player — handle to the playback thread
// ════════════════════════════════════════════════════════════════════════════

pub struct Player {
    cmd_tx: Sender<PlayerCommand>,
    note_rx: Receiver<NoteEvent>,
}

impl Player {
    /// Spawn the playback thread. The thread owns the MIDI connection; the
    /// handle only talks to it over channels.
    pub fn spawn(carol: Carol, bpm: u32, instrument: u8, velocity: u8, channel: u8) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayerCommand>();
        let (note_tx, note_rx) = mpsc::channel::<NoteEvent>();

        thread::spawn(move || {
            player_thread(carol, bpm, instrument, velocity, channel, cmd_rx, note_tx);
        });

        Player { cmd_tx, note_rx }
    }

    pub fn play(&self) {
        let _ = self.cmd_tx.send(PlayerCommand::Play);
    }

    pub fn pause(&self) {
        let _ = self.cmd_tx.send(PlayerCommand::Pause);
    }

    pub fn quit(&self) {
        let _ = self.cmd_tx.send(PlayerCommand::Quit);
    }

    /// Drain any pending note events (non-blocking).
    pub fn drain_notes(&self) -> Vec<NoteEvent> {
        let mut out = Vec::new();
        while let Ok(n) = self.note_rx.try_recv() {
            out.push(n);
        }
        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// player_thread — the actual loop
// ════════════════════════════════════════════════════════════════════════════

fn player_thread(
    carol: Carol,
    bpm: u32,
    instrument: u8,
    velocity: u8,
    channel: u8,
    cmd_rx: Receiver<PlayerCommand>,
    note_tx: Sender<NoteEvent>,
) {
    let mut midi = open_midi_output();
    let mut playing = false;
    let mut note_idx = 0usize;
    let mut position_secs = 0.0f32;
    let secs_per_beat = 60.0 / bpm.max(1) as f32;

    midi.program_change(channel, instrument);

    loop {
        // ── drain commands ────────────────────────────────────────────────
        loop {
            match cmd_rx.try_recv() {
                Ok(PlayerCommand::Play) => {
                    playing = true;
                    midi.program_change(channel, instrument);
                }
                Ok(PlayerCommand::Pause) => playing = false,
                Ok(PlayerCommand::Quit) => return,
                Err(_) => break,
            }
        }

        if !playing {
            thread::sleep(Duration::from_millis(10));
            continue;
        }

        // ── play the next note, wrapping at the end (the carol loops) ─────
        if note_idx >= carol.notes().len() {
            note_idx = 0;
            position_secs = 0.0;
        }
        let note = carol.notes()[note_idx];
        let millis = beats_to_ms(note.beats, bpm);

        let _ = note_tx.send(NoteEvent {
            position_secs,
            pitch: note.pitch,
            duration_ms: millis,
        });

        midi.note_on(channel, note.pitch, velocity);
        thread::sleep(Duration::from_millis(millis));
        midi.note_off(channel, note.pitch);

        // Brief gap between notes so repeated pitches re-articulate.
        let gap = (millis / 20).max(5);
        thread::sleep(Duration::from_millis(gap));

        note_idx += 1;
        position_secs += note.beats * secs_per_beat;
    }
}
