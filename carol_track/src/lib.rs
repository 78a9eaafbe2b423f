//! # carol_track
//!
//! The music side of the bloom scene: a built-in public-domain carol melody
//! and a timestamped lyric sheet, with the lookup the overlay uses to show
//! the current line. No external crates are required — notes are plain
//! `(pitch, beats)` events and lyric cues are parsed from `MM:SS text`
//! lines.
//!
//! ## Quick start
//!
//! ```rust
//! use carol_track::{Carol, LyricSheet, WE_WISH_YOU_LYRICS};
//!
//! let carol = Carol::we_wish_you();
//! assert!(carol.duration_secs(carol.default_bpm()) > 0.0);
//!
//! let sheet = LyricSheet::parse(WE_WISH_YOU_LYRICS);
//! assert_eq!(sheet.cue_at(1.0), Some("We wish you a merry Christmas"));
//! ```

// ════════════════════════════════════════════════════════════════════════════
// Notes and the carol melody
// ════════════════════════════════════════════════════════════════════════════

/// One melody event: a MIDI pitch held for a number of beats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    pub pitch: u8,
    pub beats: f32,
}

/// A playable melody. The player loops it; duration helpers are provided
/// for anything that needs wall-clock timing.
#[derive(Clone, Debug)]
pub struct Carol {
    name: &'static str,
    default_bpm: u32,
    notes: Vec<Note>,
}

impl Carol {
    /// "We Wish You a Merry Christmas", verse and chorus, in G.
    pub fn we_wish_you() -> Carol {
        const D4: u8 = 62;
        const E4: u8 = 64;
        const FS4: u8 = 66;
        const G4: u8 = 67;
        const A4: u8 = 69;
        const B4: u8 = 71;
        const C5: u8 = 72;
        const D5: u8 = 74;

        let n = |pitch: u8, beats: f32| Note { pitch, beats };

        Carol {
            name: "We Wish You a Merry Christmas",
            default_bpm: 120,
            notes: vec![
                // verse
                n(D4, 1.0),
                n(G4, 1.0), n(G4, 0.5), n(A4, 0.5), n(G4, 0.5), n(FS4, 0.5),
                n(E4, 1.0), n(E4, 1.0), n(E4, 1.0),
                n(A4, 1.0), n(A4, 0.5), n(B4, 0.5), n(A4, 0.5), n(G4, 0.5),
                n(FS4, 1.0), n(D4, 1.0), n(D4, 1.0),
                n(B4, 1.0), n(B4, 0.5), n(C5, 0.5), n(B4, 0.5), n(A4, 0.5),
                n(G4, 1.0), n(E4, 1.0), n(D4, 0.5), n(D4, 0.5),
                n(E4, 1.0), n(A4, 1.0), n(FS4, 1.0),
                n(G4, 3.0),
                // chorus
                n(D4, 1.0),
                n(G4, 1.0), n(G4, 1.0), n(G4, 1.0),
                n(FS4, 2.0), n(FS4, 1.0),
                n(G4, 1.0), n(FS4, 1.0), n(E4, 1.0),
                n(D4, 2.0), n(A4, 1.0),
                n(B4, 1.0), n(A4, 1.0), n(G4, 1.0),
                n(D5, 1.0), n(D4, 1.0), n(D4, 1.0),
                n(E4, 1.0), n(A4, 1.0), n(FS4, 1.0),
                n(G4, 3.0),
            ],
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn default_bpm(&self) -> u32 {
        self.default_bpm
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn total_beats(&self) -> f32 {
        self.notes.iter().map(|n| n.beats).sum()
    }

    pub fn duration_secs(&self, bpm: u32) -> f32 {
        self.total_beats() * 60.0 / bpm.max(1) as f32
    }
}

/// Convert beats to milliseconds at the given tempo, floored at 50 ms so a
/// very short note still sounds.
pub fn beats_to_ms(beats: f32, bpm: u32) -> u64 {
    let ms_per_beat = 60_000.0 / bpm.max(1) as f32;
    (beats * ms_per_beat).max(50.0) as u64
}

// ════════════════════════════════════════════════════════════════════════════
// Lyric sheet
// ════════════════════════════════════════════════════════════════════════════

/// One timed lyric line.
#[derive(Clone, Debug, PartialEq)]
pub struct LyricCue {
    /// Seconds from the start of playback.
    pub time: f32,
    pub text: String,
}

/// A sorted list of lyric cues, parsed from raw `MM:SS text` lines.
#[derive(Clone, Debug, Default)]
pub struct LyricSheet {
    cues: Vec<LyricCue>,
}

impl LyricSheet {
    /// Parse a raw sheet. Each non-empty line is `MM:SS text` (seconds may
    /// carry decimals); malformed lines are skipped. Cues are sorted by time
    /// so [`cue_at`](Self::cue_at) can stop at the first future cue.
    pub fn parse(raw: &str) -> LyricSheet {
        let mut cues: Vec<LyricCue> = raw
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                let (stamp, text) = line.split_once(' ')?;
                let (min, sec) = stamp.split_once(':')?;
                let min: f32 = min.parse().ok()?;
                let sec: f32 = sec.parse().ok()?;
                Some(LyricCue {
                    time: min * 60.0 + sec,
                    text: text.trim().to_string(),
                })
            })
            .collect();
        cues.sort_by(|a, b| a.time.total_cmp(&b.time));
        LyricSheet { cues }
    }

    /// The latest cue at or before `secs`, if any. A linear scan over the
    /// sorted list — the sheet is tiny and the scan exits at the first cue
    /// in the future.
    pub fn cue_at(&self, secs: f32) -> Option<&str> {
        let mut active = None;
        for cue in &self.cues {
            if cue.time <= secs {
                active = Some(cue.text.as_str());
            } else {
                break;
            }
        }
        active
    }

    pub fn cues(&self) -> &[LyricCue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

/// Timed lyric sheet for [`Carol::we_wish_you`] at its default tempo.
pub const WE_WISH_YOU_LYRICS: &str = "\
00:00 We wish you a merry Christmas
00:03 We wish you a merry Christmas
00:07 We wish you a merry Christmas
00:10 And a happy New Year
00:13 Good tidings we bring
00:16 To you and your kin
00:19 We wish you a merry Christmas
00:22 And a happy New Year";

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
