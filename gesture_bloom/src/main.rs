//! gesture_bloom — interactive entry point.

use gesture_bloom::app::{run, AppConfig};
use std::io::{self, Write};

fn main() {
    env_logger::init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Gesture Bloom — Holiday Tree & Photo Nebula           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: hand tracking hardware  (keyboard still works)");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: keyboard simulation  (use --features leap for hardware)");
    println!();

    let cfg = if std::env::args().any(|a| a == "--quick") {
        println!("  Quick-start: default scene, glockenspiel, 120 BPM\n");
        AppConfig::default()
    } else {
        configure_interactively()
    };

    println!();
    println!("  Open palm blooms the tree, closed fist collapses the nebula.");
    println!("  Opening visualizer window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn configure_interactively() -> AppConfig {
    let mut cfg = AppConfig::default();

    cfg.music = !matches!(
        read_line("  Play the carol? (Y/n): ").trim(),
        "n" | "N" | "no"
    );

    if cfg.music {
        cfg.tempo_bpm = read_line("  Tempo BPM (default 120): ")
            .trim()
            .parse()
            .unwrap_or(120)
            .clamp(40, 240);

        println!("  Instrument (GM program 0–127):");
        println!("    0=Grand Piano  9=Glockenspiel  11=Vibraphone  14=Tubular Bells  73=Flute");
        cfg.instrument = read_line("  Program (default 9): ")
            .trim()
            .parse::<u8>()
            .unwrap_or(9)
            .min(127);
    }

    cfg
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
