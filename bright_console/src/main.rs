//! bright_console — interactive entry point.

use bright_console::app::{run, AppConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Brightness Control Console                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "camera")]
    println!("  Camera:  webcam device 0");
    #[cfg(not(feature = "camera"))]
    println!("  Camera:  synthetic test pattern  (use --features camera for a webcam)");

    #[cfg(feature = "mediapipe")]
    println!("  Tracker: MediaPipe helper subprocess");
    #[cfg(not(feature = "mediapipe"))]
    println!("  Tracker: mouse simulation  (hold left button to pinch)");
    println!();

    println!("  Opening feed window…");
    println!();

    if let Err(e) = run(AppConfig::default()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
