//! Bench simulator for the hygrostat controller
//!
//! Runs the real control loop against a synthetic triangle-wave RH
//! sensor, with the clock accelerated so a simulated day passes in
//! minutes. The status screen is a console line, relay writes go to
//! the log. Useful for watching the hysteresis and outlet rotation
//! behave before touching hardware.
//!
//! ```text
//! RUST_LOG=info cargo run -p hygrostat-sim -- [accel]
//! ```
//!
//! `accel` is how many simulated seconds pass per wall second
//! (default 60). Stop with Ctrl-C.

use std::env;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use hygrostat_core::sampler::SawtoothRh;
use hygrostat_core::time::{NoPause, TimeSource, UptimeClock};
use hygrostat_core::{
    Controller, Intensity, RelayDriver, StatusDisplay, StatusSnapshot, Task, Trend,
};

/// Simulated milliseconds per wall millisecond when no argument is given
const DEFAULT_ACCEL: u64 = 60;

/// How often the loop wakes to poll, in wall time
const LOOP_SLEEP_MS: u64 = 100;

/// Relay board stand-in: writes go to the log instead of GPIO
struct LoggingRelays;

impl RelayDriver for LoggingRelays {
    fn set_outlet_energized(&mut self, index: usize, energized: bool) {
        info!(
            "relay {} {}",
            index,
            if energized { "ON" } else { "off" }
        );
    }
}

/// Status screen stand-in: one console line per refresh
struct ConsoleDisplay;

impl ConsoleDisplay {
    fn trend_arrow(trend: Trend) -> char {
        match trend {
            Trend::Rising => '^',
            Trend::Even => '-',
            Trend::Falling => 'v',
        }
    }
}

impl StatusDisplay<3> for ConsoleDisplay {
    fn render(&mut self, snapshot: &StatusSnapshot<3>) {
        let mut outlets = String::new();
        for outlet in &snapshot.outlets {
            outlets.push_str(&format!(
                " [{} {} {:5.1}%{}]",
                outlet.setting.name(),
                if outlet.energized { "ON " } else { "off" },
                100.0 - outlet.depleted_percent,
                if outlet.energized { "*" } else { " " },
            ));
        }

        println!(
            "RH {:5.2}% {} | {:5}{}{}{}",
            snapshot.rh,
            Self::trend_arrow(snapshot.trend),
            snapshot.intensity.name(),
            outlets,
            if snapshot.alert { " ALERT" } else { "" },
            if snapshot.heartbeat { " ." } else { "" },
        );
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("fatal: {message}");
    }
}

fn acceleration() -> Result<u64> {
    match env::args().nth(1) {
        None => Ok(DEFAULT_ACCEL),
        Some(arg) => {
            let accel: u64 = arg
                .parse()
                .with_context(|| format!("acceleration factor must be a number, got {arg:?}"))?;
            anyhow::ensure!(accel > 0, "acceleration factor must be at least 1");
            Ok(accel)
        }
    }
}

fn run() -> Result<()> {
    let accel = acceleration()?;
    info!("starting simulator at {accel}x time");

    let clock = UptimeClock::new();
    let mut sensor = SawtoothRh::new(60.0);
    // Sample gaps are simulated time; never sleep the bench for them
    let mut pause = NoPause;
    let mut relays = LoggingRelays;
    let mut display = ConsoleDisplay;
    let mut controller = Controller::standard(0);

    loop {
        let now = clock.now() * accel;

        while let Some(task) = controller.poll(now) {
            match task {
                Task::SampleRh => {
                    let rh = controller.update_rh(&mut sensor, &mut pause);
                    info!("sampled RH {rh:.2}%");
                }
                Task::Automate => {
                    let outcome = controller.automate(now);
                    if controller.intensity() != Intensity::Off {
                        log::debug!("automation pass: {outcome:?}");
                    }
                }
                Task::RefreshDisplay => {
                    display.render(&controller.snapshot(now));
                }
                Task::Heartbeat => {}
            }
        }

        controller.sync_relays(&mut relays);
        thread::sleep(Duration::from_millis(LOOP_SLEEP_MS));
    }
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        ConsoleDisplay.show_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}
