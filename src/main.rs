//! Engine instrument cluster firmware for Raspberry Pi Pico 2 (RP2350).
//!
//! Drives two HT16K33 seven-segment lines over I2C0: line 0 shows RPM with
//! the alarm indicator, line 1 rotates through the configured pages.
//!
//! # Tasks
//!
//! - `tick_task`: samples the analog bank every `TICK_MS`, advances the
//!   fuel-flow window and hobbs pre-load
//! - `tach_task` / `fuel_flow_task`: timestamp and count rising edges
//! - main: tach activity check, engine-running detection, rendering, and
//!   batched status writes to flash
//!
//! # Wiring
//!
//! | Signal | Pin |
//! |--------|-----|
//! | I2C0 SDA / SCL | GPIO4 / GPIO5 |
//! | tach | GPIO2 |
//! | fuel-flow transducer | GPIO3 |
//! | analog 0-3 | GPIO26-29 |

#![no_std]
#![no_main]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

// Modules only used in the binary (not testable on host)
mod board;
mod storage;

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_time::{Duration, Instant, Ticker};
use enguino_cluster::bus::HalTwoWire;
use enguino_cluster::config::sensors::{HEADLINE, PAGES, RUN_CRITERIA, WATCHED};
use enguino_cluster::config::{COMMIT_MS, PAGE_MS, RENDER_MS, TACH_CHECK_MS, TICK_MS};
use enguino_cluster::display::LedDisplay;
use enguino_cluster::engine::is_engine_running;
use enguino_cluster::frame::Line;
use enguino_cluster::pages::{Rotation, render_headline, render_page, watched_alerts};
use enguino_cluster::persist::{PersistentStatus, Settings, StatusStorage, StorageError};
use enguino_cluster::reader::SensorReader;
use enguino_cluster::store::{FuelFlowPort, SampleStore, Startup, TachPort, TickPort};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::board::BoardAnalog;
use crate::storage::FlashStorage;

// =============================================================================
// Producer tasks
// =============================================================================

/// Periodic tick: analog sampling plus the slower fuel-window and hobbs work.
#[embassy_executor::task]
async fn tick_task(
    mut analog: BoardAnalog<'static>,
    mut port: TickPort<'static>,
) {
    info!("Tick task started ({} ms)", TICK_MS);
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    loop {
        ticker.next().await;
        port.on_tick(&mut analog);
    }
}

/// Tachometer rising edges, timestamped with the microsecond clock.
#[embassy_executor::task]
async fn tach_task(
    mut input: Input<'static>,
    mut port: TachPort<'static>,
) {
    info!("Tach task started");
    loop {
        input.wait_for_rising_edge().await;
        // the ring only needs intervals; the clock may wrap freely
        port.on_edge(Instant::now().as_micros() as u32);
    }
}

/// Fuel-flow transducer pulses.
#[embassy_executor::task]
async fn fuel_flow_task(
    mut input: Input<'static>,
    mut port: FuelFlowPort<'static>,
) {
    info!("Fuel flow task started");
    loop {
        input.wait_for_rising_edge().await;
        port.on_edge();
    }
}

// =============================================================================
// Main loop
// =============================================================================

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Engine cluster starting...");
    let p = embassy_rp::init(Default::default());

    let mut storage = FlashStorage::new(p.FLASH);
    let (settings, status) = match storage.load() {
        Ok(loaded) => loaded,
        Err(StorageError::Blank) => {
            info!("No stored status, starting from defaults");
            (Settings::default(), PersistentStatus::default())
        }
        Err(error) => {
            warn!("Stored status unusable ({}), starting from defaults", error);
            (Settings::default(), PersistentStatus::default())
        }
    };
    info!("Settings: {}, status: {}", settings, status);

    static STORE: StaticCell<SampleStore> = StaticCell::new();
    let store: &'static SampleStore = STORE.init(SampleStore::new(settings, status));
    let ports = store.split(Startup::AssumeHalfLost).expect("ports are split once");

    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default());
    let mut display = LedDisplay::configure(HalTwoWire::new(i2c));
    info!("Display configured");

    let analog = BoardAnalog::new(p.ADC, p.PIN_26, p.PIN_27, p.PIN_28, p.PIN_29);
    spawner.spawn(tick_task(analog, ports.tick)).unwrap();
    spawner.spawn(tach_task(Input::new(p.PIN_2, Pull::Up), ports.tach)).unwrap();
    spawner.spawn(fuel_flow_task(Input::new(p.PIN_3, Pull::Up), ports.fuel_flow)).unwrap();
    info!("Producer tasks spawned");

    // no thermocouple converter on this board; probes stay faulted
    let main_port = ports.main;
    let reader = SensorReader::new(&main_port);

    let mut rotation = Rotation::new(PAGES.len(), PAGE_MS);
    let mut ticker = Ticker::every(Duration::from_millis(RENDER_MS));
    let mut last_tach_check = Instant::now();
    let mut last_commit = Instant::now();
    let mut running = false;

    loop {
        ticker.next().await;
        let now = Instant::now();

        if now - last_tach_check >= Duration::from_millis(TACH_CHECK_MS) {
            last_tach_check = now;
            main_port.check_tach();

            let now_running = is_engine_running(&reader, RUN_CRITERIA);
            if now_running != running {
                info!("Engine {}", if now_running { "running" } else { "stopped" });
                running = now_running;
            }
            main_port.set_engine_running(running);
        }

        let indicator = watched_alerts(&reader, WATCHED).indicator();
        display.show(Line::Upper, &render_headline(&reader, HEADLINE, indicator)).ok();

        if let Some(page) = PAGES.get(rotation.current(now.as_millis())) {
            display.show(Line::Lower, &render_page(&reader, page)).ok();
        }

        if now - last_commit >= Duration::from_millis(COMMIT_MS) {
            last_commit = now;
            // failures stay dirty and are retried on the next interval
            main_port.commit_if_dirty(&mut storage).ok();
        }
    }
}
