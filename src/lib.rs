//! Engine instrument cluster core.
//!
//! Reads engine sensors, classifies them against alert bands and renders the
//! results on two HT16K33 seven-segment LED lines. Everything here is
//! target-independent; the binary (`main.rs`) adds the RP2350 board glue.
//!
//! # Data flow
//!
//! ```text
//! interrupt producers ──► store::SampleStore ──► reader::SensorReader ──► alert
//!   (tick, tach,             (SharedCell /          (interpolate,           │
//!    fuel flow,               WordCell)              fixed-point)           ▼
//!    thermocouple)                                                   pages ──► frame ──► display ──► bus
//! ```
//!
//! A faulted channel is `None` at every stage and only becomes a glyph when a
//! frame is rendered.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test --lib
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), while the firmware itself is
//! `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

// Configuration
pub mod config;

// Arithmetic and calibration
pub mod calibration;
pub mod fixed;
pub mod interpolate;

// Sampling and persistence
pub mod cell;
pub mod persist;
pub mod store;

// Reading and classification
pub mod alert;
pub mod engine;
pub mod reader;
pub mod sensor;

// Display
pub mod bus;
pub mod display;
pub mod frame;
pub mod pages;
pub mod segments;
