#![cfg_attr(not(test), no_std)]

//! # thermolog-rs
//! ## An analog temperature/humidity logging station in Rust
//!
//! Features:
//! - Analog temperature and humidity sampling (10-bit)
//! - Timed logging runs with a configurable interval and count
//! - Per-byte EEPROM persistence of every reading
//! - LCD menu driven by a 4x4 matrix keypad
//! - End-of-run buzzer alarm
//!
//! The control logic only depends on the capability traits in these
//! modules; `main.rs` binds them to the Pico's peripherals.

pub mod controller;
pub mod keypad;
pub mod preferences;
pub mod rendering;
pub mod sensors;
pub mod storage;
pub mod timer;
