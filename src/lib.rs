//! buzzfx library — sound-effect engine for an onboard PWM buzzer.
//!
//! Other tasks on the board signal state changes (startup, mode toggle,
//! error, target acquired) by writing a requested [`effect::Effect`] into a
//! shared [`control::ControlHandle`]. A single sound-effect task reads it on a
//! fixed cadence and plays one of twelve fixed patterns through a
//! [`tone::ToneDriver`].
//!
//! This crate holds all pattern, scheduling and handshake logic with no
//! platform dependencies, testable on any host with
//! `cargo test --no-default-features`. The firmware binaries (Embassy in
//! `src/main.rs`, ESP-IDF in `firmware-std/`) only provide the LEDC tone
//! driver, the timer, and the tasks that request effects.
//!
//! - `effect` — selector codes and the pattern table
//! - `tone` — tone driver contract and pitch/duty constants
//! - `control` — busy / work / effect handshake record
//! - `player` — pattern state machine
//! - `task` — startup sequence and per-tick scheduling
//! - `config` — task configuration
//! - `board` — per-board pin constants

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod config;
pub mod control;
pub mod effect;
pub mod player;
pub mod task;
pub mod tone;
