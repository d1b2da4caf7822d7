//! mediaprobe - Command-line front end for mediaprobe-core
//!
//! This library crate exposes configuration loading for integration testing.

pub mod config;
