//! Host-runtime driver for rnr-usb
//!
//! Thin layer between the operating system and the session core: locates
//! the configured device, claims its vendor interface through rusb, runs
//! one session per attach, and maps the verdict to an exit code. All
//! protocol behavior lives in the `session` crate; this crate only adapts
//! rusb to the session transport traits and carries the configuration.

pub mod config;
pub mod usb;
