//! Host platform detection
//!
//! This module describes the machine an artifact is being resolved for:
//! its operating system, CPU family and bit width. The host is either
//! detected at compile time or built from user-supplied names, so a
//! resolution can be performed for any target machine.

mod host;

pub use host::{BitWidth, CpuFamily, Host, HostOs};
