//! Core domain model for the atelier pair-coding sandbox.
//!
//! Holds the virtual project store with per-file version history, the
//! AI action protocol, session management, and the service traits the
//! outer layers implement. No I/O happens in this crate apart from
//! reading the clock.

pub mod action;
pub mod error;
pub mod project;
pub mod services;
pub mod session;
pub mod settings;

pub use error::{AtelierError, Result};
