//! Connection management for the control link
//!
//! This module handles:
//! - Opening the serial or TCP control link with automatic reconnection
//! - Splitting inbound bytes into control messages
//! - Writing event and notification lines back to the controller

mod manager;

pub use manager::{ConnectionEvent, ConnectionManager, ControlPublisher};
