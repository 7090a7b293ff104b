//! Application layer — ports, commands, events, and the orchestrating
//! service.
//!
//! The domain core (input, sensors, control, graph, ui) never touches
//! hardware or storage directly; everything flows through the port traits in
//! [`ports`]. External execution contexts (the web front end) reach the core
//! only through the [`commands`] queue.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
