//! Road Segment Simulation Library
//!
//! Vehicles driving over a fixed network of straight and arc segments. The
//! simulation runs headless or with a Bevy UI.

pub mod simulation;

#[cfg(feature = "ui")]
pub mod ui;
