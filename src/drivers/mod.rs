//! Low-level output drivers, generic over `embedded-hal` pins.

pub mod indicator;
pub mod relay;
