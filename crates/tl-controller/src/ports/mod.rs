//! Hexagonal architecture ports.

pub mod outbound;
