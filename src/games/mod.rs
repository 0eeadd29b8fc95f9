//! Game rule implementations.

pub mod reversi;
