//! Gravitational field models and the numerics behind them

pub mod error;
pub mod field;
pub mod math;
pub mod multipole;
pub mod special;
