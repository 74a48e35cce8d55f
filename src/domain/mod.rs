// Domain layer: calendar symbols, models and the store ports the engine reads through.

pub mod ganji;
pub mod model;
pub mod ports;
pub mod term;
