//! World data model and the pure physics derived from it

pub mod derived;
pub mod energy;
pub mod forces;
pub mod math;
pub mod snapshot;
