pub mod config;
pub mod continuity;
pub mod drift;
pub mod session;

pub(crate) mod shared;
pub(crate) mod slot;
pub(crate) mod state;
