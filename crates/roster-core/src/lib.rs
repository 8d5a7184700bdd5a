pub mod a1;
pub mod access;
pub mod backup;
pub mod cell;
pub mod config;
pub mod error;
pub mod export;
pub mod locate;
#[cfg(test)]
mod memory;
pub mod note;
pub mod roster;
pub mod store;
pub mod types;

pub use error::{Result, RosterError};
