//! Building blocks shared by the vesting vault and the crowd sale contracts.
//!
//! - [`access`]: role membership (`Admin`, `Controller`, `Whitelisted`) kept in
//!   the calling contract's own storage.
//! - [`custody`]: checked token transfers on top of the Soroban token interface.

#![no_std]
#![deny(unsafe_code)]
#![deny(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

pub mod access;
pub mod custody;

pub use access::{AccessError, Role};
pub use custody::CustodyError;
