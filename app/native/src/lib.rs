//! Tessel - intelligent window placement.
//!
//! The [`placement`] engine keeps a registry of windows and monitors and
//! places windows through tiling, snapping, rule automation and focus
//! prediction. A display server is reached only through the
//! [`DisplayBinding`](placement::binding::DisplayBinding) trait.
//!
//! The [`cli`] module hosts the `tessel` command line.

pub mod cli;
pub mod config;
pub mod error;
pub mod placement;
