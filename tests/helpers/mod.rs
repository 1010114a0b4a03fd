//! Shared test helpers.

pub mod host_helpers;
