//! Shared test utilities for changes-cache integration tests
//!
//! Provides real git repositories, isolated cache/config directories and
//! change list fixtures.

pub mod assertions;
pub mod fixtures;
pub mod repository;
