//! Shared fixtures for integration tests.

pub mod paper_tree;
