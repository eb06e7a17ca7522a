//! Integration test crate for Stillframe.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on every stillframe library crate to verify they work together.

#[cfg(test)]
mod planning;

#[cfg(test)]
mod transforms;

#[cfg(test)]
mod extraction;
