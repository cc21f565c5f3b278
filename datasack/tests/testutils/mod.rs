//! Test utilities for datasack integration tests
//!
//! Every fixture opens its own store and a uniquely named database, so tests
//! can run in parallel without sharing state.

pub mod test_fixture;
