//! Resolver tests over small synthetic module sets.
//!
//! For randomized checks of the readability closure, see property_tests.rs
//! (requires the proptest feature).

mod resolve_tests;
