//! Test suites spanning several modules
//!
//! Unit tests live next to the code they cover; the suites here exercise
//! schema translation, merging, registration and rendering together.

#[cfg(test)]
mod integration;
