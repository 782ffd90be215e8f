//! Wire and domain types shared by the LMS client crates.

pub mod domain;
pub mod error;
pub mod protocol;
