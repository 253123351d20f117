//! Payload representation shared by triggers and outputs.

mod raw;

pub use raw::RawValue;
