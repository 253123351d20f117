//! Transport-neutral request and response types exchanged with the host.

mod request;
mod response;

pub use request::{HostRequest, Method};
pub use response::{HostResponse, StatusCode};
