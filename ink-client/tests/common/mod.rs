//! Shared integration-test support.

// Each test binary compiles this module separately, so helpers unused by
// one suite would otherwise warn.
#[allow(dead_code)]
pub mod server;

pub use server::InferenceStub;
