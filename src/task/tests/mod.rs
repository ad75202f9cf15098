//! Unit tests for the task module.
//!
//! Tests are organised by layer: codec, domain values, workflow gates,
//! filesystem adapters, and the lifecycle service.

mod codec_tests;
mod gate_tests;
mod support;
