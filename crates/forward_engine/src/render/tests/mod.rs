//! Renderer test support and cross-module scenarios
//!
//! `recording_device` is the device double used by every renderer test;
//! `shadow_frame` drives whole frames through the public renderer API.

pub(crate) mod recording_device;
