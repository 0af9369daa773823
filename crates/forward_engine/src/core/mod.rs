//! # Core Engine Module
//!
//! Shared configuration types used by the renderer and by applications.

pub mod config;

pub use config::{Config, ConfigError, RendererConfig, ShadowConfig};
