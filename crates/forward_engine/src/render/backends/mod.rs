//! Graphics device implementations bundled with the engine
//!
//! Real GPU backends live with the application that owns the context; the
//! engine only ships a device that logs what it is asked to do.

mod logging;

pub use logging::{DeviceStats, LoggingDevice};
