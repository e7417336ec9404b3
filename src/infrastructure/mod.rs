//! Infrastructure layer - Port implementations
//!
//! Concrete implementations of the domain ports on top of the ESP32 GPIO
//! block, plus the tasks running the deferred edge work.

#[cfg(feature = "esp32")]
pub mod adapters;
pub mod drivers;
pub mod services;
pub mod tasks;
