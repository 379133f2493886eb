//! Configuration core for the codeshade desktop overlay.
//!
//! On startup the path resolver enumerates every location a config file may
//! live in (current identity, Electron-era legacy identities, working
//! directory), the reconciler deletes the invalid ones, and `ConfigStore`
//! becomes the only mutation surface for the rest of the process lifetime.

pub mod config;
pub mod providers;

pub use config::{Config, ConfigStore, ConfigUpdate, Provider};
