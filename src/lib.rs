//! opsdesk: terminal operator console for an agency operations backend.
//!
//! The library holds everything but argument parsing: configuration,
//! logging, the backend client and view state (`desk`), and text rendering
//! (`ui`). The `opsdesk` binary wires these together behind clap.

pub mod config;
pub mod desk;
pub mod errors;
pub mod logging;
pub mod ui;
