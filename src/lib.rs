//! Certificate batch generator backend.
//!
//! Turns an uploaded roster spreadsheet into a zip archive of personalized
//! certificate images, one per data row, rendered onto the background
//! template that matches the requested unit and certificate type.

pub mod api;
pub mod assets;
pub mod batch;
pub mod extract;
pub mod openapi;
pub mod registry;
pub mod render;
pub mod resolve;
pub mod state;

pub use state::AppState;
