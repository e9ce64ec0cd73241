//! Store backends.

pub mod json;
pub mod postgres;
