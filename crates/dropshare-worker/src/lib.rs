//! Background reaping for DropShare.
//!
//! This crate provides:
//! - A [`Reaper`] that sweeps every stored record and reaps the ones whose
//!   policy is no longer active, plus payload directories left without one
//! - A cron [`ReaperScheduler`] that runs the sweep periodically

pub mod reaper;
pub mod scheduler;

pub use reaper::{Reaper, SweepReport};
pub use scheduler::ReaperScheduler;

#[cfg(test)]
mod testing;
