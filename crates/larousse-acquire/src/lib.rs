//! Offline snapshots of Larousse bilingual dictionary entries.
//!
//! [`run_entry`] renders one entry page, keeps only the entry itself, pulls
//! its stylesheets, scripts and pronunciation audio next to it and writes a
//! self-contained HTML file. [`worker::EntryWorker`] runs that pipeline off
//! the caller's thread for interactive front ends.

pub mod assemble;
pub mod config;
pub mod dom;
pub mod events;
pub mod extract;
pub mod localize;
pub mod neutralize;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod resolve;
pub mod worker;

pub use config::SnapshotConfig;
pub use events::Reporter;
pub use pipeline::run_entry;
pub use render::{ChromiumRenderer, PageRenderer};
pub use worker::{EntryWorker, RunHandle};
