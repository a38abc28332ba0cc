pub mod entry;
pub mod asset;
pub mod report;
pub mod error;

pub use entry::*;
pub use asset::*;
pub use report::*;
pub use error::*;
