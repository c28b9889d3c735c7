pub mod blockers;
pub mod config;
pub mod error;
pub mod event;
pub mod guidance;
pub mod io;
pub mod machine;
pub mod paths;
pub mod reflection;
pub mod session;
pub mod spec;
pub mod store;
pub mod testrun;
pub mod types;
pub mod workflow;

pub use error::{Result, TddError};
