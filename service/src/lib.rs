//! Process-level infrastructure shared by every other crate: command line / environment
//! configuration and logger initialisation.

pub mod config;
pub mod logging;
