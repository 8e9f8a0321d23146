#[macro_use]
extern crate log;

pub mod benchmark;
pub mod cli;
pub mod error;
pub mod filter;
pub mod format;
pub mod partition;
pub mod pipeline;
pub mod preset;
pub mod record;
pub mod report;
pub mod sample;
pub mod table;
