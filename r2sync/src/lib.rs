//! CLI glue for r2sync. All engine logic lives in the `r2sync-core` crate;
//! this crate adds argument parsing, configuration loading and the concrete
//! R2 storage client.

pub mod cli;
pub mod load_config;
pub mod store;
