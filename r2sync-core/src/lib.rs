#![doc = "r2sync-core: core synchronisation engine for r2sync."]

//! This crate contains all storage-agnostic logic for mirroring a local
//! directory tree against a remote object-storage bucket, in either direction.
//! The actual storage client lives in the CLI crate behind the
//! [`contract::ObjectStore`] capability trait.
//!
//! # Usage
//! Add this as a dependency for path/key mapping, enumeration and the bounded
//! transfer pipeline. Begin new modules as submodules below.

pub mod config;
pub mod contract;
pub mod enumerate;
pub mod keymap;
pub mod schedule;
pub mod synchronise;
pub mod transfer;
