//! vtoy Core Library
//!
//! Leaf utilities for the loader's platform module: rule matching, fact
//! publishing into the bootloader environment, and diagnostics.
//! Designed to be no_std compatible; nothing here allocates.
//!
//! # Modules
//!
//! - [`pattern`]: single-byte wildcard comparison (`a*c` matches `abc`)
//! - [`env`]: `EnvStore` plus the fact / pair publishers
//! - [`fmt`]: fixed-capacity stack formatting buffer
//! - [`logger`]: `log` backend with a bounded ring and the debug flag
//! - [`dump`]: 16-byte identifier dumps for debug output
//! - [`string`]: small string helpers

#![no_std]

pub mod dump;
pub mod env;
pub mod fmt;
pub mod logger;
pub mod pattern;
pub mod string;

#[doc(hidden)]
pub use log as __log;

pub use env::{export_fact, publish_fact, publish_pair, EnvStore, EnvTable};
pub use fmt::FmtBuf;
pub use pattern::{
    wildcard_cmp, wildcard_match, wildcard_match_n, wildcard_matches_opt, wildcard_ncmp,
};
