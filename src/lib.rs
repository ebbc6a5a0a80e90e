//! A small Rust client for the Statistics Netherlands (CBS) open data API.
//!
//! This crate implements a `cbsodata`-style flow over the OData v3 service:
//! list the tables of a catalog, read table information and metadata, and
//! download table data as ordered records, following pagination links until the
//! result is complete.
//!
//! ## Quick start
//! - Optionally configure the catalog via environment variables (`CBSODATA_CATALOG_URL`,
//!   `CBSODATA_USE_HTTPS`) or a `.cbsodatarc` file (current directory or home directory).
//! - Call [`Client::get_data`] with a table identifier.
//!
//! ```no_run
//! use cbsodata::{Client, Query};
//!
//! fn main() -> cbsodata::Result<()> {
//!     let client = Client::from_env()?;
//!
//!     let info = client.get_info("82070ENG", &Query::new())?;
//!     println!("{}", info["Title"]);
//!
//!     let rows = client.get_data(
//!         "82070ENG",
//!         &Query::new().select(["Periods", "Sex"]).dir("82070ENG"),
//!     )?;
//!     for row in rows.iter().take(5) {
//!         println!("{:?}", row);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Other catalogs, such as `dataderden.cbs.nl`, can be selected per call with
//! [`Query::catalog`], for a block of code with [`catalog::scoped`], or for the
//! whole process with [`catalog::set_default_catalog`].

#![forbid(unsafe_code)]

mod bundle;
pub mod catalog;
mod client;
mod config;
mod error;
pub mod export;
mod odata;
mod query;
mod record;
mod util;

pub use bundle::TableBundle;
pub use client::{Client, ClientConfig, Service};
pub use error::{Error, Result};
pub use query::Query;
pub use record::{Record, Value};
