//! Harmattan - Gill 2D sonic anemometer data processing.
//!
//! Harmattan turns raw Gill WindSonic 2D anemometer captures from the Cape
//! Verde Atmospheric Observatory into CF-1.6 NetCDF files, carrying NCAS/AMF
//! variable metadata. It also runs standalone quality-control scans, reports
//! the latest readings for the tower's sensor units, and inspects produced
//! NetCDF files headlessly.
//!
//! # Pipeline
//!
//! 1. [`gill`] reads raw files line by line and applies the strict
//!    quality-control rules of the logger format (exact line length, working
//!    status code, permitted character set).
//! 2. [`series`] holds the accepted readings as a meteorological-component
//!    time series and can bin-average it onto an epoch-aligned grid.
//! 3. [`amf`] supplies the output variable metadata, embedded or from a CSV.
//! 4. [`writer`] writes the CF-1.6 NetCDF file.
//!
//! # Example
//!
//! ```ignore
//! use harmattan::amf::VariableTable;
//! use harmattan::gill;
//! use harmattan::series::SonicSeries;
//! use harmattan::writer::{self, DatasetAttrs};
//!
//! let outcome = gill::scan_files(&files)?;
//! let series = SonicSeries::from_records(&outcome.records);
//! writer::write_netcdf(
//!     &series,
//!     &VariableTable::builtin(),
//!     &DatasetAttrs::default(),
//!     Path::new("sonic_2d_data.nc"),
//! )?;
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod amf;
pub mod cli;
pub mod config;
pub mod error;
pub mod gill;
pub mod inspect;
pub mod logging;
pub mod report;
pub mod series;
pub mod wind;
pub mod writer;

pub use config::Config;
pub use error::{HarmattanError, Result};
pub use logging::{init_logging, Verbosity};
