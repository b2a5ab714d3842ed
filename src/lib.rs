pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, Overrides, Settings};

pub use core::{etl::EtlEngine, pipeline::DashboardPipeline};
pub use utils::error::{DashboardError, Result};
