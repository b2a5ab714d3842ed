pub mod analysis;
pub mod etl;
pub mod parse;
pub mod pipeline;
pub mod render;

pub use crate::domain::model::{DashboardData, ProviderRecord, RenderedDashboard, SourceDocument};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
