use crate::domain::model::{RenderedDashboard, SourceDocument};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source_url(&self) -> &str;
    /// Local register copy; when set, no download happens.
    fn csv_path(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn summary_path(&self) -> Option<&str>;
    fn focus_country(&self) -> &str;
    fn user_agent(&self) -> &str;
    fn timeout(&self) -> Duration;
    fn generated_on(&self) -> Option<NaiveDate>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SourceDocument>;
    async fn transform(&self, source: SourceDocument) -> Result<RenderedDashboard>;
    async fn load(&self, rendered: RenderedDashboard) -> Result<String>;
}
