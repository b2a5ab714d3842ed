use crate::core::analysis::analyze;
use crate::core::parse::{decode_csv_bytes, parse_providers};
use crate::core::render::{render_dashboard, RenderOptions};
use crate::core::{ConfigProvider, Pipeline, RenderedDashboard, SourceDocument, Storage};
use crate::utils::error::{DashboardError, Result};
use reqwest::Client;

pub struct DashboardPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> DashboardPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            storage,
            config,
            client,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        tracing::info!("⬇️  Downloading register from {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("Register response status: {}", status);

        if !status.is_success() {
            return Err(DashboardError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        tracing::info!("Downloaded {} bytes", body.len());
        Ok(body.to_vec())
    }

    /// Writes `data` unless `path` already holds exactly these bytes.
    async fn write_if_changed(&self, path: &str, data: &[u8]) -> Result<bool> {
        match self.storage.read_file(path).await {
            Ok(existing) if existing == data => {
                tracing::info!("{} is unchanged, not rewriting", path);
                return Ok(false);
            }
            Ok(_) => tracing::debug!("{} differs from the new content", path),
            Err(e) => tracing::debug!("No readable previous {} ({})", path, e),
        }
        self.storage.write_file(path, data).await?;
        Ok(true)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DashboardPipeline<S, C> {
    async fn extract(&self) -> Result<SourceDocument> {
        let (origin, bytes) = match self.config.csv_path() {
            Some(path) => {
                tracing::info!("📄 Reading local register: {}", path);
                (path.to_string(), self.storage.read_file(path).await?)
            }
            None => {
                let url = self.config.source_url();
                (url.to_string(), self.download(url).await?)
            }
        };

        Ok(SourceDocument {
            byte_len: bytes.len(),
            text: decode_csv_bytes(&bytes),
            origin,
        })
    }

    async fn transform(&self, source: SourceDocument) -> Result<RenderedDashboard> {
        let records = parse_providers(&source.text)?;
        if records.is_empty() {
            return Err(DashboardError::EmptyInputError {
                source_name: source.origin,
            });
        }
        tracing::info!("Parsed {} rows from {}", records.len(), source.origin);

        let data = analyze(&records, self.config.focus_country());
        tracing::info!(
            "Analysis: {} unique CASPs, {} countries, {} active in {}",
            data.total,
            data.num_countries(),
            data.focus.active_count(),
            data.focus.code
        );
        if data.duplicate_rows() > 0 {
            tracing::warn!(
                "{} rows repeat an earlier LEI and are excluded from statistics",
                data.duplicate_rows()
            );
        }

        let options = RenderOptions {
            generated_on: self.config.generated_on(),
        };
        let html = render_dashboard(&data, &options)?;

        let summary_json = match self.config.summary_path() {
            Some(_) => Some(serde_json::to_string_pretty(&data)?),
            None => None,
        };

        Ok(RenderedDashboard {
            html,
            summary_json,
            data,
        })
    }

    async fn load(&self, rendered: RenderedDashboard) -> Result<String> {
        // Summary first: a failed summary write must leave the published HTML untouched.
        if let (Some(path), Some(json)) = (self.config.summary_path(), &rendered.summary_json) {
            if self.write_if_changed(path, json.as_bytes()).await? {
                tracing::info!("Summary written to {}", path);
            }
        }

        let output_path = self.config.output_path();
        if self.write_if_changed(output_path, rendered.html.as_bytes()).await? {
            tracing::info!("Dashboard written to {}", output_path);
        }

        Ok(output_path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    const REGISTER: &str = "\
ae_competentAuthority,ae_homeMemberState,ae_lei_name,ae_lei,ae_commercial_name,ac_serviceCode,ac_serviceCode_cou
AFM,NL,Alpha B.V.,LEI-A,Alpha,custody of crypto-assets,NL
BaFin,DE,Beta GmbH,LEI-B,,transfer services,NL|BE
BaFin,DE,Beta GmbH,LEI-B,,transfer services,NL|BE
";

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        writes: Arc<Mutex<usize>>,
        read_only: Option<String>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
                writes: Arc::new(Mutex::new(0)),
                read_only: None,
            }
        }

        fn with_read_only(path: &str) -> Self {
            Self {
                read_only: Some(path.to_string()),
                ..Self::new()
            }
        }

        async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }

        async fn write_count(&self) -> usize {
            *self.writes.lock().await
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                DashboardError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            if self.read_only.as_deref() == Some(path) {
                return Err(DashboardError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("Read-only: {}", path),
                )));
            }
            *self.writes.lock().await += 1;
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        source_url: String,
        csv_path: Option<String>,
        summary_path: Option<String>,
    }

    impl MockConfig {
        fn remote(source_url: String) -> Self {
            Self {
                source_url,
                csv_path: None,
                summary_path: None,
            }
        }

        fn local(csv_path: &str) -> Self {
            Self {
                source_url: "http://unused.invalid/CASPS.csv".to_string(),
                csv_path: Some(csv_path.to_string()),
                summary_path: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn source_url(&self) -> &str {
            &self.source_url
        }

        fn csv_path(&self) -> Option<&str> {
            self.csv_path.as_deref()
        }

        fn output_path(&self) -> &str {
            "site/index.html"
        }

        fn summary_path(&self) -> Option<&str> {
            self.summary_path.as_deref()
        }

        fn focus_country(&self) -> &str {
            "NL"
        }

        fn user_agent(&self) -> &str {
            "casp-dashboard-test"
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(5)
        }

        fn generated_on(&self) -> Option<NaiveDate> {
            NaiveDate::from_ymd_opt(2026, 1, 2)
        }
    }

    #[tokio::test]
    async fn test_extract_downloads_register() {
        let server = MockServer::start_async().await;
        let mut body = b"\xEF\xBB\xBF".to_vec();
        body.extend_from_slice(REGISTER.as_bytes());

        let register_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/CASPS.csv");
                then.status(200)
                    .header("Content-Type", "text/csv")
                    .body(body.clone());
            })
            .await;

        let pipeline =
            DashboardPipeline::new(MockStorage::new(), MockConfig::remote(server.url("/CASPS.csv")))
                .unwrap();
        let source = pipeline.extract().await.unwrap();

        register_mock.assert_async().await;
        assert_eq!(source.byte_len, REGISTER.len() + 3);
        assert!(source.text.starts_with("ae_competentAuthority"));
        assert!(source.origin.ends_with("/CASPS.csv"));
    }

    #[tokio::test]
    async fn test_extract_fails_on_http_error_status() {
        let server = MockServer::start_async().await;
        let register_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/CASPS.csv");
                then.status(404);
            })
            .await;

        let pipeline =
            DashboardPipeline::new(MockStorage::new(), MockConfig::remote(server.url("/CASPS.csv")))
                .unwrap();
        let err = pipeline.extract().await.unwrap_err();

        register_mock.assert_async().await;
        match err {
            DashboardError::HttpStatusError { status, .. } => assert_eq!(status, 404),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_extract_reads_local_file_through_storage() {
        let storage = MockStorage::new();
        storage.put("data/CASPS.csv", REGISTER.as_bytes()).await;

        let pipeline = DashboardPipeline::new(storage, MockConfig::local("data/CASPS.csv")).unwrap();
        let source = pipeline.extract().await.unwrap();

        assert_eq!(source.origin, "data/CASPS.csv");
        assert_eq!(source.text, REGISTER);
    }

    #[tokio::test]
    async fn test_extract_missing_local_file_is_io_error() {
        let pipeline =
            DashboardPipeline::new(MockStorage::new(), MockConfig::local("missing.csv")).unwrap();
        assert!(matches!(
            pipeline.extract().await,
            Err(DashboardError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_transform_renders_and_summarises() {
        let mut config = MockConfig::local("unused.csv");
        config.summary_path = Some("site/summary.json".to_string());
        let pipeline = DashboardPipeline::new(MockStorage::new(), config).unwrap();

        let source = SourceDocument {
            origin: "inline".to_string(),
            text: REGISTER.to_string(),
            byte_len: REGISTER.len(),
        };
        let rendered = pipeline.transform(source).await.unwrap();

        assert_eq!(rendered.data.total_rows, 3);
        assert_eq!(rendered.data.total, 2);
        assert_eq!(rendered.data.focus.active_count(), 2);
        assert_eq!(rendered.html.matches("<tr class=\"dir-row").count(), 3);
        assert!(rendered.html.contains("Auto-generated 02 January 2026"));

        let summary: serde_json::Value =
            serde_json::from_str(rendered.summary_json.as_deref().unwrap()).unwrap();
        assert_eq!(summary["total"], 2);
        assert_eq!(summary["countries"][0]["code"], "NL");
    }

    #[tokio::test]
    async fn test_transform_rejects_header_only_register() {
        let pipeline =
            DashboardPipeline::new(MockStorage::new(), MockConfig::local("unused.csv")).unwrap();
        let source = SourceDocument {
            origin: "empty.csv".to_string(),
            text: "ae_lei_name,ae_homeMemberState\n".to_string(),
            byte_len: 31,
        };
        match pipeline.transform(source).await {
            Err(DashboardError::EmptyInputError { source_name }) => {
                assert_eq!(source_name, "empty.csv")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_skips_unchanged_output() {
        let storage = MockStorage::new();
        let mut config = MockConfig::local("unused.csv");
        config.summary_path = Some("site/summary.json".to_string());
        let pipeline = DashboardPipeline::new(storage.clone(), config).unwrap();

        let source = SourceDocument {
            origin: "inline".to_string(),
            text: REGISTER.to_string(),
            byte_len: REGISTER.len(),
        };
        let rendered = pipeline.transform(source).await.unwrap();

        let path = pipeline.load(rendered.clone()).await.unwrap();
        assert_eq!(path, "site/index.html");
        assert_eq!(storage.write_count().await, 2);

        pipeline.load(rendered.clone()).await.unwrap();
        assert_eq!(storage.write_count().await, 2);
        assert_eq!(
            storage.get_file("site/summary.json").await,
            rendered.summary_json.clone().map(String::into_bytes)
        );
        assert_eq!(
            storage.get_file("site/index.html").await.unwrap(),
            rendered.html.into_bytes()
        );
    }

    #[tokio::test]
    async fn test_failed_summary_write_leaves_html_untouched() {
        let storage = MockStorage::with_read_only("site/summary.json");
        let mut config = MockConfig::local("unused.csv");
        config.summary_path = Some("site/summary.json".to_string());
        let pipeline = DashboardPipeline::new(storage.clone(), config).unwrap();

        let source = SourceDocument {
            origin: "inline".to_string(),
            text: REGISTER.to_string(),
            byte_len: REGISTER.len(),
        };
        let rendered = pipeline.transform(source).await.unwrap();

        let err = pipeline.load(rendered).await.unwrap_err();
        assert_eq!(err.severity().exit_code(), 3);
        assert_eq!(storage.write_count().await, 0);
        assert!(storage.get_file("site/index.html").await.is_none());
    }
}
