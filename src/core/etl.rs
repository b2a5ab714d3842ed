use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs extract, transform and load once; returns the dashboard path.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting dashboard build...");
        self.monitor.log_stats("Start");

        tracing::info!("Extracting register...");
        let source = self.pipeline.extract().await?;
        tracing::info!("Extracted {} bytes from {}", source.byte_len, source.origin);
        self.monitor.log_stats("Extract");

        tracing::info!("Transforming register...");
        let rendered = self.pipeline.transform(source).await?;
        tracing::info!(
            "Rendered {} directory entries ({} unique providers)",
            rendered.data.total_rows,
            rendered.data.total
        );
        self.monitor.log_stats("Transform");

        tracing::info!("Loading dashboard...");
        let output_path = self.pipeline.load(rendered).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
