use casp_dashboard::utils::error::DashboardError;
use casp_dashboard::utils::{logger, validation::Validate};
use casp_dashboard::{CliConfig, DashboardPipeline, EtlEngine, LocalStorage};
use clap::Parser;

fn fail(stage: &str, e: &DashboardError) -> ! {
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.severity().exit_code());
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting casp-dashboard");
    tracing::debug!("CLI config: {:?}", config);

    let settings = match config.settings() {
        Ok(settings) => settings,
        Err(e) => fail("Configuration could not be loaded", &e),
    };
    if let Err(e) = settings.validate() {
        fail("Configuration validation failed", &e);
    }
    tracing::debug!("Resolved settings: {:?}", settings);

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = match DashboardPipeline::new(LocalStorage::current_dir(), settings) {
        Ok(pipeline) => pipeline,
        Err(e) => fail("HTTP client setup failed", &e),
    };
    let engine = EtlEngine::new_with_monitoring(pipeline, config.monitor);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Dashboard build completed successfully!");
            println!("✅ Dashboard written to {}", output_path);
        }
        Err(e) => fail("Dashboard build failed", &e),
    }
}
