use clap::Parser;
use spanner_load::utils::{logger, validation::Validate};
use spanner_load::{BatchWriter, CliArgs, DryRunWriter, EtlError, Loader, LoaderConfig, SpannerClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting spanner-load");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = match args.resolve_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    tracing::info!(
        "📁 Loading {} into {} on {}",
        config.source.path.display(),
        config.destination.table,
        config.database.database_path()
    );

    let result = if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        load(DryRunWriter::new(), &config).await
    } else {
        load_into_spanner(&config).await
    };

    if let Err(e) = result {
        tracing::error!(
            "❌ Load aborted: {} (Category: {:?})",
            e,
            e.category()
        );
        exit_with(&e);
    }

    Ok(())
}

async fn load_into_spanner(config: &LoaderConfig) -> spanner_load::Result<()> {
    let client = SpannerClient::new(&config.database)?;
    load(client, config).await
}

async fn load<W: BatchWriter>(writer: W, config: &LoaderConfig) -> spanner_load::Result<()> {
    let report = Loader::from_config(writer, config).run().await?;

    if !report.is_complete_success() {
        tracing::warn!(
            "⚠️ {} batches failed and {} rows were skipped",
            report.batches_failed(),
            report.rows_skipped
        );
    }
    Ok(())
}

fn exit_with(e: &EtlError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(1);
}
