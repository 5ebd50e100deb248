use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sdwan_migrate::config::Config;
use sdwan_migrate::converters::SchemaRegistry;
use sdwan_migrate::manager::{ConfigReader, ManagerClient};
use sdwan_migrate::migration::{
    collect_ux1_config, log_progress, push_ux2_config, rollback_ux2_config, transform_ux1_config,
};
use sdwan_migrate::models::UX2ConfigRollback;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sdwan_migrate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let cfg = Config::load();
    if !cfg.has_credentials() {
        anyhow::bail!("MANAGER_USERNAME and MANAGER_PASSWORD must be set");
    }
    tracing::info!("Starting UX1 to UX2 migration");
    tracing::info!("Manager: {}", cfg.manager_url);

    let client = ManagerClient::login(
        &cfg.manager_url,
        &cfg.manager_username,
        &cfg.manager_password,
        cfg.request_timeout_secs,
    )
    .await
    .context("login to SD-WAN Manager failed")?;
    tracing::info!("Platform version: {}", client.platform_version().await?);

    let result = migrate(&client, &cfg).await;

    if let Err(e) = client.logout().await {
        tracing::warn!("Logout failed: {:#}", e);
    }
    result
}

async fn migrate(client: &ManagerClient, cfg: &Config) -> anyhow::Result<()> {
    let ux1 = collect_ux1_config(client, log_progress).await?;
    let ux2 = transform_ux1_config(&ux1, &SchemaRegistry::default(), log_progress)?;

    let (record, aborted) = match push_ux2_config(client, ux2, log_progress).await {
        Ok(record) => (record, false),
        Err(e) => {
            tracing::warn!("{}", e);
            (e.rollback, true)
        }
    };

    if let Some(path) = &cfg.report_path {
        write_report(path, &record).await?;
    }

    let complete = !aborted && record.report.is_complete();
    if !complete && cfg.rollback_on_failure {
        let report = rollback_ux2_config(client, &record).await;
        if !report.success() {
            anyhow::bail!("rollback left {} items behind", report.failed.len());
        }
    }
    Ok(())
}

async fn write_report(path: &str, record: &UX2ConfigRollback) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&record.report)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("writing push report to {}", path))?;
    tracing::info!("Push report written to {}", path);
    Ok(())
}
