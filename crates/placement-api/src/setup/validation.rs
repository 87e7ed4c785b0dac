//! Startup checks that go beyond parsing: settings that are individually valid
//! but dangerous or unusable together.

use anyhow::Result;
use placement_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() {
        if config.cors_origins().iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS configured to allow all origins (*) in production. \
                Set specific allowed origins via CORS_ORIGINS."
            ));
        }

        if config.uses_memory_store() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL=memory: keeps records in process memory and cannot be used in production"
            ));
        }
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.http_concurrency_limit() == 0 {
        return Err(anyhow::anyhow!("HTTP concurrency limit cannot be 0"));
    }

    if config.email_notifications_enabled() && config.admin_email().is_none() {
        tracing::warn!("Email notifications enabled without ADMIN_EMAIL; nothing will be sent");
    }

    Ok(())
}
