use anyhow::{ anyhow, Result };

use pagesmith::ServiceConfig;

use crate::cli::ui;

/// Report which settings are in effect. Secrets are only reported as set or missing.
pub fn execute(config: &ServiceConfig) -> Result<()> {
    ui::print_header("Configuration");

    let missing = config.missing_values();
    let state = |name: &str| (if missing.iter().any(|m| *m == name) { "missing" } else { "set" }).to_string();

    for name in ["APP_SECRET", "GITHUB_TOKEN", "AIPIPE_API_KEY", "HUGGINGFACE_API_KEY"] {
        ui::print_result(name, &state(name));
    }
    ui::print_result("Repository owner", config.github.owner.as_deref().unwrap_or("missing"));
    ui::print_result("GitHub API", &config.github.api_url);
    ui::print_result(
        "Primary provider",
        &format!("{} ({}, {}s)", config.primary.name, config.primary.model, config.primary.timeout_secs)
    );
    ui::print_result(
        "Fallback provider",
        &format!("{} ({}, {}s)", config.fallback.name, config.fallback.model, config.fallback.timeout_secs)
    );
    ui::print_result("Evaluator", config.evaluator.url.as_deref().unwrap_or("per request"));
    ui::print_result("Staging directory", &config.staging_dir.display().to_string());
    if let Some(path) = &config.audit_log {
        ui::print_result("Audit log", &path.display().to_string());
    }

    config.validate().map_err(|e| anyhow!("Configuration is incomplete: {}", e))?;
    ui::print_success("Configuration is complete");
    Ok(())
}
