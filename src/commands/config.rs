use anyhow::Result;
use colored::Colorize;
use health_cost::config::{self, Config};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration with the API key masked
pub fn show(path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!(path = %path.display(), "Loading configuration for display");

    let cfg = config::load_config(path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    Ok(())
}

/// Execute the config validate command
pub fn validate(path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!(path = %path.display(), "Validating configuration file");

    let cfg = config::load_config(path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Costs Table: {}", cfg.data.costs_path.display());
    println!("  Condition Weights: {}", cfg.data.weights_path.display());
    println!(
        "  Insurance Discount: {:.0}%",
        cfg.estimator.insurance_discount_rate * 100.0
    );
    println!(
        "  Advice: {}",
        if cfg.advice.enabled {
            format!("enabled ({})", cfg.advice.model)
        } else {
            "disabled".to_string()
        }
    );
    println!(
        "  Reports: {}",
        if cfg.report.enabled {
            cfg.report.output_dir.display().to_string()
        } else {
            "disabled".to_string()
        }
    );

    Ok(())
}

fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();
    if !sanitized.advice.api_key.is_empty() {
        sanitized.advice.api_key = mask_api_key(&sanitized.advice.api_key);
    }
    sanitized
}

/// Shows first 7 and last 4 characters, e.g. "AIzaSyA...wxyz"
fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }

    let prefix: String = chars[..7].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("AIzaSyA1234567890wxyz"), "AIzaSyA...wxyz");
        assert_eq!(mask_api_key("short"), "***");
    }

    #[test]
    fn test_sanitize_secrets() {
        let mut cfg = Config::default();
        cfg.advice.api_key = "AIzaSyA1234567890wxyz".to_string();

        let sanitized = sanitize_secrets(&cfg);
        assert_eq!(sanitized.advice.api_key, "AIzaSyA...wxyz");
        assert_eq!(cfg.advice.api_key, "AIzaSyA1234567890wxyz");

        let empty = sanitize_secrets(&Config::default());
        assert!(empty.advice.api_key.is_empty());
    }
}
