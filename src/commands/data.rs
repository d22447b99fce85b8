//! Reference data commands

use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use health_cost::config::Config;
use health_cost::estimator::models::format_amount;
use health_cost::estimator::{write_builtin_data, CostEstimator};
use tracing::info;

/// Write the built-in tables to the configured paths
pub async fn init(cfg: &Config, force: bool) -> Result<()> {
    let written = write_builtin_data(&cfg.data.costs_path, &cfg.data.weights_path, force).await?;

    if written.is_empty() {
        println!(
            "{}",
            "Data files already exist (use --force to overwrite)".yellow()
        );
        return Ok(());
    }

    for path in &written {
        println!("{} {}", "✓ Wrote".green(), path.display());
    }
    info!(files = written.len(), "Reference data initialized");
    Ok(())
}

/// Print the tables the estimator would use
pub async fn show(cfg: &Config) -> Result<()> {
    let estimator = health_cost::build_estimator(cfg).await?;

    println!(
        "Regional Base Costs ({}):",
        cfg.data.costs_path.display()
    );
    println!("{}", cost_table(&estimator));
    println!(
        "Mean base cost (fallback): ${}",
        format_amount(estimator.costs().mean())
    );
    println!();

    println!(
        "Chronic Condition Weights ({}):",
        cfg.data.weights_path.display()
    );
    println!("{}", weight_table(&estimator));
    println!();

    println!("Family History Risks:");
    println!("{}", family_table(&estimator));
    println!(
        "\nInsurance discount: {:.0}%",
        estimator.discount_rate() * 100.0
    );

    Ok(())
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

fn cost_table(estimator: &CostEstimator) -> Table {
    let mut table = new_table(&["REGION", "AGE GROUP", "BASE COST"]);
    for row in estimator.costs().rows() {
        table.add_row(vec![
            Cell::new(&row.region),
            Cell::new(row.age_group.label()),
            Cell::new(format!("${}", format_amount(row.base_cost))),
        ]);
    }
    table
}

fn weight_table(estimator: &CostEstimator) -> Table {
    let mut table = new_table(&["CONDITION", "RISK", "SOURCE"]);
    for (name, weight) in estimator.weights().iter() {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("+{:.2}", weight.risk_value)),
            Cell::new(&weight.source),
        ]);
    }
    table
}

fn family_table(estimator: &CostEstimator) -> Table {
    let mut table = new_table(&["CONDITION", "RISK"]);
    for (name, risk) in estimator.family_history().iter() {
        table.add_row(vec![Cell::new(name), Cell::new(format!("+{:.2}", risk))]);
    }
    table
}
