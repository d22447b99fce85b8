//! Estimate command
//!
//! Validates the intake flags, scores the lifestyle answers, runs the
//! estimator and optionally asks for recommendations and writes a report.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use health_cost::advice::{recommend_or_fallback, AdviceRequest, GeminiAdvisor, FALLBACK_MESSAGE};
use health_cost::config::Config;
use health_cost::estimator::models::format_amount;
use health_cost::estimator::EstimateResult;
use health_cost::intake::{parse_list, Gender, PatientProfile};
use health_cost::lifestyle::MAX_SCORE;
use health_cost::report::{ReportInput, ReportRenderer, TextReportRenderer};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Estimate annual health cost for one person
#[derive(Debug, Clone, Parser)]
pub struct EstimateArgs {
    /// Age in years (30-100)
    #[arg(long)]
    pub age: u32,

    /// Gender (male, female, other)
    #[arg(long)]
    pub gender: Gender,

    /// Height in centimeters
    #[arg(long)]
    pub height: f64,

    /// Weight in kilograms
    #[arg(long)]
    pub weight: f64,

    /// Region as it appears in the cost table (e.g. USA, Europe, Asia, Turkey)
    #[arg(long)]
    pub region: String,

    /// Comma-separated chronic conditions (e.g. "diabetes, asthma")
    #[arg(long, default_value = "")]
    pub conditions: String,

    /// Comma-separated family history conditions
    #[arg(long, default_value = "")]
    pub family_history: String,

    /// Current smoker
    #[arg(long)]
    pub smoker: bool,

    /// Regular alcohol consumption
    #[arg(long)]
    pub alcohol: bool,

    /// Exercise days per week (0-7)
    #[arg(long)]
    pub exercise_days: u32,

    /// Daily fruit and vegetable portions (0-10)
    #[arg(long)]
    pub fruit_veg: u32,

    /// Average sleep hours per night
    #[arg(long)]
    pub sleep_hours: f64,

    /// No health insurance
    #[arg(long)]
    pub no_insurance: bool,

    /// Output format (text, json)
    #[arg(short = 'f', long, default_value = "text")]
    pub format: String,

    /// Skip recommendations even if enabled in the configuration
    #[arg(long)]
    pub no_advice: bool,

    /// Skip writing the report file
    #[arg(long)]
    pub no_report: bool,
}

impl EstimateArgs {
    pub fn profile(&self) -> PatientProfile {
        PatientProfile {
            age: self.age,
            gender: self.gender,
            height_cm: self.height,
            weight_kg: self.weight,
            region: self.region.trim().to_string(),
            chronic_conditions: parse_list(&self.conditions),
            family_history: parse_list(&self.family_history),
            smoker: self.smoker,
            alcohol: self.alcohol,
            exercise_days: self.exercise_days,
            fruit_veg_portions: self.fruit_veg,
            sleep_hours: self.sleep_hours,
            has_insurance: !self.no_insurance,
        }
    }
}

/// Everything one estimate run produced
#[derive(Debug, Serialize)]
pub struct EstimateOutcome {
    pub profile: PatientProfile,
    pub lifestyle_score: u8,
    pub estimate: EstimateResult,
    pub recommendations: Vec<String>,
    pub report_path: Option<PathBuf>,
}

/// Execute the estimate command
pub async fn execute(cfg: &Config, args: EstimateArgs) -> Result<()> {
    let outcome = run(cfg, &args).await?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    print_text(&outcome);
    Ok(())
}

/// Validate, score and estimate, then collect advice and write the report
/// as configured. Advice and report failures never fail the run.
pub async fn run(cfg: &Config, args: &EstimateArgs) -> Result<EstimateOutcome> {
    if !matches!(args.format.as_str(), "text" | "json") {
        anyhow::bail!("Invalid format '{}': expected 'text' or 'json'", args.format);
    }

    let profile = args.profile();
    profile.validate()?;

    let lifestyle_score = profile.lifestyle_score();
    let estimator = health_cost::build_estimator(cfg).await?;

    let estimate = estimator.predict(
        profile.age,
        &profile.region,
        profile.chronic_conditions.as_slice(),
        profile.family_history.as_slice(),
        lifestyle_score,
        profile.has_insurance,
    );
    info!(
        region = %profile.region,
        final_cost = estimate.final_cost(),
        steps = estimate.details().len(),
        "Estimate complete"
    );

    // --no-advice wins over an enabled config
    let recommendations = if cfg.advice.enabled && !args.no_advice {
        recommend(cfg, &profile, lifestyle_score, &estimate).await
    } else {
        Vec::new()
    };

    let report_path = if cfg.report.enabled && !args.no_report {
        let renderer = TextReportRenderer::new(&cfg.report.output_dir);
        match renderer.render(&ReportInput {
            profile: &profile,
            lifestyle_score,
            estimate: &estimate,
            recommendations: &recommendations,
        }) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Failed to write report");
                None
            }
        }
    } else {
        None
    };

    Ok(EstimateOutcome {
        profile,
        lifestyle_score,
        estimate,
        recommendations,
        report_path,
    })
}

async fn recommend(
    cfg: &Config,
    profile: &PatientProfile,
    lifestyle_score: u8,
    estimate: &EstimateResult,
) -> Vec<String> {
    let advisor = match GeminiAdvisor::new(cfg.advice.clone()) {
        Ok(advisor) => advisor,
        Err(e) => {
            warn!(error = %e, "Advisor unavailable");
            return vec![FALLBACK_MESSAGE.to_string()];
        }
    };

    let request = AdviceRequest {
        age: profile.age,
        region: &profile.region,
        chronic_conditions: &profile.chronic_conditions,
        family_history: &profile.family_history,
        lifestyle_score,
        has_insurance: profile.has_insurance,
        details: estimate.details(),
    };
    recommend_or_fallback(&advisor, &request).await
}

fn steps_table(estimate: &EstimateResult) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::Cyan),
        Cell::new("STEP").fg(Color::Cyan),
        Cell::new("DESCRIPTION").fg(Color::Cyan),
        Cell::new("VALUE").fg(Color::Cyan),
        Cell::new("SOURCE").fg(Color::Cyan),
    ]);

    for (idx, step) in estimate.details().iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(step.step_name()),
            Cell::new(&step.description),
            Cell::new(format_amount(step.value)),
            Cell::new(&step.source),
        ]);
    }
    table
}

fn print_text(outcome: &EstimateOutcome) {
    println!(
        "{} {}/{}",
        "Lifestyle Score:".bold(),
        outcome.lifestyle_score,
        MAX_SCORE
    );
    println!(
        "{} {}",
        "Predicted Annual Health Cost:".bold(),
        format!("${}", format_amount(outcome.estimate.final_cost()))
            .green()
            .bold()
    );
    println!();
    println!("Calculation Steps:");
    println!("{}", steps_table(&outcome.estimate));

    if !outcome.recommendations.is_empty() {
        println!();
        println!("{}", "Recommendations:".bold());
        for rec in &outcome.recommendations {
            println!("  • {}", rec);
        }
    }

    if let Some(path) = &outcome.report_path {
        println!();
        println!("{} {}", "✓ Report saved to".green(), path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_cost::estimator::CostEstimator;

    #[test]
    fn test_profile_from_args() {
        let args = EstimateArgs::try_parse_from([
            "estimate",
            "--age",
            "65",
            "--gender",
            "male",
            "--height",
            "175",
            "--weight",
            "80",
            "--region",
            " USA ",
            "--conditions",
            "diabetes,,heart_disease",
            "--family-history",
            "cancer",
            "--smoker",
            "--exercise-days",
            "0",
            "--fruit-veg",
            "1",
            "--sleep-hours",
            "5",
            "--no-insurance",
            "--format",
            "json",
        ])
        .unwrap();

        let profile = args.profile();
        assert_eq!(profile.region, "USA");
        assert_eq!(profile.chronic_conditions, vec!["diabetes", "heart_disease"]);
        assert_eq!(profile.family_history, vec!["cancer"]);
        assert!(profile.smoker);
        assert!(!profile.has_insurance);
        assert_eq!(profile.lifestyle_score(), 1);
        assert_eq!(args.format, "json");
    }

    #[test]
    fn test_steps_table_rows() {
        let conditions: Vec<String> = vec!["diabetes".to_string()];
        let family: Vec<String> = Vec::new();
        let estimate = CostEstimator::with_builtin_data().predict(
            35,
            "Turkey",
            conditions.as_slice(),
            family.as_slice(),
            7,
            true,
        );
        let rendered = steps_table(&estimate).to_string();

        assert!(rendered.contains("Base Cost"));
        assert!(rendered.contains("Insurance Discount"));
        assert!(rendered.contains("1,148.00"));
    }

    #[tokio::test]
    async fn test_rejects_unknown_format() {
        let args = EstimateArgs::try_parse_from([
            "estimate", "--age", "40", "--gender", "female", "--height", "165", "--weight", "60",
            "--region", "Asia", "--exercise-days", "2", "--fruit-veg", "3", "--sleep-hours", "7",
            "--format", "xml",
        ])
        .unwrap();

        let err = execute(&Config::default(), args).await.unwrap_err();
        assert!(err.to_string().contains("Invalid format"));
    }

    fn turkey_args(extra: &[&str]) -> EstimateArgs {
        let mut argv = vec![
            "estimate", "--age", "35", "--gender", "female", "--height", "170", "--weight", "65",
            "--region", "Turkey", "--conditions", "diabetes", "--exercise-days", "3",
            "--fruit-veg", "4", "--sleep-hours", "7.5",
        ];
        argv.extend_from_slice(extra);
        EstimateArgs::try_parse_from(argv).unwrap()
    }

    fn config_in(dir: &std::path::Path) -> Config {
        let mut cfg = Config::default();
        cfg.data.costs_path = dir.join("data/costs.json");
        cfg.data.weights_path = dir.join("data/weights.json");
        cfg.report.output_dir = dir.join("reports");
        cfg
    }

    #[tokio::test]
    async fn test_run_text_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        let args = turkey_args(&[]);

        let outcome = run(&cfg, &args).await.unwrap();

        // 800 * (1 + 0.96 + 0.06) * 0.7
        assert_eq!(outcome.lifestyle_score, 8);
        assert_eq!(outcome.estimate.final_cost(), 1131.2);
        assert!(outcome.recommendations.is_empty());
        let report = outcome.report_path.expect("report written");
        assert!(report.starts_with(dir.path().join("reports")));
        assert!(std::fs::read_to_string(report).unwrap().contains("$1,131.20"));

        execute(&cfg, args).await.unwrap();
    }

    #[tokio::test]
    async fn test_run_json_without_report() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        let args = turkey_args(&["--format", "json", "--no-report"]);

        let outcome = run(&cfg, &args).await.unwrap();
        assert!(outcome.report_path.is_none());
        assert!(!dir.path().join("reports").exists());

        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json["report_path"].is_null());
        assert_eq!(json["lifestyle_score"], 8);
        assert_eq!(json["estimate"]["final_cost"], 1131.2);
        assert_eq!(json["estimate"]["details"][0]["step"], "Base Cost");
        assert_eq!(json["profile"]["gender"], "female");

        execute(&cfg, args).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_advice_overrides_enabled_config() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config_in(dir.path());
        cfg.advice.enabled = true;
        cfg.advice.api_key = "test-key".to_string();
        cfg.advice.base_url = server.uri();

        let outcome = run(&cfg, &turkey_args(&["--no-advice", "--no-report"]))
            .await
            .unwrap();
        assert!(outcome.recommendations.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());

        let outcome = run(&cfg, &turkey_args(&["--no-report"])).await.unwrap();
        assert_eq!(outcome.recommendations, vec![FALLBACK_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_report_failure_keeps_estimate() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config_in(dir.path());
        let blocker = dir.path().join("reports-file");
        std::fs::write(&blocker, "").unwrap();
        cfg.report.output_dir = blocker;

        let args = turkey_args(&[]);
        let outcome = run(&cfg, &args).await.unwrap();
        assert!(outcome.report_path.is_none());
        assert_eq!(outcome.estimate.final_cost(), 1131.2);

        execute(&cfg, args).await.unwrap();
    }

    #[tokio::test]
    async fn test_out_of_range_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config_in(dir.path());
        let mut args = turkey_args(&[]);
        args.sleep_hours = 30.0;

        let err = run(&cfg, &args).await.unwrap_err();
        assert!(err.to_string().contains("sleep_hours"));
    }
}
