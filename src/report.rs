//! Persisted estimate reports

use crate::error::AppError;
use crate::estimator::models::format_amount;
use crate::estimator::EstimateResult;
use crate::intake::PatientProfile;
use std::fmt::Write;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};
use tracing::info;

const DISCLAIMER: &str = "This prediction is based on statistical models and should be used as a \
general guideline only. Actual health costs may vary based on individual circumstances and \
healthcare system changes. Please consult with healthcare professionals for accurate medical advice.";

const DATA_SOURCES: [&str; 7] = [
    "World Health Organization (WHO) - lifestyle impact data",
    "Centers for Disease Control and Prevention (CDC) - chronic condition costs and risk factors",
    "Organisation for Economic Co-operation and Development (OECD) - regional healthcare costs and insurance data",
    "American Heart Association - cardiovascular disease costs and risk factors",
    "American Cancer Society - cancer screening and treatment costs",
    "American Lung Association - respiratory condition costs",
    "National Institute of Mental Health - mental health condition costs",
];

/// Everything that goes into a report
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub profile: &'a PatientProfile,
    pub lifestyle_score: u8,
    pub estimate: &'a EstimateResult,
    pub recommendations: &'a [String],
}

pub trait ReportRenderer: Send + Sync {
    /// Write the report and return where it was stored
    fn render(&self, input: &ReportInput<'_>) -> Result<PathBuf, AppError>;
}

/// Plain-text report written to a directory, one file per estimate
pub struct TextReportRenderer {
    output_dir: PathBuf,
}

impl TextReportRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl ReportRenderer for TextReportRenderer {
    fn render(&self, input: &ReportInput<'_>) -> Result<PathBuf, AppError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            AppError::Report(format!(
                "Failed to create {}: {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let filepath = write_new_file(&self.output_dir, &timestamp, &render_text(input))?;

        info!(path = %filepath.display(), "Report written");
        Ok(filepath)
    }
}

/// Create `health_cost_prediction_{timestamp}.txt`, adding a `_N` suffix
/// when reports from the same second already exist. Never overwrites.
fn write_new_file(dir: &Path, timestamp: &str, content: &str) -> Result<PathBuf, AppError> {
    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("health_cost_prediction_{}.txt", timestamp)
        } else {
            format!("health_cost_prediction_{}_{}.txt", timestamp, attempt)
        };
        let filepath = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&filepath) {
            Ok(mut file) => {
                file.write_all(content.as_bytes()).map_err(|e| {
                    AppError::Report(format!("Failed to write {}: {}", filepath.display(), e))
                })?;
                return Ok(filepath);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => {
                return Err(AppError::Report(format!(
                    "Failed to create {}: {}",
                    filepath.display(),
                    e
                )))
            }
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}\n{}", title, "-".repeat(title.len()));
}

/// Render the report body
pub fn render_text(input: &ReportInput<'_>) -> String {
    let profile = input.profile;
    let mut out = String::with_capacity(4096);

    out.push_str("Health Cost Prediction Report\n=============================\n");

    heading(&mut out, "Personal Information");
    let rows = [
        ("Age", profile.age.to_string()),
        ("Gender", profile.gender.to_string()),
        ("Height (cm)", format!("{:.1}", profile.height_cm)),
        ("Weight (kg)", format!("{:.1}", profile.weight_kg)),
        ("BMI", format!("{:.1}", profile.bmi())),
        ("Region", profile.region.clone()),
        ("Lifestyle Score", format!("{}/10", input.lifestyle_score)),
        ("Insurance Status", yes_no(profile.has_insurance).to_string()),
        ("Smoking", yes_no(profile.smoker).to_string()),
        ("Alcohol Consumption", yes_no(profile.alcohol).to_string()),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{:<22}{}", format!("{}:", label), value);
    }

    heading(&mut out, "Health Information");
    let conditions = if profile.chronic_conditions.is_empty() {
        "None".to_string()
    } else {
        profile.chronic_conditions.join(", ")
    };
    let family = if profile.family_history.is_empty() {
        "None".to_string()
    } else {
        profile.family_history.join(", ")
    };
    let _ = writeln!(out, "{:<22}{}", "Chronic Conditions:", conditions);
    let _ = writeln!(out, "{:<22}{}", "Family History:", family);

    heading(&mut out, "Prediction Results");
    let _ = writeln!(
        out,
        "Predicted Annual Health Cost: ${}",
        format_amount(input.estimate.final_cost())
    );

    if !input.estimate.details().is_empty() {
        heading(&mut out, "Calculation Steps");
        for (idx, step) in input.estimate.details().iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {}: {} (Value: {})",
                idx + 1,
                step.step_name(),
                step.description,
                format_amount(step.value)
            );
            let _ = writeln!(out, "   Source: {}", step.source);
        }
    }

    if !input.recommendations.is_empty() {
        heading(&mut out, "Recommendations");
        for rec in input.recommendations {
            let _ = writeln!(out, "* {}", rec);
        }
    }

    heading(&mut out, "Disclaimer");
    let _ = writeln!(out, "{}", DISCLAIMER);

    heading(&mut out, "Data Sources");
    for source in DATA_SOURCES {
        let _ = writeln!(out, "* {}", source);
    }

    out
}
