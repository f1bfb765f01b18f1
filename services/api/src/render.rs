use chrono::{Local, Months, NaiveDate};
use clap::Args;
use distribution_hub::error::AppError;
use distribution_hub::terms::{
    merge_values, render, validate_variables, Rendered, TemplateCategory, TermsError,
    TermsTemplate, VariableReport, VariableSchema,
};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// Template file: a JSON template payload, or plain text with `{{placeholders}}`
    #[arg(long)]
    pub(crate) template: PathBuf,
    /// JSON object with the variable values
    #[arg(long)]
    pub(crate) variables: Option<PathBuf>,
    /// Date used for `current_date` and `effective_date` (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_render(args: RenderArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.template)?;
    let template = load_template(&args.template, &raw)?;
    let supplied = match &args.variables {
        Some(path) => serde_json::from_str::<Map<String, Value>>(&fs::read_to_string(path)?)?,
        None => Map::new(),
    };
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    match render_offline(&template, &supplied, today) {
        Ok(rendered) => {
            println!("{}", rendered.content);
            if !rendered.unresolved.is_empty() {
                eprintln!(
                    "unresolved placeholders: {}",
                    rendered.unresolved.join(", ")
                );
            }
            Ok(())
        }
        Err(report) => {
            eprintln!("Variable validation failed");
            for name in &report.missing {
                eprintln!("  missing: {name}");
            }
            for mismatch in &report.type_mismatches {
                eprintln!(
                    "  {}: expected {}, got {}",
                    mismatch.name, mismatch.expected, mismatch.actual
                );
            }
            Err(TermsError::InvalidVariables(report).into())
        }
    }
}

fn load_template(path: &Path, raw: &str) -> Result<TermsTemplate, AppError> {
    if path.extension().is_some_and(|extension| extension == "json") {
        return Ok(serde_json::from_str(raw)?);
    }

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "template".to_string());
    Ok(TermsTemplate {
        name,
        description: None,
        category: TemplateCategory::General,
        content: raw.to_string(),
        variables: VariableSchema::new(),
        revision: "1.0".to_string(),
        is_active: true,
        is_default: false,
        approval_required: false,
        approved_by: None,
        approved_at: None,
        auto_renewal: false,
        renewal_period_months: None,
    })
}

/// Renders without a distributor; only the date-derived values are filled in.
pub(crate) fn render_offline(
    template: &TermsTemplate,
    supplied: &Map<String, Value>,
    today: NaiveDate,
) -> Result<Rendered, VariableReport> {
    let date = |day: NaiveDate| Value::String(day.format("%Y-%m-%d").to_string());
    let mut derived = Map::new();
    derived.insert("current_date".to_string(), date(today));
    derived.insert("effective_date".to_string(), date(today));
    if let Some(end) = template
        .renewal_period_months
        .and_then(|months| today.checked_add_months(Months::new(months)))
    {
        derived.insert("expiration_date".to_string(), date(end));
    }

    let values = merge_values(&template.variables, &derived, supplied);
    let report = validate_variables(&template.variables, &values);
    if !report.is_valid() {
        return Err(report);
    }
    Ok(render(&template.content, &values))
}
