//! HTML report of packages that changed version during a run

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::ReportConfig;
use crate::version::reconciler::ChangeEvent;

const TEMPLATE: &str = include_str!("report.html.tera");

#[derive(Serialize)]
struct ReportView<'a> {
    title: &'a str,
    lang: &'a str,
    dir: &'a str,
    generated_at: String,
    changes: &'a [ChangeEvent],
}

/// Renders one table row per change, in the given order. Values are HTML-escaped.
pub fn render(
    config: &ReportConfig,
    changes: &[ChangeEvent],
    generated_at: DateTime<Local>,
) -> Result<String, tera::Error> {
    let view = ReportView {
        title: &config.title,
        lang: &config.lang,
        dir: &config.direction,
        generated_at: generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        changes,
    };
    let context = tera::Context::from_serialize(&view)?;
    tera::Tera::one_off(TEMPLATE, &context, true)
}
