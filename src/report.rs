use anyhow::Result;
use serde::Serialize;

use crate::audit::{Explanation, RunReport, TestRun};
use crate::evaluate::{Evaluation, Verdict};

/// Report-layer settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Leave passing results out of the listing. Counts still include them.
    pub hide_passes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Lowest verdict that makes a run count as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FailOn {
    #[default]
    Fail,
    Warn,
    Never,
}

impl FailOn {
    pub fn tripped(self, report: &RunReport) -> bool {
        let run = match report {
            RunReport::Completed(run) => run,
            RunReport::Failed { .. } => return self != FailOn::Never,
        };
        let worst = run.worst_verdict();
        match self {
            FailOn::Fail => worst == Some(Verdict::Fail),
            FailOn::Warn => worst.is_some_and(|v| v >= Verdict::Warn),
            FailOn::Never => false,
        }
    }
}

fn visible_results<'a>(
    run: &'a TestRun,
    opts: &ReportOptions,
) -> impl Iterator<Item = &'a Evaluation> {
    let hide = opts.hide_passes;
    run.results
        .iter()
        .filter(move |r| !(hide && r.verdict == Verdict::Pass))
}

/// Renders a run for a terminal.
///
/// ```text
/// accessibility test: https://example.com/ [1760000000]
/// ---
/// FAIL img #hero: Image is missing an accessible name
///   Add an alt attribute: descriptive text, or alt="" if the image is decorative.
///   <img id="hero" src="hero.png">
/// PASS button html > body:nth-of-type(1) > button:nth-of-type(1) "Save": Button has accessible name: "Save"
/// ---
/// 2 elements: 1 failed, 0 warned, 1 passed
/// ```
pub fn to_text(run: &TestRun, opts: &ReportOptions) -> String {
    let mut output = String::new();

    output.push_str(&format!("accessibility test: {}", display_url(&run.url)));
    output.push_str(&format!(" [{}]\n---\n", run.timestamp));

    for result in visible_results(run, opts) {
        write_result(result, &mut output);
    }

    let c = &run.counts;
    output.push_str(&format!(
        "---\n{} elements: {} failed, {} warned, {} passed\n",
        c.total, c.failed, c.warned, c.passed
    ));
    output
}

fn display_url(url: &str) -> &str {
    if url.is_empty() {
        "(inline document)"
    } else {
        url
    }
}

fn write_result(result: &Evaluation, output: &mut String) {
    output.push_str(&format!("{} {}", result.verdict, result.tag));
    if let Some(role) = &result.role {
        output.push_str(&format!("[role={role}]"));
    }
    output.push_str(&format!(" {}", result.css_selector));

    let name = result.shown_name();
    if !name.is_empty() {
        output.push_str(&format!(" \"{name}\""));
    }
    if !result.visible {
        output.push_str(" [hidden]");
    }
    output.push_str(&format!(": {}\n", result.description));

    if result.verdict != Verdict::Pass {
        if let Some(detail) = &result.detail {
            output.push_str(&format!("  {detail}\n"));
        }
        output.push_str(&format!("  {}\n", result.markup));
    }
}

pub fn report_to_text(report: &RunReport, opts: &ReportOptions) -> String {
    match report {
        RunReport::Completed(run) => to_text(run, opts),
        RunReport::Failed { error } => format!("error: {error}\n"),
    }
}

/// JSON form of a report. Hidden passes are dropped from `results` only.
pub fn report_to_json(report: &RunReport, opts: &ReportOptions) -> Result<String> {
    let json = match report {
        RunReport::Completed(run) if opts.hide_passes => {
            let filtered = TestRun {
                results: visible_results(run, opts).cloned().collect(),
                ..run.clone()
            };
            serde_json::to_string_pretty(&RunReport::Completed(filtered))?
        }
        other => serde_json::to_string_pretty(other)?,
    };
    Ok(json)
}

pub fn render(report: &RunReport, format: OutputFormat, opts: &ReportOptions) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report_to_text(report, opts)),
        OutputFormat::Json => report_to_json(report, opts),
    }
}

/// Renders the per-element breakdown used by `explain`.
pub fn explanations_to_text(explained: &[Explanation]) -> String {
    if explained.is_empty() {
        return "no elements match\n".to_string();
    }

    let mut output = String::new();
    for (i, e) in explained.iter().enumerate() {
        if i > 0 {
            output.push_str("---\n");
        }
        output.push_str(&format!("element: {}", e.css_selector));
        if let Some(role) = &e.role {
            output.push_str(&format!(" [role={role}]"));
        }
        output.push('\n');

        let category = e
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "(none)".to_string());
        output.push_str(&format!("  category: {category}\n"));
        output.push_str(&format!("  name: \"{}\"\n", e.resolution.name));
        output.push_str(&format!("  source: {}\n", json_token(&e.resolution.source)));
        output.push_str(&format!("  visible: {}\n", e.visible));

        let notes = &e.resolution.annotations;
        if !notes.broken_reference_ids.is_empty() {
            output.push_str(&format!(
                "  broken ids: {}\n",
                notes.broken_reference_ids.join(" ")
            ));
        }
        let mut flags = Vec::new();
        if notes.name_source_is_title_only {
            flags.push("title-only");
        }
        match notes.name_source_is_wrapping_label {
            Some(true) => flags.push("wrapping-label"),
            Some(false) => flags.push("for-label"),
            None => {}
        }
        if notes.aria_label_is_empty {
            flags.push("empty-aria-label");
        }
        if notes.aria_label_is_punctuation_only {
            flags.push("punctuation-aria-label");
        }
        if !flags.is_empty() {
            output.push_str(&format!("  flags: {}\n", flags.join(", ")));
        }

        match &e.evaluation {
            Some(ev) => {
                output.push_str(&format!(
                    "  verdict: {} ({}) {}\n",
                    ev.verdict, ev.rule, ev.description
                ));
                if let Some(detail) = &ev.detail {
                    output.push_str(&format!("  detail: {detail}\n"));
                }
            }
            None => output.push_str("  verdict: not evaluated\n"),
        }
    }
    output
}

fn json_token<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{audit_html, explain, run_accessibility_test};
    use crate::dom::Page;

    fn run(html: &str) -> TestRun {
        run_accessibility_test(&Page::parse(html, "https://test.example/"))
    }

    #[test]
    fn text_lists_results_and_summary() {
        let text = to_text(
            &run(r#"<img id="hero" src="hero.png"><button>Save</button>"#),
            &ReportOptions::default(),
        );
        assert!(text.starts_with("accessibility test: https://test.example/ ["));
        assert!(text.contains("FAIL img #hero: Image is missing an accessible name\n"));
        assert!(text.contains("  <img id=\"hero\" src=\"hero.png\">\n"));
        assert!(text.contains("PASS button"));
        assert!(text.contains("\"Save\""));
        assert!(text.ends_with("2 elements: 1 failed, 0 warned, 1 passed\n"));
    }

    #[test]
    fn hide_passes_keeps_counts() {
        let r = run(r#"<img src="a.png"><button>Save</button>"#);
        let opts = ReportOptions { hide_passes: true };
        let text = to_text(&r, &opts);
        assert!(!text.contains("PASS"));
        assert!(text.contains("1 passed"));

        let json = report_to_json(&RunReport::Completed(r), &opts).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 1);
        assert_eq!(value["counts"]["total"], 2);
    }

    #[test]
    fn hidden_results_are_marked() {
        let text = to_text(
            &run(r#"<div hidden><button id="b"></button></div>"#),
            &ReportOptions::default(),
        );
        assert!(text.contains("WARN button #b [hidden]"));
        assert!(text.contains("(hidden element)"));
    }

    #[test]
    fn fail_on_thresholds() {
        let failing = audit_html(r#"<img src="a.png">"#, "");
        let warning = audit_html("<nav></nav>", "");
        let clean = audit_html("<button>Save</button>", "");

        assert!(FailOn::Fail.tripped(&failing));
        assert!(!FailOn::Fail.tripped(&warning));
        assert!(FailOn::Warn.tripped(&warning));
        assert!(!FailOn::Warn.tripped(&clean));
        assert!(!FailOn::Never.tripped(&failing));
        assert!(FailOn::Fail.tripped(&audit_html("", "")));
    }

    #[test]
    fn error_report_renders_single_line() {
        let report = RunReport::Failed {
            error: "boom".to_string(),
        };
        assert_eq!(report_to_text(&report, &ReportOptions::default()), "error: boom\n");
    }

    #[test]
    fn explanation_text() {
        let page = Page::parse(
            r#"<label>Email <input id="e" aria-labelledby="nope"></label>"#,
            "",
        );
        let text = explanations_to_text(&explain(&page, "input"));
        assert!(text.contains("element: #e\n"));
        assert!(text.contains("  category: form_control\n"));
        assert!(text.contains("  name: \"Email\"\n"));
        assert!(text.contains(r#"  source: {"label":"wrapped"}"#));
        assert!(text.contains("  broken ids: nope\n"));
        assert!(text.contains("flags: wrapping-label"));
        assert!(text.contains("verdict: FAIL (broken-reference)"));

        assert_eq!(explanations_to_text(&[]), "no elements match\n");
    }
}
