use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::dom::{self, CssPathLocator, Locator, Page, RenderedStyle};
use crate::evaluate::{self, categorize, Category, Evaluation, Verdict};
use crate::inspect;
use crate::name::{self, Resolution};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub total: usize,
    pub failed: usize,
    pub warned: usize,
    pub passed: usize,
}

impl Counts {
    fn tally(results: &[Evaluation]) -> Self {
        let count = |v: Verdict| results.iter().filter(|r| r.verdict == v).count();
        Self {
            total: results.len(),
            failed: count(Verdict::Fail),
            warned: count(Verdict::Warn),
            passed: count(Verdict::Pass),
        }
    }
}

/// One full pass over a document.
#[derive(Debug, Clone, Serialize)]
pub struct TestRun {
    pub url: String,
    /// Unix seconds.
    pub timestamp: u64,
    pub results: Vec<Evaluation>,
    pub counts: Counts,
}

impl TestRun {
    /// Worst verdict in the run, `None` when nothing was evaluated.
    pub fn worst_verdict(&self) -> Option<Verdict> {
        self.results.iter().map(|r| r.verdict).max()
    }
}

/// What a caller gets back: a completed run, or a single error for the whole
/// document when it could not be read at all.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RunReport {
    Completed(TestRun),
    Failed { error: String },
}

impl RunReport {
    pub fn failed(err: &anyhow::Error) -> Self {
        RunReport::Failed {
            error: format!("{err:#}"),
        }
    }
}

pub fn now_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Markup to audit, kept as text so it can be re-parsed on demand.
#[derive(Debug, Clone)]
pub struct Document {
    pub html: String,
    pub url: String,
    /// The markup carries computed-visibility markers from a live page.
    pub rendered: bool,
}

impl Document {
    pub fn page(&self) -> Page {
        let page = Page::parse(&self.html, &self.url);
        if self.rendered {
            page.with_style(RenderedStyle)
        } else {
            page
        }
    }

    /// Audits the document, or reports the whole run as failed when there is
    /// nothing to parse.
    pub fn audit(&self) -> RunReport {
        if self.html.trim().is_empty() {
            return RunReport::Failed {
                error: "document is empty".to_string(),
            };
        }
        RunReport::Completed(run_accessibility_test(&self.page()))
    }
}

/// Evaluates every categorized element of `page`, category by category.
pub fn run_accessibility_test(page: &Page) -> TestRun {
    run_with_locator(page, &CssPathLocator)
}

pub fn run_with_locator(page: &Page, locator: &dyn Locator) -> TestRun {
    let mut results = Vec::new();

    for category in Category::ALL {
        let before = results.len();
        for element in page.select(category.selector()) {
            if categorize(element) != Some(category) {
                continue;
            }
            if let Some(evaluation) = evaluate::evaluate_as(page, element, category, locator) {
                results.push(evaluation);
            }
        }
        debug!(category = %category, evaluated = results.len() - before, "category scanned");
    }

    let counts = Counts::tally(&results);
    info!(
        url = %page.url(),
        total = counts.total,
        failed = counts.failed,
        warned = counts.warned,
        passed = counts.passed,
        "accessibility test complete"
    );

    TestRun {
        url: page.url().to_string(),
        timestamp: now_timestamp(),
        results,
        counts,
    }
}

/// Everything known about one element: how its name was computed and how it
/// was judged.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub css_selector: String,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub category: Option<Category>,
    pub resolution: Resolution,
    pub visible: bool,
    /// `None` for elements no evaluator covers.
    pub evaluation: Option<Evaluation>,
}

/// Explains every element matching `selector`, in document order.
pub fn explain(page: &Page, selector: &str) -> Vec<Explanation> {
    let locator = CssPathLocator;
    page.select(selector)
        .into_iter()
        .map(|element| Explanation {
            css_selector: locator.locate(page, element),
            tag: dom::tag(element),
            role: dom::explicit_role(element),
            category: categorize(element),
            resolution: name::resolve_accessible_name(page, element),
            visible: !inspect::is_hidden(page, element),
            evaluation: evaluate::evaluate_with(page, element, &locator),
        })
        .collect()
}

/// Parses and audits an HTML string. Blank input is the one whole-run error.
pub fn audit_html(html: &str, url: &str) -> RunReport {
    Document {
        html: html.to_string(),
        url: url.to_string(),
        rendered: false,
    }
    .audit()
}

/// Reads a document from a file path, or stdin when `input` is `-`.
pub fn load_document(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read HTML from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))
    }
}

pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> TestRun {
        run_accessibility_test(&Page::parse(html, "https://test.example/page"))
    }

    #[test]
    fn counts_add_up() {
        let r = run(r#"<img src="a.png"><img src="b.png" alt="Team photo"><a href="/">Read more</a>"#);
        assert_eq!(r.counts.total, 3);
        assert_eq!(r.counts.failed, 1);
        assert_eq!(r.counts.warned, 1);
        assert_eq!(r.counts.passed, 1);
        assert_eq!(r.url, "https://test.example/page");
    }

    #[test]
    fn results_follow_category_order_then_document_order() {
        let r = run(r#"<button>Save</button><img id=b src="b.png" alt="B"><img id=a src="a.png" alt="A">"#);
        let tags: Vec<&str> = r.results.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, ["img", "img", "button"]);
        assert_eq!(r.results[0].css_selector, "#b");
    }

    #[test]
    fn each_element_is_evaluated_once() {
        let r = run(r#"<a href="/x" role="button">Open</a><div role="img" aria-label="Logo"></div>"#);
        assert_eq!(r.counts.total, 2);
        assert_eq!(r.results[0].category, Category::RoleImg);
        assert_eq!(r.results[1].category, Category::Button);
    }

    #[test]
    fn page_without_candidates_is_an_empty_run() {
        let r = run("<p>Just text</p>");
        assert_eq!(r.counts, Counts::default());
        assert_eq!(r.worst_verdict(), None);
    }

    #[test]
    fn explain_reports_resolution_and_evaluation() {
        let page = Page::parse(
            r#"<p id=p>Text</p><button aria-labelledby="gone" title="Save">x</button>"#,
            "",
        );
        let explained = explain(&page, "button, p");
        assert_eq!(explained.len(), 2);

        assert_eq!(explained[0].tag, "p");
        assert!(explained[0].evaluation.is_none());

        let button = &explained[1];
        assert_eq!(button.category, Some(Category::Button));
        assert_eq!(button.resolution.annotations.broken_reference_ids, vec!["gone"]);
        let evaluation = button.evaluation.as_ref().unwrap();
        assert_eq!(evaluation.rule, "broken-reference");
        assert_eq!(evaluation.verdict, Verdict::Fail);
    }

    #[test]
    fn explain_with_bad_selector_is_empty() {
        let page = Page::parse("<button>Go</button>", "");
        assert!(explain(&page, "button[").is_empty());
    }

    #[test]
    fn blank_document_is_a_single_error() {
        match audit_html("  \n", "") {
            RunReport::Failed { error } => assert_eq!(error, "document is empty"),
            RunReport::Completed(_) => panic!("expected a failure"),
        }
        let json = serde_json::to_value(audit_html("", "")).unwrap();
        assert_eq!(json, serde_json::json!({"error": "document is empty"}));
    }

    #[test]
    fn load_document_reads_files_and_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<img src=x.png>").unwrap();
        let html = load_document(path.to_str().unwrap()).unwrap();
        assert_eq!(html, "<img src=x.png>");

        let err = load_document(dir.path().join("missing.html").to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read"));
    }
}
