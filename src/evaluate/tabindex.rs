//! Elements made focusable with `tabindex` that no other evaluator covers.

use super::common::{self, named_pass};
use super::{rule, Evaluator, Outcome, Subject};
use crate::dom::{self, AriaRole};
use crate::inspect;

/// Tags that are focusable or operable without `tabindex`.
const NATIVELY_INTERACTIVE: &[&str] = &[
    "a", "area", "button", "input", "select", "textarea", "summary", "details", "iframe", "audio",
    "video", "embed", "object",
];

/// Roles outside the evaluated set that still make an element a widget.
const EXTRA_INTERACTIVE_ROLES: &[&str] = &[
    "gridcell",
    "row",
    "columnheader",
    "rowheader",
    "scrollbar",
    "separator",
    "treegrid",
    "tooltip",
];

/// Containers whose text is their content, not a name.
const TEXT_CONTAINERS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "li", "p", "div", "span", "td", "th", "dt", "dd", "pre",
    "blockquote", "figcaption", "label", "section", "article",
];

pub static TABINDEX_ONLY: Evaluator = Evaluator {
    rules: &[
        rule("broken-reference", common::broken_reference),
        rule("missing-name", |s| {
            common::missing_name_with(
                s,
                super::Verdict::Fail,
                "Give the element a role and an accessible name, or remove tabindex.",
            )
        }),
        rule("empty-name", common::empty_name),
        rule("punctuation-only", common::punctuation_only),
        rule("no-role", no_role),
    ],
    pass: named_pass,
};

fn negative_tabindex(s: &Subject<'_>) -> bool {
    s.attr("tabindex")
        .and_then(|t| t.trim().parse::<i32>().ok())
        .is_some_and(|t| t < 0)
}

fn interactive_role(s: &Subject<'_>) -> bool {
    match s.role.as_deref() {
        Some(role) => {
            AriaRole::parse(role).is_some_and(AriaRole::is_interactive)
                || EXTRA_INTERACTIVE_ROLES.contains(&role)
        }
        None => false,
    }
}

fn natively_interactive(s: &Subject<'_>) -> bool {
    NATIVELY_INTERACTIVE.contains(&s.tag.as_str())
        || s.attr("contenteditable")
            .is_some_and(|v| !v.trim().eq_ignore_ascii_case("false"))
}

fn text_container(s: &Subject<'_>) -> bool {
    TEXT_CONTAINERS.contains(&s.tag.as_str()) && !inspect::text_content(s.element).is_empty()
}

/// Whether the element is left to its own evaluator or needs no name.
pub fn skipped(s: &Subject<'_>) -> bool {
    natively_interactive(s) || interactive_role(s) || negative_tabindex(s) || text_container(s)
}

fn no_role(s: &Subject<'_>) -> Option<Outcome> {
    dom::explicit_role(s.element).is_none().then(|| {
        Outcome::warn(format!(
            "{} is focusable but has no role",
            s.noun()
        ))
        .with_detail("Add a role so assistive technology can tell users what the element does.")
    })
}

#[cfg(test)]
mod tests {
    use crate::evaluate::testing::{eval, eval_opt};
    use crate::evaluate::Verdict;

    #[test]
    fn skips_text_containers_and_negative_tabindex() {
        assert!(eval_opt(r#"<p tabindex="0">Intro text</p>"#, "p").is_none());
        assert!(eval_opt(r#"<div tabindex="-1"></div>"#, "div").is_none());
        assert!(eval_opt(r#"<div tabindex="0" role="row"></div>"#, "div").is_none());
        assert!(eval_opt(r#"<summary tabindex="0"></summary>"#, "summary").is_none());
    }

    #[test]
    fn empty_focusable_container_fails() {
        let e = eval(r#"<div tabindex="0"></div>"#, "div");
        assert_eq!(e.verdict, Verdict::Fail);
        assert_eq!(e.rule, "missing-name");
    }

    #[test]
    fn named_focusable_without_role_warns() {
        let e = eval(r#"<div tabindex="0" aria-label="Canvas"></div>"#, "div");
        assert_eq!(e.verdict, Verdict::Warn);
        assert_eq!(e.rule, "no-role");

        let e = eval(r#"<svg tabindex="0" aria-label="Chart"></svg>"#, "svg");
        assert_eq!(e.rule, "no-role");
    }
}
