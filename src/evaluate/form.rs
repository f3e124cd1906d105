//! Form controls, radio buttons, selects and grouping elements.

use super::common::{self, named_pass};
use super::{rule, Evaluator, Outcome, Subject, Verdict};
use crate::dom;
use crate::inspect;

pub static FORM_CONTROL: Evaluator = Evaluator {
    rules: &[
        rule("broken-reference", common::broken_reference),
        rule("placeholder-only", placeholder_only),
        rule("missing-name", |s| {
            common::missing_name_with(
                s,
                Verdict::Fail,
                "Associate a <label>, or add aria-label or aria-labelledby.",
            )
        }),
        rule("empty-name", common::empty_name),
        rule("punctuation-only", common::punctuation_only),
        rule("filename", |s| common::filename_as(s, Verdict::Fail)),
        rule("url", |s| common::url_as(s, Verdict::Fail)),
        rule("generic", |s| common::generic_label_as(s, Verdict::Fail)),
        rule("implicit-label", common::implicit_label),
        rule("title-only", common::title_only),
    ],
    pass: named_pass,
};

pub static FIELDSET: Evaluator = Evaluator {
    rules: &[
        rule("broken-reference", common::broken_reference),
        rule("legend-not-first", legend_not_first),
        rule("legend-and-aria", legend_and_aria),
        rule("missing-name", group_missing_name),
        rule("empty-name", common::empty_name),
        rule("punctuation-only", common::punctuation_only),
        rule("generic", |s| common::generic_label_as(s, Verdict::Warn)),
    ],
    pass: named_pass,
};

fn placeholder_only(s: &Subject<'_>) -> Option<Outcome> {
    let placeholder = s.attr("placeholder").map(str::trim).filter(|p| !p.is_empty())?;
    common::is_missing(s).then(|| {
        Outcome::fail(format!(
            "{} is labelled only by its placeholder \"{placeholder}\"",
            s.noun()
        ))
        .with_detail("Placeholder text disappears on input and is not a reliable name. Add a <label>.")
    })
}

/// Runs the form-control table, then `extra` only when that did not fail.
fn after_form_control(s: &Subject<'_>, extra: fn(&Subject<'_>) -> Option<Outcome>, id: &'static str) -> Outcome {
    let base = FORM_CONTROL.apply(s);
    if base.verdict == Verdict::Fail {
        return base;
    }
    extra(s).map(|o| o.with_rule(id)).unwrap_or(base)
}

// ── Radio ──

fn in_radio_group(s: &Subject<'_>) -> bool {
    dom::ancestors(s.element).any(|a| {
        a.value().name() == "fieldset"
            || dom::explicit_role(a).as_deref() == Some("radiogroup")
    })
}

pub fn radio(s: &Subject<'_>) -> Outcome {
    after_form_control(
        s,
        |s| {
            (!in_radio_group(s)).then(|| {
                Outcome::fail("Radio button is not contained within a fieldset or role=radiogroup")
                    .with_detail("Group related radio buttons so the group's question is announced.")
            })
        },
        "not-grouped",
    )
}

// ── Select ──

fn options<'a>(s: &Subject<'a>) -> Vec<scraper::ElementRef<'a>> {
    dom::descendant_elements(s.element)
        .filter(|d| d.value().name() == "option")
        .collect()
}

fn select_options(s: &Subject<'_>) -> Option<Outcome> {
    let options = options(s);
    if let Some(first) = options.first() {
        if inspect::raw_text_content(*first).is_empty() {
            return Some(
                Outcome::fail("Select's first option has no text")
                    .with_detail("An empty first option is announced as blank. Use a prompt such as \"Choose...\".")
                    .with_rule("empty-first-option"),
            );
        }
    }
    options
        .iter()
        .position(|o| inspect::raw_text_content(*o).trim().is_empty())
        .map(|i| {
            Outcome::fail(format!("Select option {} has whitespace-only text", i + 1))
                .with_rule("whitespace-option")
        })
}

pub fn select(s: &Subject<'_>) -> Outcome {
    let base = FORM_CONTROL.apply(s);
    if base.verdict == Verdict::Fail {
        return base;
    }
    select_options(s).unwrap_or(base)
}

// ── Fieldset / group ──

fn legends<'a>(s: &Subject<'a>) -> Vec<scraper::ElementRef<'a>> {
    dom::child_elements(s.element)
        .filter(|c| c.value().name() == "legend")
        .collect()
}

fn legend_is_first(s: &Subject<'_>) -> bool {
    dom::child_elements(s.element)
        .next()
        .is_some_and(|c| c.value().name() == "legend")
}

fn legend_not_first(s: &Subject<'_>) -> Option<Outcome> {
    if s.tag != "fieldset" || legends(s).is_empty() || legend_is_first(s) {
        return None;
    }
    Some(
        Outcome::fail("Fieldset has a <legend> that is not its first child")
            .with_detail("The legend only names the fieldset when it is the first child element."),
    )
}

fn legend_and_aria(s: &Subject<'_>) -> Option<Outcome> {
    if s.tag != "fieldset" || !legend_is_first(s) {
        return None;
    }
    let legend_text = legends(s).first().map(|l| inspect::text_content(*l))?;
    if legend_text.is_empty() {
        return None;
    }
    let aria = s.attr("aria-label").is_some() || s.attr("aria-labelledby").is_some();
    aria.then(|| {
        Outcome::warn("Fieldset has both a legend and aria-label or aria-labelledby")
            .with_detail("Screen readers may announce the group name twice. Keep the legend only.")
    })
}

fn group_missing_name(s: &Subject<'_>) -> Option<Outcome> {
    let verdict = if s.tag == "fieldset" || s.role_is("radiogroup") {
        Verdict::Fail
    } else {
        Verdict::Warn
    };
    let guidance = if s.tag == "fieldset" {
        "Add a <legend> as the first child of the fieldset."
    } else {
        "Label the group with aria-label or aria-labelledby."
    };
    common::missing_name_with(s, verdict, guidance)
}

#[cfg(test)]
mod tests {
    use crate::evaluate::testing::eval;
    use crate::evaluate::Verdict;

    #[test]
    fn placeholder_only_is_distinct_from_missing() {
        let e = eval(r#"<input placeholder="Email">"#, "input");
        assert_eq!(e.verdict, Verdict::Fail);
        assert_eq!(e.rule, "placeholder-only");

        let e = eval(r#"<input>"#, "input");
        assert_eq!(e.rule, "missing-name");
    }

    #[test]
    fn generic_label_fails_on_form_controls() {
        let e = eval(r#"<label for=a>Field</label><input id=a>"#, "input");
        assert_eq!(e.verdict, Verdict::Fail);
        assert_eq!(e.rule, "generic");
    }

    #[test]
    fn wrapped_label_warns() {
        let e = eval(r#"<label>Email <input type="email"></label>"#, "input");
        assert_eq!(e.verdict, Verdict::Warn);
        assert_eq!(e.rule, "implicit-label");

        let e = eval(r#"<label for=e>Email</label><input id=e type="email">"#, "input");
        assert_eq!(e.verdict, Verdict::Pass);
    }

    #[test]
    fn radio_requires_group() {
        let e = eval(r#"<label for="r1">Option A</label><input type="radio" id="r1">"#, "input");
        assert_eq!(e.verdict, Verdict::Fail);
        assert!(e.description.contains("not contained within a fieldset or role=radiogroup"));

        let e = eval(
            r#"<div role="radiogroup"><label for="r1">Option A</label><input type="radio" id="r1"></div>"#,
            "input",
        );
        assert_eq!(e.verdict, Verdict::Pass);
    }

    #[test]
    fn radio_short_circuits_on_name_failure() {
        let e = eval(r#"<input type="radio">"#, "input");
        assert_eq!(e.rule, "missing-name");
    }

    #[test]
    fn select_option_checks() {
        let e = eval(
            r#"<label for=s>Size</label><select id=s><option></option><option>M</option></select>"#,
            "select",
        );
        assert_eq!(e.rule, "empty-first-option");

        let e = eval(
            r#"<label for=s>Size</label><select id=s><option>S</option><option> </option></select>"#,
            "select",
        );
        assert_eq!(e.rule, "whitespace-option");

        let e = eval(
            r#"<label for=s>Size</label><select id=s><option>S</option></select>"#,
            "select",
        );
        assert_eq!(e.verdict, Verdict::Pass);
    }

    #[test]
    fn fieldset_checks() {
        let e = eval(
            r#"<fieldset aria-label="Pay"><legend>Payment</legend><input></fieldset>"#,
            "fieldset",
        );
        assert_eq!(e.verdict, Verdict::Warn);
        assert_eq!(e.rule, "legend-and-aria");
        assert_eq!(e.name, "Payment");

        let e = eval(r#"<fieldset><input><legend>Late</legend></fieldset>"#, "fieldset");
        assert_eq!(e.verdict, Verdict::Fail);
        assert_eq!(e.rule, "legend-not-first");

        let e = eval(r#"<fieldset><input></fieldset>"#, "fieldset");
        assert_eq!(e.verdict, Verdict::Fail);
    }

    #[test]
    fn unnamed_group_warns_but_radiogroup_fails() {
        let e = eval(r#"<div role="group"><input></div>"#, "div");
        assert_eq!(e.verdict, Verdict::Warn);
        let e = eval(r#"<div role="radiogroup"><input type="radio"></div>"#, "div");
        assert_eq!(e.verdict, Verdict::Fail);
    }
}
