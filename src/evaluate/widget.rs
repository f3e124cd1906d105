//! Generic ARIA widgets, dialogs and tab panels.

use scraper::ElementRef;

use super::common::{self, named_pass};
use super::{rule, Evaluator, Outcome, Subject, Verdict};
use crate::dom;
use crate::inspect;
use crate::name::{self, NameSource};

/// Composite containers whose children carry the real names.
const CONTAINER_ROLES: &[&str] = &["tablist", "menu", "menubar", "toolbar"];

const GENERIC_DIALOG_NAMES: &[&str] = &["dialog", "modal", "popup", "window"];

pub static ARIA_WIDGET: Evaluator = Evaluator {
    rules: &[
        rule("broken-reference", common::broken_reference),
        rule("icon-only-tab", icon_only_tab),
        rule("missing-name", widget_missing_name),
        rule("empty-name", common::empty_name),
        rule("punctuation-only", common::punctuation_only),
        rule("icon-only", |s| {
            name::names_from_content(s.element)
                .then(|| common::icon_only(s))
                .flatten()
        }),
        rule("generic", |s| common::generic_text_as(s, Verdict::Warn)),
        rule("title-only", common::title_only),
    ],
    pass: named_pass,
};

pub static DIALOG: Evaluator = Evaluator {
    rules: &[
        rule("broken-reference", common::broken_reference),
        rule("missing-name", common::missing_name),
        rule("empty-name", common::empty_name),
        rule("punctuation-only", common::punctuation_only),
        rule("duplicated-heading", duplicated_heading),
        rule("generic-dialog-name", generic_dialog_name),
    ],
    pass: named_pass,
};

pub static TAB_PANEL: Evaluator = Evaluator {
    rules: &[
        rule("broken-reference", common::broken_reference),
        rule("unlabelled-tab", unlabelled_tab),
        rule("missing-name", common::missing_name),
        rule("empty-name", common::empty_name),
        rule("punctuation-only", common::punctuation_only),
    ],
    pass: named_pass,
};

fn role_guidance(role: &str) -> &'static str {
    match role {
        "checkbox" | "radio" | "switch" => {
            "Give it visible text, or aria-labelledby pointing at its label."
        }
        "combobox" | "listbox" | "searchbox" | "textbox" | "spinbutton" | "slider" => {
            "Associate a visible label through aria-labelledby, or add aria-label."
        }
        "tab" => "Give the tab visible text naming the panel it controls.",
        "menuitem" | "menuitemcheckbox" | "menuitemradio" => "Give the menu item visible text.",
        "option" | "treeitem" => "Give the item visible text.",
        "tablist" | "menu" | "menubar" | "toolbar" | "tree" | "grid" => {
            "Label the container with aria-label or aria-labelledby."
        }
        _ => "Add an aria-label or aria-labelledby.",
    }
}

fn widget_missing_name(s: &Subject<'_>) -> Option<Outcome> {
    let role = s.role.as_deref().unwrap_or_default();
    let verdict = if CONTAINER_ROLES.contains(&role) {
        Verdict::Warn
    } else {
        Verdict::Fail
    };
    common::missing_name_with(s, verdict, role_guidance(role))
}

/// A tab whose only content is hidden from assistive technology.
fn icon_only_tab(s: &Subject<'_>) -> Option<Outcome> {
    let from_content = matches!(s.resolution.source, NameSource::Content | NameSource::None);
    (s.role_is("tab") && from_content && inspect::has_aria_hidden_content(s.element)).then(|| {
        Outcome::fail("Icon-only tab: its only content is hidden with aria-hidden")
            .with_detail("Add an aria-label to the tab, or visible text next to the icon.")
    })
}

fn heading_texts(s: &Subject<'_>) -> Vec<String> {
    dom::descendant_elements(s.element)
        .filter(|d| {
            matches!(d.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
                || dom::explicit_role(*d).as_deref() == Some("heading")
        })
        .map(inspect::text_content)
        .collect()
}

fn duplicated_heading(s: &Subject<'_>) -> Option<Outcome> {
    if s.resolution.source != NameSource::AriaLabel {
        return None;
    }
    let label = s.name();
    heading_texts(s).iter().any(|h| h == label).then(|| {
        Outcome::warn("Dialog aria-label duplicates its heading text")
            .with_detail("Use aria-labelledby pointing at the heading instead of repeating its text.")
    })
}

fn generic_dialog_name(s: &Subject<'_>) -> Option<Outcome> {
    let lower = s.name().trim().to_lowercase();
    GENERIC_DIALOG_NAMES.contains(&lower.as_str()).then(|| {
        Outcome::warn(format!("Dialog has a generic accessible name: \"{}\"", s.name()))
            .with_detail("Name the dialog after its purpose, e.g. \"Delete file?\".")
    })
}

/// What a labelledby target contributes: its own name, or its visible text
/// for elements that take no name from content.
fn label_text(s: &Subject<'_>, target: ElementRef<'_>) -> String {
    let resolved = name::resolve_accessible_name(s.page, target);
    if resolved.name.trim().is_empty() {
        inspect::visible_text_content(target)
    } else {
        resolved.name
    }
}

/// `aria-labelledby` pointing at a tab that has no usable name of its own.
fn unlabelled_tab(s: &Subject<'_>) -> Option<Outcome> {
    let ids = s.attr("aria-labelledby")?;
    let unlabelled = ids
        .split_whitespace()
        .filter_map(|id| s.page.element_by_id(id))
        .find(|target| {
            if inspect::has_aria_hidden_content(*target) {
                let resolved = name::resolve_accessible_name(s.page, *target);
                return matches!(resolved.source, NameSource::Content | NameSource::None);
            }
            label_text(s, *target).trim().is_empty()
        })?;
    let id = unlabelled.value().id().unwrap_or_default();
    Some(
        Outcome::fail(format!(
            "Tab panel is labelled by \"{id}\", which has no accessible name of its own"
        ))
        .with_detail("Name the controlling tab with visible text or aria-label.")
        .redacted(),
    )
}

#[cfg(test)]
mod tests {
    use crate::evaluate::testing::eval;
    use crate::evaluate::Verdict;

    #[test]
    fn widget_missing_name_guidance_by_role() {
        let e = eval(r#"<div role="checkbox"></div>"#, "div");
        assert_eq!(e.verdict, Verdict::Fail);
        assert!(e.description.starts_with("Element with role=checkbox"));
        assert!(e.detail.unwrap().contains("visible text"));

        let e = eval(r#"<div role="tablist"></div>"#, "div");
        assert_eq!(e.verdict, Verdict::Warn);
    }

    #[test]
    fn icon_only_tab_is_its_own_reason() {
        let e = eval(r#"<div role="tab"><span aria-hidden="true">★</span></div>"#, "div");
        assert_eq!(e.verdict, Verdict::Fail);
        assert_eq!(e.rule, "icon-only-tab");

        let e = eval(
            r#"<div role="tab" aria-label="Favourites"><span aria-hidden="true">★</span></div>"#,
            "div",
        );
        assert_eq!(e.verdict, Verdict::Pass);
    }

    #[test]
    fn content_named_widget_icon() {
        let e = eval(r#"<div role="menuitem">☰</div>"#, "div");
        assert_eq!(e.rule, "icon-only");
        let e = eval(r#"<div role="switch" aria-label="Dark mode"></div>"#, "div");
        assert_eq!(e.verdict, Verdict::Pass);
    }

    #[test]
    fn dialog_checks() {
        let e = eval(
            r#"<div role="dialog" aria-label="Delete file"><h2>Delete file</h2></div>"#,
            "div",
        );
        assert_eq!(e.verdict, Verdict::Warn);
        assert_eq!(e.rule, "duplicated-heading");

        let e = eval(r#"<dialog aria-label="Modal"></dialog>"#, "dialog");
        assert_eq!(e.rule, "generic-dialog-name");

        let e = eval(r#"<dialog></dialog>"#, "dialog");
        assert_eq!(e.verdict, Verdict::Fail);

        let e = eval(
            r#"<div role="alertdialog" aria-labelledby="t"><h2 id="t">Session expiring</h2></div>"#,
            "div",
        );
        assert_eq!(e.verdict, Verdict::Pass);
    }

    #[test]
    fn tabpanel_labelled_by_icon_tab_is_cleared() {
        let e = eval(
            r#"<div role="tab" id="t1"><i aria-hidden="true">★</i></div>
               <div role="tabpanel" aria-labelledby="t1">Saved items</div>"#,
            "[role=tabpanel]",
        );
        assert_eq!(e.verdict, Verdict::Fail);
        assert_eq!(e.rule, "unlabelled-tab");
        assert_eq!(e.name, "");
        assert_eq!(e.display_name.as_deref(), Some(""));
    }

    #[test]
    fn tabpanel_labelled_by_plain_text_passes() {
        let e = eval(
            r#"<span id="lbl">Account settings</span>
               <div role="tabpanel" aria-labelledby="lbl">Body</div>"#,
            "[role=tabpanel]",
        );
        assert_eq!(e.verdict, Verdict::Pass);
        assert_eq!(e.name, "Account settings");

        let e = eval(
            r#"<h3 id="hd">Shipping</h3>
               <div role="tabpanel" aria-labelledby="hd">Rates</div>"#,
            "[role=tabpanel]",
        );
        assert_eq!(e.verdict, Verdict::Pass);
    }

    #[test]
    fn tabpanel_labelled_by_hidden_only_span_is_cleared() {
        let e = eval(
            r#"<span id="lbl"><i aria-hidden="true">★</i></span>
               <div role="tabpanel" aria-labelledby="lbl">Body</div>"#,
            "[role=tabpanel]",
        );
        assert_eq!(e.rule, "unlabelled-tab");
        assert_eq!(e.name, "");
    }

    #[test]
    fn tabpanel_labelled_by_named_tab_passes() {
        let e = eval(
            r#"<div role="tab" id="t1">Saved</div>
               <div role="tabpanel" aria-labelledby="t1">Saved items</div>"#,
            "[role=tabpanel]",
        );
        assert_eq!(e.verdict, Verdict::Pass);
        assert_eq!(e.name, "Saved");
    }
}
