//! Landmark regions.

use scraper::ElementRef;

use super::common::{self, named_pass};
use super::{rule, Evaluator, Outcome, Subject, Verdict};
use crate::dom::{self, AriaRole};
use crate::name;

/// Ancestors that turn `header`/`footer` into plain sectioning content.
const SCOPING_TAGS: &[&str] = &["article", "aside", "main", "nav", "section"];

/// Roles that may appear once on a page without a name.
const SINGLETON_ROLES: &[AriaRole] = &[
    AriaRole::Banner,
    AriaRole::ContentInfo,
    AriaRole::Main,
    AriaRole::Complementary,
    AriaRole::Search,
];

pub static LANDMARK: Evaluator = Evaluator {
    rules: &[
        rule("broken-reference", common::broken_reference),
        rule("unnamed", unnamed),
        rule("empty-name", common::empty_name),
        rule("punctuation-only", punctuation_only),
        rule("filename", |s| form_only(s, common::filename_as)),
        rule("url", |s| form_only(s, common::url_as)),
        rule("generic", |s| form_only(s, common::generic_label_as)),
        rule("duplicate-name", duplicate_name),
        rule("role-as-name", role_as_name),
    ],
    pass: named_pass,
};

fn is_scoped(element: ElementRef<'_>) -> bool {
    dom::ancestors(element).any(|a| SCOPING_TAGS.contains(&a.value().name()))
}

/// The landmark role an element exposes, explicit or implied by its tag.
/// An explicit non-landmark role removes the tag's landmark semantics.
pub fn landmark_role(element: ElementRef<'_>) -> Option<AriaRole> {
    if let Some(role) = dom::aria_role(element) {
        return role.is_landmark().then_some(role);
    }
    match element.value().name() {
        "header" if !is_scoped(element) => Some(AriaRole::Banner),
        "footer" if !is_scoped(element) => Some(AriaRole::ContentInfo),
        "main" => Some(AriaRole::Main),
        "nav" => Some(AriaRole::Navigation),
        "aside" => Some(AriaRole::Complementary),
        "search" => Some(AriaRole::Search),
        _ => None,
    }
}

fn same_role_landmarks<'a>(s: &Subject<'a>, role: AriaRole) -> impl Iterator<Item = ElementRef<'a>> {
    s.page
        .elements()
        .filter(move |el| landmark_role(*el) == Some(role))
}

fn unnamed(s: &Subject<'_>) -> Option<Outcome> {
    if !common::is_missing(s) {
        return None;
    }
    let role = landmark_role(s.element)?;
    let count = same_role_landmarks(s, role).count();
    let noun = s.noun();

    if count > 1 {
        return Some(
            Outcome::fail(format!(
                "{noun} is missing an accessible name ({count} {role} landmarks on the page)"
            ))
            .with_detail("When a landmark role appears more than once, each instance needs a distinct name."),
        );
    }
    if matches!(role, AriaRole::Region | AriaRole::Form) {
        return Some(
            Outcome::fail(format!("{noun} is missing an accessible name"))
                .with_detail("region and form landmarks are only exposed when they are named."),
        );
    }
    if role == AriaRole::Navigation {
        return Some(
            Outcome::warn(format!(
                "{noun} should have an accessible name for better user experience"
            ))
            .with_detail("Naming navigation, e.g. aria-label=\"Main\", helps users tell menus apart."),
        );
    }
    SINGLETON_ROLES
        .contains(&role)
        .then(|| Outcome::pass(format!("{noun} is unique on the page and does not need a name")))
}

fn is_form_like(s: &Subject<'_>) -> bool {
    matches!(
        landmark_role(s.element),
        Some(AriaRole::Form) | Some(AriaRole::Region)
    )
}

fn punctuation_only(s: &Subject<'_>) -> Option<Outcome> {
    let verdict = if is_form_like(s) { Verdict::Fail } else { Verdict::Warn };
    common::punctuation_only_as(s, verdict)
}

fn form_only(
    s: &Subject<'_>,
    check: fn(&Subject<'_>, Verdict) -> Option<Outcome>,
) -> Option<Outcome> {
    if landmark_role(s.element) != Some(AriaRole::Form) {
        return None;
    }
    check(s, Verdict::Fail)
}

fn duplicate_name(s: &Subject<'_>) -> Option<Outcome> {
    let role = landmark_role(s.element)?;
    let mine = s.name().trim().to_lowercase();
    if mine.is_empty() {
        return None;
    }
    let clash = same_role_landmarks(s, role)
        .filter(|other| *other != s.element)
        .any(|other| {
            name::resolve_accessible_name(s.page, other)
                .name
                .trim()
                .to_lowercase()
                == mine
        });
    clash.then(|| {
        Outcome::warn(format!(
            "{} shares its accessible name \"{}\" with another {role} landmark",
            s.noun(),
            s.name()
        ))
        .with_detail("Landmarks of the same role need distinct names to be told apart.")
    })
}

fn role_as_name(s: &Subject<'_>) -> Option<Outcome> {
    let role = landmark_role(s.element)?;
    let lower = s.name().trim().to_lowercase();
    let redundant = lower == role.token()
        || lower == s.tag
        || lower == format!("{} landmark", role.token());
    redundant.then(|| {
        Outcome::warn(format!(
            "{} is named after its role: \"{}\"",
            s.noun(),
            s.name()
        ))
        .with_detail("Screen readers already announce the role. Name the landmark by its content.")
    })
}
