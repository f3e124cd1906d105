//! Checks shared by most evaluators, plus the name-quality checks whose verdict
//! depends on the category calling them.

use super::{Outcome, Subject, Verdict};
use crate::inspect::LabelKind;
use crate::name::NameSource;
use crate::text;

pub const HIDDEN_SUFFIX: &str = " (hidden element)";
pub const HIDDEN_DETAIL: &str =
    "This element is not currently visible; the issue applies once it is shown.";

pub fn broken_reference(s: &Subject<'_>) -> Option<Outcome> {
    let ids = &s.notes().broken_reference_ids;
    if ids.is_empty() {
        return None;
    }
    let quoted: Vec<String> = ids.iter().map(|id| format!("\"{id}\"")).collect();
    Some(
        Outcome::fail(format!(
            "{} has aria-labelledby referencing missing id(s): {}",
            s.noun(),
            quoted.join(", ")
        ))
        .with_detail("Every id listed in aria-labelledby must belong to an element in the document."),
    )
}

/// No name from any source. A blank `aria-label` is reported by
/// [`empty_name`] instead.
pub fn is_missing(s: &Subject<'_>) -> bool {
    s.name().is_empty() && !s.notes().aria_label_is_empty
}

pub fn missing_name_with(s: &Subject<'_>, verdict: Verdict, guidance: &str) -> Option<Outcome> {
    is_missing(s).then(|| {
        Outcome::with_verdict(verdict, format!("{} is missing an accessible name", s.noun()))
            .with_detail(guidance.to_string())
    })
}

pub fn missing_name(s: &Subject<'_>) -> Option<Outcome> {
    let guidance = match s.category {
        super::Category::RoleImg => "Give the element an aria-label or aria-labelledby describing the image.",
        super::Category::SvgImage => "Add a <title> child, aria-label or aria-labelledby to the SVG.",
        super::Category::Button => "Give the button visible text, an aria-label or aria-labelledby.",
        super::Category::Link => "Give the link text that describes its destination.",
        super::Category::Dialog => "Label the dialog with aria-labelledby pointing at its heading, or aria-label.",
        super::Category::TabPanel => "Label the panel with aria-labelledby pointing at its tab.",
        super::Category::ProgressMeter => "Associate a <label>, or add aria-label or aria-labelledby.",
        super::Category::Frame => "Add a title attribute describing the frame's content.",
        _ => "Add an aria-label or aria-labelledby.",
    };
    missing_name_with(s, Verdict::Fail, guidance)
}

pub fn empty_name(s: &Subject<'_>) -> Option<Outcome> {
    (s.notes().aria_label_is_empty || text::is_whitespace_only(s.name())).then(|| {
        Outcome::fail(format!(
            "{} has an empty or whitespace-only accessible name",
            s.noun()
        ))
    })
}

pub fn punctuation_only_as(s: &Subject<'_>, verdict: Verdict) -> Option<Outcome> {
    text::is_punctuation_only(s.name()).then(|| {
        Outcome::with_verdict(
            verdict,
            format!("{} accessible name contains only punctuation", s.noun()),
        )
    })
}

pub fn punctuation_only(s: &Subject<'_>) -> Option<Outcome> {
    punctuation_only_as(s, Verdict::Fail)
}

pub fn filename_as(s: &Subject<'_>, verdict: Verdict) -> Option<Outcome> {
    text::looks_like_filename(s.name()).then(|| {
        Outcome::with_verdict(
            verdict,
            format!("{} uses a filename as accessible name: \"{}\"", s.noun(), s.name()),
        )
    })
}

pub fn url_as(s: &Subject<'_>, verdict: Verdict) -> Option<Outcome> {
    text::looks_like_url(s.name()).then(|| {
        Outcome::with_verdict(
            verdict,
            format!("{} uses a URL as accessible name: \"{}\"", s.noun(), s.name()),
        )
    })
}

pub fn generic_label_as(s: &Subject<'_>, verdict: Verdict) -> Option<Outcome> {
    text::is_generic_label(s.name()).then(|| {
        Outcome::with_verdict(
            verdict,
            format!("{} has a generic accessible name: \"{}\"", s.noun(), s.name()),
        )
    })
}

pub fn generic_text_as(s: &Subject<'_>, verdict: Verdict) -> Option<Outcome> {
    text::is_generic_text(s.name()).then(|| {
        Outcome::with_verdict(
            verdict,
            format!("{} has generic text: \"{}\"", s.noun(), s.name()),
        )
        .with_detail("Say what happens when it is activated.")
    })
}

pub fn icon_only(s: &Subject<'_>) -> Option<Outcome> {
    text::is_icon_only_content(s.element, s.name(), s.resolution.source).then(|| {
        Outcome::fail(format!(
            "{} accessible name is only an icon or symbol",
            s.noun()
        ))
        .with_detail("Screen readers announce the glyph literally. Add an aria-label.")
    })
}

pub fn title_only(s: &Subject<'_>) -> Option<Outcome> {
    s.notes().name_source_is_title_only.then(|| {
        Outcome::warn(format!(
            "{} is named only by its title attribute",
            s.noun()
        ))
        .with_detail("Tooltips are not reliably exposed to all users. Prefer visible text or aria-label.")
    })
}

pub fn implicit_label(s: &Subject<'_>) -> Option<Outcome> {
    (s.resolution.source == NameSource::Label(LabelKind::Wrapped)).then(|| {
        Outcome::warn(format!(
            "{} is labelled only by a wrapping <label>",
            s.noun()
        ))
        .with_detail("Some voice-control software misses implicit labels. Add matching for/id attributes.")
    })
}

pub fn named_pass(s: &Subject<'_>) -> Outcome {
    Outcome::pass(format!("{} has accessible name: \"{}\"", s.noun(), s.name()))
}
