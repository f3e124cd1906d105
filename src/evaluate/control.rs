//! Buttons and links.

use super::common::{self, named_pass};
use super::{rule, Evaluator, Outcome, Subject, Verdict};
use crate::dom;
use crate::text;

pub static BUTTON: Evaluator = Evaluator {
    rules: &[
        rule("broken-reference", common::broken_reference),
        rule("input-missing-value", input_missing_value),
        rule("missing-name", common::missing_name),
        rule("empty-name", common::empty_name),
        rule("punctuation-only", common::punctuation_only),
        rule("icon-only", common::icon_only),
        rule("generic", |s| common::generic_text_as(s, Verdict::Warn)),
        rule("filename", |s| common::filename_as(s, Verdict::Warn)),
        rule("url", |s| common::url_as(s, Verdict::Warn)),
        rule("title-only", common::title_only),
    ],
    pass: named_pass,
};

pub static LINK: Evaluator = Evaluator {
    rules: &[
        rule("broken-reference", common::broken_reference),
        rule("image-without-alt", image_without_alt),
        rule("missing-name", common::missing_name),
        rule("empty-name", common::empty_name),
        rule("punctuation-only", common::punctuation_only),
        rule("icon-only", common::icon_only),
        rule("url", |s| common::url_as(s, Verdict::Warn)),
        rule("filename", |s| common::filename_as(s, Verdict::Warn)),
        rule("generic", generic_link_text),
        rule("title-only", common::title_only),
    ],
    pass: named_pass,
};

fn input_missing_value(s: &Subject<'_>) -> Option<Outcome> {
    let button_input = s.tag == "input"
        && matches!(dom::input_type(s.element).as_str(), "button" | "submit" | "reset");
    (button_input && s.attr("value").is_none() && common::is_missing(s)).then(|| {
        Outcome::fail(format!(
            "Input button (type=\"{}\") is missing a value attribute",
            dom::input_type(s.element)
        ))
        .with_detail("The value attribute is the visible label of an input button.")
    })
}

fn image_without_alt(s: &Subject<'_>) -> Option<Outcome> {
    if !common::is_missing(s) {
        return None;
    }
    let bare = dom::descendant_elements(s.element)
        .filter(|d| d.value().name() == "img")
        .any(|img| img.value().attr("alt").is_none());
    bare.then(|| {
        Outcome::fail("Link contains an image without alt text and has no other accessible name")
            .with_detail("Give the image alt text describing the link's destination.")
    })
}

fn generic_link_text(s: &Subject<'_>) -> Option<Outcome> {
    text::is_generic_link_text(s.name()).then(|| {
        Outcome::warn(format!("Link has generic text: \"{}\"", s.name()))
            .with_detail("Link text should make sense out of context. Describe the destination.")
    })
}
