//! Images: `<img>`, `input[type=image]`, `<svg role=img>` and other `role=img`.

use super::common::{self, named_pass};
use super::{first_match, rule, Evaluator, Outcome, Rule, Subject, Verdict};
use crate::dom;
use crate::inspect;
use crate::name::NameSource;

const REDUNDANT_PREFIXES: &[&str] = &["image of", "picture of", "photo of", "graphic of", "icon of"];

const LONG_ALT_LIMIT: usize = 150;

pub static IMAGE: Evaluator = Evaluator {
    rules: &[
        rule("broken-reference", common::broken_reference),
        rule("decorative", decorative),
        rule("missing-name", missing_alt),
        rule("empty-name", common::empty_name),
        rule("punctuation-only", common::punctuation_only),
        rule("filename", |s| common::filename_as(s, Verdict::Fail)),
        rule("url", |s| common::url_as(s, Verdict::Fail)),
        rule("generic", |s| common::generic_label_as(s, Verdict::Warn)),
        rule("redundant-prefix", redundant_prefix),
        rule("title-only", common::title_only),
        rule("long-alt", long_alt),
        rule("broken-usemap", broken_usemap),
    ],
    pass: named_pass,
};

pub static ROLE_IMG: Evaluator = Evaluator {
    rules: &[
        rule("broken-reference", common::broken_reference),
        rule("missing-name", common::missing_name),
        rule("empty-name", common::empty_name),
        rule("punctuation-only", common::punctuation_only),
        rule("filename", |s| common::filename_as(s, Verdict::Warn)),
        rule("url", |s| common::url_as(s, Verdict::Warn)),
        rule("generic", |s| common::generic_label_as(s, Verdict::Warn)),
    ],
    pass: named_pass,
};

const SVG_RULES: &[Rule] = &[
    rule("broken-reference", common::broken_reference),
    rule("markup-in-name", markup_in_name),
    rule("empty-title", empty_title),
    rule("missing-name", common::missing_name),
    rule("empty-name", common::empty_name),
    rule("punctuation-only", common::punctuation_only),
    rule("filename", |s| common::filename_as(s, Verdict::Warn)),
    rule("url", |s| common::url_as(s, Verdict::Warn)),
    rule("generic", |s| common::generic_label_as(s, Verdict::Warn)),
];

fn is_image_map(s: &Subject<'_>) -> bool {
    s.attr("usemap").is_some_and(|m| !m.trim().is_empty())
}

fn has_decorative_marker(s: &Subject<'_>) -> bool {
    s.attr("alt") == Some("")
        || s.attr("aria-hidden").is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
        || s.role_is("presentation")
        || s.role_is("none")
}

fn decorative(s: &Subject<'_>) -> Option<Outcome> {
    if !has_decorative_marker(s) {
        return None;
    }
    if s.name().is_empty() {
        if is_image_map(s) {
            return Some(
                Outcome::warn("Image map is marked decorative")
                    .with_detail("Image maps carry links and need alt text describing them."),
            );
        }
        let message = if s.attr("alt") == Some("") {
            "Image correctly has empty alt text (decorative)"
        } else {
            "Image is marked decorative"
        };
        return Some(Outcome::pass(message));
    }
    Some(
        Outcome::warn(format!(
            "Image is marked decorative but has accessible name: \"{}\"",
            s.name()
        ))
        .with_detail("Either remove the decorative marker or remove the name."),
    )
}

fn missing_alt(s: &Subject<'_>) -> Option<Outcome> {
    let guidance = if is_image_map(s) {
        "Image maps need alt text describing the map as a whole."
    } else {
        "Add an alt attribute: descriptive text, or alt=\"\" if the image is decorative."
    };
    let noun = if is_image_map(s) { "Image map" } else { "Image" };
    common::is_missing(s).then(|| {
        Outcome::fail(format!("{noun} is missing an accessible name")).with_detail(guidance)
    })
}

fn redundant_prefix(s: &Subject<'_>) -> Option<Outcome> {
    let lower = s.name().trim().to_lowercase();
    REDUNDANT_PREFIXES
        .iter()
        .find(|p| lower.starts_with(*p))
        .map(|p| {
            Outcome::warn(format!("Image alt text starts with redundant \"{p}\""))
                .with_detail("Screen readers already announce the element as an image.")
        })
}

fn long_alt(s: &Subject<'_>) -> Option<Outcome> {
    let len = s.name().chars().count();
    (s.resolution.source == NameSource::Alt && len > LONG_ALT_LIMIT).then(|| {
        Outcome::warn(format!("Image alt text is long ({len} characters)"))
            .with_detail("Move long descriptions into surrounding text or a linked description.")
    })
}

/// `usemap="#name"` that matches no `<map name>` in the document.
fn broken_usemap(s: &Subject<'_>) -> Option<Outcome> {
    let target = s.attr("usemap")?.trim().trim_start_matches('#');
    if target.is_empty() {
        return None;
    }
    let found = s
        .page
        .elements()
        .any(|el| el.value().name() == "map" && el.value().attr("name") == Some(target));
    (!found).then(|| Outcome::warn(format!("Image usemap references missing map \"{target}\"")))
}

// ── SVG ──

fn title_child(s: &Subject<'_>) -> Option<String> {
    dom::child_elements(s.element)
        .find(|c| c.value().name() == "title")
        .map(inspect::text_content)
}

fn markup_in_name(s: &Subject<'_>) -> Option<Outcome> {
    let name = s.name();
    (name.contains('<') && name.contains('>')).then(|| {
        Outcome::fail("SVG image accessible name contains markup")
            .with_detail("The name looks like HTML and is not reported.")
            .redacted()
    })
}

fn empty_title(s: &Subject<'_>) -> Option<Outcome> {
    let title = title_child(s)?;
    (title.is_empty() && !s.name().is_empty()).then(|| {
        Outcome::warn("SVG image has an empty <title> element")
            .with_detail("Remove the empty <title> or give it the same text as the name.")
    })
}

/// SVG names fall back to a `<title>` child when no other source applied.
pub fn svg_image(subject: &Subject<'_>) -> Outcome {
    let mut s = subject.clone();
    let mut from_title = None;
    if s.name().is_empty() && !s.notes().aria_label_is_empty {
        if let Some(title) = title_child(&s).filter(|t| !t.is_empty()) {
            s.resolution.name = title.clone();
            s.resolution.source = NameSource::Content;
            from_title = Some(title);
        }
    }

    let outcome = first_match(SVG_RULES, &s).unwrap_or_else(|| named_pass(&s).with_rule("pass"));
    match from_title {
        Some(title) if outcome.display_name.is_none() => outcome.with_display_name(title),
        _ => outcome,
    }
}

#[cfg(test)]
mod tests {
    use crate::evaluate::testing::eval;
    use crate::evaluate::Verdict;

    #[test]
    fn missing_alt_fails() {
        let e = eval(r#"<img src="x.png">"#, "img");
        assert_eq!(e.verdict, Verdict::Fail);
        assert!(e.description.contains("missing an accessible name"));
    }

    #[test]
    fn empty_alt_is_decorative_pass() {
        let e = eval(r#"<img src="x.png" alt="">"#, "img");
        assert_eq!(e.verdict, Verdict::Pass);
        assert!(e.description.contains("correctly has empty alt text"));
    }

    #[test]
    fn decorative_marker_with_name_warns() {
        let e = eval(r#"<img src="x.png" alt="Logo" aria-hidden="true">"#, "img");
        assert_eq!(e.verdict, Verdict::Warn);
        assert_eq!(e.rule, "decorative");

        let e = eval(r#"<img src="x.png" role="presentation">"#, "img");
        assert_eq!(e.verdict, Verdict::Pass);
    }

    #[test]
    fn filename_beats_generic() {
        let e = eval(r#"<img src="photo.jpg" alt="photo.jpg">"#, "img");
        assert_eq!(e.verdict, Verdict::Fail);
        assert_eq!(e.rule, "filename");
        assert!(e.description.contains("filename"));

        let e = eval(r#"<img src="x.png" alt="photo">"#, "img");
        assert_eq!(e.verdict, Verdict::Warn);
        assert_eq!(e.rule, "generic");
    }

    #[test]
    fn whitespace_alt_is_empty_name() {
        let e = eval(r#"<img src="x.png" alt="   ">"#, "img");
        assert_eq!(e.verdict, Verdict::Fail);
        assert_eq!(e.rule, "empty-name");
    }

    #[test]
    fn url_alt_fails() {
        let e = eval(r#"<img src="x.png" alt="https://cdn.example.com/x.png?v=2">"#, "img");
        assert_eq!(e.verdict, Verdict::Fail);
    }

    #[test]
    fn redundant_prefix_and_long_alt_warn() {
        let e = eval(r#"<img src="x.png" alt="Picture of a lighthouse">"#, "img");
        assert_eq!(e.rule, "redundant-prefix");

        let long = "a".repeat(151);
        let e = eval(&format!(r#"<img src="x.png" alt="{long}">"#), "img");
        assert_eq!(e.verdict, Verdict::Warn);
        assert_eq!(e.rule, "long-alt");
    }

    #[test]
    fn image_map_wording_and_missing_map() {
        let e = eval(r##"<img src="x.png" usemap="#nav">"##, "img");
        assert_eq!(e.verdict, Verdict::Fail);
        assert!(e.description.starts_with("Image map"));

        let e = eval(r##"<img src="x.png" alt="Site map" usemap="#nav">"##, "img");
        assert_eq!(e.rule, "broken-usemap");
        let e = eval(
            r##"<img src="x.png" alt="Site map" usemap="#nav"><map name="nav"></map>"##,
            "img",
        );
        assert_eq!(e.verdict, Verdict::Pass);
    }

    #[test]
    fn svg_takes_name_from_title_child() {
        let e = eval(r#"<svg role="img"><title>Sales chart</title></svg>"#, "svg");
        assert_eq!(e.verdict, Verdict::Pass);
        assert_eq!(e.display_name.as_deref(), Some("Sales chart"));
    }

    #[test]
    fn svg_markup_name_is_redacted() {
        let e = eval(r#"<svg role="img" aria-label="<b>chart</b>"></svg>"#, "svg");
        assert_eq!(e.verdict, Verdict::Fail);
        assert_eq!(e.name, "");
        assert_eq!(e.display_name.as_deref(), Some(""));
    }

    #[test]
    fn redacted_result_does_not_echo_markup() {
        let e = eval(
            r#"<svg role="img" aria-label="<script>alert(1)</script>"></svg>"#,
            "svg",
        );
        assert_eq!(e.rule, "markup-in-name");
        assert_eq!(e.name, "");
        assert!(!e.markup.contains("script"));
        assert!(e.markup.starts_with("<svg"));
    }

    #[test]
    fn svg_empty_title_with_other_name_warns() {
        let e = eval(r#"<svg role="img" aria-label="Chart"><title></title></svg>"#, "svg");
        assert_eq!(e.verdict, Verdict::Warn);
        assert_eq!(e.rule, "empty-title");
    }

    #[test]
    fn role_img_without_name_fails() {
        let e = eval(r#"<div role="img"></div>"#, "div");
        assert_eq!(e.verdict, Verdict::Fail);
        let e = eval(r#"<div role="img" aria-label="logo.png"></div>"#, "div");
        assert_eq!(e.verdict, Verdict::Warn);
    }
}
