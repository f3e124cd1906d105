//! Progress indicators, audio/video and embedded frames.

use super::common::{self, named_pass};
use super::{rule, Evaluator, Outcome, Subject, Verdict};
use crate::dom;

const GENERIC_FRAME_TITLES: &[&str] = &["iframe", "frame", "untitled", "content"];

static PROGRESS_METER: Evaluator = Evaluator {
    rules: &[
        rule("broken-reference", common::broken_reference),
        rule("missing-name", common::missing_name),
        rule("empty-name", common::empty_name),
        rule("punctuation-only", common::punctuation_only),
        rule("implicit-label", common::implicit_label),
        rule("title-only", common::title_only),
    ],
    pass: named_pass,
};

pub static MEDIA: Evaluator = Evaluator {
    rules: &[
        rule("broken-reference", common::broken_reference),
        rule("missing-name", |s| {
            common::missing_name_with(
                s,
                Verdict::Warn,
                "Add aria-label or aria-labelledby so the player can be identified.",
            )
        }),
        rule("empty-name", common::empty_name),
        rule("no-captions", no_captions),
        rule("autoplay-unmuted", autoplay_unmuted),
    ],
    pass: named_pass,
};

pub static FRAME: Evaluator = Evaluator {
    rules: &[
        rule("broken-reference", common::broken_reference),
        rule("missing-name", common::missing_name),
        rule("empty-name", common::empty_name),
        rule("punctuation-only", common::punctuation_only),
        rule("generic", generic_frame_title),
    ],
    pass: named_pass,
};

// ── Progress / meter ──

fn number(s: &Subject<'_>, attr: &str) -> Option<f64> {
    s.attr(attr)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Human summary of the current value, e.g. `value 30 in 0–100 (30%)`.
pub fn value_summary(s: &Subject<'_>) -> String {
    let native = matches!(s.tag.as_str(), "progress" | "meter") && s.role.is_none();
    let (now, min, max) = if native {
        let min = if s.tag == "meter" { number(s, "min").unwrap_or(0.0) } else { 0.0 };
        (number(s, "value"), min, number(s, "max").unwrap_or(1.0))
    } else {
        (
            number(s, "aria-valuenow"),
            number(s, "aria-valuemin").unwrap_or(0.0),
            number(s, "aria-valuemax").unwrap_or(100.0),
        )
    };

    let Some(now) = now else {
        return "indeterminate".to_string();
    };
    let range = format!("value {} in {}–{}", format_number(now), format_number(min), format_number(max));
    if max > min {
        let percent = ((now - min) / (max - min) * 100.0).round();
        format!("{range} ({}%)", format_number(percent))
    } else {
        range
    }
}

/// Progress outcomes always carry the value summary in their detail.
pub fn progress_meter(s: &Subject<'_>) -> Outcome {
    let outcome = PROGRESS_METER.apply(s);
    let summary = value_summary(s);
    let detail = match outcome.detail {
        Some(ref d) => format!("{d} Current {summary}."),
        None => format!("Current {summary}."),
    };
    Outcome {
        detail: Some(detail),
        ..outcome
    }
}

// ── Audio / video ──

fn no_captions(s: &Subject<'_>) -> Option<Outcome> {
    if s.tag != "video" {
        return None;
    }
    let captioned = dom::child_elements(s.element).any(|c| {
        c.value().name() == "track"
            && c.value()
                .attr("kind")
                .map(|k| k.trim().to_ascii_lowercase())
                .is_some_and(|k| k == "captions" || k == "subtitles")
    });
    (!captioned).then(|| {
        Outcome::warn("Video has no captions track")
            .with_detail("Add <track kind=\"captions\"> so the audio content is available as text.")
    })
}

fn autoplay_unmuted(s: &Subject<'_>) -> Option<Outcome> {
    (s.attr("autoplay").is_some() && s.attr("muted").is_none()).then(|| {
        Outcome::warn(format!("{} plays automatically with sound", s.noun()))
            .with_detail("Autoplaying audio interferes with screen readers. Add muted or remove autoplay.")
    })
}

// ── Frames ──

fn generic_frame_title(s: &Subject<'_>) -> Option<Outcome> {
    let lower = s.name().trim().to_lowercase();
    GENERIC_FRAME_TITLES.contains(&lower.as_str()).then(|| {
        Outcome::warn(format!("Frame has a generic title: \"{}\"", s.name()))
            .with_detail("Describe the frame's content, e.g. \"Store location map\".")
    })
}

#[cfg(test)]
mod tests {
    use crate::evaluate::testing::eval;
    use crate::evaluate::Verdict;

    #[test]
    fn progress_detail_carries_percentage() {
        let e = eval(
            r#"<label for=p>Upload</label><progress id=p value="0.3"></progress>"#,
            "progress",
        );
        assert_eq!(e.verdict, Verdict::Pass);
        assert_eq!(e.detail.as_deref(), Some("Current value 0.3 in 0–1 (30%)."));
    }

    #[test]
    fn aria_progressbar_defaults_to_hundred() {
        let e = eval(
            r#"<div role="progressbar" aria-label="Loading" aria-valuenow="30"></div>"#,
            "div",
        );
        assert!(e.detail.unwrap().contains("value 30 in 0–100 (30%)"));

        let e = eval(r#"<div role="progressbar" aria-label="Loading"></div>"#, "div");
        assert!(e.detail.unwrap().contains("indeterminate"));
    }

    #[test]
    fn meter_without_name_fails_with_summary() {
        let e = eval(r#"<meter min="10" max="20" value="15"></meter>"#, "meter");
        assert_eq!(e.verdict, Verdict::Fail);
        assert!(e.detail.unwrap().ends_with("Current value 15 in 10–20 (50%)."));
    }

    #[test]
    fn media_checks() {
        let e = eval(r#"<video src="a.mp4"></video>"#, "video");
        assert_eq!(e.verdict, Verdict::Warn);
        assert_eq!(e.rule, "missing-name");

        let e = eval(r#"<video src="a.mp4" aria-label="Intro"></video>"#, "video");
        assert_eq!(e.rule, "no-captions");

        let e = eval(
            r#"<video src="a.mp4" aria-label="Intro" autoplay><track kind="captions" src="c.vtt"></video>"#,
            "video",
        );
        assert_eq!(e.rule, "autoplay-unmuted");

        let e = eval(
            r#"<video src="a.mp4" aria-label="Intro" autoplay muted><track kind="subtitles" src="c.vtt"></video>"#,
            "video",
        );
        assert_eq!(e.verdict, Verdict::Pass);
    }

    #[test]
    fn frame_checks() {
        let e = eval(r#"<iframe src="map.html"></iframe>"#, "iframe");
        assert_eq!(e.verdict, Verdict::Fail);
        let e = eval(r#"<iframe src="map.html" title="Untitled"></iframe>"#, "iframe");
        assert_eq!(e.verdict, Verdict::Warn);
        let e = eval(r#"<iframe src="map.html" title="Store locations"></iframe>"#, "iframe");
        assert_eq!(e.verdict, Verdict::Pass);
    }
}
