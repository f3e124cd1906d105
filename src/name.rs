//! Accessible name resolution.
//!
//! A prioritized walk over the naming sources an element can have, stopping at
//! the first one that produces a name. Diagnostic facts observed along the way
//! (broken `aria-labelledby` ids, which source won) come back as part of the
//! [`Resolution`] value rather than being stored on the tree, so resolving the
//! same element twice always gives the same answer.

use scraper::ElementRef;
use serde::Serialize;
use tracing::trace;

use crate::dom::{self, Page};
use crate::inspect::{self, LabelKind};

/// Where the resolved name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    Legend,
    LabelledBy,
    AriaLabel,
    Label(LabelKind),
    Alt,
    Value,
    FrameTitle,
    Title,
    /// `alt` of an image inside a link.
    ImageAlt,
    Content,
    None,
}

/// Side facts recorded while resolving one element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Annotations {
    /// `aria-labelledby` ids that matched nothing, in attribute order.
    pub broken_reference_ids: Vec<String>,
    pub name_source_is_title_only: bool,
    /// `Some(true)` for a wrapping label, `Some(false)` for `label[for]`,
    /// `None` when no label was used.
    pub name_source_is_wrapping_label: Option<bool>,
    pub aria_label_is_empty: bool,
    pub aria_label_is_punctuation_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub name: String,
    pub source: NameSource,
    pub annotations: Annotations,
}

impl Resolution {
    fn new(name: impl Into<String>, source: NameSource, annotations: Annotations) -> Self {
        Self {
            name: name.into(),
            source,
            annotations,
        }
    }
}

/// Tags that take their name from a `<label>`.
const LABELABLE: &[&str] = &["input", "select", "textarea", "progress", "meter"];

const TEXT_NAMED_TAGS: &[&str] = &[
    "button", "a", "h1", "h2", "h3", "h4", "h5", "h6", "li", "dt", "dd", "figure", "figcaption",
];

const TEXT_NAMED_ROLES: &[&str] = &["button", "link", "heading", "listitem"];

const CONTENT_NAMED_WIDGET_ROLES: &[&str] = &[
    "checkbox",
    "menuitem",
    "menuitemcheckbox",
    "menuitemradio",
    "option",
    "radio",
    "tab",
    "treeitem",
];

/// Whether the element's role lets it take its name from its own text.
pub fn names_from_content(element: ElementRef<'_>) -> bool {
    let tag = dom::tag(element);
    let role = dom::explicit_role(element);
    TEXT_NAMED_TAGS.contains(&tag.as_str())
        || role.as_deref().is_some_and(|r| {
            TEXT_NAMED_ROLES.contains(&r) || CONTENT_NAMED_WIDGET_ROLES.contains(&r)
        })
}

/// Computes the accessible name of `element`.
pub fn resolve_accessible_name(page: &Page, element: ElementRef<'_>) -> Resolution {
    let resolution = resolve(page, element);
    trace!(
        tag = %element.value().name(),
        name = %resolution.name,
        source = ?resolution.source,
        "resolved accessible name"
    );
    resolution
}

fn resolve(page: &Page, element: ElementRef<'_>) -> Resolution {
    let el = element.value();
    let tag = dom::tag(element);
    let role = dom::explicit_role(element);
    let mut notes = Annotations::default();

    // 1. A fieldset's leading legend beats every ARIA source.
    if tag == "fieldset" {
        if let Some(legend) = dom::child_elements(element).next() {
            if legend.value().name() == "legend" {
                let text = inspect::text_content(legend);
                if !text.is_empty() {
                    return Resolution::new(text, NameSource::Legend, notes);
                }
            }
        }
    }

    // 2. aria-labelledby
    if let Some(labelled) = inspect::resolve_labelledby_ids(page, element) {
        notes.broken_reference_ids = labelled.broken_ids;
        if !labelled.name.is_empty() {
            return Resolution::new(labelled.name, NameSource::LabelledBy, notes);
        }
    }

    // 3. aria-label; a blank one blocks every later source.
    if let Some(label) = el.attr("aria-label") {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            notes.aria_label_is_empty = true;
            return Resolution::new(String::new(), NameSource::None, notes);
        }
        notes.aria_label_is_punctuation_only = crate::text::is_punctuation_only(trimmed);
        return Resolution::new(trimmed, NameSource::AriaLabel, notes);
    }

    // 4. <label for> / wrapping <label>
    if LABELABLE.contains(&tag.as_str()) {
        let label = inspect::find_associated_label(page, element);
        if label.kind != LabelKind::None {
            notes.name_source_is_wrapping_label = Some(label.kind == LabelKind::Wrapped);
            return Resolution::new(label.text, NameSource::Label(label.kind), notes);
        }
    }

    // 5. alt, verbatim: an empty alt is the decorative signal.
    let is_image_input = tag == "input" && dom::input_type(element) == "image";
    if matches!(tag.as_str(), "img" | "area") || is_image_input {
        if let Some(alt) = el.attr("alt") {
            return Resolution::new(alt, NameSource::Alt, notes);
        }
    }

    // 6. value of button-like inputs
    if tag == "input" && matches!(dom::input_type(element).as_str(), "button" | "submit" | "reset")
    {
        if let Some(value) = el.attr("value").filter(|v| !v.is_empty()) {
            return Resolution::new(value, NameSource::Value, notes);
        }
    }

    let title = el.attr("title").map(str::trim).filter(|t| !t.is_empty());

    // 7. iframe title
    if tag == "iframe" {
        if let Some(title) = title {
            return Resolution::new(title, NameSource::FrameTitle, notes);
        }
    }

    // 8. any other title
    if let Some(title) = title {
        notes.name_source_is_title_only = true;
        return Resolution::new(title, NameSource::Title, notes);
    }

    // 9. text content of text-bearing elements; links prefer a contained image's alt.
    let role_str = role.as_deref().unwrap_or("");
    if TEXT_NAMED_TAGS.contains(&tag.as_str()) || TEXT_NAMED_ROLES.contains(&role_str) {
        if tag == "a" {
            let image_alt = dom::descendant_elements(element)
                .filter(|d| d.value().name() == "img")
                .filter_map(|img| img.value().attr("alt"))
                .map(str::trim)
                .find(|alt| !alt.is_empty());
            if let Some(alt) = image_alt {
                return Resolution::new(alt, NameSource::ImageAlt, notes);
            }
        }
        let text = inspect::text_content(element);
        if !text.is_empty() {
            return Resolution::new(text, NameSource::Content, notes);
        }
    }

    // 10. widget roles named from content
    if CONTENT_NAMED_WIDGET_ROLES.contains(&role_str) {
        let text = inspect::text_content(element);
        if !text.is_empty() {
            return Resolution::new(text, NameSource::Content, notes);
        }
    }

    // 11.
    Resolution::new(String::new(), NameSource::None, notes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_first(html: &str, css: &str) -> Resolution {
        let page = Page::parse(html, "");
        let el = page.select(css).into_iter().next().expect("element present");
        resolve_accessible_name(&page, el)
    }

    #[test]
    fn labelledby_beats_aria_label() {
        let r = resolve_first(
            r#"<span id=b>B</span><button aria-label="A" aria-labelledby="b">x</button>"#,
            "button",
        );
        assert_eq!(r.name, "B");
        assert_eq!(r.source, NameSource::LabelledBy);
    }

    #[test]
    fn broken_labelledby_falls_through_and_is_recorded() {
        let r = resolve_first(
            r#"<button aria-label="A" aria-labelledby="nope gone">x</button>"#,
            "button",
        );
        assert_eq!(r.name, "A");
        assert_eq!(r.annotations.broken_reference_ids, vec!["nope", "gone"]);
    }

    #[test]
    fn fieldset_legend_beats_aria_label() {
        let r = resolve_first(
            r#"<fieldset aria-label="Pay"><legend>Payment</legend><input></fieldset>"#,
            "fieldset",
        );
        assert_eq!(r.name, "Payment");
        assert_eq!(r.source, NameSource::Legend);
    }

    #[test]
    fn legend_not_first_is_ignored() {
        let r = resolve_first(
            r#"<fieldset><input><legend>Late</legend></fieldset>"#,
            "fieldset",
        );
        assert_eq!(r.name, "");
        assert_eq!(r.source, NameSource::None);
    }

    #[test]
    fn blank_aria_label_blocks_content() {
        let r = resolve_first(r#"<button aria-label="   ">Save</button>"#, "button");
        assert_eq!(r.name, "");
        assert!(r.annotations.aria_label_is_empty);
    }

    #[test]
    fn punctuation_aria_label_is_kept_and_flagged() {
        let r = resolve_first(r#"<button aria-label=" ... ">Save</button>"#, "button");
        assert_eq!(r.name, "...");
        assert!(r.annotations.aria_label_is_punctuation_only);
    }

    #[test]
    fn explicit_label_records_kind() {
        let r = resolve_first(r#"<label for=n>Name</label><input id=n>"#, "input");
        assert_eq!(r.name, "Name");
        assert_eq!(r.annotations.name_source_is_wrapping_label, Some(false));

        let r = resolve_first(r#"<label>Name <input></label>"#, "input");
        assert_eq!(r.name, "Name");
        assert_eq!(r.annotations.name_source_is_wrapping_label, Some(true));
    }

    #[test]
    fn empty_alt_is_returned_verbatim() {
        let r = resolve_first(r#"<img src="x.png" alt="" title="Tooltip">"#, "img");
        assert_eq!(r.name, "");
        assert_eq!(r.source, NameSource::Alt);
    }

    #[test]
    fn missing_alt_falls_to_title() {
        let r = resolve_first(r#"<img src="x.png" title="Chart">"#, "img");
        assert_eq!(r.name, "Chart");
        assert!(r.annotations.name_source_is_title_only);
    }

    #[test]
    fn input_button_value() {
        let r = resolve_first(r#"<input type="submit" value="Send">"#, "input");
        assert_eq!(r.name, "Send");
        assert_eq!(r.source, NameSource::Value);
    }

    #[test]
    fn iframe_title_is_not_title_only() {
        let r = resolve_first(r#"<iframe title="Map" src="m.html"></iframe>"#, "iframe");
        assert_eq!(r.name, "Map");
        assert!(!r.annotations.name_source_is_title_only);
    }

    #[test]
    fn link_prefers_image_alt() {
        let r = resolve_first(
            r#"<a href="/"><img src="logo.png" alt="Home"> Acme</a>"#,
            "a",
        );
        assert_eq!(r.name, "Home");
        assert_eq!(r.source, NameSource::ImageAlt);
    }

    #[test]
    fn widget_roles_use_content() {
        let r = resolve_first(r#"<div role="tab">Overview</div>"#, "div");
        assert_eq!(r.name, "Overview");
        assert_eq!(r.source, NameSource::Content);
    }

    #[test]
    fn plain_div_has_no_name() {
        let r = resolve_first(r#"<div tabindex="0">Text</div>"#, "div");
        assert_eq!(r.name, "");
        assert_eq!(r.source, NameSource::None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let page = Page::parse(
            r#"<button aria-labelledby="missing" title="Hint">Go</button>"#,
            "",
        );
        let el = page.select("button")[0];
        assert_eq!(
            resolve_accessible_name(&page, el),
            resolve_accessible_name(&page, el)
        );
    }
}
