//! Read-only queries over the host tree: visibility, text extraction and the
//! label relationships (`aria-labelledby`, `<label for>`, wrapping labels).

use scraper::{ElementRef, Node};
use serde::Serialize;

use crate::dom::{self, Page};

/// Subtrees whose text never reaches the accessibility tree.
const NON_RENDERED: &[&str] = &["script", "style", "template", "noscript"];

fn collect_text(element: ElementRef<'_>, skip: &dyn Fn(ElementRef<'_>) -> bool, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                if NON_RENDERED.contains(&el.name()) {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    if !skip(child_el) {
                        collect_text(child_el, skip, out);
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// textContent of the element, untouched.
pub fn raw_text_content(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &|_| false, &mut out);
    out
}

/// textContent with whitespace runs collapsed and ends trimmed.
pub fn text_content(element: ElementRef<'_>) -> String {
    collapse_whitespace(&raw_text_content(element))
}

/// Text of `element` with the `excluded` subtree cut out, so a control nested
/// in its own label does not echo its content into the label text.
pub fn text_content_excluding(element: ElementRef<'_>, excluded: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &|el| el == excluded, &mut out);
    collapse_whitespace(&out)
}

/// Text content with `aria-hidden` subtrees left out.
pub fn visible_text_content(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &is_aria_hidden, &mut out);
    collapse_whitespace(&out)
}

/// Whether the element is out of view.
///
/// Unions the host's computed style with a literal scan of the inline `style`
/// attribute and zero `width`/`height`. Hosts can report stale computed style
/// before a forced layout; the literal scan covers that window and is
/// redundant, not contradictory, when computed style is fresh.
pub fn is_hidden(page: &Page, element: ElementRef<'_>) -> bool {
    let visual = page.visual(element);
    if visual.display_none || visual.visibility_hidden || visual.opacity_zero {
        return true;
    }

    let el = element.value();
    if let Some(style) = el.attr("style") {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if compact.contains("display:none") || compact.contains("visibility:hidden") {
            return true;
        }
    }

    let zero = |attr: &str| {
        let from_attr = el.attr(attr).map(str::trim);
        let from_style = el
            .attr("style")
            .and_then(|s| dom::declaration(s, attr));
        from_attr == Some("0") || matches!(from_style.as_deref(), Some("0") | Some("0px"))
    };
    zero("width") && zero("height")
}

fn is_aria_hidden(element: ElementRef<'_>) -> bool {
    element
        .value()
        .attr("aria-hidden")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// True when the subtree has at least one `aria-hidden="true"` descendant and
/// no text outside those descendants.
pub fn has_aria_hidden_content(element: ElementRef<'_>) -> bool {
    if !dom::descendant_elements(element).any(is_aria_hidden) {
        return false;
    }
    let mut visible = String::new();
    collect_text(element, &is_aria_hidden, &mut visible);
    visible.trim().is_empty()
}

/// Result of following `aria-labelledby`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelledBy {
    /// Referenced texts joined with single spaces; empty when nothing resolved.
    pub name: String,
    /// Referenced ids with no element in the document, in attribute order.
    pub broken_ids: Vec<String>,
}

/// Follows `aria-labelledby`. `None` when the attribute is absent.
pub fn resolve_labelledby_ids(page: &Page, element: ElementRef<'_>) -> Option<LabelledBy> {
    let ids = element.value().attr("aria-labelledby")?;
    let mut parts = Vec::new();
    let mut broken_ids = Vec::new();

    for id in ids.split_whitespace() {
        match page.element_by_id(id) {
            Some(target) => {
                let text = text_content(target);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
            None => broken_ids.push(id.to_string()),
        }
    }

    Some(LabelledBy {
        name: parts.join(" "),
        broken_ids,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    /// `<label for="id">` elsewhere in the document.
    External,
    /// An ancestor `<label>` wrapping the control.
    Wrapped,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssociatedLabel {
    pub text: String,
    pub kind: LabelKind,
}

impl AssociatedLabel {
    fn none() -> Self {
        Self {
            text: String::new(),
            kind: LabelKind::None,
        }
    }
}

/// Finds the `<label>` naming a control: `label[for=id]` first, then a wrapping
/// label that does not point its `for` at some other element.
pub fn find_associated_label(page: &Page, element: ElementRef<'_>) -> AssociatedLabel {
    let id = element.value().id().filter(|id| !id.is_empty());

    if let Some(id) = id {
        for label in page.labels_for(id) {
            let text = text_content(label);
            if !text.is_empty() {
                return AssociatedLabel {
                    text,
                    kind: LabelKind::External,
                };
            }
        }
    }

    let wrapping = dom::ancestors(element).find(|a| a.value().name() == "label");
    if let Some(label) = wrapping {
        let points_elsewhere = match label.value().attr("for") {
            Some(target) => Some(target) != id,
            None => false,
        };
        if !points_elsewhere {
            let text = text_content_excluding(label, element);
            if !text.is_empty() {
                return AssociatedLabel {
                    text,
                    kind: LabelKind::Wrapped,
                };
            }
        }
    }

    AssociatedLabel::none()
}
