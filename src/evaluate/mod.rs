//! Per-category evaluation of an element's accessible name.
//!
//! Each category is an ordered table of [`Rule`]s. The first rule that fires
//! decides the outcome; when none fires the category's pass outcome applies.
//! Failures on elements that are out of view are then downgraded to warnings.

mod common;
mod control;
mod form;
mod image;
pub(crate) mod landmark;
mod media;
mod tabindex;
mod widget;

use scraper::ElementRef;
use serde::Serialize;

use crate::dom::{self, AriaRole, CssPathLocator, Locator, Page};
use crate::inspect;
use crate::name::{self, Annotations, Resolution};

pub use common::{HIDDEN_DETAIL, HIDDEN_SUFFIX};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Warn => write!(f, "WARN"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// The evaluator an element is judged by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Image,
    SvgImage,
    RoleImg,
    FormControl,
    Radio,
    Select,
    Fieldset,
    Button,
    Link,
    Landmark,
    AriaWidget,
    Dialog,
    TabPanel,
    ProgressMeter,
    Media,
    Frame,
    TabindexOnly,
}

impl Category {
    /// Scan order of a full run.
    pub const ALL: [Category; 17] = [
        Category::Image,
        Category::SvgImage,
        Category::RoleImg,
        Category::FormControl,
        Category::Radio,
        Category::Select,
        Category::Fieldset,
        Category::Button,
        Category::Link,
        Category::Landmark,
        Category::AriaWidget,
        Category::Dialog,
        Category::TabPanel,
        Category::ProgressMeter,
        Category::Media,
        Category::Frame,
        Category::TabindexOnly,
    ];

    /// Candidate selector; [`categorize`] has the final say.
    pub fn selector(self) -> &'static str {
        match self {
            Category::Image => "img, input",
            Category::SvgImage => "svg",
            Category::RoleImg => "[role]",
            Category::FormControl => "input, textarea",
            Category::Radio => "input",
            Category::Select => "select",
            Category::Fieldset => "fieldset, [role]",
            Category::Button => "button, input, [role]",
            Category::Link => "a[href], area[href], [role]",
            Category::Landmark => "header, footer, main, nav, aside, search, [role]",
            Category::AriaWidget => "[role]",
            Category::Dialog => "dialog, [role]",
            Category::TabPanel => "[role]",
            Category::ProgressMeter => "progress, meter, [role]",
            Category::Media => "video, audio",
            Category::Frame => "iframe",
            Category::TabindexOnly => "[tabindex]",
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            Category::Image => "Image",
            Category::SvgImage => "SVG image",
            Category::RoleImg => "Element with role=img",
            Category::FormControl => "Form control",
            Category::Radio => "Radio button",
            Category::Select => "Select",
            Category::Fieldset => "Group",
            Category::Button => "Button",
            Category::Link => "Link",
            Category::Landmark => "Landmark",
            Category::AriaWidget => "Widget",
            Category::Dialog => "Dialog",
            Category::TabPanel => "Tab panel",
            Category::ProgressMeter => "Progress indicator",
            Category::Media => "Media element",
            Category::Frame => "Frame",
            Category::TabindexOnly => "Focusable element",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default();
        f.write_str(&token)
    }
}

/// Picks the evaluator for an element. Native form controls and images keep
/// their own category; otherwise an explicit role wins over the tag.
pub fn categorize(element: ElementRef<'_>) -> Option<Category> {
    let tag = dom::tag(element);
    let role = dom::aria_role(element);

    match tag.as_str() {
        "input" => {
            return match dom::input_type(element).as_str() {
                "hidden" => None,
                "radio" => Some(Category::Radio),
                "button" | "submit" | "reset" => Some(Category::Button),
                "image" => Some(Category::Image),
                _ => Some(Category::FormControl),
            }
        }
        "textarea" => return Some(Category::FormControl),
        "select" => return Some(Category::Select),
        "img" => return Some(Category::Image),
        "svg" => {
            return if role == Some(AriaRole::Img) {
                Some(Category::SvgImage)
            } else if element.value().attr("tabindex").is_some() {
                Some(Category::TabindexOnly)
            } else {
                None
            }
        }
        _ => {}
    }

    if let Some(role) = role {
        let by_role = match role {
            AriaRole::Img => Some(Category::RoleImg),
            AriaRole::Button => Some(Category::Button),
            AriaRole::Link => Some(Category::Link),
            AriaRole::Dialog | AriaRole::AlertDialog => Some(Category::Dialog),
            AriaRole::TabPanel => Some(Category::TabPanel),
            AriaRole::ProgressBar | AriaRole::Meter => Some(Category::ProgressMeter),
            AriaRole::Group | AriaRole::RadioGroup => Some(Category::Fieldset),
            r if r.is_landmark() => Some(Category::Landmark),
            r if r.is_widget() => Some(Category::AriaWidget),
            _ => None,
        };
        if by_role.is_some() {
            return by_role;
        }
    }

    let el = element.value();
    match tag.as_str() {
        "fieldset" => Some(Category::Fieldset),
        "button" => Some(Category::Button),
        "a" | "area" if el.attr("href").is_some() => Some(Category::Link),
        "dialog" => Some(Category::Dialog),
        "progress" | "meter" => Some(Category::ProgressMeter),
        "video" | "audio" => Some(Category::Media),
        "iframe" => Some(Category::Frame),
        _ if landmark::landmark_role(element).is_some() => Some(Category::Landmark),
        _ if el.attr("tabindex").is_some() => Some(Category::TabindexOnly),
        _ => None,
    }
}

/// Everything an evaluator looks at for one element.
#[derive(Clone)]
pub struct Subject<'a> {
    pub page: &'a Page,
    pub element: ElementRef<'a>,
    pub category: Category,
    pub tag: String,
    pub role: Option<String>,
    pub resolution: Resolution,
    pub visible: bool,
}

impl<'a> Subject<'a> {
    pub fn new(page: &'a Page, element: ElementRef<'a>, category: Category) -> Self {
        Self {
            page,
            element,
            category,
            tag: dom::tag(element),
            role: dom::explicit_role(element),
            resolution: name::resolve_accessible_name(page, element),
            visible: !inspect::is_hidden(page, element),
        }
    }

    pub fn name(&self) -> &str {
        &self.resolution.name
    }

    pub fn notes(&self) -> &Annotations {
        &self.resolution.annotations
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    pub fn role_is(&self, token: &str) -> bool {
        self.role.as_deref() == Some(token)
    }

    /// How descriptions refer to this element.
    pub fn noun(&self) -> String {
        match (self.category, self.role.as_deref()) {
            (Category::AriaWidget, Some(role)) => format!("Element with role={role}"),
            (Category::Landmark, _) => match landmark::landmark_role(self.element) {
                Some(role) => format!("{} landmark", capitalize(role.token())),
                None => "Landmark".to_string(),
            },
            (category, _) => category.noun().to_string(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// What a rule decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub rule: &'static str,
    pub verdict: Verdict,
    pub description: String,
    pub detail: Option<String>,
    pub display_name: Option<String>,
    /// The resolved name must not be echoed back in the result.
    pub redacted: bool,
}

impl Outcome {
    fn new(verdict: Verdict, description: impl Into<String>) -> Self {
        Self {
            rule: "",
            verdict,
            description: description.into(),
            detail: None,
            display_name: None,
            redacted: false,
        }
    }

    pub fn pass(description: impl Into<String>) -> Self {
        Self::new(Verdict::Pass, description)
    }

    pub fn warn(description: impl Into<String>) -> Self {
        Self::new(Verdict::Warn, description)
    }

    pub fn fail(description: impl Into<String>) -> Self {
        Self::new(Verdict::Fail, description)
    }

    pub fn with_verdict(verdict: Verdict, description: impl Into<String>) -> Self {
        Self::new(verdict, description)
    }

    pub fn with_rule(mut self, rule: &'static str) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Clears the reported name entirely.
    pub fn redacted(mut self) -> Self {
        self.display_name = Some(String::new());
        self.redacted = true;
        self
    }
}

pub type Check = fn(&Subject<'_>) -> Option<Outcome>;

/// One entry of an evaluator's decision table.
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub check: Check,
}

pub const fn rule(id: &'static str, check: Check) -> Rule {
    Rule { id, check }
}

/// First matching rule of `rules`, stamped with its id.
pub fn first_match(rules: &[Rule], subject: &Subject<'_>) -> Option<Outcome> {
    rules
        .iter()
        .find_map(|r| (r.check)(subject).map(|o| o.with_rule(r.id)))
}

/// An ordered rule table plus the outcome when nothing fires.
pub struct Evaluator {
    pub rules: &'static [Rule],
    pub pass: fn(&Subject<'_>) -> Outcome,
}

impl Evaluator {
    pub fn apply(&self, subject: &Subject<'_>) -> Outcome {
        first_match(self.rules, subject)
            .unwrap_or_else(|| (self.pass)(subject).with_rule("pass"))
    }
}

/// Turns a Fail on an element that is out of view into a Warn. Pass and Warn
/// are returned untouched.
pub fn downgrade_if_hidden(outcome: Outcome, visible: bool) -> Outcome {
    if visible || outcome.verdict != Verdict::Fail {
        return outcome;
    }
    Outcome {
        verdict: Verdict::Warn,
        description: format!("{}{}", outcome.description, HIDDEN_SUFFIX),
        detail: Some(HIDDEN_DETAIL.to_string()),
        ..outcome
    }
}

/// One evaluated element, as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub category: Category,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub css_selector: String,
    pub markup: String,
    pub name: String,
    pub visible: bool,
    pub verdict: Verdict,
    pub rule: &'static str,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Evaluation {
    fn new(subject: &Subject<'_>, outcome: Outcome, locator: &dyn Locator) -> Self {
        let (name, markup) = if outcome.redacted {
            (String::new(), dom::redacted_snapshot(subject.element))
        } else {
            (subject.name().to_string(), dom::markup_snapshot(subject.element))
        };
        Self {
            category: subject.category,
            tag: subject.tag.clone(),
            role: subject.role.clone(),
            css_selector: locator.locate(subject.page, subject.element),
            markup,
            name,
            visible: subject.visible,
            verdict: outcome.verdict,
            rule: outcome.rule,
            description: outcome.description,
            detail: outcome.detail,
            display_name: outcome.display_name,
        }
    }

    /// The name a report should show.
    pub fn shown_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// Judges one element with the default locator. `None` when the element
/// belongs to no category or is a focusable element that needs no name.
pub fn evaluate(page: &Page, element: ElementRef<'_>) -> Option<Evaluation> {
    evaluate_with(page, element, &CssPathLocator)
}

pub fn evaluate_with(
    page: &Page,
    element: ElementRef<'_>,
    locator: &dyn Locator,
) -> Option<Evaluation> {
    let category = categorize(element)?;
    evaluate_as(page, element, category, locator)
}

pub(crate) fn evaluate_as(
    page: &Page,
    element: ElementRef<'_>,
    category: Category,
    locator: &dyn Locator,
) -> Option<Evaluation> {
    let subject = Subject::new(page, element, category);
    if category == Category::TabindexOnly && tabindex::skipped(&subject) {
        return None;
    }

    let outcome = match category {
        Category::Image => image::IMAGE.apply(&subject),
        Category::SvgImage => image::svg_image(&subject),
        Category::RoleImg => image::ROLE_IMG.apply(&subject),
        Category::FormControl => form::FORM_CONTROL.apply(&subject),
        Category::Radio => form::radio(&subject),
        Category::Select => form::select(&subject),
        Category::Fieldset => form::FIELDSET.apply(&subject),
        Category::Button => control::BUTTON.apply(&subject),
        Category::Link => control::LINK.apply(&subject),
        Category::Landmark => landmark::LANDMARK.apply(&subject),
        Category::AriaWidget => widget::ARIA_WIDGET.apply(&subject),
        Category::Dialog => widget::DIALOG.apply(&subject),
        Category::TabPanel => widget::TAB_PANEL.apply(&subject),
        Category::ProgressMeter => media::progress_meter(&subject),
        Category::Media => media::MEDIA.apply(&subject),
        Category::Frame => media::FRAME.apply(&subject),
        Category::TabindexOnly => tabindex::TABINDEX_ONLY.apply(&subject),
    };

    let outcome = downgrade_if_hidden(outcome, subject.visible);
    Some(Evaluation::new(&subject, outcome, locator))
}
