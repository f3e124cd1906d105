use std::collections::HashMap;
use std::fmt;

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::debug;

/// ARIA roles the evaluators reason about. Anything else is carried as the raw
/// `role` token on the result and never drives a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AriaRole {
    // Landmarks
    Banner,
    Navigation,
    Main,
    Complementary,
    ContentInfo,
    Search,
    Region,
    Form,

    // Widgets
    Button,
    Link,
    Checkbox,
    ComboBox,
    ListBox,
    Menu,
    MenuBar,
    MenuItem,
    MenuItemCheckbox,
    MenuItemRadio,
    Option,
    Radio,
    SearchBox,
    Slider,
    SpinButton,
    Switch,
    Tab,
    TabList,
    TextBox,
    Tree,
    TreeItem,
    Grid,
    Toolbar,

    // Structure
    Img,
    Dialog,
    AlertDialog,
    TabPanel,
    ProgressBar,
    Meter,
    Group,
    RadioGroup,
    Heading,
    ListItem,
    Presentation,
    None,
}

impl AriaRole {
    const ALL: &'static [AriaRole] = &[
        AriaRole::Banner,
        AriaRole::Navigation,
        AriaRole::Main,
        AriaRole::Complementary,
        AriaRole::ContentInfo,
        AriaRole::Search,
        AriaRole::Region,
        AriaRole::Form,
        AriaRole::Button,
        AriaRole::Link,
        AriaRole::Checkbox,
        AriaRole::ComboBox,
        AriaRole::ListBox,
        AriaRole::Menu,
        AriaRole::MenuBar,
        AriaRole::MenuItem,
        AriaRole::MenuItemCheckbox,
        AriaRole::MenuItemRadio,
        AriaRole::Option,
        AriaRole::Radio,
        AriaRole::SearchBox,
        AriaRole::Slider,
        AriaRole::SpinButton,
        AriaRole::Switch,
        AriaRole::Tab,
        AriaRole::TabList,
        AriaRole::TextBox,
        AriaRole::Tree,
        AriaRole::TreeItem,
        AriaRole::Grid,
        AriaRole::Toolbar,
        AriaRole::Img,
        AriaRole::Dialog,
        AriaRole::AlertDialog,
        AriaRole::TabPanel,
        AriaRole::ProgressBar,
        AriaRole::Meter,
        AriaRole::Group,
        AriaRole::RadioGroup,
        AriaRole::Heading,
        AriaRole::ListItem,
        AriaRole::Presentation,
        AriaRole::None,
    ];

    /// The ARIA token for this role, as written in a `role` attribute.
    pub fn token(self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::Navigation => "navigation",
            Self::Main => "main",
            Self::Complementary => "complementary",
            Self::ContentInfo => "contentinfo",
            Self::Search => "search",
            Self::Region => "region",
            Self::Form => "form",
            Self::Button => "button",
            Self::Link => "link",
            Self::Checkbox => "checkbox",
            Self::ComboBox => "combobox",
            Self::ListBox => "listbox",
            Self::Menu => "menu",
            Self::MenuBar => "menubar",
            Self::MenuItem => "menuitem",
            Self::MenuItemCheckbox => "menuitemcheckbox",
            Self::MenuItemRadio => "menuitemradio",
            Self::Option => "option",
            Self::Radio => "radio",
            Self::SearchBox => "searchbox",
            Self::Slider => "slider",
            Self::SpinButton => "spinbutton",
            Self::Switch => "switch",
            Self::Tab => "tab",
            Self::TabList => "tablist",
            Self::TextBox => "textbox",
            Self::Tree => "tree",
            Self::TreeItem => "treeitem",
            Self::Grid => "grid",
            Self::Toolbar => "toolbar",
            Self::Img => "img",
            Self::Dialog => "dialog",
            Self::AlertDialog => "alertdialog",
            Self::TabPanel => "tabpanel",
            Self::ProgressBar => "progressbar",
            Self::Meter => "meter",
            Self::Group => "group",
            Self::RadioGroup => "radiogroup",
            Self::Heading => "heading",
            Self::ListItem => "listitem",
            Self::Presentation => "presentation",
            Self::None => "none",
        }
    }

    pub fn parse(token: &str) -> Option<AriaRole> {
        Self::ALL.iter().copied().find(|r| r.token() == token)
    }

    pub fn is_landmark(self) -> bool {
        matches!(
            self,
            AriaRole::Banner
                | AriaRole::Navigation
                | AriaRole::Main
                | AriaRole::Complementary
                | AriaRole::ContentInfo
                | AriaRole::Search
                | AriaRole::Region
                | AriaRole::Form
        )
    }

    /// Composite and input widgets judged by the generic ARIA widget evaluator.
    pub fn is_widget(self) -> bool {
        matches!(
            self,
            AriaRole::Checkbox
                | AriaRole::ComboBox
                | AriaRole::ListBox
                | AriaRole::Menu
                | AriaRole::MenuBar
                | AriaRole::MenuItem
                | AriaRole::MenuItemCheckbox
                | AriaRole::MenuItemRadio
                | AriaRole::Option
                | AriaRole::Radio
                | AriaRole::SearchBox
                | AriaRole::Slider
                | AriaRole::SpinButton
                | AriaRole::Switch
                | AriaRole::Tab
                | AriaRole::TabList
                | AriaRole::TextBox
                | AriaRole::Tree
                | AriaRole::TreeItem
                | AriaRole::Grid
                | AriaRole::Toolbar
        )
    }

    /// Whether an element with this role is something a user operates.
    pub fn is_interactive(self) -> bool {
        self.is_widget() || matches!(self, AriaRole::Button | AriaRole::Link)
    }
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Lowercased local tag name.
pub fn tag(element: ElementRef<'_>) -> String {
    element.value().name().to_ascii_lowercase()
}

/// First token of the `role` attribute, lowercased. Empty roles count as absent.
pub fn explicit_role(element: ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attr("role")
        .and_then(|r| r.split_whitespace().next())
        .map(|r| r.to_ascii_lowercase())
}

/// The explicit role parsed into a known [`AriaRole`].
pub fn aria_role(element: ElementRef<'_>) -> Option<AriaRole> {
    explicit_role(element).and_then(|r| AriaRole::parse(&r))
}

/// `<input>` type, lowercased, defaulting to `text`.
pub fn input_type(element: ElementRef<'_>) -> String {
    element
        .value()
        .attr("type")
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "text".to_string())
}

pub fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

pub fn ancestors(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.ancestors().filter_map(ElementRef::wrap)
}

pub fn child_elements(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.children().filter_map(ElementRef::wrap)
}

/// Descendant elements in document order, excluding `element` itself.
pub fn descendant_elements(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// Computed visual properties the core needs from the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisualStyle {
    pub display_none: bool,
    pub visibility_hidden: bool,
    pub opacity_zero: bool,
}

/// Supplies computed visual properties for elements of a parsed document.
pub trait StyleSource {
    fn visual(&self, element: ElementRef<'_>) -> VisualStyle;
}

/// Style derived from inline `style` declarations and the `hidden` attribute.
///
/// `display:none` and `opacity:0` on any ancestor take the subtree out of view;
/// `visibility` inherits, so the nearest declaration wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct CascadedInlineStyle;

impl StyleSource for CascadedInlineStyle {
    fn visual(&self, element: ElementRef<'_>) -> VisualStyle {
        let mut style = VisualStyle::default();
        let mut visibility_decided = false;

        for node in std::iter::once(element).chain(ancestors(element)) {
            let el = node.value();
            let inline = el.attr("style").unwrap_or("");

            if el.attr("hidden").is_some()
                || declaration(inline, "display").as_deref() == Some("none")
            {
                style.display_none = true;
            }
            if declaration(inline, "opacity")
                .and_then(|o| o.trim_end_matches('%').parse::<f32>().ok())
                .is_some_and(|o| o <= 0.0)
            {
                style.opacity_zero = true;
            }
            if !visibility_decided {
                if let Some(v) = declaration(inline, "visibility") {
                    style.visibility_hidden = v == "hidden" || v == "collapse";
                    visibility_decided = true;
                }
            }
        }

        style
    }
}

/// Attribute the live-page host stamps on elements whose computed style hides them.
/// Its value names the property: `display`, `visibility` or `opacity`.
pub const RENDERED_HIDDEN_ATTR: &str = "data-accname-hidden";

/// Style snapshot taken by the browser after layout, unioned with the inline cascade.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderedStyle;

impl StyleSource for RenderedStyle {
    fn visual(&self, element: ElementRef<'_>) -> VisualStyle {
        let mut style = CascadedInlineStyle.visual(element);
        if element.value().attr(RENDERED_HIDDEN_ATTR) == Some("visibility") {
            style.visibility_hidden = true;
        }
        for node in std::iter::once(element).chain(ancestors(element)) {
            match node.value().attr(RENDERED_HIDDEN_ATTR) {
                Some("display") => style.display_none = true,
                Some("opacity") => style.opacity_zero = true,
                _ => {}
            }
        }
        style
    }
}

/// Last value of `property` in an inline style string, lowercased, without `!important`.
pub fn declaration(style: &str, property: &str) -> Option<String> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| {
            value
                .trim()
                .trim_end_matches("!important")
                .trim()
                .to_ascii_lowercase()
        })
        .last()
}

/// Produces the opaque locator string a result is labelled with.
pub trait Locator {
    fn locate(&self, page: &Page, element: ElementRef<'_>) -> String;
}

/// `#id` for uniquely identified elements, otherwise an `nth-of-type` chain
/// rooted at the nearest uniquely identified ancestor.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssPathLocator;

impl Locator for CssPathLocator {
    fn locate(&self, page: &Page, element: ElementRef<'_>) -> String {
        let mut parts = Vec::new();
        let mut current = Some(element);

        while let Some(el) = current {
            if let Some(id) = el.value().id() {
                if is_css_ident(id) && page.id_count(id) == 1 {
                    parts.push(format!("#{id}"));
                    break;
                }
            }
            let name = el.value().name();
            if name == "html" {
                parts.push("html".to_string());
                break;
            }
            let index = 1 + el
                .prev_siblings()
                .filter_map(ElementRef::wrap)
                .filter(|s| s.value().name() == name)
                .count();
            parts.push(format!("{name}:nth-of-type({index})"));
            current = parent_element(el);
        }

        parts.reverse();
        parts.join(" > ")
    }
}

fn is_css_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '-' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

const MARKUP_LIMIT: usize = 300;

/// Outer HTML of the element, truncated for display.
pub fn markup_snapshot(element: ElementRef<'_>) -> String {
    let html = element.html();
    if html.len() <= MARKUP_LIMIT {
        return html;
    }
    let mut end = MARKUP_LIMIT - 3;
    while !html.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &html[..end])
}

/// Attributes that carry a name and are blanked in a redacted snapshot.
const NAME_ATTRS: &[&str] = &["aria-label", "aria-labelledby", "alt", "title"];

/// Start tag only, with name-bearing attribute values emptied and the rest
/// escaped. Used where the name itself must not be echoed back.
pub fn redacted_snapshot(element: ElementRef<'_>) -> String {
    let el = element.value();
    let mut out = format!("<{}", el.name());
    for (name, value) in el.attrs() {
        let value = if NAME_ATTRS.contains(&name) {
            String::new()
        } else {
            escape_attr(value)
        };
        out.push_str(&format!(" {name}=\"{value}\""));
    }
    out.push('>');
    out
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A parsed document plus the host capabilities the core queries it through.
pub struct Page {
    document: Html,
    url: String,
    style: Box<dyn StyleSource>,
    /// Elements carrying each id, in document order.
    ids: HashMap<String, Vec<NodeId>>,
    /// `<label>` elements keyed by their `for` attribute, in document order.
    labels: HashMap<String, Vec<NodeId>>,
}

impl Page {
    pub fn parse(html: &str, url: &str) -> Self {
        debug!(html_len = html.len(), url = %url, "parsing document");
        let document = Html::parse_document(html);

        let mut ids: HashMap<String, Vec<NodeId>> = HashMap::new();
        let mut labels: HashMap<String, Vec<NodeId>> = HashMap::new();
        for el in document.root_element().descendants().filter_map(ElementRef::wrap) {
            let value = el.value();
            if let Some(id) = value.id().filter(|id| !id.is_empty()) {
                ids.entry(id.to_string()).or_default().push(el.id());
            }
            if value.name() == "label" {
                if let Some(target) = value.attr("for") {
                    labels.entry(target.to_string()).or_default().push(el.id());
                }
            }
        }

        Self {
            document,
            url: url.to_string(),
            style: Box::new(CascadedInlineStyle),
            ids,
            labels,
        }
    }

    pub fn with_style(mut self, style: impl StyleSource + 'static) -> Self {
        self.style = Box::new(style);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Every element in document order, root included.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    }

    fn element(&self, node: NodeId) -> Option<ElementRef<'_>> {
        self.document.tree.get(node).and_then(ElementRef::wrap)
    }

    /// First element in document order with this id.
    pub fn element_by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        let first = *self.ids.get(id)?.first()?;
        self.element(first)
    }

    pub fn id_count(&self, id: &str) -> usize {
        self.ids.get(id).map_or(0, Vec::len)
    }

    /// Elements matching a CSS selector. An unparsable selector matches nothing.
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.document.select(&selector).collect(),
            Err(e) => {
                debug!(selector = %css, error = %e, "unparsable selector");
                Vec::new()
            }
        }
    }

    /// `<label>` elements whose `for` attribute names `id`.
    pub fn labels_for(&self, id: &str) -> Vec<ElementRef<'_>> {
        self.labels
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|node| self.element(*node))
            .collect()
    }

    pub fn visual(&self, element: ElementRef<'_>) -> VisualStyle {
        self.style.visual(element)
    }
}
