//! String classifiers used to judge the quality of a computed accessible name.
//!
//! Every predicate here is pure. Callers decide what a match means for the
//! verdict. Each calling context has its own word list: "button" is a lazy
//! image description but fine on a control.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use crate::dom;
use crate::name::NameSource;

const PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '-', '–', '—', '_', '/', '\\', '|', '(', ')', '[', ']', '{',
    '}', '\'', '"', '`', '~', '@', '#', '$', '%', '^', '&', '*', '+', '=', '<', '>', '…', '•',
    '·', '«', '»', '‹', '›',
];

const FILE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "svg", "webp", "bmp", "tif", "tiff", "ico", "avif", "heic", "pdf",
    "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "csv", "zip", "mp3", "mp4", "wav",
    "ogg", "webm", "mov", "avi",
];

const GENERIC_LABELS: &[&str] = &[
    "label",
    "field",
    "input",
    "text",
    "textbox",
    "textarea",
    "form field",
    "form input",
    "name",
    "enter text",
    "enter input",
    "image",
    "button",
    "submit",
    "icon",
    "picture",
    "photo",
    "graphic",
];

const GENERIC_TEXT: &[&str] = &[
    "click",
    "click here",
    "click me",
    "submit",
    "go",
    "next",
    "previous",
    "prev",
    "back",
    "ok",
    "okay",
    "continue",
    "more",
    "press",
    "press here",
    "tap",
    "tap here",
    "here",
    "this",
    "link",
];

const GENERIC_LINK_TEXT: &[&str] = &[
    "click",
    "click here",
    "here",
    "more",
    "read more",
    "learn more",
    "more info",
    "more information",
    "info",
    "link",
    "this",
    "this link",
    "go",
    "continue",
    "details",
    "see more",
    "view more",
    "see details",
    "view",
    "page",
    "website",
    "download",
];

const ICON_GLYPHS: &[char] = &[
    '×', '✕', '✖', '✓', '✔', '☰', '≡', '⋮', '⋯', '…', '+', '−', '›', '‹', '»', '«', '→', '←',
    '↑', '↓', '▲', '▼', '▶', '◀', '★', '☆', '♥', '❤', '⚙', '✎', '✏', '⌂', 'ⓘ', 'x', 'X',
];

const ICON_RANGES: &[(u32, u32)] = &[
    (0x2190, 0x21FF),
    (0x2300, 0x23FF),
    (0x25A0, 0x27BF),
    (0x2B00, 0x2BFF),
    (0xE000, 0xF8FF),
    (0x1F300, 0x1FAFF),
];

const ICON_CLASS_PREFIXES: &[&str] = &["fa-", "glyphicon-", "icon-", "ui-icon-", "material-icons"];

static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"(?i)^(?:.*[/\\])?[^/\\]+\.(?:{})$", FILE_EXTENSIONS.join("|"));
    Regex::new(&pattern).expect("valid filename pattern")
});

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,}(?:/\S*)?$")
        .expect("valid domain pattern")
});

static SHORT_SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid symbol pattern"));

/// True when the trimmed text is non-empty and made only of punctuation
/// (interior spaces allowed, as in `". . ."`).
pub fn is_punctuation_only(s: &str) -> bool {
    let t = s.trim();
    !t.is_empty()
        && t.chars().any(|c| PUNCTUATION.contains(&c))
        && t.chars().all(|c| PUNCTUATION.contains(&c) || c.is_whitespace())
}

/// True when the text is present but trims to nothing.
pub fn is_whitespace_only(s: &str) -> bool {
    !s.is_empty() && s.trim().is_empty()
}

pub fn looks_like_filename(s: &str) -> bool {
    FILENAME_RE.is_match(s.trim())
}

pub fn looks_like_url(s: &str) -> bool {
    let t = s.trim();
    let lower = t.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("www.")
        || DOMAIN_RE.is_match(t)
}

fn exact_member(list: &[&str], s: &str) -> bool {
    let t = s.trim().to_lowercase();
    list.contains(&t.as_str())
}

/// Exact (not substring) membership in the generic-label list.
pub fn is_generic_label(s: &str) -> bool {
    exact_member(GENERIC_LABELS, s)
}

/// Generic call-to-action wording on buttons and widgets.
pub fn is_generic_text(s: &str) -> bool {
    exact_member(GENERIC_TEXT, s)
}

pub fn is_generic_link_text(s: &str) -> bool {
    exact_member(GENERIC_LINK_TEXT, s)
}

fn is_icon_char(c: char) -> bool {
    let cp = c as u32;
    ICON_GLYPHS.contains(&c) || ICON_RANGES.iter().any(|(lo, hi)| (*lo..=*hi).contains(&cp))
}

fn has_icon_class(element: ElementRef<'_>) -> bool {
    element.value().classes().any(|class| {
        let class = class.to_ascii_lowercase();
        ICON_CLASS_PREFIXES.iter().any(|p| class.starts_with(p))
    })
}

fn is_icon_element(element: ElementRef<'_>) -> bool {
    matches!(element.value().name(), "i" | "svg") || has_icon_class(element)
}

/// Whether the resolved name is really just an icon glyph standing in for a label.
///
/// Names supplied through `aria-label`, `aria-labelledby` or `title` are
/// deliberate and never count as icon-only.
pub fn is_icon_only_content(element: ElementRef<'_>, name: &str, source: NameSource) -> bool {
    if matches!(
        source,
        NameSource::AriaLabel | NameSource::LabelledBy | NameSource::Title
    ) {
        return false;
    }

    if has_icon_class(element) {
        return true;
    }

    let content = name.trim();
    let count = content.chars().count();
    if count == 1 && content.chars().all(is_icon_char) {
        return true;
    }
    if count > 0 && count <= 2 && SHORT_SYMBOL_RE.is_match(content) {
        return true;
    }

    let text_len = crate::inspect::text_content(element).chars().count();
    text_len <= 2 && dom::descendant_elements(element).any(is_icon_element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Page;

    #[test]
    fn punctuation_only_needs_a_punctuation_char() {
        assert!(is_punctuation_only("..."));
        assert!(is_punctuation_only(" . . . "));
        assert!(is_punctuation_only("—"));
        assert!(!is_punctuation_only(""));
        assert!(!is_punctuation_only("   "));
        assert!(!is_punctuation_only("a."));
    }

    #[test]
    fn whitespace_only_excludes_empty() {
        assert!(is_whitespace_only("  \t"));
        assert!(!is_whitespace_only(""));
        assert!(!is_whitespace_only(" x "));
    }

    #[test]
    fn filenames_are_detected() {
        assert!(looks_like_filename("photo.jpg"));
        assert!(looks_like_filename(" IMG_1234.JPEG "));
        assert!(looks_like_filename("assets/img/hero-banner.webp"));
        assert!(looks_like_filename(r"C:\docs\report.pdf"));
        assert!(!looks_like_filename("A photo of the team"));
        assert!(!looks_like_filename(".png"));
        assert!(!looks_like_filename("version 2.0"));
    }

    #[test]
    fn urls_are_detected() {
        assert!(looks_like_url("https://example.com/a"));
        assert!(looks_like_url("HTTP://x"));
        assert!(looks_like_url("www.example"));
        assert!(looks_like_url("example.co.uk"));
        assert!(looks_like_url("docs.rs/scraper/latest"));
        assert!(!looks_like_url("Read the docs"));
        assert!(!looks_like_url("e.g"));
        assert!(!looks_like_url("Dr. Smith"));
    }

    #[test]
    fn generic_label_is_exact_match() {
        assert!(is_generic_label("label"));
        assert!(is_generic_label("  Form Field "));
        assert!(!is_generic_label("email label"));
    }

    #[test]
    fn generic_lists_are_distinct() {
        assert!(is_generic_label("image"));
        assert!(!is_generic_text("image"));
        assert!(!is_generic_link_text("image"));

        assert!(is_generic_text("Click here"));
        assert!(is_generic_link_text("Read more"));
        assert!(!is_generic_text("read more"));
        assert!(!is_generic_link_text("submit"));
    }

    fn icon_only(html: &str, source: NameSource) -> bool {
        let page = Page::parse(html, "");
        let el = page.select("#t")[0];
        let name = crate::inspect::text_content(el);
        is_icon_only_content(el, &name, source)
    }

    #[test]
    fn single_glyphs_are_icons() {
        assert!(icon_only(r#"<button id="t">×</button>"#, NameSource::Content));
        assert!(icon_only(r#"<button id="t">☰</button>"#, NameSource::Content));
        assert!(icon_only(r#"<button id="t">🔍</button>"#, NameSource::Content));
        assert!(!icon_only(r#"<button id="t">Search</button>"#, NameSource::Content));
    }

    #[test]
    fn short_symbol_content_is_icon() {
        assert!(icon_only(r#"<button id="t">&lt;&lt;</button>"#, NameSource::Content));
        assert!(!icon_only(r#"<button id="t">OK</button>"#, NameSource::Content));
    }

    #[test]
    fn deliberate_sources_never_count() {
        assert!(!icon_only(r#"<button id="t">×</button>"#, NameSource::AriaLabel));
        assert!(!icon_only(r#"<button id="t" class="fa-close">×</button>"#, NameSource::Title));
    }

    #[test]
    fn icon_font_class_on_element() {
        assert!(icon_only(
            r#"<button id="t" class="btn fa-trash">Delete</button>"#,
            NameSource::Content
        ));
    }

    #[test]
    fn icon_descendant_with_short_text() {
        assert!(icon_only(
            r#"<a id="t" href="/"><i class="x"></i></a>"#,
            NameSource::Content
        ));
        assert!(!icon_only(
            r#"<a id="t" href="/"><svg></svg> Home page</a>"#,
            NameSource::Content
        ));
    }
}
