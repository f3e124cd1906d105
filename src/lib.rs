//! Accessible name computation and authoring-quality checks for HTML.
//!
//! [`name::resolve_accessible_name`] computes what a screen reader announces
//! for an element; [`evaluate::evaluate`] judges that name for the element's
//! category; [`audit::run_accessibility_test`] does both for a whole page.

pub mod audit;
pub mod browser;
pub mod dom;
pub mod evaluate;
pub mod inspect;
pub mod mcp;
pub mod name;
pub mod report;
pub mod text;
