//! Login-page navigation and the unload guard.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

/// Path segment that replaces the document name when leaving a sheet.
pub const DOCUMENTS_PATH: &str = "documents";

/// Prompt shown when the page is left in the middle of an edit.
pub const UNSAVED_CHANGES_WARNING: &str = "You have unsaved changes! Are you sure you want to leave?";

/// Strip the trailing `/<document>` segment from `href` and append
/// `/documents`.
#[must_use]
pub fn login_url(href: &str) -> String {
    let base = href.rfind('/').map_or("", |index| &href[..index]);
    format!("{base}/{DOCUMENTS_PATH}")
}

/// Warning to show before unloading, or `None` when nothing is in flight.
#[must_use]
pub fn unload_warning(editing: bool) -> Option<&'static str> {
    editing.then_some(UNSAVED_CHANGES_WARNING)
}
