//! Compiler warnings with colored terminal output.
//!
//! Warnings are deduplicated so a nonstandard construct used a thousand
//! times in one stylesheet is reported once. Used by the selector parser
//! for nonstandard syntax notices.

use std::collections::HashSet;
use std::sync::Mutex;

use owo_colors::OwoColorize;

/// Global set of warnings already printed (to deduplicate).
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about nonstandard or deprecated syntax (prints once per unique
/// message).
///
/// # Example
/// ```ignore
/// warn_once("Selector", "the reference combinator is nonstandard");
/// ```
///
/// # Panics
/// Panics if the global warning set mutex is poisoned.
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap()
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{}", format!("[Moss {component}] warning: {message}").yellow());
    }
}

/// Number of distinct warnings recorded since the last clear.
///
/// # Panics
/// Panics if the global warning set mutex is poisoned.
#[must_use]
pub fn warning_count() -> usize {
    WARNED.lock().unwrap().as_ref().map_or(0, HashSet::len)
}

/// Clear all recorded warnings (call when starting a new compilation).
///
/// # Panics
/// Panics if the global warning set mutex is poisoned.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap();
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
