//! Embedded initial-state JSON in storefront pages.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static INITIAL_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"window\.__INITIAL_STATE__\s*=\s*").expect("valid initial-state regex")
});

/// Parses the JSON value assigned to `window.__INITIAL_STATE__`, if any.
///
/// Only the first complete JSON value after the assignment is read, so a
/// trailing `;` or the rest of the script block is ignored.
pub(crate) fn initial_state(html: &str) -> Option<Value> {
    let assignment = INITIAL_STATE.find(html)?;
    let rest = &html[assignment.end()..];
    match serde_json::Deserializer::from_str(rest)
        .into_iter::<Value>()
        .next()?
    {
        Ok(state) => Some(state),
        Err(err) => {
            tracing::debug!(error = %err, "initial state blob did not parse");
            None
        }
    }
}

/// Takes the value at `pointer` out of `state`, leaving `null` behind.
pub(crate) fn take_at(state: &mut Value, pointer: &str) -> Option<Value> {
    state.pointer_mut(pointer).map(Value::take)
}
