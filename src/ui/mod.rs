//! Operator-facing build output
//!
//! Lifecycle output goes to stdout, styled with `console`. Styling is dropped
//! automatically when stdout is not a terminal, which is the usual case in a
//! build container.

mod output;

pub use output::{header, key_value, step_info, step_ok, step_warn};
