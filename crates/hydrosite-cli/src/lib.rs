//! hydrosite CLI library.
//!
//! Command handlers and summary rendering for the `hydrosite-cli` binary. The
//! plant search itself lives in `hydrosite-lib`.

pub mod commands;
pub mod output;
