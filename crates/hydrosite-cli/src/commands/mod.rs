// Command handlers. main.rs parses arguments and dispatches here.

pub mod optimal;
