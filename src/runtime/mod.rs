//! Single-writer runtime and event stream APIs.

/// Event stream types emitted by the runtime.
pub mod events;
/// Handle and writer loop implementation.
pub mod handle;
