//! Purpose: Shared core library crate used by the `statpick` CLI and tests.
//! Exports: `core` (stats tree model, report parsing, filtering, errors).
//! Role: Internal library backing the binary; not yet a stable public SDK.
//! Invariants: Core functions are pure over in-memory data; I/O stays in the binary.
//! Invariants: Treat the crate API as internal until a dedicated library release.
pub mod core;
