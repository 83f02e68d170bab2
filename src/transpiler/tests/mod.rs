//! Compiler test modules.
//!
//! - `snapshots`: whole-statement output for representative configurations
//! - `parameters`: placeholder binding, defaults and pass-through

mod snapshots;
