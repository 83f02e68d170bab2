//! Rule configuration AST.
//!
//! Every node is validated by its constructor and is immutable afterwards.

pub mod conditions;
pub mod config;
pub mod expr;
pub mod names;
pub mod operators;
pub mod select;
pub mod tables;
pub mod values;

pub use conditions::*;
pub use config::*;
pub use expr::*;
pub use operators::*;
pub use select::*;
pub use tables::*;
pub use values::*;
