pub mod check;
pub mod env;
pub mod error;
pub mod order;
pub mod subst;
pub mod ty;
pub mod unify;

pub use check::{CheckReport, check_program};
