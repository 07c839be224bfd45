pub mod ai;
pub mod runtime;
