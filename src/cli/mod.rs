pub mod args;

pub use args::{Arguments, Module, parse};
