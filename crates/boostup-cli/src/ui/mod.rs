//! Terminal output.

mod console;
pub mod theme;

pub use console::ConsoleReporter;
