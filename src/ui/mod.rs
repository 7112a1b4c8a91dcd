pub mod printer;
pub mod prompt;

pub use printer::Printer;
pub use prompt::{Confirm, StdinConfirm};
