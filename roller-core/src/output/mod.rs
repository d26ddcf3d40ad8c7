//! Digital outputs

mod switch;

pub use switch::SwitchedOutput;
