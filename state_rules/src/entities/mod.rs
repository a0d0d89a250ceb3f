//! Entity definitions: the six-axis model, inventory items and characters.

mod axes;
mod character;
mod items;

pub use axes::*;
pub use character::*;
pub use items::*;
