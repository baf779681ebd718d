mod color;
mod outcome;
mod position;
mod rules;

pub use color::*;
pub use outcome::*;
pub use position::*;
pub use rules::*;
