mod rules;
mod sanitize;

pub use rules::*;
pub use sanitize::*;
