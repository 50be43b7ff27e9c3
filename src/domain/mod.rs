mod form_data;
mod submission;

pub use form_data::*;
pub use submission::*;
