mod form_controller;

pub use form_controller::*;
