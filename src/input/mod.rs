//! Salsa inputs: Java sources and `.lang` locale files.

pub mod locale;
pub mod source;
