//! Java source file input.

use std::path::Path;

/// A Java source file.
#[salsa::input(debug)]
pub struct SourceFile {
    /// URI the file was read from.
    #[returns(ref)]
    pub uri: String,

    /// Contents, from disk or from the editor.
    #[returns(ref)]
    pub text: String,
}

/// Whether `uri` names a Java compilation unit.
#[must_use]
pub fn is_java_uri(uri: &str) -> bool {
    Path::new(uri).extension().and_then(|ext| ext.to_str()) == Some("java")
}
