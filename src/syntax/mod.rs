//! Java syntax layer: parsing, declaration extraction and call resolution.

pub mod declarations;
pub mod error;
pub mod hierarchy;
pub mod resolver;

pub use declarations::JavaDeclarations;
pub use error::AnalyzerError;
pub use hierarchy::ClassIndex;
pub use resolver::JavaCallResolver;
use tree_sitter::{
    Parser,
    Tree,
};

use crate::db::I18nDatabase;
use crate::input::source::SourceFile;

/// Parses Java source text.
///
/// # Errors
/// Returns an error when the grammar cannot be loaded or the parser gives up.
pub fn parse_java(text: &str) -> Result<Tree, AnalyzerError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_java::LANGUAGE.into())?;
    parser.parse(text, None).ok_or(AnalyzerError::ParseFailed)
}

/// Package, imports and type declarations of a source file.
///
/// Files that fail to parse contribute no declarations.
#[salsa::tracked(returns(ref))]
pub fn java_declarations(db: &dyn I18nDatabase, file: SourceFile) -> JavaDeclarations {
    let text = file.text(db);
    match parse_java(text) {
        Ok(tree) => JavaDeclarations::extract(tree.root_node(), text),
        Err(error) => {
            tracing::warn!(uri = %file.uri(db), %error, "failed to parse java source");
            JavaDeclarations::default()
        }
    }
}
