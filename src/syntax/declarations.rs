//! Per-file Java declarations.
//!
//! Only what call resolution needs is kept: the package, imports, and for
//! every type its supertypes as written, its fields and its method and
//! constructor signatures. Type names stay unqualified here; they are
//! qualified against the whole workspace when the [`ClassIndex`] is built.
//!
//! [`ClassIndex`]: crate::syntax::ClassIndex

use tree_sitter::Node;

use crate::translations::key::node_text;

/// Nodes that declare a type.
const TYPE_DECLARATION_KINDS: &[&str] =
    &["class_declaration", "interface_declaration", "enum_declaration", "record_declaration"];

/// Types every Java file sees without an import.
const JAVA_LANG_TYPES: &[&str] = &[
    "Boolean",
    "Byte",
    "Character",
    "Class",
    "Double",
    "Enum",
    "Exception",
    "Float",
    "Integer",
    "Iterable",
    "Long",
    "Math",
    "Number",
    "Object",
    "RuntimeException",
    "Short",
    "String",
    "StringBuilder",
    "System",
    "Thread",
    "Throwable",
    "Void",
];

/// Primitive type names and their descriptor letters.
const PRIMITIVES: &[(&str, &str)] = &[
    ("boolean", "Z"),
    ("byte", "B"),
    ("char", "C"),
    ("double", "D"),
    ("float", "F"),
    ("int", "I"),
    ("long", "J"),
    ("short", "S"),
];

/// Package, imports and types of one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, salsa::Update)]
pub struct JavaDeclarations {
    /// `package` declaration, if any.
    pub package: Option<String>,
    /// In file order.
    pub imports: Vec<Import>,
    /// Top-level and nested types in document order.
    pub classes: Vec<ClassDeclaration>,
}

/// One `import` line.
#[derive(Debug, Clone, PartialEq, Eq, salsa::Update)]
pub struct Import {
    /// Dotted path without the trailing `.*`.
    pub path: String,
    /// `import static`
    pub is_static: bool,
    /// Ends in `.*`.
    pub wildcard: bool,
}

/// A class, interface, enum or record.
#[derive(Debug, Clone, PartialEq, Eq, salsa::Update)]
pub struct ClassDeclaration {
    /// Simple name.
    pub name: String,
    /// Package plus enclosing type names, dot separated.
    pub qualified_name: String,
    /// `extends` clause of a class, as written.
    pub superclass: Option<String>,
    /// `implements` of a class, or `extends` of an interface, as written.
    pub interfaces: Vec<String>,
    /// Fields in declaration order.
    pub fields: Vec<FieldDeclaration>,
    /// Methods and constructors.
    pub methods: Vec<MethodDeclaration>,
}

/// One variable of a field declaration.
#[derive(Debug, Clone, PartialEq, Eq, salsa::Update)]
pub struct FieldDeclaration {
    /// Field name.
    pub name: String,
    /// Declared type, as written.
    pub type_name: String,
}

/// A method or constructor signature.
#[derive(Debug, Clone, PartialEq, Eq, salsa::Update)]
pub struct MethodDeclaration {
    /// Method name, or the simple class name for constructors.
    pub name: String,
    /// Parameter types as written, `...` already turned into `[]`.
    pub parameter_types: Vec<String>,
    /// Last parameter is `T...`.
    pub varargs: bool,
    /// Declared as a constructor.
    pub constructor: bool,
}

impl JavaDeclarations {
    /// Collects the declarations below `root` (a `program` node).
    #[must_use]
    pub fn extract(root: Node<'_>, source: &str) -> Self {
        let mut declarations = Self::default();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_declaration" => {
                    declarations.package = first_name(child, source);
                }
                "import_declaration" => {
                    if let Some(import) = parse_import(child, source) {
                        declarations.imports.push(import);
                    }
                }
                kind if TYPE_DECLARATION_KINDS.contains(&kind) => {
                    let prefix = declarations.package.clone();
                    collect_type(child, source, prefix.as_deref(), &mut declarations.classes);
                }
                _ => {}
            }
        }
        declarations
    }

    /// Finds a type declared in this file by simple or qualified name.
    #[must_use]
    pub fn class_named(&self, name: &str) -> Option<&ClassDeclaration> {
        self.classes.iter().find(|class| class.name == name || class.qualified_name == name)
    }

    /// Qualifies a type name as written in this file.
    ///
    /// Lookup order: primitives, types declared in this file, single-type
    /// imports, `java.lang`, the file's own package and on-demand imports
    /// (both only for names `is_known` accepts). Anything else is assumed to
    /// live in the file's package.
    pub fn qualify(&self, written: &str, is_known: impl Fn(&str) -> bool) -> String {
        let name = strip_type_arguments(written);
        if PRIMITIVES.iter().any(|(primitive, _)| *primitive == name) {
            return name.to_string();
        }
        if let Some(class) = self.class_named(name) {
            return class.qualified_name.clone();
        }
        let (head, rest) = name.split_once('.').map_or((name, None), |(h, r)| (h, Some(r)));
        if let Some(import) = self
            .imports
            .iter()
            .find(|import| !import.wildcard && import.path.rsplit('.').next() == Some(head))
        {
            return rest.map_or_else(|| import.path.clone(), |r| format!("{}.{r}", import.path));
        }
        if rest.is_some() {
            return name.to_string();
        }
        if JAVA_LANG_TYPES.contains(&name) {
            return format!("java.lang.{name}");
        }
        let same_package =
            self.package.as_ref().map_or_else(|| name.to_string(), |p| format!("{p}.{name}"));
        if is_known(&same_package) {
            return same_package;
        }
        self.imports
            .iter()
            .filter(|import| import.wildcard && !import.is_static)
            .map(|import| format!("{}.{name}", import.path))
            .find(|candidate| is_known(candidate))
            .unwrap_or(same_package)
    }

    /// Encodes a parameter type: primitives as one letter, references as
    /// `L<qualified>;`, one leading `[` per array dimension.
    pub fn encode_type(&self, written: &str, is_known: impl Fn(&str) -> bool) -> String {
        let mut element = written.trim();
        let mut dimensions = 0;
        while let Some(inner) = element.strip_suffix("[]") {
            element = inner.trim_end();
            dimensions += 1;
        }
        let element = strip_type_arguments(element);
        let encoded = PRIMITIVES.iter().find(|(primitive, _)| *primitive == element).map_or_else(
            || format!("L{};", self.qualify(element, &is_known)),
            |(_, letter)| (*letter).to_string(),
        );
        format!("{}{encoded}", "[".repeat(dimensions))
    }
}

/// `List<String>` → `List`.
#[must_use]
pub fn strip_type_arguments(written: &str) -> &str {
    let trimmed = written.trim();
    trimmed.split('<').next().unwrap_or(trimmed).trim_end()
}

/// Simple name of a possibly qualified, possibly generic type.
#[must_use]
pub fn simple_type_name(written: &str) -> &str {
    let name = strip_type_arguments(written);
    name.rsplit('.').next().unwrap_or(name)
}

/// Type text with generics removed, `[]` kept per dimension.
#[must_use]
pub fn written_type(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "generic_type" => {
            let mut cursor = node.walk();
            let base = node
                .named_children(&mut cursor)
                .find(|child| matches!(child.kind(), "type_identifier" | "scoped_type_identifier"))?;
            written_type(base, source)
        }
        "array_type" => {
            let element = written_type(node.child_by_field_name("element")?, source)?;
            let dimensions = node
                .child_by_field_name("dimensions")
                .and_then(|dims| node_text(dims, source))
                .map_or(1, |dims| dims.matches('[').count());
            Some(format!("{element}{}", "[]".repeat(dimensions)))
        }
        "annotated_type" => {
            let mut cursor = node.walk();
            let inner = node.named_children(&mut cursor).find(|child| {
                !matches!(child.kind(), "annotation" | "marker_annotation")
            })?;
            written_type(inner, source)
        }
        _ => node_text(node, source).map(|text| text.split_whitespace().collect()),
    }
}

/// First identifier child, e.g. the path of an import.
fn first_name(node: Node<'_>, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    let name = node
        .named_children(&mut cursor)
        .find(|child| matches!(child.kind(), "identifier" | "scoped_identifier"))?;
    node_text(name, source).map(ToString::to_string)
}

/// Reads one `import_declaration`.
fn parse_import(node: Node<'_>, source: &str) -> Option<Import> {
    let path = first_name(node, source)?;
    let mut cursor = node.walk();
    let mut is_static = false;
    let mut wildcard = false;
    for child in node.children(&mut cursor) {
        match child.kind() {
            "static" => is_static = true,
            "asterisk" => wildcard = true,
            _ => {}
        }
    }
    Some(Import { path, is_static, wildcard })
}

/// Adds `node` and its nested types to `out`.
fn collect_type(
    node: Node<'_>,
    source: &str,
    prefix: Option<&str>,
    out: &mut Vec<ClassDeclaration>,
) {
    let Some(name) = node.child_by_field_name("name").and_then(|n| node_text(n, source)) else {
        return;
    };
    let qualified_name = prefix.map_or_else(|| name.to_string(), |p| format!("{p}.{name}"));

    let superclass = node
        .child_by_field_name("superclass")
        .and_then(|clause| clause.named_child(0))
        .and_then(|ty| written_type(ty, source));

    let mut interfaces = Vec::new();
    let mut cursor = node.walk();
    for clause in node.named_children(&mut cursor) {
        if matches!(clause.kind(), "super_interfaces" | "extends_interfaces") {
            let mut clause_cursor = clause.walk();
            for list in clause.named_children(&mut clause_cursor) {
                let mut list_cursor = list.walk();
                interfaces.extend(
                    list.named_children(&mut list_cursor).filter_map(|ty| written_type(ty, source)),
                );
            }
        }
    }

    let index = out.len();
    out.push(ClassDeclaration {
        name: name.to_string(),
        qualified_name: qualified_name.clone(),
        superclass,
        interfaces,
        fields: Vec::new(),
        methods: Vec::new(),
    });

    let Some(body) = node.child_by_field_name("body") else {
        return;
    };
    let mut fields = Vec::new();
    let mut methods = Vec::new();
    let mut body_cursor = body.walk();
    for member in body.named_children(&mut body_cursor) {
        match member.kind() {
            "field_declaration" | "constant_declaration" => {
                collect_fields(member, source, &mut fields);
            }
            "method_declaration" => {
                if let Some(method) = method_declaration(member, source, None) {
                    methods.push(method);
                }
            }
            "constructor_declaration" => {
                if let Some(constructor) = method_declaration(member, source, Some(name)) {
                    methods.push(constructor);
                }
            }
            "enum_body_declarations" => {
                let mut inner_cursor = member.walk();
                for inner in member.named_children(&mut inner_cursor) {
                    match inner.kind() {
                        "field_declaration" => collect_fields(inner, source, &mut fields),
                        "method_declaration" => {
                            methods.extend(method_declaration(inner, source, None));
                        }
                        "constructor_declaration" => {
                            methods.extend(method_declaration(inner, source, Some(name)));
                        }
                        kind if TYPE_DECLARATION_KINDS.contains(&kind) => {
                            collect_type(inner, source, Some(&qualified_name), out);
                        }
                        _ => {}
                    }
                }
            }
            kind if TYPE_DECLARATION_KINDS.contains(&kind) => {
                collect_type(member, source, Some(&qualified_name), out);
            }
            _ => {}
        }
    }
    if let Some(class) = out.get_mut(index) {
        class.fields = fields;
        class.methods = methods;
    }
}

/// One entry per declarator of a field declaration.
fn collect_fields(declaration: Node<'_>, source: &str, out: &mut Vec<FieldDeclaration>) {
    let Some(type_name) =
        declaration.child_by_field_name("type").and_then(|ty| written_type(ty, source))
    else {
        return;
    };
    let mut cursor = declaration.walk();
    for declarator in declaration.children_by_field_name("declarator", &mut cursor) {
        if let Some(name) = declarator.child_by_field_name("name").and_then(|n| node_text(n, source))
        {
            out.push(FieldDeclaration { name: name.to_string(), type_name: type_name.clone() });
        }
    }
}

/// `constructor_of` is the enclosing class name when `node` is a constructor.
fn method_declaration(
    node: Node<'_>,
    source: &str,
    constructor_of: Option<&str>,
) -> Option<MethodDeclaration> {
    let name = match constructor_of {
        Some(class_name) => class_name.to_string(),
        None => node_text(node.child_by_field_name("name")?, source)?.to_string(),
    };
    let parameters = node.child_by_field_name("parameters")?;
    let mut parameter_types = Vec::new();
    let mut varargs = false;
    let mut cursor = parameters.walk();
    for parameter in parameters.named_children(&mut cursor) {
        match parameter.kind() {
            "formal_parameter" => {
                let mut written =
                    parameter.child_by_field_name("type").and_then(|ty| written_type(ty, source))?;
                // `String names[]`
                if let Some(dims) = parameter.child_by_field_name("dimensions") {
                    let count = node_text(dims, source).map_or(1, |d| d.matches('[').count());
                    written.push_str(&"[]".repeat(count));
                }
                parameter_types.push(written);
            }
            "spread_parameter" => {
                let mut spread_cursor = parameter.walk();
                let ty = parameter.named_children(&mut spread_cursor).find(|child| {
                    !matches!(
                        child.kind(),
                        "modifiers" | "annotation" | "marker_annotation" | "variable_declarator"
                    )
                })?;
                parameter_types.push(format!("{}[]", written_type(ty, source)?));
                varargs = true;
            }
            _ => {}
        }
    }
    Some(MethodDeclaration { name, parameter_types, varargs, constructor: constructor_of.is_some() })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::syntax::parse_java;

    fn extract(source: &str) -> JavaDeclarations {
        let tree = parse_java(source).unwrap();
        JavaDeclarations::extract(tree.root_node(), source)
    }

    const BLOCK_SOURCE: &str = r"
package net.example.blocks;

import java.util.List;
import net.minecraft.block.Block;
import net.minecraft.item.*;
import static net.minecraft.util.Util.helper;

public class RubyBlock extends Block implements Comparable<RubyBlock>, Runnable {
    private final String name;
    private List<String> aliases, tags;

    public RubyBlock(String name, int... levels) {
        this.name = name;
    }

    public void rename(String[] parts, java.util.Map<String, Integer> weights) {}

    static class Inner {}
}
";

    #[googletest::test]
    fn extracts_package_and_imports() {
        let declarations = extract(BLOCK_SOURCE);

        expect_that!(declarations.package, some(eq("net.example.blocks")));
        expect_that!(
            declarations.imports,
            elements_are![
                eq(&Import { path: "java.util.List".into(), is_static: false, wildcard: false }),
                eq(&Import {
                    path: "net.minecraft.block.Block".into(),
                    is_static: false,
                    wildcard: false
                }),
                eq(&Import { path: "net.minecraft.item".into(), is_static: false, wildcard: true }),
                eq(&Import {
                    path: "net.minecraft.util.Util.helper".into(),
                    is_static: true,
                    wildcard: false
                }),
            ]
        );
    }

    #[googletest::test]
    fn extracts_class_header_members_and_nested_types() {
        let declarations = extract(BLOCK_SOURCE);

        assert_that!(declarations.classes, len(eq(2)));
        let block = &declarations.classes[0];
        expect_that!(block.qualified_name, eq("net.example.blocks.RubyBlock"));
        expect_that!(block.superclass, some(eq("Block")));
        expect_that!(block.interfaces, elements_are![eq("Comparable"), eq("Runnable")]);
        let field_names: Vec<&str> = block.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(field_names, vec!["name", "aliases", "tags"]);
        expect_that!(block.fields[1].type_name, eq("List"));

        assert_that!(block.methods, len(eq(2)));
        let constructor = &block.methods[0];
        expect_that!(constructor.name, eq("RubyBlock"));
        expect_that!(constructor.constructor, eq(true));
        expect_that!(constructor.varargs, eq(true));
        expect_that!(constructor.parameter_types, elements_are![eq("String"), eq("int[]")]);

        let rename = &block.methods[1];
        expect_that!(rename.varargs, eq(false));
        expect_that!(rename.parameter_types, elements_are![eq("String[]"), eq("java.util.Map")]);

        expect_that!(declarations.classes[1].qualified_name, eq("net.example.blocks.RubyBlock.Inner"));
    }

    #[googletest::test]
    fn interface_extends_are_recorded_as_interfaces() {
        let declarations = extract("interface Named extends Comparable<Named> { String name(); }");

        let named = &declarations.classes[0];
        expect_that!(named.qualified_name, eq("Named"));
        expect_that!(named.superclass, none());
        expect_that!(named.interfaces, elements_are![eq("Comparable")]);
        expect_that!(named.methods[0].name, eq("name"));
    }

    #[rstest]
    #[case::primitive("int", "int")]
    #[case::declared_here("RubyBlock", "net.example.blocks.RubyBlock")]
    #[case::single_import("Block", "net.minecraft.block.Block")]
    #[case::java_lang("String", "java.lang.String")]
    #[case::generic("List<String>", "java.util.List")]
    #[case::qualified("java.util.Map", "java.util.Map")]
    #[case::on_demand_import("Item", "net.minecraft.item.Item")]
    #[case::unknown_defaults_to_package("Helper", "net.example.blocks.Helper")]
    fn qualify_cases(#[case] written: &str, #[case] expected: &str) {
        let declarations = extract(BLOCK_SOURCE);
        let known = |name: &str| name == "net.minecraft.item.Item";

        assert_eq!(declarations.qualify(written, known), expected);
    }

    #[rstest]
    #[case::string("String", "Ljava.lang.String;")]
    #[case::object_array("Object[]", "[Ljava.lang.Object;")]
    #[case::primitive("boolean", "Z")]
    #[case::primitive_matrix("int[][]", "[[I")]
    #[case::generic("List<String>", "Ljava.util.List;")]
    fn encode_type_cases(#[case] written: &str, #[case] expected: &str) {
        let declarations = extract(BLOCK_SOURCE);

        assert_eq!(declarations.encode_type(written, |_| false), expected);
    }
}
