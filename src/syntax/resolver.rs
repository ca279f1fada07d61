//! Call-site resolution over tree-sitter-java trees.
//!
//! Resolution is name based: the receiver type comes from locals,
//! parameters, fields, `this`/`super`, constructor expressions or a type
//! name, and the overload is picked by argument count.

use tree_sitter::Node;

use crate::syntax::declarations::{
    JavaDeclarations,
    simple_type_name,
    written_type,
};
use crate::syntax::hierarchy::ClassIndex;
use crate::translations::host::{
    CallResolver,
    NameMapping,
    ResolvedCall,
};
use crate::translations::key::node_text;

/// Nodes that declare a type.
const TYPE_DECLARATION_KINDS: &[&str] =
    &["class_declaration", "interface_declaration", "enum_declaration", "record_declaration"];

/// Nodes whose statements can declare locals.
const BLOCK_KINDS: &[&str] = &["block", "constructor_body", "switch_block_statement_group"];

/// Nodes that bring parameters into scope.
const CALLABLE_KINDS: &[&str] =
    &["method_declaration", "constructor_declaration", "lambda_expression"];

/// [`CallResolver`] for one Java source file.
#[derive(Clone, Copy)]
pub struct JavaCallResolver<'a> {
    /// Text of the file.
    source: &'a str,
    /// Declarations of the file being resolved.
    file: &'a JavaDeclarations,
    /// Classes of the whole workspace.
    index: &'a ClassIndex,
    /// MCP to SRG names, used when matching inherited methods.
    mappings: &'a dyn NameMapping,
}

impl std::fmt::Debug for JavaCallResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaCallResolver")
            .field("package", &self.file.package)
            .field("mappings", &"<dyn NameMapping>")
            .finish_non_exhaustive()
    }
}

impl<'a> JavaCallResolver<'a> {
    /// Resolver for the file `source` declared as `file`.
    #[must_use]
    pub const fn new(
        source: &'a str,
        file: &'a JavaDeclarations,
        index: &'a ClassIndex,
        mappings: &'a dyn NameMapping,
    ) -> Self {
        Self { source, file, index, mappings }
    }

    /// Qualifies a type name as written in this file.
    fn qualify(&self, written: &str) -> String {
        self.file.qualify(written, |name| self.index.contains(name))
    }

    /// Source text of `node`.
    fn text(&self, node: Node<'_>) -> Option<&'a str> {
        node_text(node, self.source)
    }

    /// `new T(...)`
    fn resolve_constructor(&self, call: Node<'_>) -> Option<ResolvedCall> {
        let written = written_type(call.child_by_field_name("type")?, self.source)?;
        let owner = self.qualify(&written);
        let constructor =
            self.index.find_constructor(&owner, argument_count(call.child_by_field_name("arguments")?))?;
        Some(ResolvedCall::new(owner, simple_type_name(&written), constructor.signature()))
    }

    /// `super(...)` runs a constructor of the superclass, `this(...)` one of
    /// the enclosing class.
    fn resolve_explicit_constructor(&self, call: Node<'_>) -> Option<ResolvedCall> {
        let class = self.enclosing_classes(call).into_iter().next()?;
        let owner = match call.child_by_field_name("constructor")?.kind() {
            "super" => self.index.get(&class)?.superclass.clone()?,
            "this" => class,
            _ => return None,
        };
        let constructor =
            self.index.find_constructor(&owner, argument_count(call.child_by_field_name("arguments")?))?;
        let name = simple_type_name(&owner).to_string();
        Some(ResolvedCall::new(owner, name, constructor.signature()))
    }

    /// Receiver type, then name and argument count, select the method.
    fn resolve_method(&self, call: Node<'_>) -> Option<ResolvedCall> {
        let name = self.text(call.child_by_field_name("name")?)?;
        let arguments = argument_count(call.child_by_field_name("arguments")?);

        let owners = match call.child_by_field_name("object") {
            Some(object) => vec![self.receiver_type(object)?],
            None => self.unqualified_owners(call, name),
        };
        owners.iter().find_map(|owner| {
            let (declaring, method) = self.index.find_method(owner, name, arguments, self.mappings)?;
            Some(ResolvedCall::new(declaring, name, method.signature()))
        })
    }

    /// Candidate owners for a call without receiver: single static imports
    /// of the name, enclosing classes from the inside out, then static
    /// on-demand imports.
    fn unqualified_owners(&self, call: Node<'_>, name: &str) -> Vec<String> {
        let mut owners: Vec<String> = self
            .file
            .imports
            .iter()
            .filter(|import| import.is_static && !import.wildcard)
            .filter_map(|import| {
                let (owner, member) = import.path.rsplit_once('.')?;
                (member == name).then(|| self.qualify(owner))
            })
            .collect();
        owners.extend(self.enclosing_classes(call));
        owners.extend(
            self.file
                .imports
                .iter()
                .filter(|import| import.is_static && import.wildcard)
                .map(|import| self.qualify(&import.path)),
        );
        owners
    }

    /// Qualified names of the types enclosing `node`, innermost first.
    fn enclosing_classes(&self, node: Node<'_>) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if TYPE_DECLARATION_KINDS.contains(&ancestor.kind())
                && let Some(name) = ancestor.child_by_field_name("name").and_then(|n| self.text(n))
            {
                names.push(name);
            }
            current = ancestor.parent();
        }
        let mut qualified = Vec::with_capacity(names.len());
        let mut prefix = self.file.package.clone();
        for name in names.iter().rev() {
            let next = prefix.map_or_else(|| (*name).to_string(), |p| format!("{p}.{name}"));
            qualified.push(next.clone());
            prefix = Some(next);
        }
        qualified.reverse();
        qualified
    }

    /// Static type of a receiver expression.
    fn receiver_type(&self, object: Node<'_>) -> Option<String> {
        match object.kind() {
            "this" => self.enclosing_classes(object).into_iter().next(),
            "super" => {
                let class = self.enclosing_classes(object).into_iter().next()?;
                self.index.get(&class)?.superclass.clone()
            }
            "identifier" => {
                let name = self.text(object)?;
                if let Some(local) = self.local_type(object, name) {
                    return Some(self.qualify(&local));
                }
                if let Some(field) = self
                    .enclosing_classes(object)
                    .iter()
                    .find_map(|class| self.index.field_type(class, name))
                {
                    return Some(field.to_string());
                }
                Some(self.qualify(name))
            }
            "field_access" => {
                let target = object.child_by_field_name("object")?;
                let field = self.text(object.child_by_field_name("field")?)?;
                if target.kind() != "this" {
                    let written: String = self.text(object)?.split_whitespace().collect();
                    let qualified = self.qualify(&written);
                    if self.index.contains(&qualified) {
                        return Some(qualified);
                    }
                }
                let owner = self.receiver_type(target)?;
                self.index.field_type(&owner, field).map(ToString::to_string)
            }
            "object_creation_expression" | "cast_expression" => {
                let written = written_type(object.child_by_field_name("type")?, self.source)?;
                Some(self.qualify(&written))
            }
            "parenthesized_expression" => self.receiver_type(object.named_child(0)?),
            _ => None,
        }
    }

    /// Declared type of the local variable or parameter `name` visible at `at`.
    fn local_type(&self, at: Node<'_>, name: &str) -> Option<String> {
        let mut child = at;
        while let Some(scope) = child.parent() {
            if TYPE_DECLARATION_KINDS.contains(&scope.kind()) || scope.kind() == "class_body" {
                return None;
            }
            let found = if BLOCK_KINDS.contains(&scope.kind()) {
                self.block_local(scope, child, name)
            } else if CALLABLE_KINDS.contains(&scope.kind()) {
                scope.child_by_field_name("parameters").and_then(|p| self.parameter_type(p, name))
            } else {
                match scope.kind() {
                    "for_statement" => {
                        let mut cursor = scope.walk();
                        let init = scope.children_by_field_name("init", &mut cursor).collect::<Vec<_>>();
                        init.into_iter().find_map(|decl| self.declaration_type(decl, name))
                    }
                    "enhanced_for_statement" | "catch_formal_parameter" => {
                        self.typed_name(scope, name)
                    }
                    "catch_clause" => {
                        let mut cursor = scope.walk();
                        let parameter = scope
                            .named_children(&mut cursor)
                            .find(|c| c.kind() == "catch_formal_parameter");
                        parameter.and_then(|p| self.typed_name(p, name))
                    }
                    _ => None,
                }
            };
            if found.is_some() {
                return found;
            }
            child = scope;
        }
        None
    }

    /// Last declaration of `name` among the statements of `block` before `child`.
    fn block_local(&self, block: Node<'_>, child: Node<'_>, name: &str) -> Option<String> {
        let mut cursor = block.walk();
        block
            .named_children(&mut cursor)
            .take_while(|statement| statement.start_byte() < child.start_byte())
            .filter(|statement| statement.kind() == "local_variable_declaration")
            .filter_map(|statement| self.declaration_type(statement, name))
            .last()
    }

    /// Declared type of `name` when `declaration` declares it. `var` is typed from a `new` initializer.
    fn declaration_type(&self, declaration: Node<'_>, name: &str) -> Option<String> {
        if declaration.kind() != "local_variable_declaration" {
            return None;
        }
        let mut cursor = declaration.walk();
        let declarator = declaration
            .children_by_field_name("declarator", &mut cursor)
            .find(|d| d.child_by_field_name("name").and_then(|n| self.text(n)) == Some(name))?;
        let declared = declaration.child_by_field_name("type")?;
        if self.text(declared) == Some("var") {
            let value = declarator.child_by_field_name("value")?;
            return (value.kind() == "object_creation_expression")
                .then(|| written_type(value.child_by_field_name("type")?, self.source))
                .flatten();
        }
        written_type(declared, self.source)
    }

    /// Type of the parameter `name` in a parameter list.
    fn parameter_type(&self, parameters: Node<'_>, name: &str) -> Option<String> {
        let mut cursor = parameters.walk();
        parameters.named_children(&mut cursor).find_map(|parameter| match parameter.kind() {
            "formal_parameter" => self.typed_name(parameter, name),
            "spread_parameter" => {
                let mut inner = parameter.walk();
                let children: Vec<Node<'_>> = parameter.named_children(&mut inner).collect();
                let declarator = children.iter().find(|c| c.kind() == "variable_declarator")?;
                if declarator.child_by_field_name("name").and_then(|n| self.text(n)) != Some(name) {
                    return None;
                }
                let ty = children.iter().find(|c| {
                    !matches!(c.kind(), "modifiers" | "variable_declarator" | "annotation")
                })?;
                written_type(*ty, self.source).map(|ty| format!("{ty}[]"))
            }
            // lambda `(a, b) -> ...` carries no types
            _ => None,
        })
    }

    /// `type` of a node with `type` and `name` fields, when its name is `name`.
    fn typed_name(&self, node: Node<'_>, name: &str) -> Option<String> {
        if node.child_by_field_name("name").and_then(|n| self.text(n)) != Some(name) {
            return None;
        }
        written_type(node.child_by_field_name("type")?, self.source)
    }
}

impl CallResolver for JavaCallResolver<'_> {
    fn resolve_call(&self, call: Node<'_>) -> Option<ResolvedCall> {
        match call.kind() {
            "method_invocation" => self.resolve_method(call),
            "object_creation_expression" => self.resolve_constructor(call),
            "explicit_constructor_invocation" => self.resolve_explicit_constructor(call),
            _ => None,
        }
    }
}

/// Arguments of an `argument_list`, comments excluded.
fn argument_count(arguments: Node<'_>) -> usize {
    let mut cursor = arguments.walk();
    arguments.named_children(&mut cursor).filter(|child| !child.is_extra()).count()
}
