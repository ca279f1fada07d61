//! Workspace-wide type index.

use std::collections::{
    HashMap,
    HashSet,
    VecDeque,
};

use crate::syntax::declarations::JavaDeclarations;
use crate::translations::TranslationFunctionCatalog;
use crate::translations::host::{
    NameMapping,
    TypeHierarchy,
};

/// One method or constructor with its parameters already encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
    /// Method name, or the simple class name for constructors.
    pub name: String,
    /// Descriptor per parameter, e.g. `Ljava.lang.String;`.
    pub parameters: Vec<String>,
    /// Last parameter is an array taking varargs.
    pub varargs: bool,
    /// Declared as a constructor.
    pub constructor: bool,
}

impl MethodEntry {
    /// Encoded parameter signature, parameters concatenated.
    #[must_use]
    pub fn signature(&self) -> String {
        self.parameters.concat()
    }

    /// How well `argument_count` fits: exact arity first, varargs second.
    fn arity_rank(&self, argument_count: usize) -> Option<u8> {
        let declared = self.parameters.len();
        if argument_count == declared {
            Some(if self.varargs { 1 } else { 0 })
        } else if self.varargs && argument_count + 1 >= declared {
            Some(2)
        } else {
            None
        }
    }
}

/// What the index knows about one class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassEntry {
    /// Qualified name.
    pub superclass: Option<String>,
    /// Qualified names.
    pub interfaces: Vec<String>,
    /// Field name → qualified type.
    pub fields: HashMap<String, String>,
    /// Methods and constructors declared by the class itself.
    pub methods: Vec<MethodEntry>,
}

/// Classes known to the workspace, keyed by qualified name.
///
/// Built from the declarations of every indexed source file plus stubs for
/// the types the translation catalog refers to, so that calls into the game
/// resolve without the game sources being present.
#[derive(Debug, Clone, Default)]
pub struct ClassIndex {
    /// Entries by qualified name.
    classes: HashMap<String, ClassEntry>,
}

impl ClassIndex {
    /// Builds the index for one snapshot of the workspace.
    #[must_use]
    pub fn build<'a>(
        catalog: &TranslationFunctionCatalog,
        files: impl IntoIterator<Item = &'a JavaDeclarations>,
    ) -> Self {
        let mut index = Self::default();
        index.seed_catalog(catalog);

        let files: Vec<&JavaDeclarations> = files.into_iter().collect();
        let mut known: HashSet<String> = index.classes.keys().cloned().collect();
        known.extend(files.iter().flat_map(|file| file.classes.iter().map(|c| c.qualified_name.clone())));
        let is_known = |name: &str| known.contains(name);

        for file in files {
            for class in &file.classes {
                let entry = ClassEntry {
                    superclass: class.superclass.as_deref().map(|s| file.qualify(s, is_known)),
                    interfaces: class.interfaces.iter().map(|i| file.qualify(i, is_known)).collect(),
                    fields: class
                        .fields
                        .iter()
                        .map(|field| (field.name.clone(), file.qualify(&field.type_name, is_known)))
                        .collect(),
                    methods: class
                        .methods
                        .iter()
                        .map(|method| MethodEntry {
                            name: method.name.clone(),
                            parameters: method
                                .parameter_types
                                .iter()
                                .map(|ty| file.encode_type(ty, is_known))
                                .collect(),
                            varargs: method.varargs,
                            constructor: method.constructor,
                        })
                        .collect(),
                };
                index.insert(class.qualified_name.clone(), entry);
            }
        }
        index
    }

    /// Registers the owner and member of every catalog entry.
    fn seed_catalog(&mut self, catalog: &TranslationFunctionCatalog) {
        for function in catalog.functions() {
            let simple_name = function.owner_type.rsplit('.').next().unwrap_or(&function.owner_type);
            let parameters = split_signature(&function.parameter_signature);
            let entry = self.classes.entry(function.owner_type.clone()).or_default();
            entry.methods.push(MethodEntry {
                name: function.member_name.clone(),
                varargs: parameters.last().is_some_and(|p| p.starts_with('[')),
                parameters,
                constructor: function.member_name == simple_name,
            });
        }
    }

    /// Workspace declarations replace catalog stubs of the same type.
    pub fn insert(&mut self, qualified_name: String, entry: ClassEntry) {
        self.classes.insert(qualified_name, entry);
    }

    /// `true` when the type is indexed or stubbed.
    #[must_use]
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.classes.contains_key(qualified_name)
    }

    /// Entry of a qualified type name.
    #[must_use]
    pub fn get(&self, qualified_name: &str) -> Option<&ClassEntry> {
        self.classes.get(qualified_name)
    }

    /// `qualified_name` followed by its supertypes, breadth first, each once.
    #[must_use]
    pub fn ancestors(&self, qualified_name: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([qualified_name.to_string()]);
        let mut order = Vec::new();
        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(entry) = self.classes.get(&name) {
                queue.extend(entry.superclass.iter().cloned());
                queue.extend(entry.interfaces.iter().cloned());
            }
            order.push(name);
        }
        order
    }

    /// Finds the method `name` invoked with `argument_count` arguments on
    /// `owner` or one of its supertypes.
    ///
    /// A declared name also matches when `mappings` maps the written name to
    /// it on the declaring type. Returns the declaring type and the method.
    #[must_use]
    pub fn find_method(
        &self,
        owner: &str,
        name: &str,
        argument_count: usize,
        mappings: &dyn NameMapping,
    ) -> Option<(String, &MethodEntry)> {
        self.ancestors(owner).into_iter().find_map(|declaring| {
            let entry = self.classes.get(&declaring)?;
            let mapped = mappings.deobfuscate(&declaring, name);
            let method = best_overload(
                entry.methods.iter().filter(|method| {
                    !method.constructor
                        && (method.name == name || mapped.as_deref() == Some(method.name.as_str()))
                }),
                argument_count,
            )?;
            Some((declaring, method))
        })
    }

    /// Finds the constructor of `owner` invoked with `argument_count` arguments.
    #[must_use]
    pub fn find_constructor(&self, owner: &str, argument_count: usize) -> Option<&MethodEntry> {
        let entry = self.classes.get(owner)?;
        best_overload(entry.methods.iter().filter(|method| method.constructor), argument_count)
    }

    /// Type of field `name` on `owner` or a supertype.
    #[must_use]
    pub fn field_type(&self, owner: &str, name: &str) -> Option<&str> {
        self.ancestors(owner)
            .iter()
            .find_map(|declaring| self.classes.get(declaring)?.fields.get(name))
            .map(String::as_str)
    }
}

impl TypeHierarchy for ClassIndex {
    fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        sub == sup || self.ancestors(sub).iter().any(|ancestor| ancestor == sup)
    }
}

/// Exact arity wins over varargs. `None` when nothing accepts `argument_count`.
fn best_overload<'a>(
    candidates: impl Iterator<Item = &'a MethodEntry>,
    argument_count: usize,
) -> Option<&'a MethodEntry> {
    candidates
        .filter_map(|method| method.arity_rank(argument_count).map(|rank| (rank, method)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, method)| method)
}

/// Splits an encoded signature into its parameters.
///
/// `Ljava.lang.String;[Ljava.lang.Object;` → `["Ljava.lang.String;", "[Ljava.lang.Object;"]`
#[must_use]
pub fn split_signature(signature: &str) -> Vec<String> {
    let mut parameters = Vec::new();
    let mut current = String::new();
    let mut in_reference = false;
    for ch in signature.chars() {
        current.push(ch);
        match ch {
            '[' if !in_reference => {}
            'L' if !in_reference => in_reference = true,
            ';' if in_reference => {
                in_reference = false;
                parameters.push(std::mem::take(&mut current));
            }
            _ if !in_reference => parameters.push(std::mem::take(&mut current)),
            _ => {}
        }
    }
    parameters
}
