//! Catalog of the Minecraft functions that take a translation key.

use crate::translations::host::{
    NameMapping,
    ResolvedCall,
    TypeHierarchy,
};

/// Client-side `I18n` (`net.minecraft.client.resources.I18n`).
pub const I18N_CLIENT_CLASS: &str = "net.minecraft.client.resources.I18n";
/// Server-side `I18n` (`net.minecraft.util.text.translation.I18n`).
pub const I18N_COMMON_CLASS: &str = "net.minecraft.util.text.translation.I18n";
/// `TextComponentTranslation` constructor.
pub const TRANSLATION_COMPONENT_CONSTRUCTOR: &str = "TextComponentTranslation";
/// Chat component carrying a key and format arguments.
pub const TRANSLATION_COMPONENT_CLASS: &str = "net.minecraft.util.text.TextComponentTranslation";
/// `CommandException` constructor.
pub const COMMAND_EXCEPTION_CONSTRUCTOR: &str = "CommandException";
/// Command error carrying a key and format arguments.
pub const COMMAND_EXCEPTION_CLASS: &str = "net.minecraft.command.CommandException";
/// Owner of `setUnlocalizedName` for blocks.
pub const BLOCK_CLASS: &str = "net.minecraft.block.Block";
/// Owner of `setUnlocalizedName` for items.
pub const ITEM_CLASS: &str = "net.minecraft.item.Item";

/// `I18n.format`
pub const FORMAT: &str = "func_135052_a";
/// `I18n.translateToLocal`
pub const TRANSLATE_TO_LOCAL: &str = "func_74838_a";
/// `I18n.translateToLocalFormatted`
pub const TRANSLATE_TO_LOCAL_FORMATTED: &str = "func_74837_a";
/// `Block.setBlockName` / `setUnlocalizedName`
pub const SET_BLOCK_NAME: &str = "func_149663_c";
/// `Item.setUnlocalizedName`
pub const SET_ITEM_NAME: &str = "func_77655_b";

/// Descriptor of `(String)`.
const STRING_PARAM: &str = "Ljava.lang.String;";
/// Descriptor of `(String, Object...)`.
const STRING_VARARGS_PARAMS: &str = "Ljava.lang.String;[Ljava.lang.Object;";

/// A function or constructor whose argument is a translation key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationFunction {
    /// Fully-qualified declaring type.
    pub owner_type: String,
    /// Method or constructor name. Stable (SRG) name when `obfuscated_name` is set.
    pub member_name: String,
    /// Encoded parameter types used to pick the right overload.
    pub parameter_signature: String,
    /// Position of the key among the call arguments.
    pub key_argument_index: usize,
    /// Arguments after the key are format substitutions.
    pub formatting: bool,
    /// The whole argument list is folded, not just the key.
    pub folds_parameters: bool,
    /// The call assigns a name rather than looking one up.
    pub setter: bool,
    /// `member_name` has to be compared through the name mapping.
    pub obfuscated_name: bool,
    /// Prepended to the written key, e.g. `tile.` for block names.
    pub key_prefix: String,
    /// Appended to the written key, e.g. `.name`.
    pub key_suffix: String,
}

impl TranslationFunction {
    /// Plain entry: no formatting, key argument folded on its own.
    #[must_use]
    pub fn new(
        owner_type: &str,
        member_name: &str,
        parameter_signature: &str,
        key_argument_index: usize,
    ) -> Self {
        Self {
            owner_type: owner_type.to_string(),
            member_name: member_name.to_string(),
            parameter_signature: parameter_signature.to_string(),
            key_argument_index,
            formatting: false,
            folds_parameters: false,
            setter: false,
            obfuscated_name: false,
            key_prefix: String::new(),
            key_suffix: String::new(),
        }
    }

    /// Sets [`Self::formatting`].
    #[must_use]
    pub const fn formatting(mut self) -> Self {
        self.formatting = true;
        self
    }

    /// Sets [`Self::folds_parameters`].
    #[must_use]
    pub const fn folds_parameters(mut self) -> Self {
        self.folds_parameters = true;
        self
    }

    /// Sets [`Self::setter`].
    #[must_use]
    pub const fn setter(mut self) -> Self {
        self.setter = true;
        self
    }

    /// Sets [`Self::obfuscated_name`].
    #[must_use]
    pub const fn obfuscated_name(mut self) -> Self {
        self.obfuscated_name = true;
        self
    }

    /// Sets [`Self::key_prefix`] and [`Self::key_suffix`].
    #[must_use]
    pub fn decorated(mut self, prefix: &str, suffix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self.key_suffix = suffix.to_string();
        self
    }

    /// Applies `key_prefix` and `key_suffix` to a key.
    #[must_use]
    pub fn decorate(&self, key: &str) -> String {
        format!("{}{key}{}", self.key_prefix, self.key_suffix)
    }

    /// Checks whether `call` invokes this function.
    pub fn matches(
        &self,
        call: &ResolvedCall,
        hierarchy: &dyn TypeHierarchy,
        mappings: &dyn NameMapping,
    ) -> bool {
        if call.parameter_signature != self.parameter_signature {
            return false;
        }
        if !hierarchy.is_subtype(&call.owner_type, &self.owner_type) {
            return false;
        }
        if self.obfuscated_name {
            mappings
                .deobfuscate(&self.owner_type, &call.member_name)
                .is_some_and(|name| name == self.member_name)
        } else {
            call.member_name == self.member_name
        }
    }
}

/// Ordered, immutable list of [`TranslationFunction`]s.
///
/// Order is priority: the first entry that matches a call wins.
#[derive(Debug, Clone)]
pub struct TranslationFunctionCatalog {
    /// In priority order.
    functions: Vec<TranslationFunction>,
}

impl TranslationFunctionCatalog {
    /// Catalog with `functions` in priority order.
    #[must_use]
    pub const fn new(functions: Vec<TranslationFunction>) -> Self {
        Self { functions }
    }

    /// Entries in priority order.
    #[must_use]
    pub fn functions(&self) -> &[TranslationFunction] {
        &self.functions
    }

    /// Finds the first entry matching `call`.
    #[must_use]
    pub fn lookup(
        &self,
        call: &ResolvedCall,
        hierarchy: &dyn TypeHierarchy,
        mappings: &dyn NameMapping,
    ) -> Option<&TranslationFunction> {
        self.functions.iter().find(|function| function.matches(call, hierarchy, mappings))
    }
}

impl Default for TranslationFunctionCatalog {
    fn default() -> Self {
        Self::new(vec![
            TranslationFunction::new(I18N_CLIENT_CLASS, FORMAT, STRING_VARARGS_PARAMS, 0)
                .formatting()
                .obfuscated_name(),
            TranslationFunction::new(I18N_COMMON_CLASS, TRANSLATE_TO_LOCAL, STRING_PARAM, 0)
                .obfuscated_name(),
            TranslationFunction::new(
                I18N_COMMON_CLASS,
                TRANSLATE_TO_LOCAL_FORMATTED,
                STRING_VARARGS_PARAMS,
                0,
            )
            .formatting()
            .obfuscated_name(),
            TranslationFunction::new(
                TRANSLATION_COMPONENT_CLASS,
                TRANSLATION_COMPONENT_CONSTRUCTOR,
                STRING_VARARGS_PARAMS,
                0,
            )
            .formatting()
            .folds_parameters(),
            TranslationFunction::new(
                COMMAND_EXCEPTION_CLASS,
                COMMAND_EXCEPTION_CONSTRUCTOR,
                STRING_VARARGS_PARAMS,
                0,
            )
            .formatting()
            .folds_parameters(),
            TranslationFunction::new(BLOCK_CLASS, SET_BLOCK_NAME, STRING_PARAM, 0)
                .setter()
                .folds_parameters()
                .decorated("tile.", ".name")
                .obfuscated_name(),
            TranslationFunction::new(ITEM_CLASS, SET_ITEM_NAME, STRING_PARAM, 0)
                .setter()
                .folds_parameters()
                .decorated("item.", ".name")
                .obfuscated_name(),
        ])
    }
}
