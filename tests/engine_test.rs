//! Recognition over real Java sources, mappings and locale files.

#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]
#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use std::sync::Arc;

use googletest::prelude::*;
use mc_i18n_language_server::db::I18nDatabaseImpl;
use mc_i18n_language_server::ide::goto_definition::resolve_reference;
use mc_i18n_language_server::ide::snapshot::WorkspaceSnapshot;
use mc_i18n_language_server::input::locale::{
    DEFAULT_LOCALE,
    LocaleFile,
};
use mc_i18n_language_server::input::source::SourceFile;
use mc_i18n_language_server::mappings::McpMappings;
use mc_i18n_language_server::types::SourcePosition;
use pretty_assertions::assert_eq;

const RUBY_BLOCK: &str = r#"package ruby;

import net.minecraft.block.Block;
import net.minecraft.client.resources.I18n;

public class RubyBlock extends Block {
    private static final String NAME = "ruby";

    public RubyBlock() {
        setUnlocalizedName(NAME);
    }

    String describe(String type) {
        return I18n.format("item." + type + ".name");
    }

    String title() {
        return I18n.format("gui.ruby.title");
    }
}
"#;

const SRG: &str = "\
MD: net/minecraft/block/Block/setUnlocalizedName (Ljava/lang/String;)Lnet/minecraft/block/Block; net/minecraft/block/Block/func_149663_c (Ljava/lang/String;)Lnet/minecraft/block/Block;
MD: net/minecraft/client/resources/I18n/format (Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String; net/minecraft/client/resources/I18n/func_135052_a (Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String;
";

const EN_US: &str = "\
tile.ruby.name=Ruby Block
item.ruby_gem.name=Ruby Gem
item.ruby_ore.name=Ruby Ore
gui.ruby.title=Ruby Forge
commands.ruby.usage=/ruby <gem>
";

struct Workspace {
    db: I18nDatabaseImpl,
    source: SourceFile,
    locales: Vec<LocaleFile>,
}

fn workspace() -> Workspace {
    workspace_with("file:///workspace/src/main/java/ruby/RubyBlock.java", RUBY_BLOCK)
}

fn workspace_with(uri: &str, text: &str) -> Workspace {
    let db = I18nDatabaseImpl::default();
    let source = SourceFile::new(&db, uri.to_string(), text.to_string());
    let locales = vec![LocaleFile::new(
        &db,
        "file:///workspace/assets/ruby/lang/en_us.lang".to_string(),
        "en_us".to_string(),
        EN_US.to_string(),
    )];
    Workspace { db, source, locales }
}

fn snapshot(workspace: &Workspace, mappings: Option<McpMappings>) -> WorkspaceSnapshot {
    WorkspaceSnapshot::build(
        &workspace.db,
        [&workspace.source],
        &workspace.locales,
        DEFAULT_LOCALE,
        mappings.map(Arc::new),
    )
}

#[googletest::test]
fn recognizes_setter_constant_and_variable_keys() {
    let workspace = workspace();
    let snapshot = snapshot(&workspace, Some(McpMappings::parse(SRG).unwrap()));

    let usages = snapshot.usages(&workspace.db, workspace.source);

    let summary: Vec<(&str, Option<&str>, bool)> = usages
        .iter()
        .map(|u| (u.key.as_str(), u.resolved_text.as_deref(), u.contains_variable))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("gui.ruby.title", Some("Ruby Forge"), false),
            ("tile.ruby.name", Some("Ruby Block"), false),
            ("item.$VARIABLE.name", Some("Ruby Gem"), true),
        ]
    );
}

#[googletest::test]
fn obfuscated_names_do_not_match_without_mappings() {
    let workspace = workspace();
    let snapshot = snapshot(&workspace, None);

    expect_that!(snapshot.usages(&workspace.db, workspace.source), is_empty());
}

#[googletest::test]
fn setter_folds_its_argument_list() {
    let workspace = workspace();
    let snapshot = snapshot(&workspace, Some(McpMappings::parse(SRG).unwrap()));

    let regions = snapshot.fold_regions(&workspace.db, workspace.source);
    let setter = regions.iter().find(|region| region.key == "tile.ruby.name").unwrap();

    expect_that!(setter.group_id, eq("mc.i18n.tile.ruby.name"));
    expect_that!(setter.display_text, eq("\"Ruby Block\""));
    // `setUnlocalizedName(NAME)` on line 9: only `NAME` is folded.
    expect_that!(setter.range.start, eq(SourcePosition { line: 9, character: 27 }));
    expect_that!(setter.range.end, eq(SourcePosition { line: 9, character: 31 }));
}

#[googletest::test]
fn variable_reference_resolves_to_every_matching_key() {
    let workspace = workspace();
    let snapshot = snapshot(&workspace, Some(McpMappings::parse(SRG).unwrap()));

    // Inside `"item."` on line 13.
    let reference = snapshot
        .reference_at(&workspace.db, workspace.source, SourcePosition { line: 13, character: 29 })
        .unwrap();
    let locations = resolve_reference(&reference, snapshot.locales());

    expect_that!(reference.pattern_key, eq("item.$VARIABLE.name"));
    let lines: Vec<u32> = locations.iter().map(|location| location.range.start.line).collect();
    assert_eq!(lines, vec![1, 2]);
}

const RUBY_EXCEPTION: &str = r#"package ruby;

import net.minecraft.command.CommandException;

public class RubyException extends CommandException {
    public RubyException() {
        super("commands.ruby.usage");
    }

    public RubyException(String detail) {
        this();
    }
}
"#;

#[googletest::test]
fn super_constructor_call_is_a_usage() {
    let workspace =
        workspace_with("file:///workspace/src/main/java/ruby/RubyException.java", RUBY_EXCEPTION);
    let snapshot = snapshot(&workspace, None);

    let usages = snapshot.usages(&workspace.db, workspace.source);

    let summary: Vec<(&str, Option<&str>)> =
        usages.iter().map(|u| (u.key.as_str(), u.resolved_text.as_deref())).collect();
    assert_eq!(summary, vec![("commands.ruby.usage", Some("/ruby <gem>"))]);
    expect_that!(usages[0].range.start, eq(SourcePosition { line: 6, character: 14 }));
}
