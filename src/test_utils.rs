//! Fixtures shared by the IDE tests.

use crate::db::I18nDatabaseImpl;
use crate::input::locale::LocaleFile;
use crate::input::source::SourceFile;
use crate::mappings::McpMappings;

/// URI of [`RUBY_GUI_SOURCE`].
pub(crate) const RUBY_GUI_URI: &str = "file:///workspace/src/main/java/ruby/RubyGui.java";

/// Three translation usages: a formatted client `I18n` call without and with
/// arguments, and a chat component whose key is missing from every locale.
pub(crate) const RUBY_GUI_SOURCE: &str = r#"package ruby;

import net.minecraft.client.resources.I18n;
import net.minecraft.util.text.TextComponentTranslation;

public class RubyGui {
    String title() {
        return I18n.format("gui.ruby.title");
    }

    String progress(int percent) {
        return I18n.format("gui.ruby.progress", percent);
    }

    Object missing() {
        return new TextComponentTranslation("gui.ruby.missing");
    }

    String short_of_arguments() {
        return I18n.format("gui.ruby.progress");
    }
}
"#;

/// URI of [`EN_US`].
pub(crate) const EN_US_URI: &str = "file:///workspace/assets/ruby/lang/en_us.lang";

/// Client texts for [`RUBY_GUI_SOURCE`].
pub(crate) const EN_US: &str = "\
gui.ruby.title=Ruby Forge
gui.ruby.progress=%d%% done
";

/// URI of [`JA_JP`].
pub(crate) const JA_JP_URI: &str = "file:///workspace/assets/ruby/lang/ja_jp.lang";

/// Japanese title only.
pub(crate) const JA_JP: &str = "gui.ruby.title=ルビー工房\n";

/// Maps `I18n.format` only.
pub(crate) const CLIENT_SRG: &str = "MD: net/minecraft/client/resources/I18n/format (Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String; net/minecraft/client/resources/I18n/func_135052_a (Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String;\n";

/// Registers a Java input.
pub(crate) fn create_source_file(db: &I18nDatabaseImpl, uri: &str, text: &str) -> SourceFile {
    SourceFile::new(db, uri.to_string(), text.to_string())
}

/// Registers a `.lang` input.
pub(crate) fn create_locale_file(
    db: &I18nDatabaseImpl,
    uri: &str,
    locale: &str,
    text: &str,
) -> LocaleFile {
    LocaleFile::new(db, uri.to_string(), locale.to_string(), text.to_string())
}

/// English and Japanese locale files.
pub(crate) fn create_locale_files(db: &I18nDatabaseImpl) -> Vec<LocaleFile> {
    vec![
        create_locale_file(db, EN_US_URI, "en_us", EN_US),
        create_locale_file(db, JA_JP_URI, "ja_jp", JA_JP),
    ]
}

/// Mappings parsed from [`CLIENT_SRG`].
#[allow(clippy::unwrap_used)]
pub(crate) fn client_mappings() -> McpMappings {
    McpMappings::parse(CLIENT_SRG).unwrap()
}
