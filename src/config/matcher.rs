//! File pattern matcher for Java sources and `.lang` files.

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};

use super::I18nSettings;

/// A configured glob pattern could not be compiled.
#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    /// Bad entry in `includePatterns`.
    #[error("Invalid source include pattern '{pattern}': {source}")]
    InvalidSourceIncludePattern {
        /// The pattern as configured.
        pattern: String,
        /// Why it did not compile.
        #[source]
        source: globset::Error,
    },

    /// Bad entry in `excludePatterns`.
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidExcludePattern {
        /// The pattern as configured.
        pattern: String,
        /// Why it did not compile.
        #[source]
        source: globset::Error,
    },

    /// Bad `langFilePattern`.
    #[error("Invalid lang file pattern '{pattern}': {source}")]
    InvalidLangPattern {
        /// The pattern as configured.
        pattern: String,
        /// Why it did not compile.
        #[source]
        source: globset::Error,
    },

    /// The compiled patterns could not be combined.
    #[error("Failed to build glob set: {0}")]
    GlobSetBuild(#[from] globset::Error),
}

/// Matches files against configured glob patterns.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    /// Patterns are matched against paths relative to this.
    workspace_root: PathBuf,
    /// `includePatterns`
    source_include_set: GlobSet,
    /// `excludePatterns`
    exclude_set: GlobSet,
    /// `langFilePattern`
    lang_set: GlobSet,
}

impl FileMatcher {
    /// Creates a new matcher from settings.
    pub fn new(workspace_root: PathBuf, settings: &I18nSettings) -> Result<Self, MatcherError> {
        let source_include_set =
            Self::build_glob_set(&settings.include_patterns, |pattern, source| {
                MatcherError::InvalidSourceIncludePattern { pattern, source }
            })?;

        let exclude_set = Self::build_glob_set(&settings.exclude_patterns, |pattern, source| {
            MatcherError::InvalidExcludePattern { pattern, source }
        })?;

        let lang_set = Self::build_glob_set(
            std::slice::from_ref(&settings.lang_file_pattern),
            |pattern, source| MatcherError::InvalidLangPattern { pattern, source },
        )?;

        Ok(Self { workspace_root, source_include_set, exclude_set, lang_set })
    }

    /// Compiles `patterns`, reporting the first bad one through `make_error`.
    fn build_glob_set<F>(patterns: &[String], make_error: F) -> Result<GlobSet, MatcherError>
    where
        F: Fn(String, globset::Error) -> MatcherError,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| make_error(pattern.clone(), e))?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }

    /// Root the patterns are relative to.
    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Returns true if the path matches `includePatterns` but not `excludePatterns`.
    ///
    /// The path must be absolute and under the workspace root.
    #[must_use]
    pub fn is_source_file(&self, absolute_path: &Path) -> bool {
        let Some(relative_path) = absolute_path.strip_prefix(&self.workspace_root).ok() else {
            return false;
        };

        self.is_source_file_relative(relative_path)
    }

    /// Returns true if the path matches `includePatterns` but not `excludePatterns`.
    ///
    /// The path must be relative to the workspace root.
    #[must_use]
    pub fn is_source_file_relative(&self, relative_path: &Path) -> bool {
        self.source_include_set.is_match(relative_path) && !self.exclude_set.is_match(relative_path)
    }

    /// Returns true if the path matches `langFilePattern` but not `excludePatterns`.
    ///
    /// The path must be absolute and under the workspace root.
    #[must_use]
    pub fn is_lang_file(&self, absolute_path: &Path) -> bool {
        let Some(relative_path) = absolute_path.strip_prefix(&self.workspace_root).ok() else {
            return false;
        };

        self.is_lang_file_relative(relative_path)
    }

    /// Returns true if the path matches `langFilePattern` but not `excludePatterns`.
    ///
    /// The path must be relative to the workspace root.
    #[must_use]
    pub fn is_lang_file_relative(&self, relative_path: &Path) -> bool {
        self.lang_set.is_match(relative_path) && !self.exclude_set.is_match(relative_path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::path::PathBuf;

    use rstest::rstest;

    use super::*;
    use crate::config::I18nSettings;

    fn create_settings(
        source_include: &[&str],
        exclude: &[&str],
        lang_pattern: &str,
    ) -> I18nSettings {
        I18nSettings {
            include_patterns: source_include.iter().copied().map(String::from).collect(),
            exclude_patterns: exclude.iter().copied().map(String::from).collect(),
            lang_file_pattern: lang_pattern.to_string(),
            ..I18nSettings::default()
        }
    }

    #[rstest]
    fn is_source_file_with_default_patterns() {
        let settings = I18nSettings::default();
        let matcher =
            FileMatcher::new(PathBuf::from("/workspace"), &settings).expect("valid patterns");

        assert!(matcher.is_source_file(Path::new("/workspace/src/main/java/mod/RubyMod.java")));
        assert!(matcher.is_source_file(Path::new("/workspace/Main.java")));

        assert!(!matcher.is_source_file(Path::new("/workspace/build.gradle")));
        assert!(!matcher.is_source_file(Path::new("/workspace/build/tmp/Generated.java")));
        assert!(!matcher.is_source_file(Path::new("/workspace/.gradle/caches/Cached.java")));
    }

    #[rstest]
    fn is_source_file_with_exclude_patterns() {
        let settings = create_settings(&["src/**/*.java"], &["**/generated/**"], "**/*.lang");
        let matcher =
            FileMatcher::new(PathBuf::from("/workspace"), &settings).expect("valid patterns");

        assert!(matcher.is_source_file(Path::new("/workspace/src/main/java/A.java")));
        assert!(!matcher.is_source_file(Path::new("/workspace/src/generated/B.java")));
        assert!(!matcher.is_source_file(Path::new("/workspace/other/C.java")));
    }

    #[rstest]
    fn is_source_file_outside_workspace() {
        let settings = I18nSettings::default();
        let matcher =
            FileMatcher::new(PathBuf::from("/workspace"), &settings).expect("valid patterns");

        assert!(!matcher.is_source_file(Path::new("/other/src/Main.java")));
        assert!(!matcher.is_source_file(Path::new("/Main.java")));
    }

    #[rstest]
    fn is_source_file_relative_works() {
        let settings = create_settings(&["**/*.java"], &[], "**/*.lang");
        let matcher =
            FileMatcher::new(PathBuf::from("/workspace"), &settings).expect("valid patterns");

        assert!(matcher.is_source_file_relative(Path::new("src/Main.java")));
        assert!(!matcher.is_source_file_relative(Path::new("src/Main.kt")));
    }

    #[rstest]
    fn is_lang_file_with_default_pattern() {
        let settings = I18nSettings::default();
        let matcher =
            FileMatcher::new(PathBuf::from("/workspace"), &settings).expect("valid patterns");

        assert!(matcher.is_lang_file(Path::new(
            "/workspace/src/main/resources/assets/ruby/lang/en_us.lang"
        )));
        assert!(matcher.is_lang_file(Path::new("/workspace/assets/ruby/lang/ja_jp.lang")));

        assert!(!matcher.is_lang_file(Path::new("/workspace/assets/ruby/lang/en_us.json")));
        assert!(!matcher.is_lang_file(Path::new("/workspace/lang/en_us.lang")));
        assert!(!matcher.is_lang_file(Path::new(
            "/workspace/build/resources/main/assets/ruby/lang/en_us.lang"
        )));
    }

    #[rstest]
    fn is_lang_file_outside_workspace() {
        let settings = I18nSettings::default();
        let matcher =
            FileMatcher::new(PathBuf::from("/workspace"), &settings).expect("valid patterns");

        assert!(!matcher.is_lang_file(Path::new("/other/assets/ruby/lang/en_us.lang")));
    }

    #[rstest]
    fn is_lang_file_relative_works() {
        let settings = create_settings(&["**/*.java"], &[], "lang/*.lang");
        let matcher =
            FileMatcher::new(PathBuf::from("/workspace"), &settings).expect("valid patterns");

        assert!(matcher.is_lang_file_relative(Path::new("lang/en_us.lang")));
        assert!(!matcher.is_lang_file_relative(Path::new("src/en_us.lang")));
    }

    #[rstest]
    #[case::source(&["**/*.{java"], &[], "**/*.lang")]
    #[case::exclude(&["**/*.java"], &["[invalid"], "**/*.lang")]
    #[case::lang(&["**/*.java"], &[], "**/*.{lang")]
    fn new_with_invalid_pattern(
        #[case] source_include: &[&str],
        #[case] exclude: &[&str],
        #[case] lang_pattern: &str,
    ) {
        let settings = create_settings(source_include, exclude, lang_pattern);

        let result = FileMatcher::new(PathBuf::from("/workspace"), &settings);

        match result {
            Err(MatcherError::InvalidSourceIncludePattern { pattern, .. }) => {
                assert_eq!(pattern, "**/*.{java");
            }
            Err(MatcherError::InvalidExcludePattern { pattern, .. }) => {
                assert_eq!(pattern, "[invalid");
            }
            Err(MatcherError::InvalidLangPattern { pattern, .. }) => {
                assert_eq!(pattern, "**/*.{lang");
            }
            other => panic!("expected a pattern error, got {other:?}"),
        }
    }

    #[rstest]
    fn workspace_root_accessor() {
        let settings = I18nSettings::default();
        let matcher =
            FileMatcher::new(PathBuf::from("/workspace"), &settings).expect("valid patterns");

        assert_eq!(matcher.workspace_root(), Path::new("/workspace"));
    }
}
