//! Condition matching: which modified files trigger a rule.

use regex::Regex;

use super::types::Condition;
use crate::errors::EngineError;

/// A rule condition with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl CompiledCondition {
    pub fn compile(rule_name: &str, condition: &Condition) -> Result<Self, EngineError> {
        let compile_all = |patterns: &[String]| -> Result<Vec<Regex>, EngineError> {
            patterns
                .iter()
                .map(|pattern| {
                    Regex::new(pattern).map_err(|source| EngineError::InvalidRegex {
                        rule: rule_name.to_string(),
                        pattern: pattern.clone(),
                        source,
                    })
                })
                .collect()
        };

        Ok(Self {
            include: compile_all(&condition.include)?,
            exclude: compile_all(condition.excludes())?,
        })
    }

    /// Files matched by any include pattern and by no exclude pattern.
    ///
    /// Files are listed in the order they were first matched, walking the
    /// include patterns in order. A file matched by several patterns appears once.
    pub fn matching_files(&self, files: &[String]) -> Vec<String> {
        let mut matches: Vec<String> = Vec::new();
        for regex in &self.include {
            for file in files {
                if regex.is_match(file) && !matches.contains(file) {
                    matches.push(file.clone());
                }
            }
        }

        if !matches.is_empty() {
            matches.retain(|file| !self.exclude.iter().any(|regex| regex.is_match(file)));
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(include: &[&str], exclude: &[&str]) -> Condition {
        Condition {
            include: include.iter().map(|s| s.to_string()).collect(),
            exclude: (!exclude.is_empty()).then(|| exclude.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn matching(include: &[&str], exclude: &[&str], names: &[&str]) -> Vec<String> {
        CompiledCondition::compile("test", &condition(include, exclude))
            .unwrap()
            .matching_files(&files(names))
    }

    #[test]
    fn test_matches_substring_not_full_path() {
        let result = matching(&["src"], &[], &["src/index.ts", "README.md"]);
        assert_eq!(result, files(&["src/index.ts"]));
    }

    #[test]
    fn test_file_matched_by_two_patterns_listed_once() {
        let result = matching(&["\\.ts", "src"], &[], &["src/index.ts"]);
        assert_eq!(result, files(&["src/index.ts"]));
    }

    #[test]
    fn test_order_follows_include_patterns() {
        let result = matching(&["\\.md$", "\\.rs$"], &[], &["lib.rs", "README.md", "main.rs"]);
        assert_eq!(result, files(&["README.md", "lib.rs", "main.rs"]));
    }

    #[test]
    fn test_global_pattern_includes_everything() {
        let listed = ["src/index.ts", ".github/workflows/review-bot.yml", "yarn-error.log"];
        let result = matching(&[".+", "src"], &[], &listed);
        assert_eq!(result, files(&listed));
    }

    #[test]
    fn test_exclude_removes_included_files() {
        let listed = ["src/index.ts", ".github/workflows/review-bot.yml", "yarn-error.log"];
        let result = matching(&[".+"], &["\\.yml"], &listed);
        assert_eq!(result, files(&["src/index.ts", "yarn-error.log"]));
    }

    #[test]
    fn test_no_include_match_is_empty() {
        let result = matching(&["^docs/"], &["\\.yml"], &["src/a.rs", "b.yml"]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_matching_equals_include_minus_exclude() {
        let listed = ["a/x.rs", "a/y.md", "b/z.rs", "b/w.md", "c.txt"];
        let included = matching(&["^a/", "\\.rs$"], &[], &listed);
        let excluded_from_included = matching(&["\\.md$"], &[], &included.iter().map(String::as_str).collect::<Vec<_>>());
        let expected: Vec<String> = included
            .iter()
            .filter(|f| !excluded_from_included.contains(f))
            .cloned()
            .collect();
        assert_eq!(matching(&["^a/", "\\.rs$"], &["\\.md$"], &listed), expected);
    }

    #[test]
    fn test_invalid_regex_names_rule_and_pattern() {
        let err = CompiledCondition::compile("broken", &condition(&["(unclosed"], &[])).unwrap_err();
        match err {
            EngineError::InvalidRegex { rule, pattern, .. } => {
                assert_eq!(rule, "broken");
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("Expected InvalidRegex, got {:?}", other),
        }
    }
}
