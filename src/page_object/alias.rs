use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::error::{DefinitionError, HarnessError};
use crate::selectors::Locator;

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("valid name pattern"))
}

/// Check an alias or section name, accepting an optional leading `@`.
pub fn validate_name(kind: &'static str, name: &str) -> Result<String, DefinitionError> {
    let bare = name.strip_prefix('@').unwrap_or(name);
    if name_pattern().is_match(bare) {
        Ok(bare.to_string())
    } else {
        Err(DefinitionError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}

/// What a step refers to: a registered alias (`@name`) or a raw selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Alias(&'a str),
    Raw(&'a str),
}

pub fn parse_target(token: &str) -> Target<'_> {
    let trimmed = token.trim();
    match trimmed.strip_prefix('@') {
        Some(name) => Target::Alias(name),
        None => Target::Raw(trimmed),
    }
}

/// A named locator, fixed when its section is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub locator: Locator,
}

/// Alias name → locator for one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasRegistry {
    scope: String,
    aliases: BTreeMap<String, Alias>,
}

impl AliasRegistry {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            aliases: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, locator: Locator) -> Result<(), DefinitionError> {
        let name = validate_name("alias", name)?;
        if self.aliases.contains_key(&name) {
            return Err(DefinitionError::Duplicate {
                kind: "alias",
                scope: self.scope.clone(),
                name,
            });
        }
        self.aliases.insert(name.clone(), Alias { name, locator });
        Ok(())
    }

    /// Look up `name` (with or without `@`). Never falls back to a default.
    pub fn resolve(&self, name: &str) -> Result<&Locator, HarnessError> {
        let bare = name.strip_prefix('@').unwrap_or(name);
        self.aliases
            .get(bare)
            .map(|alias| &alias.locator)
            .ok_or_else(|| HarnessError::UnknownAlias {
                scope: self.scope.clone(),
                alias: bare.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.aliases.contains_key(name.strip_prefix('@').unwrap_or(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> AliasRegistry {
        let mut registry = AliasRegistry::new("Carina");
        registry.register("@splashScreen", Locator::css("#splash-screen")).unwrap();
        registry.register("splashClose", Locator::css("#splash-close")).unwrap();
        registry
    }

    #[test]
    fn test_parse_target_supported_formats() {
        assert_eq!(parse_target("@splashClose"), Target::Alias("splashClose"));
        assert_eq!(parse_target(" @video "), Target::Alias("video"));
        assert_eq!(parse_target("html"), Target::Raw("html"));
    }

    #[test]
    fn test_resolve_with_and_without_prefix() {
        let registry = registry();
        assert_eq!(registry.resolve("@splashScreen").unwrap(), &Locator::css("#splash-screen"));
        assert_eq!(registry.resolve("splashClose").unwrap(), &Locator::css("#splash-close"));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let registry = registry();
        let first = registry.resolve("@splashClose").unwrap().clone();
        let second = registry.resolve("@splashClose").unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_alias_does_not_fall_back() {
        let err = registry().resolve("@videoDialog").unwrap_err();
        match err {
            HarnessError::UnknownAlias { scope, alias } => {
                assert_eq!(scope, "Carina");
                assert_eq!(alias, "videoDialog");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let mut registry = registry();
        let err = registry
            .register("@splashClose", Locator::css(".other"))
            .unwrap_err();
        assert_eq!(
            err,
            DefinitionError::Duplicate {
                kind: "alias",
                scope: "Carina".into(),
                name: "splashClose".into(),
            }
        );
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(validate_name("alias", "@").is_err());
        assert!(validate_name("alias", "9lives").is_err());
        assert!(validate_name("alias", "has space").is_err());
        assert_eq!(validate_name("section", "info-sheet").unwrap(), "info-sheet");
    }
}
