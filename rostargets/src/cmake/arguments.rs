// SPDX-License-Identifier: GPL-3.0-or-later

//! Keyword argument splitting for CMake directives.
//!
//! CMake commands mix positional arguments with upper-case keywords. The same
//! positional slot means different things depending on which keywords precede
//! or follow it, so every directive handler declares the keywords it knows
//! about as an [`OptionSchema`]. The splitter consumes the argument list once,
//! and separates the recognized keywords (with their values) from the
//! remaining positional arguments.

use std::collections::{HashMap, HashSet};

/// Describes HOW a keyword consumes arguments from the directive call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Presence only: `EXCLUDE_FROM_ALL`, `APPEND`.
    Flag,
    /// Takes the next argument as its value: `RELATIVE <path>`.
    Single,
    /// Takes every following argument until the next keyword: `PROPERTIES k v k v`.
    Multi,
}

/// A keyword definition: the literal keyword and the way it consumes arguments.
#[derive(Debug, Clone, Copy)]
pub struct OptionRule {
    pub keyword: &'static str,
    pub kind: OptionKind,
}

impl OptionRule {
    pub const fn flag(keyword: &'static str) -> Self {
        Self { keyword, kind: OptionKind::Flag }
    }

    pub const fn single(keyword: &'static str) -> Self {
        Self { keyword, kind: OptionKind::Single }
    }

    pub const fn multi(keyword: &'static str) -> Self {
        Self { keyword, kind: OptionKind::Multi }
    }
}

/// The declared keywords of one directive.
#[derive(Debug, Clone, Copy)]
pub struct OptionSchema {
    rules: &'static [OptionRule],
}

impl OptionSchema {
    /// A schema without keywords: every argument is positional.
    pub const EMPTY: OptionSchema = OptionSchema { rules: &[] };

    pub const fn new(rules: &'static [OptionRule]) -> Self {
        Self { rules }
    }

    fn rule(&self, argument: &str) -> Option<&'static OptionRule> {
        self.rules.iter().find(|rule| rule.keyword == argument)
    }
}

/// The keywords found in a directive call, with their values.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedOptions {
    flags: HashSet<&'static str>,
    values: HashMap<&'static str, Vec<String>>,
}

impl ParsedOptions {
    /// Returns true if the keyword was present.
    ///
    /// Valued keywords count as present even when no value followed them.
    pub fn flag(&self, keyword: &str) -> bool {
        self.flags.contains(keyword) || self.values.contains_key(keyword)
    }

    /// The value of a single-value keyword, if it was given one.
    pub fn single(&self, keyword: &str) -> Option<&str> {
        self.values.get(keyword).and_then(|values| values.first()).map(String::as_str)
    }

    /// The values of a multi-value keyword, if it was present.
    pub fn multi(&self, keyword: &str) -> Option<&[String]> {
        self.values.get(keyword).map(Vec::as_slice)
    }
}

/// Strategy to split the raw arguments of a directive.
///
/// The interpreter owns one and every handler goes through it, so a flavor
/// can change how keywords are recognized without touching the handlers.
pub trait ArgumentSplitter {
    fn split(&self, arguments: &[String], schema: &OptionSchema) -> (ParsedOptions, Vec<String>);
}

/// The default splitter: keywords are matched exactly (case-sensitive, as CMake does).
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordSplitter;

impl ArgumentSplitter for KeywordSplitter {
    fn split(&self, arguments: &[String], schema: &OptionSchema) -> (ParsedOptions, Vec<String>) {
        split(arguments, schema)
    }
}

/// Separates the keywords declared in the schema from the positional arguments.
///
/// A repeated multi-value keyword accumulates its values; a repeated
/// single-value keyword keeps the last value.
pub fn split(arguments: &[String], schema: &OptionSchema) -> (ParsedOptions, Vec<String>) {
    let mut options = ParsedOptions::default();
    let mut positional = Vec::new();

    let mut index = 0;
    while index < arguments.len() {
        let current = &arguments[index];
        index += 1;

        let Some(rule) = schema.rule(current) else {
            positional.push(current.clone());
            continue;
        };
        match rule.kind {
            OptionKind::Flag => {
                options.flags.insert(rule.keyword);
            }
            OptionKind::Single => {
                let value = arguments.get(index).filter(|next| schema.rule(next).is_none());
                let entry = options.values.entry(rule.keyword).or_default();
                entry.clear();
                if let Some(value) = value {
                    entry.push(value.clone());
                    index += 1;
                }
            }
            OptionKind::Multi => {
                let entry = options.values.entry(rule.keyword).or_default();
                while let Some(next) = arguments.get(index) {
                    if schema.rule(next).is_some() {
                        break;
                    }
                    entry.push(next.clone());
                    index += 1;
                }
            }
        }
    }

    (options, positional)
}

#[cfg(test)]
mod test {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    const LIBRARY: OptionSchema = OptionSchema::new(&[
        OptionRule::flag("SHARED"),
        OptionRule::flag("STATIC"),
        OptionRule::flag("EXCLUDE_FROM_ALL"),
    ]);

    #[test]
    fn test_flags_are_removed_from_positionals() {
        let (options, positional) = split(&strings(&["foo", "SHARED", "a.cpp", "b.cpp"]), &LIBRARY);

        assert!(options.flag("SHARED"));
        assert!(!options.flag("STATIC"));
        assert!(!options.flag("EXCLUDE_FROM_ALL"));
        assert_eq!(positional, strings(&["foo", "a.cpp", "b.cpp"]));
    }

    #[test]
    fn test_flag_after_sources_is_still_recognized() {
        let (options, positional) = split(&strings(&["foo", "a.cpp", "EXCLUDE_FROM_ALL"]), &LIBRARY);

        assert!(options.flag("EXCLUDE_FROM_ALL"));
        assert_eq!(positional, strings(&["foo", "a.cpp"]));
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        let (options, positional) = split(&strings(&["foo", "shared"]), &LIBRARY);

        assert!(!options.flag("SHARED"));
        assert_eq!(positional, strings(&["foo", "shared"]));
    }

    const FILE: OptionSchema = OptionSchema::new(&[
        OptionRule::flag("GLOB"),
        OptionRule::single("RELATIVE"),
        OptionRule::single("LIST_DIRECTORIES"),
    ]);

    #[test]
    fn test_single_value_consumes_next_argument() {
        let (options, positional) =
            split(&strings(&["GLOB", "SOURCES", "RELATIVE", "/opt/src", "*.cpp"]), &FILE);

        assert!(options.flag("GLOB"));
        assert_eq!(options.single("RELATIVE"), Some("/opt/src"));
        assert_eq!(positional, strings(&["SOURCES", "*.cpp"]));
    }

    #[test]
    fn test_single_value_does_not_swallow_keyword() {
        let (options, positional) = split(&strings(&["RELATIVE", "GLOB", "SOURCES"]), &FILE);

        assert!(options.flag("RELATIVE"));
        assert_eq!(options.single("RELATIVE"), None);
        assert!(options.flag("GLOB"));
        assert_eq!(positional, strings(&["SOURCES"]));
    }

    const PROPERTIES: OptionSchema =
        OptionSchema::new(&[OptionRule::multi("PROPERTIES"), OptionRule::flag("FORCE")]);

    #[test]
    fn test_multi_value_stops_at_next_keyword() {
        let (options, positional) = split(
            &strings(&["target", "PROPERTIES", "OUTPUT_NAME", "foo", "FORCE"]),
            &PROPERTIES,
        );

        assert_eq!(options.multi("PROPERTIES"), Some(strings(&["OUTPUT_NAME", "foo"]).as_slice()));
        assert!(options.flag("FORCE"));
        assert_eq!(positional, strings(&["target"]));
    }

    #[test]
    fn test_missing_multi_value_keyword() {
        let (options, positional) = split(&strings(&["target"]), &PROPERTIES);

        assert_eq!(options.multi("PROPERTIES"), None);
        assert_eq!(positional, strings(&["target"]));
    }

    #[test]
    fn test_empty_schema_keeps_everything() {
        let arguments = strings(&["SHARED", "a", "b"]);
        let (options, positional) = KeywordSplitter.split(&arguments, &OptionSchema::EMPTY);

        assert_eq!(options, ParsedOptions::default());
        assert_eq!(positional, arguments);
    }
}
