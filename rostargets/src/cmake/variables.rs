// SPDX-License-Identifier: GPL-3.0-or-later

//! The variable environment of a listfile evaluation.
//!
//! Values are plain strings. Lists use the CMake convention of a single string
//! with `;` separating the elements. Beside the user-visible variables, the
//! environment carries a few bookkeeping keys (current listfile, current line,
//! current directory relative to the package root) that the interpreter and the
//! directive handlers read.
//!
//! An environment is never shared between a listfile and the listfiles it
//! includes: [`Variables::derive`] hands out an independent copy, so changes
//! made by a nested listfile never leak back into its parent.

use std::collections::HashMap;
use std::fmt;

/// Separator of list elements inside a variable value.
pub const LIST_SEPARATOR: &str = ";";

/// Absolute path of the listfile being evaluated.
pub const KEY_CURRENT_LIST_FILE: &str = "CMAKE_CURRENT_LIST_FILE";
/// Line number of the directive being evaluated.
pub const KEY_CURRENT_LIST_LINE: &str = "CMAKE_CURRENT_LIST_LINE";
/// Directory of the listfile being evaluated, relative to the package root.
pub const KEY_CURRENT_DIRECTORY: &str = "ROSTARGETS_CURRENT_DIRECTORY";
/// Space separated include directories collected by `include_directories`.
pub const KEY_INCLUDE_DIRECTORIES: &str = "ROSTARGETS_INCLUDE_DIRECTORIES";

pub const KEY_PROJECT_NAME: &str = "PROJECT_NAME";
pub const KEY_PROJECT_VERSION: &str = "PROJECT_VERSION";
pub const KEY_PROJECT_SOURCE_DIR: &str = "PROJECT_SOURCE_DIR";
pub const KEY_SOURCE_DIR: &str = "CMAKE_SOURCE_DIR";
pub const KEY_CURRENT_SOURCE_DIR: &str = "CMAKE_CURRENT_SOURCE_DIR";
pub const KEY_BINARY_DIR: &str = "CMAKE_BINARY_DIR";
pub const KEY_CURRENT_BINARY_DIR: &str = "CMAKE_CURRENT_BINARY_DIR";
pub const KEY_INSTALL_PREFIX: &str = "CMAKE_INSTALL_PREFIX";
pub const KEY_CATKIN_DEVEL_PREFIX: &str = "CATKIN_DEVEL_PREFIX";

/// Stand-in value for properties that are needed syntactically but never inspected.
pub const DUMMY_VALUE: &str = "__dummy_property_value__";

/// Splits a list value into its non-empty elements.
///
/// A separator escaped with a backslash is not an element boundary; the
/// element keeps the escape, the way CMake keeps it.
pub fn split_list(value: &str) -> Vec<String> {
    let mut elements = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in value.chars() {
        if c == ';' && !escaped {
            elements.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
        escaped = c == '\\' && !escaped;
    }
    elements.push(current);
    elements.retain(|element| !element.is_empty());
    elements
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Variables {
    values: HashMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Binds the elements as a list value.
    pub fn set_list<I, S>(&mut self, name: impl Into<String>, elements: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let value = elements
            .into_iter()
            .map(|element| element.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);
        self.set(name, value);
    }

    /// Appends the elements to a list value, creating the variable when absent.
    pub fn append<I, S>(&mut self, name: &str, elements: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut current: Vec<String> = self.list(name);
        current.extend(elements.into_iter().map(|element| element.as_ref().to_string()));
        self.set_list(name, current);
    }

    /// The elements of a list value; empty when the variable is absent.
    pub fn list(&self, name: &str) -> Vec<String> {
        self.get(name).map(split_list).unwrap_or_default()
    }

    /// Clears the variable. CMake treats an unset variable as an empty one.
    pub fn unset(&mut self, name: &str) {
        self.values.insert(name.to_string(), String::new());
    }

    /// Produces an independent copy with the given keys overwritten.
    pub fn derive<I, K, V>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut child = self.clone();
        for (key, value) in overrides {
            child.set(key, value);
        }
        child
    }

    /// The include directories collected so far, in declaration order.
    pub fn include_directories(&self) -> Vec<String> {
        self.get(KEY_INCLUDE_DIRECTORIES)
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Directory of the current listfile relative to the package root, if not the root itself.
    pub fn current_directory(&self) -> Option<&str> {
        self.get(KEY_CURRENT_DIRECTORY).filter(|value| !value.is_empty())
    }

    pub fn current_line(&self) -> usize {
        self.get(KEY_CURRENT_LIST_LINE)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub fn current_list_file(&self) -> &str {
        self.get(KEY_CURRENT_LIST_FILE).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut result = Self::new();
        for (key, value) in iter {
            result.set(key, value);
        }
        result
    }
}

impl fmt::Display for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();
        for key in keys {
            writeln!(f, "  {}={}", key, self.values[key])?;
        }
        Ok(())
    }
}
