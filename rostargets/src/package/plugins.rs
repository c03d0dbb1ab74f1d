// SPDX-License-Identifier: GPL-3.0-or-later

//! Decoder of plugin description files (`nodelet_plugins.xml` and friends).
//!
//! A description lists libraries and the classes they export:
//!
//! ```xml
//! <library path="lib/libdemo">
//!   <class name="demo/Talker" type="demo::Talker" base_class_type="nodelet::Nodelet"/>
//! </library>
//! ```
//!
//! Files with several top-level `<library>` elements are common, so the
//! content is wrapped into a synthetic root element before decoding.

use super::{ManifestError, Package};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One exported class of a plugin library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginLibrary {
    pub path: String,
    pub name: String,
    pub type_: String,
}

impl PluginLibrary {
    /// The name without the package prefix: `demo/Talker` is `Talker`.
    pub fn short_name(&self) -> &str {
        match self.name.split_once('/') {
            Some((_, short)) => short,
            None => &self.name,
        }
    }

    pub fn entrypoint(&self) -> String {
        format!("{}::onInit", self.type_)
    }
}

/// Decodes the content of a plugin description file.
pub fn decode(path: &Path, content: &str) -> Result<Vec<PluginLibrary>, ManifestError> {
    let wrapped = format!("<root>\n{}\n</root>", strip_declaration(content));
    let document = roxmltree::Document::parse(&wrapped)
        .map_err(|source| ManifestError::Xml { path: path.to_path_buf(), source })?;

    let libraries: Vec<_> = document.descendants().filter(|node| node.has_tag_name("library")).collect();
    if libraries.is_empty() {
        log::warn!("No <library/> elements in {}", path.display());
    }

    let result = libraries
        .into_iter()
        .flat_map(|library| {
            let library_path = library.attribute("path").unwrap_or_default().to_string();
            library
                .children()
                .filter(|node| node.has_tag_name("class"))
                .map(move |class| PluginLibrary {
                    path: library_path.clone(),
                    name: class.attribute("name").unwrap_or_default().to_string(),
                    type_: class.attribute("type").unwrap_or_default().to_string(),
                })
                .collect::<Vec<_>>()
        })
        .collect();
    Ok(result)
}

/// The plugin entries of the package, keyed by short name.
///
/// The description file is looked up under the given conventional names in
/// the package root first, then through the manifest exports. A missing file
/// yields no entries; an undecodable one is reported and yields no entries.
pub fn entrypoints(package: &Package, file_names: &[String]) -> BTreeMap<String, PluginLibrary> {
    let Some(path) = locate(package, file_names) else {
        log::debug!("No plugin description for package {}", package.name);
        return BTreeMap::new();
    };
    log::debug!("Reading plugin description from {}", path.display());

    let decoded = std::fs::read_to_string(&path)
        .map_err(|source| ManifestError::Io { path: path.clone(), source })
        .and_then(|content| decode(&path, &content));
    match decoded {
        Ok(libraries) => libraries
            .into_iter()
            .map(|library| (library.short_name().to_string(), library))
            .collect(),
        Err(error) => {
            log::warn!("Ignoring plugin description of package {}: {}", package.name, error);
            BTreeMap::new()
        }
    }
}

fn locate(package: &Package, file_names: &[String]) -> Option<PathBuf> {
    file_names
        .iter()
        .map(PathBuf::from)
        .chain(package.exported_plugin_files())
        .map(|relative| package.root.join(relative))
        .find(|candidate| candidate.is_file())
}

fn strip_declaration(content: &str) -> &str {
    let trimmed = content.trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return &trimmed[end + 2..];
        }
    }
    trimmed
}
