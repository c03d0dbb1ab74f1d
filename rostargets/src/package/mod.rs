// SPDX-License-Identifier: GPL-3.0-or-later

//! The package under analysis, as its manifest describes it.
//!
//! The manifest is `package.xml` (or the legacy `manifest.xml`) in the package
//! root. Only the parts the analysis needs are read: the package name, the
//! manifest format and the export declarations, which point to the plugin
//! description files.

pub mod plugins;
pub mod workspace;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MANIFEST_FILES: [&str; 2] = ["package.xml", "manifest.xml"];
const BUILD_FILE: &str = "CMakeLists.txt";

/// One child element of the `<export>` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// The inner text (or markup) of the element, trimmed.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub root: PathBuf,
    pub format: Option<String>,
    pub exports: Vec<Export>,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
    #[error("Invalid manifest {path}: root element is <{found}>, expected <package>")]
    UnexpectedRoot { path: PathBuf, found: String },
}

impl Package {
    /// A package without manifest information.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), root: root.into(), format: None, exports: vec![] }
    }

    /// Reads the manifest from the package root.
    ///
    /// A directory without manifest is still analysable: the package is named
    /// after the directory and has no exports.
    pub fn load(root: &Path) -> Result<Self, ManifestError> {
        let manifest = MANIFEST_FILES.iter().map(|name| root.join(name)).find(|path| path.is_file());
        match manifest {
            Some(path) => {
                log::debug!("Reading package manifest: {}", path.display());
                let content = std::fs::read_to_string(&path)
                    .map_err(|source| ManifestError::Io { path: path.clone(), source })?;
                Self::from_manifest(root, &path, &content)
            }
            None => {
                log::warn!("No package manifest in {}", root.display());
                Ok(Self::new(directory_name(root), root))
            }
        }
    }

    /// Builds the package description from the manifest content.
    pub fn from_manifest(root: &Path, path: &Path, content: &str) -> Result<Self, ManifestError> {
        let document = roxmltree::Document::parse(content)
            .map_err(|source| ManifestError::Xml { path: path.to_path_buf(), source })?;
        let element = document.root_element();
        if element.tag_name().name() != "package" {
            return Err(ManifestError::UnexpectedRoot {
                path: path.to_path_buf(),
                found: element.tag_name().name().to_string(),
            });
        }

        let name = element
            .children()
            .find(|node| node.has_tag_name("name"))
            .and_then(|node| node.text())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| directory_name(root));

        let exports = element
            .children()
            .filter(|node| node.has_tag_name("export"))
            .flat_map(|export| export.children().filter(roxmltree::Node::is_element))
            .map(|node| Export {
                tag: node.tag_name().name().to_string(),
                attributes: node
                    .attributes()
                    .map(|attribute| (attribute.name().to_string(), attribute.value().to_string()))
                    .collect(),
                content: inner_content(content, &node),
            })
            .collect();

        Ok(Self {
            name,
            root: root.to_path_buf(),
            format: element.attribute("format").map(str::to_string),
            exports,
        })
    }

    /// The root build file of the package.
    pub fn build_file(&self) -> PathBuf {
        self.root.join(BUILD_FILE)
    }

    /// Plugin description files declared by the exports, relative to the package root.
    ///
    /// Nodelet exports come first; the `${prefix}` placeholder denotes the package root.
    pub fn exported_plugin_files(&self) -> Vec<PathBuf> {
        let (nodelets, others): (Vec<&Export>, Vec<&Export>) =
            self.exports.iter().partition(|export| export.tag == "nodelet");
        nodelets
            .into_iter()
            .chain(others)
            .filter_map(|export| export.attributes.get("plugin"))
            .map(|plugin| {
                let stripped = plugin.replace("${prefix}", "");
                PathBuf::from(stripped.trim_start_matches('/'))
            })
            .collect()
    }
}

fn directory_name(root: &Path) -> String {
    root.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

fn inner_content(document: &str, node: &roxmltree::Node) -> String {
    match (node.first_child(), node.last_child()) {
        (Some(first), Some(last)) => document
            .get(first.range().start..last.range().end)
            .map(|text| text.trim().to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"<?xml version="1.0"?>
<package format="2">
  <name>demo_nodelets</name>
  <version>0.1.0</version>
  <export>
    <nodelet plugin="${prefix}/nodelet_plugins.xml"/>
    <rosdoc config="rosdoc.yaml"/>
    <metapackage/>
    <architecture_independent>text <b>bold</b></architecture_independent>
  </export>
</package>
"#;

    #[test]
    fn test_from_manifest() {
        let root = Path::new("/ws/src/demo");
        let sut = Package::from_manifest(root, &root.join("package.xml"), MANIFEST).unwrap();

        assert_eq!(sut.name, "demo_nodelets");
        assert_eq!(sut.format.as_deref(), Some("2"));
        assert_eq!(sut.exports.len(), 4);
        assert_eq!(sut.exports[0].tag, "nodelet");
        assert_eq!(
            sut.exports[0].attributes.get("plugin").map(String::as_str),
            Some("${prefix}/nodelet_plugins.xml")
        );
        assert_eq!(sut.exports[3].content, "text <b>bold</b>");
        assert_eq!(sut.build_file(), PathBuf::from("/ws/src/demo/CMakeLists.txt"));
    }

    #[test]
    fn test_exported_plugin_files() {
        let root = Path::new("/ws/src/demo");
        let sut = Package::from_manifest(root, &root.join("package.xml"), MANIFEST).unwrap();

        assert_eq!(sut.exported_plugin_files(), vec![PathBuf::from("nodelet_plugins.xml")]);
    }

    #[test]
    fn test_name_falls_back_to_directory() {
        let root = Path::new("/ws/src/unnamed");
        let sut = Package::from_manifest(root, &root.join("package.xml"), "<package/>").unwrap();

        assert_eq!(sut.name, "unnamed");
        assert!(sut.exports.is_empty());
    }

    #[test]
    fn test_unexpected_root_element() {
        let root = Path::new("/ws/src/demo");
        let result = Package::from_manifest(root, &root.join("package.xml"), "<library/>");

        assert!(matches!(result, Err(ManifestError::UnexpectedRoot { found, .. }) if found == "library"));
    }

    #[test]
    fn test_malformed_manifest() {
        let root = Path::new("/ws/src/demo");
        let result = Package::from_manifest(root, &root.join("package.xml"), "<package>");

        assert!(matches!(result, Err(ManifestError::Xml { .. })));
    }

    #[test]
    fn test_load_without_manifest() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("lonely");
        std::fs::create_dir(&root).unwrap();

        let sut = Package::load(&root).unwrap();

        assert_eq!(sut.name, "lonely");
        assert_eq!(sut.root, root);
    }

    #[test]
    fn test_load_legacy_manifest() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("manifest.xml"), "<package><name>legacy</name></package>").unwrap();

        let sut = Package::load(temp.path()).unwrap();

        assert_eq!(sut.name, "legacy");
    }
}
