//! Skin include documents generated from the stores.
//!
//! Projectors build a [`Document`] in memory; it is serialised in one pass and
//! written next to the target before being renamed over it, so a failed write
//! never leaves a truncated include file behind.

pub mod menu;
pub mod widget;

use std::fs;
use std::io::Cursor;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use crate::error::MarkupError;

pub use menu::MenuProjector;
pub use widget::WidgetProjector;

/// One XML element with ordered attributes and either text or children.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// `<name>text</name>`
    pub fn text_node(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_text(text)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Child element carrying `attr="value"`.
    pub fn child_with_attr(&self, name: &str, attr: &str, value: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|c| c.name == name && c.attr(attr) == Some(value))
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), MarkupError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        match (&self.text, self.children.is_empty()) {
            (None, true) => {
                writer.write_event(Event::Empty(start))?;
            }
            (Some(text), true) => {
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
            }
            (_, false) => {
                writer.write_event(Event::Start(start))?;
                for child in &self.children {
                    child.write_to(writer)?;
                }
                writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub root: Node,
}

impl Document {
    pub fn includes() -> Self {
        Self {
            root: Node::new("includes"),
        }
    }

    pub fn include(&self, name: &str) -> Option<&Node> {
        self.root.child_with_attr("include", "name", name)
    }

    pub fn include_names(&self) -> Vec<&str> {
        self.root
            .children_named("include")
            .filter_map(|n| n.attr("name"))
            .collect()
    }

    pub fn to_xml_string(&self) -> Result<String, MarkupError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        self.root.write_to(&mut writer)?;
        let mut bytes = writer.into_inner().into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Serialise, write to a sibling temp file and rename it over `path`.
    pub fn write_atomic(&self, path: &Path) -> Result<(), MarkupError> {
        let xml = self.to_xml_string()?;
        let io_err = |source| MarkupError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "includes.xml".to_string());
        let tmp = path.with_file_name(format!(".{file_name}.tmp"));
        fs::write(&tmp, xml).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        debug!(
            target: "home_menu_maker::markup",
            path = %path.display(),
            "markup written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn serialises_with_declaration_and_indent() {
        let mut doc = Document::includes();
        doc.root.push(
            Node::new("include")
                .with_attr("name", "demo")
                .with_child(Node::text_node("label", "A & B"))
                .with_child(Node::new("content")),
        );
        let xml = doc.to_xml_string().expect("document should serialise");
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <includes>\n  \
             <include name=\"demo\">\n    \
             <label>A &amp; B</label>\n    \
             <content/>\n  \
             </include>\n\
             </includes>\n"
        );
    }

    #[test]
    fn atomic_write_replaces_target_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir creation should succeed");
        let target = dir.path().join("xml").join("Includes_Test.xml");
        fs::create_dir_all(target.parent().expect("target has a parent"))
            .expect("dir should be created");
        fs::write(&target, "stale").expect("stale file should be written");

        let mut doc = Document::includes();
        doc.root
            .push(Node::new("include").with_attr("name", "fresh"));
        doc.write_atomic(&target).expect("write should succeed");

        let written = fs::read_to_string(&target).expect("target should be readable");
        assert!(written.contains("<include name=\"fresh\"/>"));
        let leftovers: Vec<_> = fs::read_dir(target.parent().expect("target has a parent"))
            .expect("dir should be listed")
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn lookup_helpers() {
        let mut doc = Document::includes();
        doc.root.push(Node::new("include").with_attr("name", "a"));
        doc.root.push(Node::new("include").with_attr("name", "b"));
        assert_eq!(doc.include_names(), vec!["a", "b"]);
        assert!(doc.include("b").is_some());
        assert!(doc.include("c").is_none());
    }
}
