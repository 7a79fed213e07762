//! TOML scene files for the headless harness
//!
//! A scene describes an already laid-out page: the viewport, the nested
//! elements under `<body>` with their page-space boxes, attributes and
//! computed style, and optionally which element starts focused.
//!
//! ```toml
//! focus = "play"
//!
//! [viewport]
//! width = 1280.0
//! height = 720.0
//!
//! [[body]]
//! tag = "button"
//! id = "play"
//! rect = { x = 40.0, y = 40.0, width = 120.0, height = 40.0 }
//!
//! [[body]]
//! tag = "div"
//! rect = { x = 40.0, y = 120.0, width = 300.0, height = 200.0 }
//! style = { overflow-y = "auto" }
//! content = { width = 300.0, height = 900.0 }
//! ```

use super::{ComputedStyle, Document, ElementId, MemoryDocument};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse scene: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Initial focus refers to unknown element id: {0}")]
    UnknownFocus(String),

    #[error("Element id used more than once: {0}")]
    DuplicateId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneSize {
    pub width: f64,
    pub height: f64,
}

impl Default for SceneSize {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<SceneRect> for Rect {
    fn from(rect: SceneRect) -> Self {
        Rect::from_origin_size((rect.x, rect.y), (rect.width, rect.height))
    }
}

fn focusable_by_default() -> bool {
    true
}

/// One element and its subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    pub rect: SceneRect,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub style: ComputedStyle,
    /// Scrollable content size, when larger than the box.
    #[serde(default)]
    pub content: Option<SceneSize>,
    #[serde(default = "focusable_by_default")]
    pub focusable: bool,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub viewport: SceneSize,
    /// Full page size; the page scrolls when it exceeds the viewport.
    #[serde(default)]
    pub page: Option<SceneSize>,
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default)]
    pub body: Vec<SceneNode>,
}

impl Scene {
    pub fn from_toml_str(source: &str) -> Result<Self, SceneError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        info!("Loading scene from {}", path.display());
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Lays the scene out into a fresh [`MemoryDocument`].
    pub fn build(&self) -> Result<MemoryDocument, SceneError> {
        let mut doc = MemoryDocument::new(self.viewport.width, self.viewport.height);
        if let Some(page) = self.page {
            let root = doc.document_element();
            doc.set_content_size(root, page.width, page.height);
        }

        let mut seen = HashSet::new();
        let body = doc.body();
        for node in &self.body {
            append_node(&mut doc, body, node, &mut seen)?;
        }

        if let Some(focus) = &self.focus {
            let element = doc
                .element_by_id(focus)
                .ok_or_else(|| SceneError::UnknownFocus(focus.clone()))?;
            doc.set_active(Some(element));
        }

        debug!("Scene built with {} element ids", seen.len());
        Ok(doc)
    }
}

fn append_node(
    doc: &mut MemoryDocument,
    parent: ElementId,
    node: &SceneNode,
    seen: &mut HashSet<String>,
) -> Result<(), SceneError> {
    let element = doc.append(parent, &node.tag, node.rect.into());
    if let Some(id) = &node.id {
        if !seen.insert(id.clone()) {
            return Err(SceneError::DuplicateId(id.clone()));
        }
        doc.set_attribute(element, "id", id);
    }
    for (name, value) in &node.attributes {
        doc.set_attribute(element, name, value);
    }
    doc.set_style(element, node.style);
    if let Some(content) = node.content {
        doc.set_content_size(element, content.width, content.height);
    }
    doc.set_focusable(element, node.focusable);

    for child in &node.children {
        append_node(doc, element, child, seen)?;
    }
    Ok(())
}
