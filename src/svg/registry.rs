use std::collections::HashMap;

use serde::Serialize;

use super::color::{resolve, ResolvedColors};
use super::document::{Element, SvgDocument};

/// Id prefixes that mark a mascot part as editable.
pub const DEFAULT_PREFIXES: &[&str] = &["bot-", "part-"];

/// One editable element of the mascot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDescriptor {
    pub id: String,
    pub label: String,
    pub is_group: bool,
    /// Colors as shipped in the source asset.
    pub original: ResolvedColors,
}

/// Editable targets of a document, built once from the asset, in document order.
#[derive(Clone, Debug, Default)]
pub struct TargetRegistry {
    targets: Vec<TargetDescriptor>,
    index: HashMap<String, usize>,
}

fn label_for(id: &str, prefix: &str) -> String {
    id.strip_prefix(prefix)
        .unwrap_or(id)
        .replace(['-', '_'], " ")
        .trim()
        .to_string()
}

impl TargetRegistry {
    pub fn build<S: AsRef<str>>(document: &SvgDocument, prefixes: &[S]) -> Self {
        let mut registry = Self::default();
        let root = document.root();
        let elements = std::iter::once(root).chain(root.descendants());
        for element in elements {
            registry.register(element, prefixes);
        }
        registry
    }

    fn register<S: AsRef<str>>(&mut self, element: &Element, prefixes: &[S]) {
        let Some(id) = element.id() else {
            return;
        };
        let Some(prefix) = prefixes.iter().map(|p| AsRef::<str>::as_ref(p)).find(|p| id.starts_with(*p)) else {
            return;
        };
        // First occurrence wins for duplicated ids, like getElementById.
        if self.index.contains_key(&id) {
            return;
        }
        self.index.insert(id.clone(), self.targets.len());
        self.targets.push(TargetDescriptor {
            label: label_for(&id, prefix),
            is_group: element.is_group(),
            original: resolve(element),
            id,
        });
    }

    pub fn get(&self, id: &str) -> Option<&TargetDescriptor> {
        self.index.get(id).map(|&i| &self.targets[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetDescriptor> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
