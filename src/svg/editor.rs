use std::path::Path;

use tracing::{debug, info};

use super::color::{resolve, Paint, ResolvedColors};
use super::document::SvgDocument;
use super::export::export_markup;
use super::overlay::{OverlayLayer, Size};
use super::registry::TargetRegistry;
use crate::error::{AppError, Result};

pub const SELECTED_FILTER: &str = "drop-shadow(0 0 4px #ff00ff) brightness(1.1)";
pub const HOVER_FILTER: &str = "brightness(1.15)";
const TARGET_CURSOR: &str = "pointer";
const TARGET_TRANSITION: &str = "filter 0.2s ease";

/// One customization session over a mounted mascot.
///
/// Nothing here is persisted; [`Customizer::export`] is the only way out.
#[derive(Default)]
pub struct Customizer {
    document: Option<SvgDocument>,
    registry: TargetRegistry,
    selected: Option<String>,
    hovered: Option<String>,
    colors: ResolvedColors,
    overlays: OverlayLayer,
    rendered: Size,
}

impl Customizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `document` as displayed at `rendered` pixels, registering every element
    /// whose id starts with one of `prefixes`.
    pub fn mount<S: AsRef<str>>(&mut self, mut document: SvgDocument, prefixes: &[S], rendered: Size) {
        let registry = TargetRegistry::build(&document, prefixes);
        for target in registry.iter() {
            if let Some(element) = document.find_mut(&target.id) {
                element.set_live("cursor", Some(TARGET_CURSOR));
                element.set_live("transition", Some(TARGET_TRANSITION));
            }
        }
        info!("Mounted mascot with {} editable parts", registry.len());

        *self = Self {
            document: Some(document),
            registry,
            rendered,
            ..Self::default()
        };
    }

    pub fn mount_markup<S: AsRef<str>>(&mut self, markup: &str, prefixes: &[S], rendered: Size) -> Result<()> {
        self.mount(SvgDocument::parse(markup)?, prefixes, rendered);
        Ok(())
    }

    pub fn is_mounted(&self) -> bool {
        self.document.is_some()
    }

    pub fn document(&self) -> Option<&SvgDocument> {
        self.document.as_ref()
    }

    pub fn targets(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Current fill/stroke shown in the color pickers.
    pub fn colors(&self) -> &ResolvedColors {
        &self.colors
    }

    pub fn overlays(&self) -> &OverlayLayer {
        &self.overlays
    }

    pub fn overlays_mut(&mut self) -> &mut OverlayLayer {
        &mut self.overlays
    }

    pub fn set_rendered_size(&mut self, rendered: Size) {
        self.rendered = rendered;
    }

    fn set_filter(&mut self, id: &str, filter: Option<&str>) {
        if let Some(element) = self.document.as_mut().and_then(|d| d.find_mut(id)) {
            element.set_live("filter", filter);
        }
    }

    /// Select a target: move the highlight to it and read its effective colors.
    pub fn click(&mut self, id: &str) -> Result<&ResolvedColors> {
        if !self.registry.contains(id) {
            return Err(AppError::Validation(format!("{id} is not an editable part")));
        }
        if let Some(previous) = self.selected.take() {
            self.set_filter(&previous, None);
        }
        self.set_filter(id, Some(SELECTED_FILTER));
        self.selected = Some(id.to_string());

        self.colors = self
            .document
            .as_ref()
            .and_then(|d| d.find(id))
            .map(resolve)
            .unwrap_or_default();
        debug!(target_id = id, fill = ?self.colors.fill, stroke = ?self.colors.stroke, "Selected part");
        Ok(&self.colors)
    }

    pub fn deselect(&mut self) {
        if let Some(previous) = self.selected.take() {
            self.set_filter(&previous, None);
        }
        self.colors = ResolvedColors::default();
    }

    /// Pointer entered a target. The selected target keeps its stronger highlight.
    pub fn hover_enter(&mut self, id: &str) -> bool {
        if !self.registry.contains(id) {
            return false;
        }
        self.hovered = Some(id.to_string());
        if self.selected.as_deref() != Some(id) {
            self.set_filter(id, Some(HOVER_FILTER));
        }
        true
    }

    pub fn hover_leave(&mut self, id: &str) -> bool {
        if !self.registry.contains(id) {
            return false;
        }
        if self.hovered.as_deref() == Some(id) {
            self.hovered = None;
        }
        if self.selected.as_deref() != Some(id) {
            self.set_filter(id, None);
        }
        true
    }

    pub fn set_fill(&mut self, color: &str) -> Result<()> {
        self.set_paint(Paint::Fill, color)
    }

    pub fn set_stroke(&mut self, color: &str) -> Result<()> {
        self.set_paint(Paint::Stroke, color)
    }

    /// Push a color onto the selection, or onto every element inside it for a group.
    fn set_paint(&mut self, paint: Paint, color: &str) -> Result<()> {
        let color = color.trim();
        if color.is_empty() {
            return Err(AppError::Validation("Color must not be empty".into()));
        }
        let id = self
            .selected
            .clone()
            .ok_or_else(|| AppError::Validation("No part selected".into()))?;
        let element = self
            .document
            .as_mut()
            .and_then(|d| d.find_mut(&id))
            .ok_or_else(|| AppError::Svg(format!("{id} is no longer in the document")))?;

        let property = paint.property();
        if element.is_group() {
            element.for_each_descendant_mut(&mut |child| child.set_paint(property, color));
        } else {
            element.set_paint(property, color);
        }

        match paint {
            Paint::Fill => self.colors.fill = Some(color.to_string()),
            Paint::Stroke => self.colors.stroke = Some(color.to_string()),
        }
        info!(target_id = %id, property, color, "Recolored part");
        Ok(())
    }

    /// What the canvas shows right now, highlights included.
    pub fn live_markup(&self) -> Option<String> {
        self.document.as_ref().map(SvgDocument::to_live_markup)
    }

    /// The downloadable file contents. `None` until a document is mounted.
    pub fn export(&self) -> Option<String> {
        let document = self.document.as_ref()?;
        Some(export_markup(document, self.overlays.images(), self.rendered))
    }

    /// Write the export to `path`. Returns `false` (and writes nothing) when unmounted.
    pub fn export_to_file(&self, path: &Path) -> Result<bool> {
        let Some(markup) = self.export() else {
            return Ok(false);
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, markup)?;
        info!("Exported mascot to {}", path.display());
        Ok(true)
    }
}
