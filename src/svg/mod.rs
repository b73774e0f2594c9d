//! Mascot customizer: pick a part of the vector image, recolor it, drop raster
//! images on top, and export the result as a standalone `.svg` file.

pub mod color;
pub mod document;
pub mod editor;
pub mod export;
pub mod overlay;
pub mod registry;
pub mod style;

pub use color::{Paint, ResolvedColors};
pub use document::{Element, Node, SvgDocument};
pub use editor::Customizer;
pub use export::{export_markup, ViewBox};
pub use overlay::{OverlayImage, OverlayLayer, Point, Size};
pub use registry::{TargetDescriptor, TargetRegistry, DEFAULT_PREFIXES};
