use super::document::{Element, Node, SvgDocument};
use super::overlay::{OverlayImage, Size};
use crate::util::format_number;

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Style properties that only exist for on-screen interaction.
pub const INTERACTION_PROPERTIES: &[&str] = &["cursor", "transition", "filter"];

/// The document's user coordinate system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn parse(raw: &str) -> Option<Self> {
        let values = raw
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .ok()?;
        match values[..] {
            [min_x, min_y, width, height] if width > 0.0 && height > 0.0 => Some(Self {
                min_x,
                min_y,
                width,
                height,
            }),
            _ => None,
        }
    }

    /// `viewBox` if valid, else numeric `width`/`height`, else the rendered size (identity).
    pub fn of(root: &Element, rendered: Size) -> Self {
        if let Some(view_box) = root.attr("viewBox").as_deref().and_then(Self::parse) {
            return view_box;
        }
        let length = |name: &str| {
            root.attr(name)
                .and_then(|v| v.trim().trim_end_matches("px").parse::<f64>().ok())
                .filter(|v| *v > 0.0)
        };
        match (length("width"), length("height")) {
            (Some(width), Some(height)) => Self {
                min_x: 0.0,
                min_y: 0.0,
                width,
                height,
            },
            _ => Self {
                min_x: 0.0,
                min_y: 0.0,
                width: rendered.width,
                height: rendered.height,
            },
        }
    }

    /// Map a rectangle in rendered pixels into user units.
    pub fn from_rendered(&self, rendered: Size, image: &OverlayImage) -> (f64, f64, f64, f64) {
        let scale = |units: f64, pixels: f64| if pixels > 0.0 { units / pixels } else { 1.0 };
        let sx = scale(self.width, rendered.width);
        let sy = scale(self.height, rendered.height);
        (
            self.min_x + image.position.x * sx,
            self.min_y + image.position.y * sy,
            image.size.width * sx,
            image.size.height * sy,
        )
    }
}

fn strip_interaction(element: &mut Element) {
    element.clear_live();
    let mut style = element.style();
    if style.remove(INTERACTION_PROPERTIES) {
        element.set_style(&style);
    }
}

fn overlay_node(view_box: &ViewBox, rendered: Size, image: &OverlayImage) -> Node {
    let (x, y, width, height) = view_box.from_rendered(rendered, image);
    let mut node = Element::new("image");
    node.set_attr("href", &image.image_data);
    node.set_attr("x", &format_number(x));
    node.set_attr("y", &format_number(y));
    node.set_attr("width", &format_number(width));
    node.set_attr("height", &format_number(height));
    node.set_attr("preserveAspectRatio", "none");
    Node::Element(node)
}

/// Serialize `document` for download: interaction styling removed, overlays embedded
/// in document coordinates, XML declaration guaranteed.
pub fn export_markup(document: &SvgDocument, overlays: &[OverlayImage], rendered: Size) -> String {
    let mut export = document.clone();
    let root = export.root_mut();
    strip_interaction(root);
    root.for_each_descendant_mut(&mut strip_interaction);

    if !overlays.is_empty() {
        let view_box = ViewBox::of(root, rendered);
        for image in overlays {
            root.push_child(overlay_node(&view_box, rendered, image));
        }
    }

    let markup = export.to_markup();
    if export.has_declaration() {
        markup
    } else {
        format!("{XML_DECLARATION}{markup}")
    }
}
