use serde::Serialize;

use super::document::Element;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Paint {
    Fill,
    Stroke,
}

impl Paint {
    pub fn property(self) -> &'static str {
        match self {
            Paint::Fill => "fill",
            Paint::Stroke => "stroke",
        }
    }
}

/// Values that mean "this element paints nothing of its own". `rgb(0, 0, 0)` is the
/// computed default for an unset fill, so it is treated as unset rather than black.
pub fn is_unset(value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    matches!(
        normalized.as_str(),
        "" | "none" | "transparent" | "rgba(0,0,0,0)" | "rgb(0,0,0)"
    )
}

/// The element's own paint: inline style first, then the presentation attribute.
pub fn declared(element: &Element, paint: Paint) -> Option<String> {
    let property = paint.property();
    let from_style = element.style().get(property).map(str::to_string);
    from_style
        .into_iter()
        .chain(element.attr(property))
        .map(|v| v.trim().to_string())
        .find(|v| !is_unset(v))
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedColors {
    pub fill: Option<String>,
    pub stroke: Option<String>,
}

impl ResolvedColors {
    pub fn is_complete(&self) -> bool {
        self.fill.is_some() && self.stroke.is_some()
    }
}

/// Effective fill and stroke of `element`: its own values, then the first
/// descendant (pre-order) that declares each one.
pub fn resolve(element: &Element) -> ResolvedColors {
    let mut colors = ResolvedColors {
        fill: declared(element, Paint::Fill),
        stroke: declared(element, Paint::Stroke),
    };
    if colors.is_complete() {
        return colors;
    }

    for descendant in element.descendants() {
        if colors.fill.is_none() {
            colors.fill = declared(descendant, Paint::Fill);
        }
        if colors.stroke.is_none() {
            colors.stroke = declared(descendant, Paint::Stroke);
        }
        if colors.is_complete() {
            break;
        }
    }
    colors
}
