use std::path::Path;

use base64::Engine;
use serde::Serialize;

use crate::error::{AppError, Result};

/// Smallest width an overlay can be resized to, in pixels.
pub const MIN_OVERLAY_WIDTH: f64 = 20.0;
pub const DEFAULT_POSITION: Point = Point { x: 20.0, y: 20.0 };
pub const DEFAULT_SIZE: Size = Size {
    width: 150.0,
    height: 150.0,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// A raster image composited over the canvas, in canvas pixels.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayImage {
    pub id: u64,
    pub image_data: String,
    pub position: Point,
    pub size: Size,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Manipulation {
    Drag {
        id: u64,
        grab_offset: Point,
    },
    Resize {
        id: u64,
        start_pointer: Point,
        start_size: Size,
    },
}

impl Manipulation {
    fn id(&self) -> u64 {
        match *self {
            Manipulation::Drag { id, .. } | Manipulation::Resize { id, .. } => id,
        }
    }
}

/// MIME type for an image file, by extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => return None,
    })
}

/// Uploaded images plus the single press/move/release gesture in progress.
#[derive(Clone, Debug, Default)]
pub struct OverlayLayer {
    images: Vec<OverlayImage>,
    next_id: u64,
    active: Option<Manipulation>,
}

impl OverlayLayer {
    pub fn images(&self) -> &[OverlayImage] {
        &self.images
    }

    pub fn get(&self, id: u64) -> Option<&OverlayImage> {
        self.images.iter().find(|i| i.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut OverlayImage> {
        self.images.iter_mut().find(|i| i.id == id)
    }

    /// Add an image from a `data:image/...` URI at the default spot.
    pub fn add_data_uri(&mut self, image_data: impl Into<String>) -> Result<u64> {
        let image_data = image_data.into();
        if !image_data.starts_with("data:image/") {
            return Err(AppError::Validation(
                "Overlay must be an image data URI".into(),
            ));
        }
        self.next_id += 1;
        let id = self.next_id;
        self.images.push(OverlayImage {
            id,
            image_data,
            position: DEFAULT_POSITION,
            size: DEFAULT_SIZE,
        });
        Ok(id)
    }

    /// Add an uploaded file's bytes, embedding them as base64.
    pub fn add_upload(&mut self, bytes: &[u8], mime: &str) -> Result<u64> {
        if !mime.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "Unsupported overlay type {mime}"
            )));
        }
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        self.add_data_uri(format!("data:{mime};base64,{encoded}"))
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.images.len();
        self.images.retain(|i| i.id != id);
        if self.active.is_some_and(|m| m.id() == id) {
            self.active = None;
        }
        self.images.len() != before
    }

    /// Move/resize an overlay directly, e.g. from saved values.
    pub fn place(&mut self, id: u64, position: Point, size: Size) -> bool {
        match self.get_mut(id) {
            Some(image) => {
                image.position = position;
                image.size = size;
                true
            }
            None => false,
        }
    }

    pub fn active_id(&self) -> Option<u64> {
        self.active.map(|m| m.id())
    }

    /// Press on an overlay body. Ignored while another gesture is active.
    pub fn press_drag(&mut self, id: u64, pointer: Point) -> bool {
        if self.active.is_some() {
            return false;
        }
        let Some(image) = self.get(id) else {
            return false;
        };
        let grab_offset = Point {
            x: pointer.x - image.position.x,
            y: pointer.y - image.position.y,
        };
        self.active = Some(Manipulation::Drag { id, grab_offset });
        true
    }

    /// Press on an overlay's resize corner. Ignored while another gesture is active.
    pub fn press_resize(&mut self, id: u64, pointer: Point) -> bool {
        if self.active.is_some() {
            return false;
        }
        let Some(image) = self.get(id) else {
            return false;
        };
        self.active = Some(Manipulation::Resize {
            id,
            start_pointer: pointer,
            start_size: image.size,
        });
        true
    }

    pub fn pointer_move(&mut self, pointer: Point) {
        let Some(active) = self.active else {
            return;
        };
        match active {
            Manipulation::Drag { id, grab_offset } => {
                if let Some(image) = self.get_mut(id) {
                    image.position = Point {
                        x: pointer.x - grab_offset.x,
                        y: pointer.y - grab_offset.y,
                    };
                }
            }
            Manipulation::Resize {
                id,
                start_pointer,
                start_size,
            } => {
                if let Some(image) = self.get_mut(id) {
                    image.size = resized(start_size, pointer.x - start_pointer.x, pointer.y - start_pointer.y);
                }
            }
        }
    }

    pub fn release(&mut self) {
        self.active = None;
    }
}

// Aspect ratio is kept by growing along whichever axis moved further.
fn resized(start: Size, dx: f64, dy: f64) -> Size {
    let delta = dx.max(dy);
    let aspect = if start.width > 0.0 && start.height > 0.0 {
        start.width / start.height
    } else {
        1.0
    };
    let width = (start.width + delta).max(MIN_OVERLAY_WIDTH);
    Size {
        width,
        height: width / aspect,
    }
}
