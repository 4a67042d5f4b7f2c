use std::sync::Arc;

use crate::models::{Detection, OverlayElement, OverlayHandle, OverlayLabel};
use crate::platform_bridge::RenderSurface;

/// Vertical gap between the caption and the top of its box.
const LABEL_OFFSET_PX: f64 = 10.0;

pub fn label_text(detection: &Detection) -> String {
    let distance = detection
        .estimated_distance()
        .map(|distance| format!("{distance:.2}"))
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "{} ({:.2}% confidence), Distance: {} units",
        detection.class,
        detection.score * 100.0,
        distance
    )
}

pub fn overlay_for(detection: &Detection) -> OverlayElement {
    let bbox = detection.bbox;
    OverlayElement {
        label: OverlayLabel {
            text: label_text(detection),
            left: bbox.x,
            top: bbox.y - LABEL_OFFSET_PX,
            width: bbox.width - LABEL_OFFSET_PX,
        },
        highlight: bbox,
    }
}

/// Tracks what the current frame put on the render surface.
pub struct OverlayBoard {
    surface: Arc<dyn RenderSurface>,
    staged: Vec<OverlayHandle>,
}

impl OverlayBoard {
    pub fn new(surface: Arc<dyn RenderSurface>) -> Self {
        Self {
            surface,
            staged: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Destroys everything from the previous frame, then draws `elements`.
    pub fn replace(&mut self, elements: &[OverlayElement]) {
        self.clear();
        self.staged = elements
            .iter()
            .map(|element| self.surface.create(element))
            .collect();
    }

    /// Returns how many elements were destroyed.
    pub fn clear(&mut self) -> usize {
        let count = self.staged.len();
        for handle in self.staged.drain(..) {
            self.surface.destroy(handle);
        }
        count
    }
}
