use serde::{Deserialize, Serialize};

/// Axis-aligned box in frame pixels. Serialized as `[x, y, width, height]`, the shape
/// object-detection models report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from([x, y, width, height]: [f64; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x, bbox.y, bbox.width, bbox.height]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class: String,
    pub score: f64,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(class: impl Into<String>, score: f64, bbox: BoundingBox) -> Self {
        Self {
            class: class.into(),
            score,
            bbox,
        }
    }

    /// Bounding-box area used as a stand-in for physical closeness. Bigger is nearer.
    pub fn proximity(&self) -> f64 {
        self.bbox.area()
    }

    /// Heuristic distance shown on the overlay label, `None` for a degenerate box.
    pub fn estimated_distance(&self) -> Option<f64> {
        let proximity = self.proximity();
        (proximity > 0.0).then(|| 10_000.0 / proximity)
    }
}

/// Caption drawn above a highlighted detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayLabel {
    pub text: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayElement {
    pub label: OverlayLabel,
    pub highlight: BoundingBox,
}

/// Identifier handed back by the render surface for a created overlay element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OverlayHandle(pub u64);
