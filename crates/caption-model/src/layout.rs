//! Positioning types attached to caption lists, cues, and nodes.
//!
//! A layout is an origin and an optional extent. Each axis carries its own
//! unit, so a reader may hand over pixel values that are later relativized
//! to percentages of the video frame.

use serde::{Deserialize, Serialize};

/// Unit of a single layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Pixel,
    Percent,
}

/// A length along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub value: f64,
    pub unit: Unit,
}

impl Size {
    pub fn px(value: f64) -> Self {
        Self {
            value,
            unit: Unit::Pixel,
        }
    }

    pub fn percent(value: f64) -> Self {
        Self {
            value,
            unit: Unit::Percent,
        }
    }

    pub fn is_percent(&self) -> bool {
        self.unit == Unit::Percent
    }

    /// Express this size as a percentage of `reference` pixels.
    ///
    /// Returns `None` for pixel values when the reference is zero.
    pub fn as_percentage_of(&self, reference: u32) -> Option<Size> {
        match self.unit {
            Unit::Percent => Some(*self),
            Unit::Pixel if reference == 0 => None,
            Unit::Pixel => Some(Size::percent(self.value * 100.0 / reference as f64)),
        }
    }
}

/// A two-dimensional position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: Size,
    pub y: Size,
}

impl Point {
    pub fn new(x: Size, y: Size) -> Self {
        Self { x, y }
    }

    pub fn percent(x: f64, y: f64) -> Self {
        Self::new(Size::percent(x), Size::percent(y))
    }
}

/// A two-dimensional extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stretch {
    pub horizontal: Size,
    pub vertical: Size,
}

/// Origin plus optional extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub origin: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<Stretch>,
}

impl Layout {
    pub fn new(origin: Point, extent: Option<Stretch>) -> Self {
        Self { origin, extent }
    }

    /// A layout anchored at a percentage origin with no extent.
    pub fn at_percent(x: f64, y: f64) -> Self {
        Self::new(Point::percent(x, y), None)
    }

    /// Whether both origin axes are percentages.
    pub fn has_percent_origin(&self) -> bool {
        self.origin.x.is_percent() && self.origin.y.is_percent()
    }

    /// Convert every pixel value to a percentage of the video frame.
    ///
    /// Axes that cannot be converted (zero-sized frame) are kept as-is.
    pub fn as_percentage_of(&self, video_width: u32, video_height: u32) -> Layout {
        let rel = |size: Size, reference: u32| size.as_percentage_of(reference).unwrap_or(size);
        Layout {
            origin: Point::new(
                rel(self.origin.x, video_width),
                rel(self.origin.y, video_height),
            ),
            extent: self.extent.map(|extent| Stretch {
                horizontal: rel(extent.horizontal, video_width),
                vertical: rel(extent.vertical, video_height),
            }),
        }
    }

    /// Make sure origin + extent stays within 100% on both axes.
    ///
    /// A missing extent is filled with the space remaining after the origin.
    /// Only percentage layouts are adjusted.
    pub fn fit_to_screen(&self) -> Layout {
        if !self.has_percent_origin() {
            return *self;
        }
        let x = self.origin.x.value.clamp(0.0, 100.0);
        let y = self.origin.y.value.clamp(0.0, 100.0);
        let fit = |origin: f64, extent: Option<Size>| match extent {
            Some(size) if size.is_percent() && origin + size.value <= 100.0 => size,
            Some(size) if !size.is_percent() => size,
            _ => Size::percent(100.0 - origin),
        };
        Layout {
            origin: Point::percent(x, y),
            extent: Some(Stretch {
                horizontal: fit(x, self.extent.map(|e| e.horizontal)),
                vertical: fit(y, self.extent.map(|e| e.vertical)),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relativize_pixels() {
        let layout = Layout::new(Point::new(Size::px(72.0), Size::px(240.0)), None);
        let rel = layout.as_percentage_of(720, 480);
        assert!(rel.has_percent_origin());
        assert!((rel.origin.x.value - 10.0).abs() < 1e-9);
        assert!((rel.origin.y.value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_relativize_zero_frame_keeps_pixels() {
        let layout = Layout::new(Point::new(Size::px(10.0), Size::percent(5.0)), None);
        let rel = layout.as_percentage_of(0, 480);
        assert_eq!(rel.origin.x, Size::px(10.0));
        assert_eq!(rel.origin.y, Size::percent(5.0));
    }

    #[test]
    fn test_fit_to_screen_fills_missing_extent() {
        let fitted = Layout::at_percent(20.0, 80.0).fit_to_screen();
        let extent = fitted.extent.unwrap();
        assert!((extent.horizontal.value - 80.0).abs() < 1e-9);
        assert!((extent.vertical.value - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_to_screen_shrinks_overflowing_extent() {
        let layout = Layout::new(
            Point::percent(50.0, 10.0),
            Some(Stretch {
                horizontal: Size::percent(70.0),
                vertical: Size::percent(30.0),
            }),
        );
        let extent = layout.fit_to_screen().extent.unwrap();
        assert!((extent.horizontal.value - 50.0).abs() < 1e-9);
        assert!((extent.vertical.value - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_layouts_are_not_fitted() {
        let layout = Layout::new(Point::new(Size::px(900.0), Size::px(10.0)), None);
        assert_eq!(layout.fit_to_screen(), layout);
    }
}
