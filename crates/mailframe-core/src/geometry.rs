//! Window geometry model
//!
//! The main window's frame is persisted as a single space-separated string
//! under the `windowFrame` preference key. Restoring validates the stored
//! rectangle (minimum size, intersects a display) and substitutes a
//! computed default otherwise. All coordinates are logical pixels.

/// Minimum usable window width
pub const MIN_WIDTH: f64 = 800.0;
/// Minimum usable window height
pub const MIN_HEIGHT: f64 = 600.0;
/// Default window width when no valid frame is stored
pub const DEFAULT_WIDTH: f64 = 1200.0;
/// Default window height when no valid frame is stored
pub const DEFAULT_HEIGHT: f64 = 800.0;

/// A display's visible area in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The main window's position and size in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowFrame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl WindowFrame {
    /// Serialize as "x y width height". `f64` Display round-trips exactly,
    /// so save-then-restore yields identical coordinates.
    pub fn serialize(&self) -> String {
        format!("{} {} {} {}", self.x, self.y, self.width, self.height)
    }

    /// Parse the serialized form; `None` on any malformation.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split_whitespace().map(str::parse::<f64>);
        let frame = Self {
            x: parts.next()?.ok()?,
            y: parts.next()?.ok()?,
            width: parts.next()?.ok()?,
            height: parts.next()?.ok()?,
        };
        if parts.next().is_some() {
            return None;
        }
        if !frame.x.is_finite()
            || !frame.y.is_finite()
            || !frame.width.is_finite()
            || !frame.height.is_finite()
        {
            return None;
        }
        Some(frame)
    }

    /// True if this frame overlaps the display's visible area
    pub fn intersects(&self, display: &DisplayBounds) -> bool {
        self.x < display.x + display.width
            && self.x + self.width > display.x
            && self.y < display.y + display.height
            && self.y + self.height > display.y
    }

    /// A stored frame is usable when it meets the minimum size and overlaps
    /// at least one attached display.
    pub fn is_valid(&self, displays: &[DisplayBounds]) -> bool {
        if self.width < MIN_WIDTH || self.height < MIN_HEIGHT {
            return false;
        }
        displays.iter().any(|d| self.intersects(d))
    }

    /// The computed default: 1200x800 centered on the given display
    pub fn default_for(display: Option<&DisplayBounds>) -> Self {
        match display {
            Some(d) => Self {
                x: d.x + (d.width - DEFAULT_WIDTH) / 2.0,
                y: d.y + (d.height - DEFAULT_HEIGHT) / 2.0,
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
            },
            None => Self {
                x: 0.0,
                y: 0.0,
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
            },
        }
    }

    /// Restore a frame from its stored form: parse, validate, and fall back
    /// to the computed default centered on the primary display.
    pub fn restore(stored: Option<&str>, displays: &[DisplayBounds]) -> Self {
        let fallback = Self::default_for(displays.first());

        match stored.and_then(Self::parse) {
            Some(frame) if frame.is_valid(displays) => frame,
            Some(frame) => {
                log::info!(
                    "Stored window frame {} is unusable, using default",
                    frame.serialize()
                );
                fallback
            }
            None => fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary() -> DisplayBounds {
        DisplayBounds {
            x: 0.0,
            y: 0.0,
            width: 2560.0,
            height: 1440.0,
        }
    }

    #[test]
    fn test_undersized_frame_restores_to_default() {
        let displays = [primary()];
        let narrow = WindowFrame {
            x: 100.0,
            y: 100.0,
            width: 799.0,
            height: 900.0,
        };
        let short = WindowFrame {
            x: 100.0,
            y: 100.0,
            width: 1000.0,
            height: 599.0,
        };
        let default = WindowFrame::default_for(Some(&primary()));

        assert_eq!(
            WindowFrame::restore(Some(&narrow.serialize()), &displays),
            default
        );
        assert_eq!(
            WindowFrame::restore(Some(&short.serialize()), &displays),
            default
        );
    }

    #[test]
    fn test_offscreen_frame_restores_to_default() {
        let displays = [primary()];
        let offscreen = WindowFrame {
            x: 5000.0,
            y: 5000.0,
            width: 1200.0,
            height: 800.0,
        };

        assert_eq!(
            WindowFrame::restore(Some(&offscreen.serialize()), &displays),
            WindowFrame::default_for(Some(&primary()))
        );
    }

    #[test]
    fn test_frame_on_secondary_display_is_kept() {
        let displays = [
            primary(),
            DisplayBounds {
                x: 2560.0,
                y: 0.0,
                width: 1920.0,
                height: 1080.0,
            },
        ];
        let frame = WindowFrame {
            x: 2700.0,
            y: 50.0,
            width: 1200.0,
            height: 800.0,
        };

        assert_eq!(
            WindowFrame::restore(Some(&frame.serialize()), &displays),
            frame
        );
    }

    #[test]
    fn test_save_restore_round_trip_is_exact() {
        let displays = [primary()];
        let frame = WindowFrame {
            x: 123.456789,
            y: -7.25,
            width: 1024.125,
            height: 768.0625,
        };

        let restored = WindowFrame::restore(Some(&frame.serialize()), &displays);
        assert_eq!(restored, frame);
    }

    #[test]
    fn test_partially_visible_frame_is_kept() {
        let displays = [primary()];
        // Hangs off the left edge but still overlaps the display
        let frame = WindowFrame {
            x: -400.0,
            y: 100.0,
            width: 1200.0,
            height: 800.0,
        };

        assert_eq!(
            WindowFrame::restore(Some(&frame.serialize()), &displays),
            frame
        );
    }

    #[test]
    fn test_malformed_or_missing_string_restores_to_default() {
        let displays = [primary()];
        let default = WindowFrame::default_for(Some(&primary()));

        assert_eq!(WindowFrame::restore(None, &displays), default);
        assert_eq!(WindowFrame::restore(Some(""), &displays), default);
        assert_eq!(WindowFrame::restore(Some("10 20 wide tall"), &displays), default);
        assert_eq!(WindowFrame::restore(Some("1 2 3"), &displays), default);
        assert_eq!(WindowFrame::restore(Some("1 2 3 4 5"), &displays), default);
        assert_eq!(
            WindowFrame::restore(Some("NaN 0 1200 800"), &displays),
            default
        );
    }

    #[test]
    fn test_default_is_centered() {
        let d = primary();
        let default = WindowFrame::default_for(Some(&d));

        assert_eq!(default.width, DEFAULT_WIDTH);
        assert_eq!(default.height, DEFAULT_HEIGHT);
        assert_eq!(default.x, (d.width - DEFAULT_WIDTH) / 2.0);
        assert_eq!(default.y, (d.height - DEFAULT_HEIGHT) / 2.0);
    }
}
