//! Viewport emulation.
//!
//! Viewports are a pure input to session creation: the backend applies them
//! through `Emulation.setDeviceMetricsOverride`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Desktop layout
    pub const DESKTOP: Self = Self::new(1280, 720);
    /// Tablet layout (portrait)
    pub const TABLET: Self = Self::new(768, 1024);
    /// Mobile layout (portrait)
    pub const MOBILE: Self = Self::new(375, 667);

    /// Create a new viewport
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check if viewport is in portrait orientation
    #[must_use]
    pub const fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// Narrow layouts get the mobile flag in device metrics
    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        self.width < 600
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::DESKTOP
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Viewport {
    type Err = String;

    /// Parse `WIDTHxHEIGHT` or one of `desktop`, `tablet`, `mobile`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => return Ok(Self::DESKTOP),
            "tablet" => return Ok(Self::TABLET),
            "mobile" => return Ok(Self::MOBILE),
            _ => {}
        }
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let width = w.parse::<u32>().map_err(|e| format!("bad width '{w}': {e}"))?;
        let height = h.parse::<u32>().map_err(|e| format!("bad height '{h}': {e}"))?;
        if width == 0 || height == 0 {
            return Err(format!("viewport must be non-empty, got '{s}'"));
        }
        Ok(Self::new(width, height))
    }
}
