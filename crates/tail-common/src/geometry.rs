//! Floorplan coordinate mapping.
//!
//! The floorplan SVG uses metres as user units. World coordinates have y up,
//! SVG has y down, so a point is flipped around the floorplan height.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Floorplan {
    pub width: f64,
    pub height: f64,
}

impl Default for Floorplan {
    fn default() -> Self {
        Self { width: 10.0, height: 5.35 }
    }
}

impl Floorplan {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn view_box(&self) -> String {
        format!("0 0 {} {}", self.width, self.height)
    }

    /// SVG transform that lets markers be drawn at raw world coordinates.
    pub fn overlay_transform(&self) -> String {
        format!("scale(1,-1) translate(0,-{})", self.height)
    }

    /// World coordinates to SVG view coordinates.
    pub fn to_view(&self, x: f64, y: f64) -> (f64, f64) {
        (x, self.height - y)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_view_flips_y() {
        let plan = Floorplan::new(10.0, 5.0);
        assert_eq!(plan.to_view(0.0, 0.0), (0.0, 5.0));
        assert_eq!(plan.to_view(2.0, 5.0), (2.0, 0.0));
        assert_eq!(plan.to_view(3.5, 1.5), (3.5, 3.5));
    }

    #[test]
    fn test_overlay_transform_matches_to_view() {
        let plan = Floorplan::default();
        assert_eq!(plan.overlay_transform(), "scale(1,-1) translate(0,-5.35)");
        // translate first, then scale: y' = -(y - h) = h - y
        let (x, y) = (1.0, 2.0);
        let by_transform = -(y - plan.height);
        assert_eq!(plan.to_view(x, y).1, by_transform);
    }

    #[test]
    fn test_contains_bounds() {
        let plan = Floorplan::new(10.0, 5.35);
        assert!(plan.contains(0.0, 0.0));
        assert!(plan.contains(10.0, 5.35));
        assert!(!plan.contains(-0.1, 1.0));
        assert!(!plan.contains(1.0, 6.0));
        assert_eq!(plan.view_box(), "0 0 10 5.35");
    }
}
