//! Per-axis bounding box accumulation

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

/// Range covered on one axis
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, Deserialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
    pub delta: f64,
}

impl Extent {
    fn at(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            delta: 0.0,
        }
    }

    fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.delta = self.max - self.min;
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        let (a, b) = (f(self.min), f(self.max));
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        Self {
            min,
            max,
            delta: max - min,
        }
    }
}

/// Bounding box over the configured axes
///
/// Axes that never received a position stay empty. Serializes as a map from
/// axis letter to extent (or null) in axis order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    axes: Vec<char>,
    extents: Vec<Option<Extent>>,
}

impl BoundingBox {
    pub fn new(axes: &[char]) -> Self {
        Self {
            axes: axes.to_vec(),
            extents: vec![None; axes.len()],
        }
    }

    /// Widen the axis at `index` to cover `value`
    pub fn include(&mut self, index: usize, value: f64) {
        if !value.is_finite() {
            return;
        }
        if let Some(slot) = self.extents.get_mut(index) {
            match slot {
                Some(extent) => extent.include(value),
                None => *slot = Some(Extent::at(value)),
            }
        }
    }

    /// Widen every axis with a known coordinate
    pub fn include_point(&mut self, point: &[Option<f64>]) {
        for (index, value) in point.iter().enumerate() {
            if let Some(value) = value {
                self.include(index, *value);
            }
        }
    }

    /// Extent of an axis by letter
    pub fn get(&self, axis: char) -> Option<&Extent> {
        let axis = axis.to_ascii_uppercase();
        self.axes
            .iter()
            .position(|&a| a == axis)
            .and_then(|i| self.extents[i].as_ref())
    }

    /// True when no axis has a position yet
    pub fn is_empty(&self) -> bool {
        self.extents.iter().all(Option::is_none)
    }

    /// Axis letters with their extents
    pub fn iter(&self) -> impl Iterator<Item = (char, Option<&Extent>)> + '_ {
        self.axes
            .iter()
            .copied()
            .zip(self.extents.iter().map(Option::as_ref))
    }

    /// Convert each axis with `f(axis_index, value)`
    pub fn map_axes(&self, f: impl Fn(usize, f64) -> f64) -> Self {
        Self {
            axes: self.axes.clone(),
            extents: self
                .extents
                .iter()
                .enumerate()
                .map(|(i, e)| e.map(|e| e.map(|v| f(i, v))))
                .collect(),
        }
    }
}

impl Serialize for BoundingBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.axes.len()))?;
        for (axis, extent) in self.iter() {
            map.serialize_entry(&axis, &extent)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_widens_and_tracks_delta() {
        let mut bbox = BoundingBox::new(&['X', 'Y']);
        assert!(bbox.is_empty());

        bbox.include(0, 10.0);
        bbox.include(0, 20.0);
        bbox.include(0, 15.0);
        let x = bbox.get('x').unwrap();
        assert_eq!((x.min, x.max, x.delta), (10.0, 20.0, 10.0));
        assert!(bbox.get('Y').is_none());
        assert!(!bbox.is_empty());
    }

    #[test]
    fn test_include_point_skips_unknown() {
        let mut bbox = BoundingBox::new(&['X', 'Y', 'Z']);
        bbox.include_point(&[Some(1.0), None, Some(-2.0)]);
        assert!(bbox.get('Y').is_none());
        assert_eq!(bbox.get('Z').unwrap().min, -2.0);
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        let mut bbox = BoundingBox::new(&['X']);
        bbox.include(0, f64::NAN);
        bbox.include(3, 1.0);
        assert!(bbox.is_empty());
    }

    #[test]
    fn test_map_axes_converts_units() {
        let mut bbox = BoundingBox::new(&['X', 'A']);
        bbox.include(0, 25.4);
        bbox.include(0, 50.8);
        bbox.include(1, 90.0);
        let converted = bbox.map_axes(|i, v| if i == 0 { v / 25.4 } else { v });
        let x = converted.get('X').unwrap();
        assert!((x.min - 1.0).abs() < 1e-12);
        assert!((x.delta - 1.0).abs() < 1e-12);
        assert_eq!(converted.get('A').unwrap().max, 90.0);
    }

    #[test]
    fn test_serializes_as_axis_map() {
        let mut bbox = BoundingBox::new(&['X', 'Y']);
        bbox.include(0, 1.0);
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(
            json,
            r#"{"X":{"min":1.0,"max":1.0,"delta":0.0},"Y":null}"#
        );
    }
}
