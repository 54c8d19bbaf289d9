//! Arc interpolation
//!
//! Expands a circular or helical move into sample points. Used for bounding
//! box accumulation and preview geometry only; the interpolator keeps no
//! state between calls.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Default number of samples per arc
pub const DEFAULT_ARC_DIVISIONS: usize = 30;

/// Angles closer than this are treated as coinciding (full circle)
const ANGLE_EPSILON: f64 = 1e-9;

/// A point in machine space (X, Y, Z)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Active arc plane (G17, G18, G19)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Plane {
    /// G17
    #[default]
    XY,
    /// G18
    ZX,
    /// G19
    YZ,
}

impl Plane {
    /// Plane selected by a G17/G18/G19 value
    pub fn from_gcode(value: f64) -> Option<Self> {
        match value.round() as i64 {
            17 => Some(Self::XY),
            18 => Some(Self::ZX),
            19 => Some(Self::YZ),
            _ => None,
        }
    }

    /// First in-plane axis, second in-plane axis, and the helix axis
    pub fn axes(self) -> [char; 3] {
        match self {
            Self::XY => ['X', 'Y', 'Z'],
            Self::ZX => ['Z', 'X', 'Y'],
            Self::YZ => ['Y', 'Z', 'X'],
        }
    }

    /// Center offset letters matching the in-plane axes
    pub fn offset_letters(self) -> [char; 2] {
        match self {
            Self::XY => ['I', 'J'],
            Self::ZX => ['K', 'I'],
            Self::YZ => ['J', 'K'],
        }
    }

    pub(crate) fn split(self, p: Point3) -> (f64, f64, f64) {
        match self {
            Self::XY => (p.x, p.y, p.z),
            Self::ZX => (p.z, p.x, p.y),
            Self::YZ => (p.y, p.z, p.x),
        }
    }

    pub(crate) fn join(self, a: f64, b: f64, h: f64) -> Point3 {
        match self {
            Self::XY => Point3::new(a, b, h),
            Self::ZX => Point3::new(b, h, a),
            Self::YZ => Point3::new(h, a, b),
        }
    }
}

/// Rotation sense of an arc seen from the positive helix axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcDirection {
    /// G2
    Clockwise,
    /// G3
    CounterClockwise,
}

/// Samples of one arc
#[derive(Debug, Clone, PartialEq)]
pub struct ArcPath {
    /// Sample points, start excluded, last point equal to the end
    pub points: Vec<Point3>,
    /// Signed swept angle in radians (negative for clockwise)
    pub sweep: f64,
    /// Length along the arc including helical travel
    pub length: f64,
}

/// Samples circular and helical arcs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcInterpolator {
    divisions: usize,
}

impl Default for ArcInterpolator {
    fn default() -> Self {
        Self::new(DEFAULT_ARC_DIVISIONS)
    }
}

impl ArcInterpolator {
    /// Create an interpolator producing `divisions` samples per arc (at least one)
    pub fn new(divisions: usize) -> Self {
        Self {
            divisions: divisions.max(1),
        }
    }

    pub fn divisions(&self) -> usize {
        self.divisions
    }

    /// Sample an arc from `start` to `end` around `center`
    ///
    /// The center's helix coordinate is ignored. The radius is interpolated
    /// linearly between the start and end radius so slightly inconsistent
    /// arcs still end exactly at `end`.
    pub fn interpolate(
        &self,
        plane: Plane,
        start: Point3,
        end: Point3,
        center: Point3,
        direction: ArcDirection,
    ) -> ArcPath {
        let (sa, sb, sh) = plane.split(start);
        let (ea, eb, eh) = plane.split(end);
        let (ca, cb, _) = plane.split(center);

        let start_radius = (sa - ca).hypot(sb - cb);
        let end_radius = (ea - ca).hypot(eb - cb);
        let start_angle = (sb - cb).atan2(sa - ca);
        let mut end_angle = (eb - cb).atan2(ea - ca);

        match direction {
            ArcDirection::Clockwise => {
                if end_angle > start_angle - ANGLE_EPSILON {
                    end_angle -= TAU;
                }
            }
            ArcDirection::CounterClockwise => {
                if end_angle < start_angle + ANGLE_EPSILON {
                    end_angle += TAU;
                }
            }
        }
        let sweep = end_angle - start_angle;

        let mut points = Vec::with_capacity(self.divisions);
        for i in 1..self.divisions {
            let t = i as f64 / self.divisions as f64;
            let angle = start_angle + sweep * t;
            let radius = start_radius + (end_radius - start_radius) * t;
            points.push(plane.join(
                ca + radius * angle.cos(),
                cb + radius * angle.sin(),
                sh + (eh - sh) * t,
            ));
        }
        points.push(end);

        let planar = sweep.abs() * 0.5 * (start_radius + end_radius);
        let length = planar.hypot(eh - sh);

        tracing::trace!(
            "Arc {:?} in {:?}: radius={:.4}, sweep={:.4} rad, length={:.4}",
            direction,
            plane,
            start_radius,
            sweep,
            length
        );

        ArcPath {
            points,
            sweep,
            length,
        }
    }
}
