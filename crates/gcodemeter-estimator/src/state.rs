//! Modal machine state carried across lines
//!
//! Tracks the active modal choices that apply to words lacking an explicit
//! override on the current line. Positions are stored per configured axis in
//! millimetres (linear) or degrees (rotary), `None` until first commanded.

use gcodemeter_core::Units;
use serde::{Deserialize, Serialize};

use crate::arc::{ArcDirection, Plane};

/// Distance mode - group 3 (G90, G91)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMode {
    #[default]
    Absolute,
    Incremental,
}

/// Arc center mode - group 4 (G90.1, G91.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArcCenterMode {
    Absolute,
    #[default]
    Incremental,
}

/// Feed rate mode - group 5 (G93, G94, G95)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeedMode {
    InverseTime,
    #[default]
    UnitsPerMinute,
    UnitsPerRevolution,
}

/// Motion mode - group 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionMode {
    /// G0
    #[default]
    Rapid,
    /// G1
    Linear,
    /// G2 / G3
    Arc(ArcDirection),
    /// Probing and canned cycles, estimated as a straight feed move
    Other,
    /// G80
    Cancelled,
}

impl MotionMode {
    /// Motion mode selected by a group 1 value
    pub fn from_gcode(value: f64) -> Self {
        match (value * 10.0).round() as i64 {
            0 => Self::Rapid,
            10 => Self::Linear,
            20 => Self::Arc(ArcDirection::Clockwise),
            30 => Self::Arc(ArcDirection::CounterClockwise),
            800 => Self::Cancelled,
            _ => Self::Other,
        }
    }
}

/// Spindle control - M group 7 (M3, M4, M5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpindleState {
    #[default]
    Off,
    Clockwise,
    CounterClockwise,
}

impl SpindleState {
    pub fn from_mcode(value: f64) -> Option<Self> {
        match value.round() as i64 {
            3 => Some(Self::Clockwise),
            4 => Some(Self::CounterClockwise),
            5 => Some(Self::Off),
            _ => None,
        }
    }
}

/// Machine state for one estimation pass
#[derive(Debug, Clone, PartialEq)]
pub struct MachineState {
    pub units: Units,
    pub distance_mode: DistanceMode,
    pub arc_center_mode: ArcCenterMode,
    pub plane: Plane,
    pub feed_mode: FeedMode,
    pub motion_mode: MotionMode,
    /// Last commanded F value in program units
    pub feed_rate: f64,
    /// Last commanded S value
    pub spindle_speed: f64,
    pub spindle: SpindleState,
    /// Tool selected with T
    pub selected_tool: Option<u32>,
    /// Tool loaded with M6
    pub active_tool: Option<u32>,
    /// Current position per configured axis
    pub position: Vec<Option<f64>>,
}

impl MachineState {
    /// Fresh state for `axis_count` axes with every position unknown
    pub fn new(axis_count: usize) -> Self {
        Self {
            units: Units::default(),
            distance_mode: DistanceMode::default(),
            arc_center_mode: ArcCenterMode::default(),
            plane: Plane::default(),
            feed_mode: FeedMode::default(),
            motion_mode: MotionMode::default(),
            feed_rate: 0.0,
            spindle_speed: 0.0,
            spindle: SpindleState::default(),
            selected_tool: None,
            active_tool: None,
            position: vec![None; axis_count],
        }
    }

    /// Current position with unknown axes taken as zero
    pub fn position_or_origin(&self) -> Vec<f64> {
        self.position.iter().map(|p| p.unwrap_or(0.0)).collect()
    }
}
