//! # GCodeMeter Estimator
//!
//! Single-pass motion and time estimation over G-code programs: modal
//! machine state, arc interpolation, trapezoidal move timing, bounding box,
//! and usage summaries.

pub mod arc;
pub mod bounds;
pub mod kinematics;
pub mod processor;
pub mod result;
pub mod state;

pub use arc::{ArcDirection, ArcInterpolator, ArcPath, Plane, Point3, DEFAULT_ARC_DIVISIONS};
pub use bounds::{BoundingBox, Extent};
pub use kinematics::{trapezoid_time, Displacement, Kinematics};
pub use processor::{
    process_file, process_file_with_progress, Processor, ProcessorOptions, ProcessorState,
    Progress,
};
pub use result::{EstimateResult, FileShape, LineDiagnostic, UsageValue};
pub use state::{ArcCenterMode, DistanceMode, FeedMode, MachineState, MotionMode, SpindleState};
