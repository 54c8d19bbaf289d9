//! Whole-file estimation pass
//!
//! The [`Processor`] folds lines one at a time through a [`MachineState`],
//! accumulating the bounding box, run time, and usage sets. Each line is
//! first interpreted into a block without touching the state, so a line
//! rejected for a modal conflict or a repeated word leaves no trace.

use gcodemeter_core::{AxisKind, ConfigError, GcodeError, MachineLimits};
use gcodemeter_parser::{Line, ModalGroup, ModalGroupTable, Word};
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

use crate::arc::{ArcDirection, ArcInterpolator, Plane, Point3, DEFAULT_ARC_DIVISIONS};
use crate::bounds::BoundingBox;
use crate::kinematics::Kinematics;
use crate::result::{EstimateResult, FileShape, LineDiagnostic, UsageValue};
use crate::state::{
    ArcCenterMode, DistanceMode, FeedMode, MachineState, MotionMode, SpindleState,
};

/// Settings for one estimation pass
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorOptions {
    /// Axis labels and kinematic limits
    pub limits: MachineLimits,
    /// Samples per arc
    pub arc_divisions: usize,
    /// Diagnostics kept in the result
    pub max_reported_errors: usize,
    /// Lines between progress reports (0 disables them)
    pub progress_interval: u64,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            limits: MachineLimits::default(),
            arc_divisions: DEFAULT_ARC_DIVISIONS,
            max_reported_errors: 100,
            progress_interval: 1000,
        }
    }
}

impl ProcessorOptions {
    pub fn new(limits: MachineLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn with_arc_divisions(mut self, divisions: usize) -> Self {
        self.arc_divisions = divisions;
        self
    }

    pub fn with_max_reported_errors(mut self, count: usize) -> Self {
        self.max_reported_errors = count;
        self
    }

    pub fn with_progress_interval(mut self, lines: u64) -> Self {
        self.progress_interval = lines;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        if self.arc_divisions == 0 {
            return Err(ConfigError::InvalidValue {
                setting: "arc_divisions".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Lifecycle of a processor; `finish` consumes it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    /// No line seen yet
    Idle,
    /// Folding lines
    Active,
}

/// Snapshot reported while a pass runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub lines_processed: u64,
    pub invalid_gcode: u64,
    /// Seconds estimated so far
    pub estimated_time: f64,
}

/// One-shot codes outside the modal groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NonModal {
    /// G4
    Dwell,
    /// G10
    SetCoordinateData,
    /// G28, G28.1, G30, G30.1
    Home,
    /// G92
    SetPosition,
    /// G92.1, G92.2, G92.3
    ResetOffsets,
}

impl NonModal {
    fn from_gcode(value: f64) -> Option<Self> {
        match (value * 10.0).round() as i64 {
            40 => Some(Self::Dwell),
            100 => Some(Self::SetCoordinateData),
            280 | 281 | 300 | 301 => Some(Self::Home),
            920 => Some(Self::SetPosition),
            921..=923 => Some(Self::ResetOffsets),
            _ => None,
        }
    }
}

/// Words of one line, interpreted but not yet applied
#[derive(Debug, Default)]
struct Block {
    motion: Option<MotionMode>,
    plane: Option<Plane>,
    distance: Option<DistanceMode>,
    arc_center: Option<ArcCenterMode>,
    feed_mode: Option<FeedMode>,
    units: Option<gcodemeter_core::Units>,
    spindle: Option<SpindleState>,
    tool_change: bool,
    non_modal: Option<NonModal>,
    /// G53 on this line
    machine_coords: bool,
    /// Axis words indexed like the configured axes
    axes: Vec<Option<f64>>,
    /// I, J, K
    offsets: [Option<f64>; 3],
    radius: Option<f64>,
    feed: Option<f64>,
    speed: Option<f64>,
    tool: Option<u32>,
    dwell: Option<f64>,
}

impl Block {
    fn has_axis_words(&self) -> bool {
        self.axes.iter().any(Option::is_some)
    }

    fn has_arc_words(&self) -> bool {
        self.offsets.iter().any(Option::is_some) || self.radius.is_some()
    }

    fn apply_modal(&mut self, group: ModalGroup, word: Word) {
        let code = (word.value * 10.0).round() as i64;
        match group {
            ModalGroup::Motion => self.motion = Some(MotionMode::from_gcode(word.value)),
            ModalGroup::Plane => self.plane = Plane::from_gcode(word.value),
            ModalGroup::Distance => {
                self.distance = Some(match code {
                    910 => DistanceMode::Incremental,
                    _ => DistanceMode::Absolute,
                })
            }
            ModalGroup::ArcDistance => {
                self.arc_center = Some(match code {
                    901 => ArcCenterMode::Absolute,
                    _ => ArcCenterMode::Incremental,
                })
            }
            ModalGroup::FeedRateMode => {
                self.feed_mode = Some(match code {
                    930 => FeedMode::InverseTime,
                    950 => FeedMode::UnitsPerRevolution,
                    _ => FeedMode::UnitsPerMinute,
                })
            }
            ModalGroup::Units => self.units = gcodemeter_core::Units::from_gcode(word.value),
            ModalGroup::Spindle => self.spindle = SpindleState::from_mcode(word.value),
            ModalGroup::ToolChange => self.tool_change = true,
            _ => {}
        }
    }
}

fn non_negative(line_number: u64, param: char, value: f64) -> Result<f64, GcodeError> {
    if value < 0.0 {
        return Err(GcodeError::InvalidParameter {
            line_number,
            param,
            reason: "must not be negative".to_string(),
        });
    }
    Ok(value)
}

/// Center of an `R` form arc in plane coordinates
///
/// A negative radius selects the arc longer than a half circle. Returns
/// `None` when start and end coincide.
fn radius_center(
    start: (f64, f64),
    end: (f64, f64),
    radius: f64,
    direction: ArcDirection,
) -> Option<(f64, f64)> {
    let (x, y) = (end.0 - start.0, end.1 - start.1);
    let chord = x.hypot(y);
    if chord < 1e-9 {
        return None;
    }
    // Radii slightly short of half the chord are rounding noise
    let mut h = -(4.0 * radius * radius - chord * chord).max(0.0).sqrt() / chord;
    if direction == ArcDirection::CounterClockwise {
        h = -h;
    }
    if radius < 0.0 {
        h = -h;
    }
    Some((start.0 + 0.5 * (x - y * h), start.1 + 0.5 * (y + x * h)))
}

fn component(p: Point3, letter: char) -> f64 {
    match letter {
        'X' => p.x,
        'Y' => p.y,
        _ => p.z,
    }
}

/// Synchronous estimation fold over G-code lines
#[derive(Debug)]
pub struct Processor {
    options: ProcessorOptions,
    kinematics: Kinematics,
    arcs: ArcInterpolator,
    stage: ProcessorState,
    state: MachineState,
    bbox: BoundingBox,
    lines: u64,
    invalid_gcode: u64,
    total_time: f64,
    dwell_time: f64,
    rapid_distance: f64,
    feed_distance: f64,
    tools: BTreeSet<u32>,
    spindle_speeds: BTreeSet<UsageValue>,
    feed_rates: BTreeSet<UsageValue>,
    used_axes: BTreeSet<char>,
    diagnostics: Vec<LineDiagnostic>,
}

impl Processor {
    /// Start a pass with fresh state
    ///
    /// Options are not rejected here. Unusable limit entries leave their
    /// axis unconstrained and a warning is logged.
    pub fn new(options: ProcessorOptions) -> Self {
        if let Err(e) = options.validate() {
            warn!("Processor options are invalid, unusable limits ignored: {}", e);
        }
        let axis_count = options.limits.axes.len();
        Self {
            kinematics: Kinematics::new(&options.limits),
            arcs: ArcInterpolator::new(options.arc_divisions),
            stage: ProcessorState::Idle,
            state: MachineState::new(axis_count),
            bbox: BoundingBox::new(&options.limits.axes),
            lines: 0,
            invalid_gcode: 0,
            total_time: 0.0,
            dwell_time: 0.0,
            rapid_distance: 0.0,
            feed_distance: 0.0,
            tools: BTreeSet::new(),
            spindle_speeds: BTreeSet::new(),
            feed_rates: BTreeSet::new(),
            used_axes: BTreeSet::new(),
            diagnostics: Vec::new(),
            options,
        }
    }

    pub fn state(&self) -> ProcessorState {
        self.stage
    }

    /// Modal state after the lines processed so far
    pub fn machine_state(&self) -> &MachineState {
        &self.state
    }

    pub fn lines_processed(&self) -> u64 {
        self.lines
    }

    pub fn invalid_gcode(&self) -> u64 {
        self.invalid_gcode
    }

    /// Seconds estimated so far
    pub fn estimated_time(&self) -> f64 {
        self.total_time
    }

    pub fn progress(&self) -> Progress {
        Progress {
            lines_processed: self.lines,
            invalid_gcode: self.invalid_gcode,
            estimated_time: self.total_time,
        }
    }

    /// Fold one line of text into the pass
    ///
    /// Never fails: lines that cannot be interpreted are counted and skipped.
    pub fn process_line(&mut self, text: &str) {
        if self.stage == ProcessorState::Idle {
            debug!(
                "Estimation pass started (axes: {:?}, arc divisions: {})",
                self.options.limits.axes,
                self.arcs.divisions()
            );
            self.stage = ProcessorState::Active;
        }
        self.lines += 1;
        let line_number = self.lines;

        let line = match Line::parse(text) {
            Ok(line) => line,
            Err(err) => {
                self.reject(GcodeError::InvalidSyntax {
                    line_number,
                    reason: err.to_string(),
                });
                return;
            }
        };

        match self.interpret(&line, line_number) {
            Ok(block) => self.apply(block, line_number),
            Err(err) => self.reject(err),
        }
    }

    /// Materialize the result
    pub fn finish(self) -> EstimateResult {
        let units = self.state.units;
        let kinematics = &self.kinematics;
        let bounding_box = self.bbox.map_axes(|i, v| match kinematics.kind(i) {
            Some(AxisKind::Linear) => units.from_mm(v),
            _ => v,
        });
        let file_shape = FileShape::classify(&self.used_axes);

        debug!(
            "Estimation pass finished: {} lines, {} invalid, {:.1}s, shape {}",
            self.lines, self.invalid_gcode, self.total_time, file_shape
        );

        EstimateResult {
            lines: self.lines,
            invalid_gcode: self.invalid_gcode,
            total_time: self.total_time,
            dwell_time: self.dwell_time,
            rapid_distance: units.from_mm(self.rapid_distance),
            feed_distance: units.from_mm(self.feed_distance),
            bounding_box,
            units,
            tools: self.tools,
            spindle_speeds: self.spindle_speeds,
            feed_rates: self.feed_rates,
            used_axes: self.used_axes,
            file_shape,
            diagnostics: self.diagnostics,
        }
    }

    fn reject(&mut self, err: GcodeError) {
        self.invalid_gcode += 1;
        let line_number = err.line_number();
        if self.diagnostics.len() < self.options.max_reported_errors {
            warn!("Skipping line {}: {}", line_number, err);
            self.diagnostics.push(LineDiagnostic {
                line_number,
                message: err.to_string(),
            });
        } else {
            debug!("Skipping line {}: {}", line_number, err);
        }
    }

    fn interpret(&self, line: &Line, line_number: u64) -> Result<Block, GcodeError> {
        let table = ModalGroupTable::global();
        let mut block = Block {
            axes: vec![None; self.options.limits.axes.len()],
            ..Block::default()
        };
        let mut groups: Vec<(ModalGroup, Word)> = Vec::new();
        let mut non_modal_word: Option<Word> = None;
        let mut seen = [false; 26];

        for &word in line.words() {
            if word.is_command() {
                if let Some(group) = table.group_of(word.letter, word.value) {
                    if let Some((_, first)) = groups.iter().find(|(g, _)| *g == group) {
                        return Err(GcodeError::ModalGroupConflict {
                            line_number,
                            group: group.to_string(),
                            first: first.to_string(),
                            second: word.to_string(),
                        });
                    }
                    groups.push((group, word));
                    block.apply_modal(group, word);
                } else if table.is_non_modal(word.letter, word.value) {
                    // G53 only modifies the motion on its line
                    if (word.value * 10.0).round() as i64 == 530 {
                        block.machine_coords = true;
                        continue;
                    }
                    if let Some(first) = non_modal_word {
                        return Err(GcodeError::ModalGroupConflict {
                            line_number,
                            group: "G0 (non-modal)".to_string(),
                            first: first.to_string(),
                            second: word.to_string(),
                        });
                    }
                    non_modal_word = Some(word);
                    block.non_modal = NonModal::from_gcode(word.value);
                } else {
                    trace!("Line {}: ignoring unsupported code {}", line_number, word);
                }
                continue;
            }

            if !word.letter.is_ascii_uppercase() {
                continue;
            }
            let slot = (word.letter as u8 - b'A') as usize;
            if seen[slot] {
                return Err(GcodeError::AmbiguousWord {
                    line_number,
                    letter: word.letter,
                });
            }
            seen[slot] = true;

            if let Some(index) = self.options.limits.axis_index(word.letter) {
                block.axes[index] = Some(word.value);
                continue;
            }
            match word.letter {
                'I' => block.offsets[0] = Some(word.value),
                'J' => block.offsets[1] = Some(word.value),
                'K' => block.offsets[2] = Some(word.value),
                'R' => block.radius = Some(word.value),
                'F' => block.feed = Some(non_negative(line_number, 'F', word.value)?),
                'S' => block.speed = Some(non_negative(line_number, 'S', word.value)?),
                'P' => block.dwell = Some(word.value),
                'T' => {
                    if word.value < 0.0
                        || word.value.fract() != 0.0
                        || word.value > f64::from(u32::MAX)
                    {
                        return Err(GcodeError::InvalidParameter {
                            line_number,
                            param: 'T',
                            reason: format!("tool number must be an integer from 0 to {}", u32::MAX),
                        });
                    }
                    block.tool = Some(word.value as u32);
                }
                _ => {}
            }
        }

        if block.non_modal == Some(NonModal::Dwell) {
            if let Some(seconds) = block.dwell {
                non_negative(line_number, 'P', seconds)?;
            }
        }

        Ok(block)
    }

    fn apply(&mut self, block: Block, line_number: u64) {
        if let Some(mode) = block.feed_mode {
            self.state.feed_mode = mode;
        }
        if let Some(feed) = block.feed {
            self.state.feed_rate = feed;
            self.feed_rates.insert(UsageValue(feed));
        }
        if let Some(speed) = block.speed {
            self.state.spindle_speed = speed;
            self.spindle_speeds.insert(UsageValue(speed));
        }
        if let Some(tool) = block.tool {
            self.state.selected_tool = Some(tool);
            self.tools.insert(tool);
        }
        if block.tool_change {
            self.state.active_tool = self.state.selected_tool;
        }
        if let Some(spindle) = block.spindle {
            self.state.spindle = spindle;
        }
        if block.non_modal == Some(NonModal::Dwell) {
            let seconds = block.dwell.unwrap_or(0.0);
            self.dwell_time += seconds;
            self.total_time += seconds;
        }
        if let Some(plane) = block.plane {
            self.state.plane = plane;
        }
        if let Some(units) = block.units {
            self.state.units = units;
        }
        if let Some(mode) = block.distance {
            self.state.distance_mode = mode;
        }
        if let Some(mode) = block.arc_center {
            self.state.arc_center_mode = mode;
        }
        if let Some(mode) = block.motion {
            self.state.motion_mode = mode;
        }

        for (index, value) in block.axes.iter().enumerate() {
            if value.is_some() {
                self.used_axes.insert(self.options.limits.axes[index]);
            }
        }

        match block.non_modal {
            Some(NonModal::SetPosition) => {
                for (index, value) in block.axes.iter().enumerate() {
                    if let Some(value) = value {
                        self.state.position[index] = Some(self.to_internal(index, *value));
                    }
                }
                return;
            }
            Some(NonModal::SetCoordinateData | NonModal::Home | NonModal::ResetOffsets) => return,
            Some(NonModal::Dwell) | None => {}
        }

        let motion = self.state.motion_mode;
        let is_arc = matches!(motion, MotionMode::Arc(_));
        if !block.has_axis_words() && !(is_arc && block.has_arc_words()) {
            return;
        }

        let target = self.resolve_target(&block);
        match motion {
            MotionMode::Rapid => self.straight_move(target, true, line_number),
            MotionMode::Linear | MotionMode::Other => self.straight_move(target, false, line_number),
            MotionMode::Arc(direction) => self.arc_move(&block, target, direction, line_number),
            MotionMode::Cancelled => {
                trace!("Line {}: axis words with motion cancelled", line_number);
            }
        }
    }

    /// Convert a program value to mm (linear axes) or degrees
    fn to_internal(&self, index: usize, value: f64) -> f64 {
        match self.kinematics.kind(index) {
            Some(AxisKind::Linear) => self.state.units.to_mm(value),
            _ => value,
        }
    }

    fn resolve_target(&self, block: &Block) -> Vec<Option<f64>> {
        let absolute =
            block.machine_coords || self.state.distance_mode == DistanceMode::Absolute;
        self.state
            .position
            .iter()
            .zip(&block.axes)
            .enumerate()
            .map(|(index, (current, given))| match given {
                None => *current,
                Some(value) => {
                    let value = self.to_internal(index, *value);
                    Some(if absolute {
                        value
                    } else {
                        current.unwrap_or(0.0) + value
                    })
                }
            })
            .collect()
    }

    /// Active feed in units/min of the move (mm for linear moves)
    fn active_feed(&self, linear: bool) -> f64 {
        let feed = match self.state.feed_mode {
            FeedMode::UnitsPerMinute => self.state.feed_rate,
            FeedMode::UnitsPerRevolution => self.state.feed_rate * self.state.spindle_speed,
            FeedMode::InverseTime => 0.0,
        };
        if linear {
            self.state.units.to_mm(feed)
        } else {
            feed
        }
    }

    fn move_time(&self, linear: bool, rapid: bool, time_at: impl FnOnce(f64) -> f64) -> f64 {
        if !rapid && self.state.feed_mode == FeedMode::InverseTime {
            return if self.state.feed_rate > 0.0 {
                60.0 / self.state.feed_rate
            } else {
                0.0
            };
        }
        time_at(self.active_feed(linear))
    }

    fn straight_move(&mut self, target: Vec<Option<f64>>, rapid: bool, line_number: u64) {
        let origin = self.state.position_or_origin();
        let deltas: Vec<f64> = target
            .iter()
            .zip(&origin)
            .map(|(t, o)| t.map_or(0.0, |t| t - o))
            .collect();

        self.bbox.include_point(&self.state.position);
        self.bbox.include_point(&target);

        if let Some(displacement) = self.kinematics.displacement(&deltas) {
            let kinematics = &self.kinematics;
            let time = self.move_time(displacement.linear, rapid, |feed| {
                kinematics.straight_move_time(&deltas, displacement, feed, rapid)
            });
            self.total_time += time;
            if displacement.linear {
                if rapid {
                    self.rapid_distance += displacement.distance;
                } else {
                    self.feed_distance += displacement.distance;
                }
            }
            trace!(
                "Line {}: {} move {:.4} over {:.3}s",
                line_number,
                if rapid { "rapid" } else { "feed" },
                displacement.distance,
                time
            );
        }

        self.state.position = target;
    }

    fn arc_move(
        &mut self,
        block: &Block,
        mut target: Vec<Option<f64>>,
        direction: ArcDirection,
        line_number: u64,
    ) {
        let plane = self.state.plane;
        let [first, second, helix] = plane.axes();
        let limits = &self.options.limits;
        let (Some(ia), Some(ib)) = (limits.axis_index(first), limits.axis_index(second)) else {
            trace!(
                "Line {}: arc plane {:?} has unconfigured axes, estimating as a line",
                line_number,
                plane
            );
            self.straight_move(target, false, line_number);
            return;
        };

        let origin = self.state.position_or_origin();
        let end: Vec<f64> = target.iter().map(|t| t.unwrap_or(0.0)).collect();
        let point = |values: &[f64]| {
            let get = |letter| limits.axis_index(letter).map_or(0.0, |i| values[i]);
            Point3::new(get('X'), get('Y'), get('Z'))
        };
        let start_point = point(&origin);
        let end_point = point(&end);

        let start_ab = (origin[ia], origin[ib]);
        let end_ab = (end[ia], end[ib]);
        let offset_index = |letter: char| (letter as u8 - b'I') as usize;
        let [oa, ob] = plane.offset_letters();
        let offset_a = block.offsets[offset_index(oa)];
        let offset_b = block.offsets[offset_index(ob)];

        let center_ab = match (block.radius, offset_a.or(offset_b)) {
            (None, None) => None,
            (Some(radius), None) => {
                radius_center(start_ab, end_ab, self.state.units.to_mm(radius), direction)
            }
            _ => {
                let units = self.state.units;
                Some(match self.state.arc_center_mode {
                    ArcCenterMode::Incremental => (
                        start_ab.0 + units.to_mm(offset_a.unwrap_or(0.0)),
                        start_ab.1 + units.to_mm(offset_b.unwrap_or(0.0)),
                    ),
                    ArcCenterMode::Absolute => (
                        offset_a.map_or(start_ab.0, |v| units.to_mm(v)),
                        offset_b.map_or(start_ab.1, |v| units.to_mm(v)),
                    ),
                })
            }
        };
        let Some((ca, cb)) = center_ab else {
            trace!(
                "Line {}: arc without a usable center, estimating as a line",
                line_number
            );
            self.straight_move(target, false, line_number);
            return;
        };

        let center = plane.join(ca, cb, 0.0);
        let path = self
            .arcs
            .interpolate(plane, start_point, end_point, center, direction);

        // The arc moves both plane axes even when one was unknown
        target[ia] = Some(end[ia]);
        target[ib] = Some(end[ib]);
        let helix_index = limits.axis_index(helix).filter(|&i| target[i].is_some());

        self.bbox.include_point(&self.state.position);
        for p in &path.points {
            self.bbox.include(ia, component(*p, first));
            self.bbox.include(ib, component(*p, second));
            if let Some(ih) = helix_index {
                self.bbox.include(ih, component(*p, helix));
            }
        }
        self.bbox.include_point(&target);

        let kinematics = &self.kinematics;
        let time = self.move_time(true, false, |feed| {
            kinematics.arc_move_time(path.length, &[ia, ib], feed, false)
        });
        self.total_time += time;
        self.feed_distance += path.length;
        trace!(
            "Line {}: arc {:?} length {:.4} over {:.3}s",
            line_number,
            direction,
            path.length,
            time
        );

        self.state.position = target;
    }
}

/// Run a whole pass over `content`
pub fn process_file(content: &str, options: &ProcessorOptions) -> EstimateResult {
    process_file_with_progress(content, options, |_| {})
}

/// Run a whole pass, reporting progress every `progress_interval` lines
pub fn process_file_with_progress(
    content: &str,
    options: &ProcessorOptions,
    mut on_progress: impl FnMut(Progress),
) -> EstimateResult {
    let mut processor = Processor::new(options.clone());
    let interval = options.progress_interval;
    for text in content.lines() {
        processor.process_line(text);
        if interval > 0 && processor.lines_processed() % interval == 0 {
            on_progress(processor.progress());
        }
    }
    processor.finish()
}
