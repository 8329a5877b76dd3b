//! Stop-on-sweep policy.
//!
//! Converts the engine's fractional progress into degrees and decides
//! whether the sweep is complete.

use crate::models::progress::{AngleBudget, ProgressSample, SweepProgress};

/// What to do with one [`ProgressSample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepDecision {
    /// Stop capturing and finalize.
    Complete,
    /// Keep capturing; report this feedback.
    InProgress(SweepProgress),
}

impl SweepDecision {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Evaluate one sample against the session's angle budget.
///
/// Each axis is compared by absolute value so panning left or right (up or
/// down) counts toward the same limit.
pub fn evaluate(sample: &ProgressSample, budget: &AngleBudget) -> SweepDecision {
    let angle_x = sample.progress_x * budget.horizontal_view_angle;
    let angle_y = sample.progress_y * budget.vertical_view_angle;

    if sample.finished
        || angle_x.abs() >= budget.sweep_limit_degrees
        || angle_y.abs() >= budget.sweep_limit_degrees
    {
        return SweepDecision::Complete;
    }

    SweepDecision::InProgress(SweepProgress {
        panning_rate_x: sample.panning_rate_x * budget.horizontal_view_angle,
        panning_rate_y: sample.panning_rate_y * budget.vertical_view_angle,
        angle_x,
        angle_y,
    })
}

/// Rotation applied to panning direction vectors so progress feedback lines
/// up with the display at capture orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressDirection {
    m: [[f32; 2]; 2],
}

impl ProgressDirection {
    pub fn identity() -> Self {
        Self {
            m: [[1.0, 0.0], [0.0, 1.0]],
        }
    }

    /// Rotation by `degrees`, which must be a multiple of 90.
    pub fn from_orientation(degrees: u32) -> Self {
        let (sin, cos) = match degrees % 360 {
            90 => (1.0, 0.0),
            180 => (0.0, -1.0),
            270 => (-1.0, 0.0),
            _ => (0.0, 1.0),
        };
        Self {
            m: [[cos, -sin], [sin, cos]],
        }
    }

    pub fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.m[0][0] * x + self.m[0][1] * y,
            self.m[1][0] * x + self.m[1][1] * y,
        )
    }

    /// Rotate the panning rates and accumulated angles of `progress`.
    pub fn apply(&self, progress: SweepProgress) -> SweepProgress {
        let (panning_rate_x, panning_rate_y) = self.map(progress.panning_rate_x, progress.panning_rate_y);
        let (angle_x, angle_y) = self.map(progress.angle_x, progress.angle_y);
        SweepProgress {
            panning_rate_x,
            panning_rate_y,
            angle_x,
            angle_y,
        }
    }
}

impl Default for ProgressDirection {
    fn default() -> Self {
        Self::identity()
    }
}
