use super::config::DEFAULT_SWEEP_ANGLE;

/// Progress report emitted by the stitching engine for each processed frame.
///
/// `progress_x`/`progress_y` are fractions of the field of view accumulated
/// since capture start; the panning rates are fractions per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressSample {
    pub finished: bool,
    pub panning_rate_x: f32,
    pub panning_rate_y: f32,
    pub progress_x: f32,
    pub progress_y: f32,
}

/// Field of view of the capturing camera plus the sweep limit, fixed per session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleBudget {
    pub horizontal_view_angle: f32,
    pub vertical_view_angle: f32,
    pub sweep_limit_degrees: f32,
}

impl AngleBudget {
    pub fn new(horizontal_view_angle: f32, vertical_view_angle: f32) -> Self {
        Self {
            horizontal_view_angle,
            vertical_view_angle,
            sweep_limit_degrees: DEFAULT_SWEEP_ANGLE,
        }
    }

    pub fn with_sweep_limit(mut self, sweep_limit_degrees: f32) -> Self {
        self.sweep_limit_degrees = sweep_limit_degrees;
        self
    }
}

/// Sweep feedback for the UI while a capture is still running, all in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SweepProgress {
    pub panning_rate_x: f32,
    pub panning_rate_y: f32,
    pub angle_x: f32,
    pub angle_y: f32,
}
