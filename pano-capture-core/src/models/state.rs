/// Capture state machine.
///
/// State transitions:
/// ```text
/// viewfinder ──start_capture──→ mosaic capturing
///     ↑                               │
///     └──────stop_capture(aborted)────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Viewfinder,
    MosaicCapturing,
}

impl CaptureState {
    pub fn is_viewfinder(&self) -> bool {
        matches!(self, Self::Viewfinder)
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::MosaicCapturing)
    }
}
