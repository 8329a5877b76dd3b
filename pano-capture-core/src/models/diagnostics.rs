/// Counters for debugging panorama sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDiagnostics {
    pub frames_dispatched: u64,
    pub frames_submitted: u64,
    pub progress_samples: u64,
    pub finalizations_started: u64,
    pub messages_discarded: u64,
    pub panoramas_saved: u64,
}
