//! Install progress reporting

/// Phases of the download/install pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    ReadingManifest,
    Downloading,
    Verifying,
    Extracting,
    Complete,
}

impl InstallPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallPhase::ReadingManifest => "reading manifest",
            InstallPhase::Downloading => "downloading",
            InstallPhase::Verifying => "verifying",
            InstallPhase::Extracting => "extracting",
            InstallPhase::Complete => "complete",
        }
    }
}

/// Progress callback: `(phase, percent complete, message)`.
pub type ProgressCallback = Box<dyn Fn(InstallPhase, f32, &str) + Send + Sync>;

/// Invoke the callback when one was supplied.
pub(crate) fn report(
    progress: Option<&ProgressCallback>,
    phase: InstallPhase,
    percent: f32,
    message: &str,
) {
    if let Some(callback) = progress {
        callback(phase, percent, message);
    }
}
