use std::fmt;

/// Stages of a subtitle generation job.
///
/// Stages advance strictly in declaration order; `Done`, `Cancelled` and
/// `Failed` are absorbing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Init,
    ProvisioningTool,
    ProvisioningModel,
    Extracting,
    Transcribing,
    Rendering,
    Remuxing,
    Done,
    Cancelled,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PipelineState::Done | PipelineState::Cancelled | PipelineState::Failed
        )
    }

    /// Short name used as the key for stage timings.
    pub fn key(self) -> &'static str {
        match self {
            PipelineState::Init => "init",
            PipelineState::ProvisioningTool => "tool",
            PipelineState::ProvisioningModel => "model",
            PipelineState::Extracting => "extract",
            PipelineState::Transcribing => "transcribe",
            PipelineState::Rendering => "render",
            PipelineState::Remuxing => "remux",
            PipelineState::Done => "done",
            PipelineState::Cancelled => "cancelled",
            PipelineState::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineState::Init => "initializing",
            PipelineState::ProvisioningTool => "provisioning ffmpeg",
            PipelineState::ProvisioningModel => "provisioning model",
            PipelineState::Extracting => "extracting audio",
            PipelineState::Transcribing => "recognizing speech",
            PipelineState::Rendering => "rendering subtitles",
            PipelineState::Remuxing => "remuxing subtitles",
            PipelineState::Done => "done",
            PipelineState::Cancelled => "cancelled",
            PipelineState::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(PipelineState::Done.is_terminal());
        assert!(PipelineState::Cancelled.is_terminal());
        assert!(PipelineState::Failed.is_terminal());
        assert!(!PipelineState::Transcribing.is_terminal());
        assert!(!PipelineState::Init.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(PipelineState::Extracting.to_string(), "extracting audio");
    }
}
