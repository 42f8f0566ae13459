use std::fmt;

/// Position of a single analysis run in the pipeline.
///
/// ```text
/// Idle -> Fetching -> Sanitizing -> Prompting -> Calling -> Parsing -> Done
///            \            \            \            \          \
///             +------------+------------+------------+----------+--> Failed
/// ```
///
/// `Done` and `Failed` are terminal. There is no transition back into an
/// earlier stage; retries happen inside a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Idle,
    Fetching,
    Sanitizing,
    Prompting,
    Calling,
    Parsing,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Fetching => "fetching",
            PipelineStage::Sanitizing => "sanitizing",
            PipelineStage::Prompting => "prompting",
            PipelineStage::Calling => "calling",
            PipelineStage::Parsing => "parsing",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    /// The stage that follows a successful completion of this one.
    pub fn next(&self) -> PipelineStage {
        match self {
            PipelineStage::Idle => PipelineStage::Fetching,
            PipelineStage::Fetching => PipelineStage::Sanitizing,
            PipelineStage::Sanitizing => PipelineStage::Prompting,
            PipelineStage::Prompting => PipelineStage::Calling,
            PipelineStage::Calling => PipelineStage::Parsing,
            PipelineStage::Parsing => PipelineStage::Done,
            PipelineStage::Done => PipelineStage::Done,
            PipelineStage::Failed => PipelineStage::Failed,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
