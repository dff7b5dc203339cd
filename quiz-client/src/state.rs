//! Observable upload state and view-phase selection.

/// Snapshot of one upload cycle, published on every change.
#[derive(Debug, Clone, Default)]
pub struct UploadState {
    /// A request is in flight.
    pub loading: bool,
    /// Transfer progress, 0-100. Reset to 0 at request start and after
    /// completion.
    pub progress: u8,
    /// Markdown from the last successful request. Replaced wholesale on
    /// each new result.
    pub data: Option<String>,
    /// Message from the last failed request. Cleared when a new request
    /// starts.
    pub error: Option<String>,
    /// Requests that have settled, success or failure.
    pub completed_requests: u64,
}

/// The four mutually exclusive presentation states.
#[derive(Debug, PartialEq, Eq)]
pub enum ViewPhase<'a> {
    /// Upload in flight. `generating` flips above 90% as a cosmetic
    /// caption; the server sends no real phase signal.
    Uploading { percent: u8, generating: bool },
    /// Nothing to show yet.
    Empty,
    /// Last request failed and no earlier result is on screen.
    Failed(&'a str),
    /// Markdown ready to render.
    Ready(&'a str),
}

impl UploadState {
    /// Select the presentation state. A result on screen outlives a later
    /// failure; the error only shows when there is no data to render.
    pub fn phase(&self) -> ViewPhase<'_> {
        if self.loading {
            ViewPhase::Uploading {
                percent: self.progress,
                generating: self.progress > 90,
            }
        } else if let Some(data) = &self.data {
            ViewPhase::Ready(data)
        } else if let Some(error) = &self.error {
            ViewPhase::Failed(error)
        } else {
            ViewPhase::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_empty() {
        assert_eq!(UploadState::default().phase(), ViewPhase::Empty);
    }

    #[test]
    fn loading_wins_over_everything() {
        let state = UploadState {
            loading: true,
            progress: 42,
            data: Some("old".to_string()),
            error: Some("old error".to_string()),
            completed_requests: 1,
        };
        assert_eq!(
            state.phase(),
            ViewPhase::Uploading {
                percent: 42,
                generating: false
            }
        );
    }

    #[test]
    fn generating_caption_flips_above_ninety_percent() {
        let mut state = UploadState {
            loading: true,
            progress: 90,
            ..Default::default()
        };
        assert_eq!(
            state.phase(),
            ViewPhase::Uploading {
                percent: 90,
                generating: false
            }
        );

        state.progress = 91;
        assert_eq!(
            state.phase(),
            ViewPhase::Uploading {
                percent: 91,
                generating: true
            }
        );
    }

    #[test]
    fn data_wins_over_error() {
        let state = UploadState {
            data: Some("# quiz".to_string()),
            error: Some("boom".to_string()),
            ..Default::default()
        };
        assert_eq!(state.phase(), ViewPhase::Ready("# quiz"));
    }

    #[test]
    fn error_shows_when_there_is_no_data() {
        let state = UploadState {
            error: Some("boom".to_string()),
            ..Default::default()
        };
        assert_eq!(state.phase(), ViewPhase::Failed("boom"));
    }
}
