use crate::error::PickerError;
use crate::size_policy::SizeViolation;
use media_library::{Asset, MediaFilter, MediaKind};

/// Outcome reported to the host of a picker invocation
///
/// Exactly one terminal event (`AssetsSelected`, `SelectionFailed` or
/// `Cancelled`) is sent per invocation. Size events may come before it any
/// number of times while the picker stays open for another attempt.
#[derive(Debug)]
pub enum PickerEvent {
    AssetsSelected(Vec<Asset>),
    SelectionFailed(PickerError),
    SizeExceeded {
        kind: MediaKind,
        limit_mb: f64,
        actual_mb: u64,
    },
    TotalSizeExceeded {
        filter: MediaFilter,
        limit_mb: f64,
        actual_total_mb: u64,
        selected_count: usize,
    },
    Cancelled,
}

impl PickerEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PickerEvent::AssetsSelected(_) | PickerEvent::SelectionFailed(_) | PickerEvent::Cancelled
        )
    }
}

impl From<SizeViolation> for PickerEvent {
    fn from(violation: SizeViolation) -> Self {
        match violation {
            SizeViolation::Item {
                kind,
                limit_mb,
                actual_mb,
            } => PickerEvent::SizeExceeded {
                kind,
                limit_mb,
                actual_mb,
            },
            SizeViolation::Total {
                filter,
                limit_mb,
                actual_total_mb,
                selected_count,
            } => PickerEvent::TotalSizeExceeded {
                filter,
                limit_mb,
                actual_total_mb,
                selected_count,
            },
        }
    }
}
