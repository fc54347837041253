//! Per-item and total size limits
//!
//! Limits are given in megabytes (1 MB = 1 048 576 bytes). Reported sizes are
//! whole megabytes, rounded down.

use media_library::{Asset, MediaFilter, MediaKind};
use serde::{Deserialize, Serialize};

pub const BYTES_PER_MB: u64 = 1024 * 1024;

pub fn bytes_to_mb(bytes: u64) -> u64 {
    bytes / BYTES_PER_MB
}

/// Size limits in MB; `None` means unlimited
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeLimits {
    pub max_media_size_mb: Option<f64>,
    pub max_total_media_size_mb: Option<f64>,
}

/// A breached size limit
#[derive(Debug, Clone, PartialEq)]
pub enum SizeViolation {
    Item {
        kind: MediaKind,
        limit_mb: f64,
        actual_mb: u64,
    },
    Total {
        filter: MediaFilter,
        limit_mb: f64,
        actual_total_mb: u64,
        selected_count: usize,
    },
}

impl SizeLimits {
    /// Limits from values where any negative number means unlimited
    pub fn from_sentinels(max_media_size_mb: f64, max_total_media_size_mb: f64) -> Self {
        Self {
            max_media_size_mb: Some(max_media_size_mb),
            max_total_media_size_mb: Some(max_total_media_size_mb),
        }
        .normalized()
    }

    pub fn normalized(self) -> Self {
        let keep = |limit: Option<f64>| limit.filter(|mb| *mb >= 0.0);
        Self {
            max_media_size_mb: keep(self.max_media_size_mb),
            max_total_media_size_mb: keep(self.max_total_media_size_mb),
        }
    }

    /// Limit applied to a single item: the per-item limit, else the total limit
    pub fn item_limit(&self) -> Option<f64> {
        self.max_media_size_mb.or(self.max_total_media_size_mb)
    }

    pub fn check_item(&self, kind: MediaKind, byte_len: usize) -> Result<(), SizeViolation> {
        let Some(limit_mb) = self.item_limit() else {
            return Ok(());
        };
        if byte_len as f64 >= limit_mb * BYTES_PER_MB as f64 {
            return Err(SizeViolation::Item {
                kind,
                limit_mb,
                actual_mb: bytes_to_mb(byte_len as u64),
            });
        }
        Ok(())
    }

    pub fn check_total(
        &self,
        filter: MediaFilter,
        assets: &[Asset],
        selected_count: usize,
    ) -> Result<(), SizeViolation> {
        let Some(limit_mb) = self.max_total_media_size_mb else {
            return Ok(());
        };
        let total: u64 = assets.iter().map(|a| a.byte_len() as u64).sum();
        let actual_total_mb = bytes_to_mb(total);
        if actual_total_mb as f64 >= limit_mb {
            return Err(SizeViolation::Total {
                filter,
                limit_mb,
                actual_total_mb,
                selected_count,
            });
        }
        Ok(())
    }

    /// Both checks for a single asset, as used for captured media
    pub fn check_single(&self, filter: MediaFilter, asset: &Asset) -> Result<(), SizeViolation> {
        self.check_item(asset.kind, asset.byte_len())?;
        self.check_total(filter, std::slice::from_ref(asset), 1)
    }
}
