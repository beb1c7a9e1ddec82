//! Snapshot of the sync session for status queries.

use serde::Serialize;

use super::asset::SyncAsset;
use crate::types::BlockHeight;

/// Payload of a sync status query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncStatus {
    #[serde(rename = "AssetID")]
    pub asset_id: i32,
    #[serde(rename = "AssetName")]
    pub asset_name: &'static str,
    /// Seconds since the current asset started.
    #[serde(rename = "AssetStartTime")]
    pub asset_elapsed_secs: u64,
    #[serde(rename = "Attempt")]
    pub attempt: u32,
    #[serde(rename = "IsBlockchainSynced")]
    pub is_blockchain_synced: bool,
    #[serde(rename = "IsDynodeListSynced")]
    pub is_dynode_list_synced: bool,
    #[serde(rename = "IsWinnersListSynced")]
    pub is_winners_list_synced: bool,
    #[serde(rename = "IsSynced")]
    pub is_synced: bool,
    #[serde(rename = "IsFailed")]
    pub is_failed: bool,
    #[serde(rename = "TipHeight")]
    pub tip_height: Option<BlockHeight>,
    #[serde(rename = "Progress")]
    pub progress: f64,
    #[serde(rename = "Status")]
    pub status: &'static str,
}

impl SyncStatus {
    pub(crate) fn from_asset(asset: SyncAsset) -> Self {
        Self {
            asset_id: asset.ordinal(),
            asset_name: asset.name(),
            asset_elapsed_secs: 0,
            attempt: 0,
            is_blockchain_synced: asset.is_past(SyncAsset::Initial),
            is_dynode_list_synced: asset.is_past(SyncAsset::NodeDirectory),
            is_winners_list_synced: asset.is_past(SyncAsset::PaymentVotes),
            is_synced: asset == SyncAsset::Finished,
            is_failed: asset == SyncAsset::Failed,
            tip_height: None,
            progress: 0.0,
            status: asset.status_text(),
        }
    }
}
