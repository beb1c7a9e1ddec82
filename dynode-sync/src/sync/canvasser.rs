//! Per-peer request policy for the active asset.
//!
//! Each pass walks a peer snapshot and issues at most one asset-progressing
//! request, so peers are asked one at a time across successive ticks.

use super::asset::SyncAsset;
use super::manager::DynodeSyncManager;
use crate::error::SyncResult;
use crate::network::{GovernanceSyncRequest, OutboundRequest, RequestTag};
use crate::types::PeerSnapshot;

/// What the canvasser does after handling one peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PeerOutcome {
    /// Try the next peer in the snapshot.
    NextPeer,
    /// A request went out or the asset changed; end the pass.
    Done,
}

impl DynodeSyncManager {
    /// Apply the request policy of the current asset to `peers`.
    pub(super) async fn canvass_peers(&mut self, peers: &[PeerSnapshot]) -> SyncResult<()> {
        for peer in peers {
            // Outbound dynode connections are short-lived. Early inbound connections to a
            // dynode most likely come from other dynodes checking on it.
            if peer.is_dynode || (self.config.local_dynode && peer.inbound) {
                continue;
            }

            if self.config.is_deterministic() {
                return self.quick_sync_step(peer);
            }

            if self.ledger.has_fulfilled(peer.address, RequestTag::FullSync).await {
                tracing::info!("Disconnecting from recently synced peer {}", peer.id);
                self.requests.disconnect(peer)?;
                continue;
            }

            if !self.ledger.has_fulfilled(peer.address, RequestTag::SporkSync).await {
                self.ledger.add_fulfilled(peer.address, RequestTag::SporkSync).await;
                self.requests.send_request(peer, OutboundRequest::GetSporks)?;
                tracing::debug!(
                    "Tick {} {}: requesting sporks from peer {}",
                    self.session.tick_count,
                    self.session.current_asset,
                    peer.id
                );
            }

            let outcome = match self.session.current_asset {
                SyncAsset::NodeDirectory => self.sync_dynode_list(peer).await?,
                SyncAsset::PaymentVotes => self.sync_payment_votes(peer).await?,
                SyncAsset::Governance => self.sync_governance(peer).await?,
                SyncAsset::Initial | SyncAsset::Failed | SyncAsset::Finished => {
                    PeerOutcome::NextPeer
                }
            };
            if outcome == PeerOutcome::Done {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Handle an asset timeout. `Some(Done)` when the session moved on.
    async fn check_asset_timeout(&mut self, load_bearing: bool) -> SyncResult<Option<PeerOutcome>> {
        let now = self.clock.now();
        if !self.session.asset_timed_out(now, self.config.asset_timeout) {
            return Ok(None);
        }

        let asset = self.session.current_asset;
        tracing::warn!("Tick {} {}: timeout", self.session.tick_count, asset);
        if self.session.attempt_count == 0 {
            if load_bearing {
                // Nothing can be done without this dataset. Try again after the cooldown.
                self.fail();
                return Ok(Some(PeerOutcome::Done));
            }
            tracing::warn!("Failed to sync {}, continuing without it", asset);
        }
        self.advance().await?;
        Ok(Some(PeerOutcome::Done))
    }

    async fn sync_dynode_list(&mut self, peer: &PeerSnapshot) -> SyncResult<PeerOutcome> {
        if let Some(outcome) = self.check_asset_timeout(true).await? {
            return Ok(outcome);
        }

        if self.ledger.has_fulfilled(peer.address, RequestTag::DynodeListSync).await {
            return Ok(PeerOutcome::NextPeer);
        }
        self.ledger.add_fulfilled(peer.address, RequestTag::DynodeListSync).await;

        if peer.version < self.payments.min_protocol_version() {
            tracing::debug!("Peer {} too old for dynode list sync ({})", peer.id, peer.version);
            return Ok(PeerOutcome::NextPeer);
        }
        self.session.record_attempt();

        self.requests.send_request(peer, OutboundRequest::DynodeListSync)?;
        Ok(PeerOutcome::Done)
    }

    async fn sync_payment_votes(&mut self, peer: &PeerSnapshot) -> SyncResult<PeerOutcome> {
        // New blocks may stretch this asset well past the timeout; tips keep bumping it.
        if let Some(outcome) = self.check_asset_timeout(true).await? {
            return Ok(outcome);
        }

        // Ask at least two peers before trusting local data.
        if self.session.attempt_count > 1 && self.payments.is_enough_data() {
            tracing::info!(
                "Tick {} {}: found enough data",
                self.session.tick_count,
                self.session.current_asset
            );
            self.advance().await?;
            return Ok(PeerOutcome::Done);
        }

        if self.ledger.has_fulfilled(peer.address, RequestTag::PaymentVoteSync).await {
            return Ok(PeerOutcome::NextPeer);
        }
        self.ledger.add_fulfilled(peer.address, RequestTag::PaymentVoteSync).await;

        if peer.version < self.payments.min_protocol_version() {
            tracing::debug!("Peer {} too old for payment vote sync ({})", peer.id, peer.version);
            return Ok(PeerOutcome::NextPeer);
        }
        self.session.record_attempt();

        self.requests.send_request(
            peer,
            OutboundRequest::PaymentVoteSync {
                count: self.payments.storage_limit(),
            },
        )?;
        let heights = self.payments.missing_payment_blocks(peer);
        if !heights.is_empty() {
            tracing::debug!("Asking peer {} for {} low-data payment blocks", peer.id, heights.len());
            self.requests.send_request(
                peer,
                OutboundRequest::PaymentBlocks {
                    heights,
                },
            )?;
        }
        Ok(PeerOutcome::Done)
    }

    async fn sync_governance(&mut self, peer: &PeerSnapshot) -> SyncResult<PeerOutcome> {
        // Governance is best effort: a timeout moves on instead of failing.
        if let Some(outcome) = self.check_asset_timeout(false).await? {
            return Ok(outcome);
        }

        // Objects are requested once per peer, votes per object afterwards.
        if self.ledger.has_fulfilled(peer.address, RequestTag::GovernanceSync).await {
            return self.request_governance_votes(peer).await;
        }
        self.ledger.add_fulfilled(peer.address, RequestTag::GovernanceSync).await;

        if peer.version < self.config.min_governance_proto_version {
            tracing::debug!("Peer {} too old for governance sync ({})", peer.id, peer.version);
            return Ok(PeerOutcome::NextPeer);
        }
        self.session.record_attempt();

        self.requests.send_request(peer, OutboundRequest::GovernanceSync(GovernanceSyncRequest::all()))?;
        Ok(PeerOutcome::Done)
    }

    /// Ask `peer` for votes and decide whether governance sync has dried up.
    ///
    /// A non-empty vote request ends the pass like any other peer request.
    async fn request_governance_votes(&mut self, peer: &PeerSnapshot) -> SyncResult<PeerOutcome> {
        let plan = self.governance.plan_vote_requests(peer);
        let sent = !plan.objects.is_empty();
        if sent {
            tracing::trace!("Requesting {} object votes from peer {}", plan.objects.len(), peer.id);
            self.requests.send_request(
                peer,
                OutboundRequest::GovernanceVotes {
                    objects: plan.objects,
                },
            )?;
        }
        if plan.remaining > 0 {
            return Ok(if sent {
                PeerOutcome::Done
            } else {
                PeerOutcome::NextPeer
            });
        }

        let now = self.clock.now();
        let idle_since = *self.session.governance_idle_since.get_or_insert(now);
        if sent {
            return Ok(PeerOutcome::Done);
        }

        let tick = self.session.tick_count;
        if self.session.last_governance_check_tick == Some(tick) {
            return Ok(PeerOutcome::NextPeer);
        }

        // Every object has been asked about and the vote rate over the last tick
        // fell below 0.01% of the total or one vote per second.
        let votes = self.governance.vote_count();
        let last_votes = self.session.last_vote_count_sample;
        let floor = ((last_votes as f64 * 0.0001) as usize).max(self.config.ticks_per_cycle as usize);
        let idle_for = now.saturating_duration_since(idle_since);
        if idle_for > self.config.asset_timeout && votes.saturating_sub(last_votes) < floor {
            tracing::info!(
                "Tick {} {}: asked for all objects, nothing to do",
                tick,
                self.session.current_asset
            );
            self.session.governance_idle_since = None;
            self.advance().await?;
            return Ok(PeerOutcome::Done);
        }

        self.session.last_governance_check_tick = Some(tick);
        self.session.last_vote_count_sample = votes;
        Ok(PeerOutcome::NextPeer)
    }

    /// One step of the regtest shortcut against a single peer.
    fn quick_sync_step(&mut self, peer: &PeerSnapshot) -> SyncResult<()> {
        match self.session.attempt_count {
            0..=2 => self.requests.send_request(peer, OutboundRequest::GetSporks)?,
            3 => self.requests.send_request(peer, OutboundRequest::DynodeListSync)?,
            4 | 5 => {
                let count = u32::try_from(self.dynodes.count()).unwrap_or(u32::MAX);
                self.requests.send_request(
                    peer,
                    OutboundRequest::PaymentVoteSync {
                        count,
                    },
                )?;
                self.requests.send_request(
                    peer,
                    OutboundRequest::GovernanceSync(GovernanceSyncRequest::all()),
                )?;
            }
            _ => {
                self.finish_deterministic();
                return Ok(());
            }
        }
        self.session.record_attempt();
        Ok(())
    }
}
