//! End-to-end behavior of the tick driver, canvasser and tip observer.

use std::time::Duration;

use dynode_sync::network::{OutboundRequest, PeerRequest, PeerRequestLedger, RequestTag};
use dynode_sync::test_utils::{TestHarness, test_peer};
use dynode_sync::{ChainTip, PeerSnapshot, SyncAsset, SyncConfig, SyncEvent};

const TIMEOUT: Duration = Duration::from_secs(30);

fn create_test_config() -> SyncConfig {
    SyncConfig::testnet().with_ticks_per_cycle(1).with_asset_timeout(TIMEOUT)
}

fn tip(height: u32) -> ChainTip {
    ChainTip {
        height,
        initial_download: false,
    }
}

/// Harness past initial block download, in `NodeDirectory`, with `peers` connected.
async fn synced_chain_harness(peers: &[PeerSnapshot]) -> TestHarness {
    let mut harness = TestHarness::new(create_test_config());
    for peer in peers {
        harness.peers.insert(peer.clone()).await;
    }
    harness.manager.on_new_tip(tip(1000)).await.unwrap();
    assert_eq!(harness.manager.current_asset(), SyncAsset::NodeDirectory);
    harness
}

async fn advance_to(harness: &mut TestHarness, asset: SyncAsset) {
    while harness.manager.current_asset() != asset {
        harness.manager.advance().await.unwrap();
    }
}

fn sent_commands(requests: &[PeerRequest]) -> Vec<&'static str> {
    requests
        .iter()
        .filter_map(|request| match request {
            PeerRequest::Send {
                request,
                ..
            } => Some(request.cmd()),
            PeerRequest::Disconnect {
                ..
            } => None,
        })
        .collect()
}

#[tokio::test]
async fn test_outdated_peer_is_skipped_on_first_tick() {
    let old = test_peer(1, 70100);
    let mut harness = synced_chain_harness(std::slice::from_ref(&old)).await;

    harness.manager.tick().await.unwrap();

    let requests = harness.drain_requests();
    assert_eq!(sent_commands(&requests), vec!["getsporks"]);
    assert_eq!(harness.manager.session().attempt_count(), 0);
    assert_eq!(harness.manager.current_asset(), SyncAsset::NodeDirectory);
}

#[tokio::test]
async fn test_dynode_list_without_answers_fails() {
    let mut harness = synced_chain_harness(&[test_peer(1, 70900)]).await;
    let mut events = harness.manager.subscribe();

    harness.clock.advance(TIMEOUT + Duration::from_secs(1));
    harness.manager.tick().await.unwrap();

    assert_eq!(harness.manager.current_asset(), SyncAsset::Failed);
    assert!(harness.manager.is_failed());
    assert_eq!(
        events.try_recv(),
        Some(SyncEvent::Failed {
            asset: SyncAsset::NodeDirectory
        })
    );
    assert_eq!(harness.manager.status().status, "Synchronization failed");
}

#[tokio::test]
async fn test_enough_payment_data_advances_without_timeout() {
    let peers = [test_peer(1, 70900), test_peer(2, 70900), test_peer(3, 70900)];
    let mut harness = synced_chain_harness(&peers).await;
    advance_to(&mut harness, SyncAsset::PaymentVotes).await;

    harness.manager.tick().await.unwrap();
    harness.manager.tick().await.unwrap();
    assert_eq!(harness.manager.session().attempt_count(), 2);
    assert_eq!(harness.manager.current_asset(), SyncAsset::PaymentVotes);

    harness.payments.set_enough_data(true);
    harness.manager.tick().await.unwrap();

    assert_eq!(harness.manager.current_asset(), SyncAsset::Governance);
    assert_eq!(harness.manager.session().attempt_count(), 0);
    let dnget_count = sent_commands(&harness.drain_requests())
        .into_iter()
        .filter(|cmd| *cmd == "dnget")
        .count();
    assert_eq!(dnget_count, 2);
}

#[tokio::test]
async fn test_single_peer_is_not_enough_for_payment_votes() {
    let peers = [test_peer(1, 70900), test_peer(2, 70900)];
    let mut harness = synced_chain_harness(&peers).await;
    advance_to(&mut harness, SyncAsset::PaymentVotes).await;
    harness.payments.set_enough_data(true);

    harness.manager.tick().await.unwrap();
    assert_eq!(harness.manager.current_asset(), SyncAsset::PaymentVotes);
    harness.manager.tick().await.unwrap();
    assert_eq!(harness.manager.current_asset(), SyncAsset::PaymentVotes);

    harness.manager.tick().await.unwrap();
    assert_eq!(harness.manager.current_asset(), SyncAsset::Governance);
}

#[tokio::test]
async fn test_governance_finishes_when_votes_dry_up() {
    let peer = test_peer(1, 70900);
    let mut harness = synced_chain_harness(std::slice::from_ref(&peer)).await;
    advance_to(&mut harness, SyncAsset::Governance).await;
    harness.governance.set_vote_count(1200);
    let mut events = harness.manager.subscribe();

    // Objects requested from the only peer.
    harness.manager.tick().await.unwrap();
    assert_eq!(harness.manager.session().attempt_count(), 1);

    // Nothing left to ask for: the idle marker starts and votes are sampled.
    harness.manager.tick().await.unwrap();
    assert_eq!(harness.manager.current_asset(), SyncAsset::Governance);

    // A new tip keeps the asset timeout away while the idle marker ages.
    harness.clock.advance(TIMEOUT + Duration::from_secs(1));
    harness.manager.on_new_tip(tip(1001)).await.unwrap();
    harness.manager.tick().await.unwrap();

    assert_eq!(harness.manager.current_asset(), SyncAsset::Finished);
    assert!(harness.manager.is_synced());
    let events: Vec<_> = std::iter::from_fn(|| events.try_recv()).collect();
    assert!(events.contains(&SyncEvent::Finished));
    assert!(harness.ledger.has_fulfilled(peer.address, RequestTag::FullSync).await);
    assert_eq!(harness.progress.last(), Some(1.0));
}

#[tokio::test]
async fn test_governance_keeps_going_while_votes_arrive() {
    let peer = test_peer(1, 70900);
    let mut harness = synced_chain_harness(std::slice::from_ref(&peer)).await;
    advance_to(&mut harness, SyncAsset::Governance).await;
    harness.governance.set_vote_count(100);

    harness.manager.tick().await.unwrap();
    harness.manager.tick().await.unwrap();

    harness.clock.advance(TIMEOUT + Duration::from_secs(1));
    harness.manager.on_new_tip(tip(1001)).await.unwrap();
    harness.governance.set_vote_count(150);
    harness.manager.tick().await.unwrap();

    assert_eq!(harness.manager.current_asset(), SyncAsset::Governance);
}

#[tokio::test]
async fn test_long_gap_restarts_sync() {
    for start in [SyncAsset::PaymentVotes, SyncAsset::Governance, SyncAsset::Finished] {
        let mut harness = synced_chain_harness(&[test_peer(1, 70900)]).await;
        advance_to(&mut harness, start).await;
        harness.manager.tick().await.unwrap();
        let mut events = harness.manager.subscribe();

        harness.clock.advance(Duration::from_secs(2 * 60 * 60));
        harness.manager.tick().await.unwrap();

        assert_eq!(harness.manager.current_asset(), SyncAsset::NodeDirectory, "from {}", start);
        assert_eq!(harness.manager.session().attempt_count(), 0);
        assert_eq!(events.try_recv(), Some(SyncEvent::Reset));
        assert_eq!(
            events.try_recv(),
            Some(SyncEvent::AssetStarted {
                asset: SyncAsset::NodeDirectory
            })
        );

        // The next tick proceeds normally instead of restarting again.
        harness.clock.advance(Duration::from_secs(1));
        harness.manager.tick().await.unwrap();
        assert_eq!(harness.manager.current_asset(), SyncAsset::NodeDirectory);
        assert_eq!(harness.manager.session().attempt_count(), 1);
    }
}

#[tokio::test]
async fn test_long_gap_restarts_failed_sync() {
    let mut harness = synced_chain_harness(&[test_peer(1, 70900)]).await;
    harness.manager.tick().await.unwrap();
    harness.manager.fail();

    harness.clock.advance(Duration::from_secs(2 * 60 * 60));
    harness.manager.tick().await.unwrap();

    assert_eq!(harness.manager.current_asset(), SyncAsset::NodeDirectory);
}

#[tokio::test]
async fn test_fully_synced_peer_is_disconnected_first() {
    for asset in [SyncAsset::NodeDirectory, SyncAsset::PaymentVotes, SyncAsset::Governance] {
        let peer = test_peer(1, 70900);
        let mut harness = synced_chain_harness(std::slice::from_ref(&peer)).await;
        advance_to(&mut harness, asset).await;
        harness.ledger.add_fulfilled(peer.address, RequestTag::FullSync).await;

        harness.manager.tick().await.unwrap();

        assert_eq!(
            harness.drain_requests(),
            vec![PeerRequest::Disconnect {
                peer: peer.address
            }],
            "in {}",
            asset
        );
        assert_eq!(harness.manager.session().attempt_count(), 0);
        assert!(!harness.ledger.has_fulfilled(peer.address, RequestTag::SporkSync).await);
    }
}

#[tokio::test]
async fn test_fully_synced_peer_frees_slot_for_next_peer() {
    let done = test_peer(1, 70900);
    let fresh = test_peer(2, 70900);
    let mut harness = synced_chain_harness(&[done.clone(), fresh.clone()]).await;
    harness.ledger.add_fulfilled(done.address, RequestTag::FullSync).await;

    harness.manager.tick().await.unwrap();

    assert_eq!(
        harness.drain_requests(),
        vec![
            PeerRequest::Disconnect {
                peer: done.address
            },
            PeerRequest::Send {
                peer: fresh.address,
                request: OutboundRequest::GetSporks
            },
            PeerRequest::Send {
                peer: fresh.address,
                request: OutboundRequest::DynodeListSync
            },
        ]
    );
}

#[tokio::test]
async fn test_full_sync_walk_through_all_assets() {
    let peers = [test_peer(1, 70900), test_peer(2, 70900)];
    let mut harness = synced_chain_harness(&peers).await;
    let mut last_progress = 0.0;

    // Dynode list: both peers asked, then time out with partial data.
    harness.manager.tick().await.unwrap();
    harness.manager.tick().await.unwrap();
    harness.clock.advance(TIMEOUT + Duration::from_secs(1));
    harness.manager.tick().await.unwrap();
    assert_eq!(harness.manager.current_asset(), SyncAsset::PaymentVotes);

    // Payment votes: two peers answer and the store has enough.
    harness.payments.set_enough_data(true);
    for _ in 0..3 {
        harness.manager.tick().await.unwrap();
    }
    assert_eq!(harness.manager.current_asset(), SyncAsset::Governance);

    // Governance: asked everywhere, then times out.
    harness.manager.tick().await.unwrap();
    harness.manager.tick().await.unwrap();
    harness.clock.advance(TIMEOUT + Duration::from_secs(1));
    harness.manager.tick().await.unwrap();
    assert!(harness.manager.is_synced());

    for value in harness.progress.values() {
        assert!(value >= last_progress, "progress went from {} to {}", last_progress, value);
        last_progress = value;
    }
    assert_eq!(last_progress, 1.0);

    let status = harness.manager.status();
    assert!(status.is_synced);
    assert!(status.is_winners_list_synced);
    assert_eq!(status.asset_id, 999);
}
