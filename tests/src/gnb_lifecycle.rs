//! gNB lifecycle integration tests
//!
//! N2 bring-up against reachable and unreachable AMFs, NG Setup outcomes,
//! loss of the AMF and stop/restart.

use ransim_common::{Error, GnbConfig};
use ransim_gnb::{AmfState, GnbEntity, GnbState, NgapState, SimulationContext};
use ransim_ngap::{Cause, TimeToWait};

use integration_tests::{
    gnb_config, init_test_logging, start_simulation, ue_config, unused_port, wait_for_condition, MockAmf,
    MockAmfConfig, MockAmfEvent, NgSetupBehaviour, DEFAULT_POLL_INTERVAL, DEFAULT_TEST_TIMEOUT,
};

/// An AMF that refuses the connection leaves the gNB in CONNECTION_REFUSED
#[tokio::test]
async fn test_unreachable_amf() {
    init_test_logging();

    let port = unused_port().await;
    let mut sim = SimulationContext::new();
    let config = gnb_config(([127, 0, 0, 1], port).into());

    let err = sim.start_gnb(config).await.unwrap_err();
    assert!(matches!(err, Error::TransportConnect(_)));

    let snapshot = sim.gnb_snapshot().await.expect("gNB kept after failed start");
    assert_eq!(snapshot.state, GnbState::ConnectionRefused);
    assert!(!snapshot.amf_connected);
    assert_eq!(snapshot.ngap_state, NgapState::Idle);

    sim.stop_gnb().await.unwrap();
    let snapshot = sim.gnb_snapshot().await.unwrap();
    assert_eq!(snapshot.state, GnbState::PoweringOff);
    assert_eq!(snapshot.ngap_state, NgapState::Idle);

    // A second stop is a no-op
    sim.stop_gnb().await.unwrap();
    assert_eq!(sim.gnb_snapshot().await.unwrap().state, GnbState::PoweringOff);

    assert!(sim
        .recent_logs(50)
        .iter()
        .any(|event| event.message.contains("Cannot reach AMF")));
}

/// A reachable AMF receives NG Setup Request and the gNB becomes READY
#[tokio::test]
async fn test_start_and_stop_with_amf() {
    init_test_logging();

    let amf = MockAmf::start().await.unwrap();
    let mut gnb = GnbEntity::new(gnb_config(amf.addr()));
    assert_eq!(gnb.state().await, GnbState::Invalid);

    gnb.start().await.unwrap();
    assert_eq!(gnb.state().await, GnbState::Ready);
    assert!(gnb.amf_connected().await);
    assert_eq!(gnb.ngap_state().await, NgapState::Connected);

    assert!(matches!(amf.next_event().await, Some(MockAmfEvent::GnbConnected(_))));
    assert_eq!(
        amf.next_event().await,
        Some(MockAmfEvent::NgSetupReceived {
            ran_node_name: Some("test-gnb".to_string())
        })
    );

    let metrics = gnb.metrics().await;
    assert_eq!(metrics.ngap_tx_by_type.get("NGSetupRequest"), Some(&1));
    assert_eq!(metrics.gnb_state, GnbState::Ready);

    let gnb_ref = &gnb;
    wait_for_condition(
        move || async move { gnb_ref.snapshot().await.amf_state == AmfState::Ready },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();
    assert_eq!(gnb.snapshot().await.amf_name.as_deref(), Some("mock-amf"));

    gnb.stop().await.unwrap();
    assert_eq!(gnb.state().await, GnbState::PoweringOff);
    assert_eq!(gnb.ngap_state().await, NgapState::Idle);
    assert!(!gnb.amf_connected().await);
    assert!(matches!(amf.next_event().await, Some(MockAmfEvent::GnbDisconnected(_))));

    gnb.stop().await.unwrap();
    assert_eq!(gnb.state().await, GnbState::PoweringOff);
}

/// Starting twice without a stop is refused
#[tokio::test]
async fn test_start_twice_rejected() {
    let amf = MockAmf::start().await.unwrap();
    let mut gnb = GnbEntity::new(gnb_config(amf.addr()));
    gnb.start().await.unwrap();
    assert!(matches!(gnb.start().await, Err(Error::InvalidOperation(_))));
    gnb.stop().await.unwrap();
}

/// A stopped gNB can be started again
#[tokio::test]
async fn test_restart() {
    init_test_logging();

    let amf = MockAmf::start().await.unwrap();
    let mut sim = start_simulation(amf.addr()).await.unwrap();
    sim.stop_gnb().await.unwrap();

    let gnb = sim.gnb().unwrap();
    assert_eq!(gnb.state().await, GnbState::PoweringOff);

    sim.start_gnb(gnb_config(amf.addr())).await.unwrap();
    assert_eq!(sim.gnb_snapshot().await.unwrap().state, GnbState::Ready);

    let amf_ref = &amf;
    wait_for_condition(
        move || async move { amf_ref.ngap_count("NGSetupRequest").await == 2 },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();
    sim.stop_gnb().await.unwrap();
}

/// NG Setup Failure closes the N2 session and leaves the gNB refused
#[tokio::test]
async fn test_ng_setup_failure() {
    init_test_logging();

    let config = MockAmfConfig {
        ng_setup: NgSetupBehaviour::Reject {
            cause: Cause::MISC_UNKNOWN_PLMN,
            time_to_wait: Some(TimeToWait::V5s),
        },
        ..MockAmfConfig::default()
    };
    let amf = MockAmf::start_with_config(config).await.unwrap();

    let mut sim = SimulationContext::new();
    sim.start_gnb(gnb_config(amf.addr())).await.unwrap();

    let sim_ref = &sim;
    wait_for_condition(
        move || async move {
            sim_ref
                .gnb_snapshot()
                .await
                .is_some_and(|gnb| gnb.state == GnbState::ConnectionRefused)
        },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();

    let snapshot = sim.gnb_snapshot().await.unwrap();
    assert_eq!(snapshot.amf_state, AmfState::Rejected);
    assert!(!snapshot.amf_connected);

    let ue_id = sim.add_ue(ue_config(1)).await.unwrap();
    assert!(matches!(sim.register_ue(ue_id).await, Err(Error::InvalidOperation(_))));

    sim.stop_gnb().await.unwrap();
    assert_eq!(sim.gnb_snapshot().await.unwrap().state, GnbState::PoweringOff);
}

/// Losing the AMF marks the N2 session down and blocks registration
#[tokio::test]
async fn test_amf_lost() {
    init_test_logging();

    let amf = MockAmf::start().await.unwrap();
    let mut sim = start_simulation(amf.addr()).await.unwrap();
    let ue_id = sim.add_ue(ue_config(1)).await.unwrap();

    amf.stop();

    let sim_ref = &sim;
    wait_for_condition(
        move || async move { sim_ref.gnb_snapshot().await.is_some_and(|gnb| !gnb.amf_connected) },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();

    assert!(matches!(sim.register_ue(ue_id).await, Err(Error::InvalidOperation(_))));
    let sim_ref = &sim;
    wait_for_condition(
        move || async move {
            sim_ref
                .recent_logs(100)
                .iter()
                .any(|event| event.message == "Lost N2 connection to AMF")
        },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();

    sim.stop_gnb().await.unwrap();
    let snapshot = sim.gnb_snapshot().await.unwrap();
    assert_eq!(snapshot.state, GnbState::PoweringOff);
    assert_eq!(snapshot.ngap_state, NgapState::Idle);
}

/// An invalid configuration never reaches the network
#[tokio::test]
async fn test_invalid_config() {
    let mut gnb = GnbEntity::new(GnbConfig {
        gnb_id_length: 40,
        ..GnbConfig::default()
    });
    assert!(matches!(gnb.start().await, Err(Error::Config(_))));
    assert_eq!(gnb.state().await, GnbState::Invalid);
    assert_eq!(gnb.ngap_state().await, NgapState::Idle);
}

/// UEs on a barred cell cannot start registration
#[tokio::test]
async fn test_barred_cell() {
    init_test_logging();

    let amf = MockAmf::start().await.unwrap();
    let mut sim = SimulationContext::new();
    let config = GnbConfig {
        cell_barred: true,
        ..gnb_config(amf.addr())
    };
    sim.start_gnb(config).await.unwrap();

    let ue_id = sim.add_ue(ue_config(1)).await.unwrap();
    let ue = sim.ue_snapshot(ue_id).await.unwrap();
    assert!(ue.camped_cell.expect("camped").barred);

    assert!(sim.register_ue(ue_id).await.is_err());
    assert_eq!(sim.metrics().await.gnb.unwrap().registration_requests, 0);
    assert_eq!(amf.ngap_count("InitialUEMessage").await, 0);
    sim.stop_gnb().await.unwrap();
}
