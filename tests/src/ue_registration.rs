//! UE Registration integration tests
//!
//! Registration, rejection, deregistration and removal of one UE through the
//! simulated gNB and the mock AMF.

use ransim_common::Error;
use ransim_nas::MmCause;

use integration_tests::{
    init_test_logging, start_simulation, ue_config, wait_for_condition, wait_for_ue, MockAmf, MockAmfConfig,
    MockAmfEvent, DEFAULT_POLL_INTERVAL, DEFAULT_TEST_TIMEOUT, TEST_IMSI,
};

const REGISTERED: &str = "5GMM-REGISTERED.NORMAL-SERVICE";

/// Full registration: authentication, security mode, accept
#[tokio::test]
async fn test_ue_registration_basic() {
    init_test_logging();

    let amf = MockAmf::start().await.unwrap();
    let mut sim = start_simulation(amf.addr()).await.unwrap();
    let ue_id = sim.add_ue(ue_config(1)).await.unwrap();

    let before = sim.ue_snapshot(ue_id).await.unwrap();
    assert_eq!(before.rrc_state, "RRC_IDLE");
    assert!(!before.security_active);

    sim.register_ue(ue_id).await.unwrap();
    wait_for_ue(&sim, ue_id, |ue| ue.mm_substate == REGISTERED).await.unwrap();

    let ue = sim.ue_snapshot(ue_id).await.unwrap();
    assert_eq!(ue.supi, TEST_IMSI);
    assert_eq!(ue.rrc_state, "RRC_CONNECTED");
    assert_eq!(ue.cm_state, "CM-CONNECTED");
    assert!(ue.security_active);
    assert_eq!(ue.connected_gnb.as_deref(), Some("test-gnb"));

    let context = amf.find_ue_by_supi(TEST_IMSI).await.expect("AMF knows the UE");
    assert!(context.authenticated);
    assert!(context.registered);

    let nas = amf.received_nas().await;
    assert_eq!(
        &nas[..3],
        ["Registration Request", "Authentication Response", "Security Mode Complete"]
    );

    let ngap = amf.received_ngap().await;
    assert_eq!(ngap[0], "NGSetupRequest");
    assert_eq!(ngap[1], "InitialUEMessage");

    let metrics = sim.metrics().await;
    let gnb = metrics.gnb.unwrap();
    assert_eq!(gnb.registration_requests, 1);
    assert_eq!(gnb.connected_ues, 1);
    assert_eq!(gnb.ngap_tx_by_type.get("InitialUEMessage"), Some(&1));
    assert!(gnb.messages_exchanged > 0);
    assert_eq!(metrics.ues[0].registration_attempts, 1);
    assert!(metrics.ues[0].last_registration.is_some());

    sim.stop_gnb().await.unwrap();
    let ue = sim.ue_snapshot(ue_id).await.unwrap();
    assert_eq!(ue.rrc_state, "RRC_IDLE");
}

/// The AMF emits a registration event carrying the SUPI
#[tokio::test]
async fn test_registration_event() {
    init_test_logging();

    let amf = MockAmf::start().await.unwrap();
    let sim = start_simulation(amf.addr()).await.unwrap();
    let ue_id = sim.add_ue(ue_config(7)).await.unwrap();
    sim.register_ue(ue_id).await.unwrap();

    loop {
        match amf.next_event().await.expect("event stream open") {
            MockAmfEvent::UeRegistered { supi, .. } => {
                assert_eq!(supi.as_deref(), Some("imsi-208930000000007"));
                break;
            }
            _ => continue,
        }
    }
}

/// Registration Reject leaves the UE deregistered with limited service
#[tokio::test]
async fn test_registration_reject() {
    init_test_logging();

    let config = MockAmfConfig {
        registration_reject: Some(MmCause::PlmnNotAllowed),
        ..MockAmfConfig::default()
    };
    let amf = MockAmf::start_with_config(config).await.unwrap();
    let sim = start_simulation(amf.addr()).await.unwrap();
    let ue_id = sim.add_ue(ue_config(1)).await.unwrap();

    sim.register_ue(ue_id).await.unwrap();
    wait_for_ue(&sim, ue_id, |ue| ue.mm_substate == "5GMM-DEREGISTERED.LIMITED-SERVICE")
        .await
        .unwrap();

    let ue = sim.ue_snapshot(ue_id).await.unwrap();
    assert!(!ue.security_active);
    assert!(ue.pdu_sessions.is_empty());
    assert_eq!(amf.registered_ue_count().await, 0);
    assert_eq!(amf.received_nas().await, ["Registration Request"]);
}

/// Registering a UE that already has an RRC connection is refused
#[tokio::test]
async fn test_register_twice() {
    let amf = MockAmf::start().await.unwrap();
    let sim = start_simulation(amf.addr()).await.unwrap();
    let ue_id = sim.add_ue(ue_config(1)).await.unwrap();

    sim.register_ue(ue_id).await.unwrap();
    wait_for_ue(&sim, ue_id, |ue| ue.mm_substate == REGISTERED).await.unwrap();
    assert!(matches!(sim.register_ue(ue_id).await, Err(Error::InvalidOperation(_))));
    assert!(sim.register_ue(99).await.is_err());
}

/// UE-initiated deregistration ends with the context released on both sides
#[tokio::test]
async fn test_ue_deregistration() {
    init_test_logging();

    let amf = MockAmf::start().await.unwrap();
    let sim = start_simulation(amf.addr()).await.unwrap();
    let ue_id = sim.add_ue(ue_config(1)).await.unwrap();

    // Deregistering before registration is refused
    assert!(matches!(sim.deregister_ue(ue_id).await, Err(Error::InvalidOperation(_))));

    sim.register_ue(ue_id).await.unwrap();
    wait_for_ue(&sim, ue_id, |ue| ue.sm_state == "SM-ACTIVE").await.unwrap();

    sim.deregister_ue(ue_id).await.unwrap();
    wait_for_ue(&sim, ue_id, |ue| {
        ue.mm_substate == "5GMM-DEREGISTERED.NORMAL-SERVICE" && ue.rrc_state == "RRC_IDLE"
    })
    .await
    .unwrap();

    let ue = sim.ue_snapshot(ue_id).await.unwrap();
    assert!(ue.pdu_sessions.is_empty());
    assert_eq!(ue.sm_state, "SM-NULL");

    let amf_ref = &amf;
    wait_for_condition(
        move || async move {
            amf_ref
                .find_ue_by_supi(TEST_IMSI)
                .await
                .is_some_and(|ue| ue.released && !ue.registered)
        },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();

    assert!(amf.received_nas().await.contains(&"Deregistration Request".to_string()));
    let gnb = sim.metrics().await.gnb.unwrap();
    assert_eq!(gnb.connected_ues, 0);
    assert_eq!(gnb.ngap_tx_by_type.get("UEContextReleaseComplete"), Some(&1));
}

/// Removing a registered UE asks the AMF to release its context
#[tokio::test]
async fn test_remove_registered_ue() {
    init_test_logging();

    let amf = MockAmf::start().await.unwrap();
    let sim = start_simulation(amf.addr()).await.unwrap();
    let ue_id = sim.add_ue(ue_config(1)).await.unwrap();
    sim.register_ue(ue_id).await.unwrap();
    wait_for_ue(&sim, ue_id, |ue| ue.mm_substate == REGISTERED).await.unwrap();

    sim.remove_ue(ue_id).await.unwrap();
    assert!(sim.ue_snapshot(ue_id).await.is_none());
    assert!(sim.gnb_snapshot().await.unwrap().ue_ids.is_empty());
    assert!(matches!(sim.remove_ue(ue_id).await, Err(Error::InvalidOperation(_))));

    let amf_ref = &amf;
    wait_for_condition(
        move || async move { amf_ref.ngap_count("UEContextReleaseRequest").await == 1 },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();
}
