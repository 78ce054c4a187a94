//! PDU Session integration tests
//!
//! The UE requests its default session right after Registration Accept; the
//! mock AMF answers inside a DL NAS Transport.

use integration_tests::{
    init_test_logging, start_simulation, test_slice, ue_address, ue_config, wait_for_ue, MockAmf,
    MockAmfConfig, MockAmfEvent,
};

/// Accepted session: address, DNN and slice reach the UE snapshot
#[tokio::test]
async fn test_pdu_session_establishment() {
    init_test_logging();

    let amf = MockAmf::start().await.unwrap();
    let sim = start_simulation(amf.addr()).await.unwrap();
    let ue_id = sim.add_ue(ue_config(1)).await.unwrap();
    sim.register_ue(ue_id).await.unwrap();

    wait_for_ue(&sim, ue_id, |ue| ue.sm_state == "SM-ACTIVE").await.unwrap();

    let ue = sim.ue_snapshot(ue_id).await.unwrap();
    assert_eq!(ue.pdu_sessions.len(), 1);
    let session = &ue.pdu_sessions[0];
    assert_eq!(session.id, 1);
    assert_eq!(session.session_type, "IPv4");
    assert_eq!(session.dnn, "internet");
    assert_eq!(session.s_nssai, Some(test_slice()));

    let context = amf.ue_contexts().await.remove(0);
    assert_eq!(session.address, Some(ue_address(context.amf_ue_ngap_id)));
    assert_eq!(context.pdu_sessions, vec![1]);

    let nas = amf.received_nas().await;
    assert_eq!(nas.last().map(String::as_str), Some("PDU Session Establishment Request"));

    let metrics = sim.metrics().await;
    assert_eq!(metrics.gnb.as_ref().unwrap().pdu_sessions_established, 1);
    assert_eq!(metrics.ues[0].pdu_sessions, 1);
    assert_eq!(metrics.ues[0].sm_state, "SM-ACTIVE");

    let mut established = None;
    while established.is_none() {
        if let Some(MockAmfEvent::PduSessionEstablished { psi, .. }) = amf.next_event().await {
            established = Some(psi);
        }
    }
    assert_eq!(established, Some(1));
}

/// Rejected session leaves the UE registered without sessions
#[tokio::test]
async fn test_pdu_session_reject() {
    init_test_logging();

    let config = MockAmfConfig {
        accept_pdu_sessions: false,
        ..MockAmfConfig::default()
    };
    let amf = MockAmf::start_with_config(config).await.unwrap();
    let sim = start_simulation(amf.addr()).await.unwrap();
    let ue_id = sim.add_ue(ue_config(1)).await.unwrap();
    sim.register_ue(ue_id).await.unwrap();

    wait_for_ue(&sim, ue_id, |ue| {
        ue.mm_substate == "5GMM-REGISTERED.NORMAL-SERVICE" && ue.sm_state == "SM-NULL"
    })
    .await
    .unwrap();

    let ue = sim.ue_snapshot(ue_id).await.unwrap();
    assert!(ue.pdu_sessions.is_empty());
    assert!(amf
        .received_nas()
        .await
        .contains(&"PDU Session Establishment Request".to_string()));
    assert_eq!(sim.metrics().await.gnb.unwrap().pdu_sessions_established, 0);
}
