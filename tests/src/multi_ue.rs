//! Multiple UE scenario integration tests
//!
//! Many UEs behind one gNB: independent state machines, unique identities
//! and concurrent registration.

use std::collections::HashSet;
use std::sync::Arc;

use integration_tests::{
    init_test_logging, start_simulation, wait_for_condition, wait_for_ue, MockAmf, DEFAULT_POLL_INTERVAL,
    DEFAULT_TEST_TIMEOUT,
};

/// Bulk-created UEs register and each gets its own session and address
#[tokio::test]
async fn test_multiple_ue_registration() {
    init_test_logging();

    let amf = MockAmf::start().await.unwrap();
    let sim = start_simulation(amf.addr()).await.unwrap();

    let num_ues = 5;
    let added = sim.add_ues(num_ues, "imsi-208930000000001").await.unwrap();
    assert_eq!(added.len(), num_ues);
    assert_eq!(added[4].imsi, "imsi-208930000000005");

    for ue in &added {
        sim.register_ue(ue.ue_id).await.unwrap();
    }
    for ue in &added {
        wait_for_ue(&sim, ue.ue_id, |snapshot| snapshot.sm_state == "SM-ACTIVE")
            .await
            .unwrap();
    }

    let mut addresses = HashSet::new();
    for ue in &added {
        let snapshot = sim.ue_snapshot(ue.ue_id).await.unwrap();
        assert_eq!(snapshot.supi, ue.imsi);
        let address = snapshot.pdu_sessions[0].address.expect("address assigned");
        assert!(addresses.insert(address), "duplicate UE address {address}");

        let context = amf.find_ue_by_supi(&ue.imsi).await.expect("AMF context");
        assert!(context.registered);
    }

    assert_eq!(amf.registered_ue_count().await, num_ues);
    assert_eq!(amf.ngap_count("InitialUEMessage").await, num_ues);

    let metrics = sim.metrics().await;
    let gnb = metrics.gnb.as_ref().unwrap();
    assert_eq!(gnb.total_ues, num_ues);
    assert_eq!(gnb.connected_ues, num_ues);
    assert_eq!(gnb.registration_requests, num_ues as u64);
    assert_eq!(gnb.pdu_sessions_established, num_ues as u64);
    assert_eq!(metrics.ues.len(), num_ues);

    let json = serde_json::to_value(&metrics).unwrap();
    assert_eq!(json["ues"].as_array().unwrap().len(), num_ues);
    assert_eq!(json["gnb"]["gnb_state"], "READY");
}

/// Registrations started from concurrent tasks all complete
#[tokio::test]
async fn test_concurrent_ue_registration() {
    init_test_logging();

    let amf = MockAmf::start().await.unwrap();
    let sim = Arc::new(start_simulation(amf.addr()).await.unwrap());

    let num_ues = 8;
    let added = sim.add_ues(num_ues, "imsi-208930000000100").await.unwrap();

    let mut handles = Vec::new();
    for ue in &added {
        let sim = Arc::clone(&sim);
        let ue_id = ue.ue_id;
        handles.push(tokio::spawn(async move { sim.register_ue(ue_id).await }));
    }
    for handle in handles {
        handle.await.expect("task panicked").unwrap();
    }

    let amf_ref = &amf;
    wait_for_condition(
        move || async move { amf_ref.registered_ue_count().await == num_ues },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();

    let mut ran_ids = HashSet::new();
    for context in amf.ue_contexts().await {
        assert!(ran_ids.insert(context.ran_ue_ngap_id), "RAN-UE-NGAP-ID reused");
    }
    assert_eq!(ran_ids.len(), num_ues);
}

/// Removing one UE leaves the others untouched
#[tokio::test]
async fn test_remove_one_of_many() {
    let amf = MockAmf::start().await.unwrap();
    let sim = start_simulation(amf.addr()).await.unwrap();
    let added = sim.add_ues(3, "imsi-208930000000001").await.unwrap();

    for ue in &added {
        sim.register_ue(ue.ue_id).await.unwrap();
    }
    for ue in &added {
        wait_for_ue(&sim, ue.ue_id, |snapshot| snapshot.sm_state == "SM-ACTIVE")
            .await
            .unwrap();
    }

    sim.remove_ue(added[1].ue_id).await.unwrap();

    let remaining: Vec<u32> = sim.ue_snapshots().await.iter().map(|ue| ue.ue_id).collect();
    assert_eq!(remaining, [added[0].ue_id, added[2].ue_id]);
    for ue_id in remaining {
        let snapshot = sim.ue_snapshot(ue_id).await.unwrap();
        assert_eq!(snapshot.rrc_state, "RRC_CONNECTED");
        assert_eq!(snapshot.pdu_sessions.len(), 1);
    }
    assert_eq!(sim.metrics().await.gnb.unwrap().total_ues, 2);
}
