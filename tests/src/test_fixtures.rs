//! Test fixtures and configuration helpers
//!
//! Every scenario runs the gNB over the TCP transport on loopback so that the
//! mock AMF can be an ordinary `TcpListener`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ransim_common::{GnbConfig, Plmn, SNssai, Supi, TransportKind, UeConfig};

/// PLMN shared by the gNB, the UEs and the mock AMF
pub const TEST_PLMN: Plmn = Plmn::new(208, 93, false);

/// Tracking area of the test cell
pub const TEST_TAC: u32 = 1;

/// IMSI of the first test subscriber
pub const TEST_IMSI: &str = "imsi-208930000000001";

/// Slice served by the mock AMF and requested by the UEs
pub fn test_slice() -> SNssai {
    SNssai::with_sd(1, 0x010203)
}

/// gNB configuration pointing at `amf` over TCP, with short timeouts.
pub fn gnb_config(amf: SocketAddr) -> GnbConfig {
    GnbConfig {
        name: "test-gnb".to_string(),
        plmn: TEST_PLMN,
        tac: TEST_TAC,
        nssai: vec![test_slice()],
        ngap_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        ngap_port: 0,
        amf_address: amf.ip(),
        amf_port: amf.port(),
        transport: TransportKind::Tcp,
        connect_timeout_ms: 1000,
        idle_interval_ms: 5,
        ..GnbConfig::default()
    }
}

/// Default subscriber whose IMSI ends in `index`.
///
/// # Panics
/// If `index` does not fit the 15-digit IMSI.
pub fn ue_config(index: u32) -> UeConfig {
    let supi = Supi::parse(&format!("2089300{:08}", index)).expect("valid test IMSI");
    UeConfig {
        hplmn: TEST_PLMN,
        ..UeConfig::with_supi(supi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_valid() {
        let gnb = gnb_config("127.0.0.1:38412".parse().unwrap());
        gnb.validate().unwrap();
        assert_eq!(gnb.transport, TransportKind::Tcp);

        let ue = ue_config(1);
        ue.validate().unwrap();
        assert_eq!(ue.supi.to_string(), TEST_IMSI);
        assert_eq!(ue.s_nssai(), test_slice());
        assert_eq!(ue_config(42).supi.digits(), "208930000000042");
    }
}
