//! Configuration structures for gNB and UE
//!
//! Both records load from YAML through `serde_yaml`. Key material is written
//! as hex strings.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{Plmn, SNssai, Supi};

/// Default NGAP port of the AMF.
pub const DEFAULT_AMF_PORT: u16 = 38412;

/// Default idle sleep of the NGAP receive loop between empty reads.
pub const DEFAULT_IDLE_INTERVAL_MS: u64 = 100;

/// Transport used for the N2 session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// SCTP encapsulated in UDP, multi-stream.
    #[default]
    Sctp,
    /// Length-framed TCP, single stream.
    Tcp,
}

/// gNB configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GnbConfig {
    /// Node name advertised in NG Setup
    pub name: String,
    /// Serving PLMN
    pub plmn: Plmn,
    /// NR Cell Identity (36 bits)
    pub nci: u64,
    /// gNB ID length in bits (22-32)
    pub gnb_id_length: u8,
    /// Tracking Area Code (24 bits)
    pub tac: u32,
    /// Supported slices
    pub nssai: Vec<SNssai>,
    /// Local address for the N2 session
    pub ngap_ip: IpAddr,
    /// Local port for the N2 session (0 picks an ephemeral port)
    pub ngap_port: u16,
    /// AMF address
    pub amf_address: IpAddr,
    /// AMF port
    pub amf_port: u16,
    /// N2 transport flavour
    pub transport: TransportKind,
    /// Upper bound on connection establishment
    pub connect_timeout_ms: u64,
    /// Receive-loop sleep between empty reads
    pub idle_interval_ms: u64,
    /// Whether the cell starts barred
    pub cell_barred: bool,
}

impl Default for GnbConfig {
    fn default() -> Self {
        Self {
            name: "ransim-gnb".to_string(),
            plmn: Plmn::new(208, 93, false),
            nci: 0x10,
            gnb_id_length: 32,
            tac: 1,
            nssai: vec![SNssai::with_sd(1, 0x010203)],
            ngap_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            ngap_port: 0,
            amf_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            amf_port: DEFAULT_AMF_PORT,
            transport: TransportKind::default(),
            connect_timeout_ms: 5000,
            idle_interval_ms: DEFAULT_IDLE_INTERVAL_MS,
            cell_barred: false,
        }
    }
}

impl GnbConfig {
    /// Parses a gNB configuration from a YAML string.
    ///
    /// # Example
    /// ```
    /// use ransim_common::GnbConfig;
    ///
    /// let yaml = r#"
    /// plmn: { mcc: 208, mnc: 93 }
    /// tac: 7
    /// amf_address: 10.0.0.5
    /// transport: tcp
    /// "#;
    /// let config = GnbConfig::from_yaml(yaml).unwrap();
    /// assert_eq!(config.tac, 7);
    /// assert_eq!(config.amf_port, 38412);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a gNB configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Serializes the configuration to YAML.
    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Checks field ranges.
    pub fn validate(&self) -> Result<(), Error> {
        if !(22..=32).contains(&self.gnb_id_length) {
            return Err(Error::Config(format!(
                "gnb_id_length must be 22..=32, got {}",
                self.gnb_id_length
            )));
        }
        if self.nci > 0xF_FFFF_FFFF {
            return Err(Error::Config(format!("nci {:#x} exceeds 36 bits", self.nci)));
        }
        if self.tac > 0xFF_FFFF {
            return Err(Error::Config(format!("tac {:#x} exceeds 24 bits", self.tac)));
        }
        Ok(())
    }

    /// The gNB ID: the upper `gnb_id_length` bits of the NCI.
    pub fn gnb_id(&self) -> u32 {
        let shift = 36u32.saturating_sub(self.gnb_id_length as u32);
        ((self.nci & 0xF_FFFF_FFFF) >> shift) as u32
    }

    /// The cell ID: the low `36 - gnb_id_length` bits of the NCI.
    pub fn cell_id(&self) -> u32 {
        let bits = 36u32.saturating_sub(self.gnb_id_length as u32);
        (self.nci & ((1u64 << bits) - 1)) as u32
    }

    /// Local endpoint of the N2 session.
    pub fn local_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ngap_ip, self.ngap_port)
    }

    /// AMF endpoint of the N2 session.
    pub fn amf_addr(&self) -> SocketAddr {
        SocketAddr::new(self.amf_address, self.amf_port)
    }

    /// Connect timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Receive-loop idle interval as a `Duration`.
    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }
}

/// UE subscriber configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UeConfig {
    /// Subscriber identity
    pub supi: Supi,
    /// Home PLMN
    pub hplmn: Plmn,
    /// Permanent key K
    #[serde(with = "hex_array")]
    pub key: [u8; 16],
    /// Derived operator key OPc
    #[serde(with = "hex_array")]
    pub opc: [u8; 16],
    /// Authentication Management Field
    #[serde(with = "hex_array")]
    pub amf: [u8; 2],
    /// Initial sequence number (48 bits)
    pub sqn: u64,
    /// Data network name for the default PDU session
    pub dnn: String,
    /// Slice/Service Type
    pub sst: u8,
    /// Slice Differentiator
    pub sd: Option<u32>,
}

impl Default for UeConfig {
    fn default() -> Self {
        Self {
            supi: default_supi(),
            hplmn: Plmn::new(208, 93, false),
            key: [
                0x8b, 0xaf, 0x47, 0x3f, 0x2f, 0x8f, 0xd0, 0x94, 0x87, 0xcc, 0xcb, 0xd7, 0x09,
                0x7c, 0x68, 0x62,
            ],
            opc: [
                0x8e, 0x27, 0xb6, 0xaf, 0x0e, 0x69, 0x2e, 0x75, 0x0f, 0x32, 0x66, 0x7a, 0x3b,
                0x14, 0x60, 0x5d,
            ],
            amf: [0x80, 0x00],
            sqn: 0,
            dnn: "internet".to_string(),
            sst: 1,
            sd: Some(0x010203),
        }
    }
}

fn default_supi() -> Supi {
    Supi::parse("imsi-208930000000001").unwrap_or_else(|| unreachable!("literal SUPI is valid"))
}

impl UeConfig {
    /// Creates the default subscriber with a different identity.
    pub fn with_supi(supi: Supi) -> Self {
        Self {
            supi,
            ..Self::default()
        }
    }

    /// Parses a UE configuration from a YAML string.
    ///
    /// # Example
    /// ```
    /// use ransim_common::UeConfig;
    ///
    /// let yaml = r#"
    /// supi: imsi-001010000000042
    /// key: 465b5ce8b199b49faa5f0a2ee238a6bc
    /// dnn: ims
    /// "#;
    /// let config = UeConfig::from_yaml(yaml).unwrap();
    /// assert_eq!(config.supi.digits(), "001010000000042");
    /// assert_eq!(config.key[0], 0x46);
    /// assert_eq!(config.dnn, "ims");
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a UE configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Serializes the configuration to YAML.
    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Checks field ranges.
    pub fn validate(&self) -> Result<(), Error> {
        if self.sqn > 0xFFFF_FFFF_FFFF {
            return Err(Error::Config(format!("sqn {:#x} exceeds 48 bits", self.sqn)));
        }
        if self.dnn.is_empty() || !self.dnn.is_ascii() {
            return Err(Error::Config(format!("dnn must be non-empty ASCII, got {:?}", self.dnn)));
        }
        if matches!(self.sd, Some(sd) if sd > 0xFF_FFFF) {
            return Err(Error::Config("sd exceeds 24 bits".to_string()));
        }
        Ok(())
    }

    /// The slice the UE requests.
    pub fn s_nssai(&self) -> SNssai {
        match self.sd {
            Some(sd) => SNssai::with_sd(self.sst, sd),
            None => SNssai::new(self.sst),
        }
    }
}

/// Serde adapter for fixed-size byte arrays written as hex strings.
mod hex_array {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(value: &[u8; N], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(value))
    }

    /// YAML reads an all-digit value such as `8000` as an integer.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum HexText {
        Text(String),
        Number(u64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(d: D) -> Result<[u8; N], D::Error> {
        let text = match HexText::deserialize(d)? {
            HexText::Text(text) => text,
            HexText::Number(n) => n.to_string(),
        };
        let bytes = hex::decode(text.trim()).map_err(D::Error::custom)?;
        let len = bytes.len();
        bytes
            .try_into()
            .map_err(|_| D::Error::custom(format!("expected {N} bytes of hex, got {len}")))
    }
}
