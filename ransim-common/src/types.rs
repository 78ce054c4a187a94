//! Identity types shared by every protocol layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Public Land Mobile Network identity.
///
/// MCC is three decimal digits, MNC two or three; `long_mnc` selects the
/// three-digit form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Plmn {
    /// Mobile Country Code (0-999)
    pub mcc: u16,
    /// Mobile Network Code (0-999)
    pub mnc: u16,
    /// True if MNC is 3 digits
    #[serde(default)]
    pub long_mnc: bool,
}

impl Plmn {
    /// Creates a new PLMN.
    pub const fn new(mcc: u16, mnc: u16, long_mnc: bool) -> Self {
        Self { mcc, mnc, long_mnc }
    }

    /// Encodes to the 3-octet BCD form of TS 24.008:
    /// `MCC2|MCC1`, `MNC3|MCC3`, `MNC2|MNC1` with 0xF filler for a
    /// two-digit MNC.
    pub fn encode(&self) -> [u8; 3] {
        let [mcc1, mcc2, mcc3] = digits3(self.mcc);
        let (mnc1, mnc2, mnc3) = if self.long_mnc {
            let [a, b, c] = digits3(self.mnc);
            (a, b, c)
        } else {
            let [_, a, b] = digits3(self.mnc);
            (a, b, 0x0F)
        };
        [(mcc2 << 4) | mcc1, (mnc3 << 4) | mcc3, (mnc2 << 4) | mnc1]
    }

    /// Decodes the 3-octet BCD form.
    pub fn decode(bytes: [u8; 3]) -> Self {
        let nibble = |b: u8, high: bool| if high { (b >> 4) as u16 } else { (b & 0x0F) as u16 };

        let mcc = 100 * nibble(bytes[0], false) + 10 * nibble(bytes[0], true) + nibble(bytes[1], false);
        let mnc1 = nibble(bytes[2], false);
        let mnc2 = nibble(bytes[2], true);
        let mnc3 = nibble(bytes[1], true);

        if mnc3 == 0x0F {
            Self::new(mcc, 10 * mnc1 + mnc2, false)
        } else {
            Self::new(mcc, 100 * mnc1 + 10 * mnc2 + mnc3, true)
        }
    }

    /// Number of MNC digits.
    pub fn mnc_digits(&self) -> usize {
        if self.long_mnc {
            3
        } else {
            2
        }
    }
}

fn digits3(value: u16) -> [u8; 3] {
    [
        ((value / 100) % 10) as u8,
        ((value / 10) % 10) as u8,
        (value % 10) as u8,
    ]
}

impl fmt::Debug for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plmn({self})")
    }
}

impl fmt::Display for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.long_mnc {
            write!(f, "{:03}-{:03}", self.mcc, self.mnc)
        } else {
            write!(f, "{:03}-{:02}", self.mcc, self.mnc)
        }
    }
}

/// Single Network Slice Selection Assistance Information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SNssai {
    /// Slice/Service Type
    pub sst: u8,
    /// Slice Differentiator (24 bits)
    #[serde(default)]
    pub sd: Option<u32>,
}

impl SNssai {
    /// Creates an S-NSSAI with only SST.
    pub const fn new(sst: u8) -> Self {
        Self { sst, sd: None }
    }

    /// Creates an S-NSSAI with SST and SD; only the low 24 bits of `sd` are kept.
    pub const fn with_sd(sst: u8, sd: u32) -> Self {
        Self {
            sst,
            sd: Some(sd & 0x00FF_FFFF),
        }
    }

    /// Encodes as `SST` or `SST || SD(3)`.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![self.sst];
        if let Some(sd) = self.sd {
            out.extend_from_slice(&sd.to_be_bytes()[1..]);
        }
        out
    }

    /// Decodes a 1- or 4-byte S-NSSAI value.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [sst] => Some(Self::new(*sst)),
            [sst, a, b, c] => Some(Self::with_sd(*sst, u32::from_be_bytes([0, *a, *b, *c]))),
            _ => None,
        }
    }
}

impl fmt::Display for SNssai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sd {
            Some(sd) => write!(f, "sst={} sd={:06x}", self.sst, sd),
            None => write!(f, "sst={}", self.sst),
        }
    }
}

/// Subscription Permanent Identifier in `imsi-<digits>` form.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Supi {
    digits: String,
}

impl Supi {
    /// Parses `imsi-<digits>` (the prefix is case-insensitive) or bare digits.
    pub fn parse(text: &str) -> Option<Self> {
        let digits = match text.split_once('-') {
            Some((kind, rest)) if kind.eq_ignore_ascii_case("imsi") => rest,
            Some(_) => return None,
            None => text,
        };
        if digits.len() < 5 || digits.len() > 15 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            digits: digits.to_string(),
        })
    }

    /// The IMSI digits without the `imsi-` prefix.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// The MSIN: the digits following MCC and MNC of `plmn`.
    pub fn msin(&self, plmn: &Plmn) -> &str {
        let skip = (3 + plmn.mnc_digits()).min(self.digits.len());
        &self.digits[skip..]
    }
}

impl TryFrom<String> for Supi {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Supi::parse(&value).ok_or_else(|| format!("invalid SUPI: {value}"))
    }
}

impl From<Supi> for String {
    fn from(value: Supi) -> Self {
        value.to_string()
    }
}

impl fmt::Debug for Supi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Supi({self})")
    }
}

impl fmt::Display for Supi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "imsi-{}", self.digits)
    }
}
