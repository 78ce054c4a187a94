//! Structured NGAP IE values
//!
//! Identity and location values shared by several procedures, with their
//! fixed-width encodings.

use bytes::BufMut;
use ransim_common::{Plmn, SNssai};

use crate::codec::{NgapError, NgapResult};

/// Splits `n` octets off the front of `buf`.
pub(crate) fn take<'a>(buf: &mut &'a [u8], n: usize) -> NgapResult<&'a [u8]> {
    if buf.len() < n {
        return Err(NgapError::BufferTooShort {
            expected: n,
            actual: buf.len(),
        });
    }
    let (head, tail) = buf.split_at(n);
    *buf = tail;
    Ok(head)
}

fn take_u8(buf: &mut &[u8]) -> NgapResult<u8> {
    Ok(take(buf, 1)?[0])
}

fn take_plmn(buf: &mut &[u8]) -> NgapResult<Plmn> {
    let b = take(buf, 3)?;
    Ok(Plmn::decode([b[0], b[1], b[2]]))
}

fn take_u24(buf: &mut &[u8]) -> NgapResult<u32> {
    let b = take(buf, 3)?;
    Ok(u32::from_be_bytes([0, b[0], b[1], b[2]]))
}

fn ensure_consumed(buf: &[u8], what: &str) -> NgapResult<()> {
    if buf.is_empty() {
        Ok(())
    } else {
        Err(NgapError::InvalidIeValue(format!("{what}: {} trailing bytes", buf.len())))
    }
}

fn count_u8(len: usize, what: &str) -> NgapResult<u8> {
    u8::try_from(len).map_err(|_| NgapError::InvalidIeValue(format!("too many {what}: {len}")))
}

// ============================================================================
// Global RAN Node ID
// ============================================================================

/// gNB ID with PLMN identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalGnbId {
    pub plmn: Plmn,
    /// gNB ID value (22-32 bits)
    pub gnb_id: u32,
    /// gNB ID bit length (22-32)
    pub gnb_id_length: u8,
}

impl GlobalGnbId {
    pub fn encode(&self) -> NgapResult<Vec<u8>> {
        if !(22..=32).contains(&self.gnb_id_length) {
            return Err(NgapError::InvalidIeValue(format!(
                "gNB ID length {} outside 22..=32",
                self.gnb_id_length
            )));
        }
        if self.gnb_id_length < 32 && self.gnb_id >> self.gnb_id_length != 0 {
            return Err(NgapError::InvalidIeValue(format!(
                "gNB ID {} does not fit in {} bits",
                self.gnb_id, self.gnb_id_length
            )));
        }
        let mut out = Vec::with_capacity(8);
        out.put_slice(&self.plmn.encode());
        out.put_u8(self.gnb_id_length);
        out.put_u32(self.gnb_id);
        Ok(out)
    }

    pub fn decode(mut value: &[u8]) -> NgapResult<Self> {
        let plmn = take_plmn(&mut value)?;
        let gnb_id_length = take_u8(&mut value)?;
        let id = take(&mut value, 4)?;
        ensure_consumed(value, "GlobalRANNodeID")?;
        Ok(Self {
            plmn,
            gnb_id_length,
            gnb_id: u32::from_be_bytes([id[0], id[1], id[2], id[3]]),
        })
    }
}

// ============================================================================
// User Location Information
// ============================================================================

/// NR Cell Global Identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NrCgi {
    pub plmn: Plmn,
    /// NR Cell Identity (36 bits)
    pub nci: u64,
}

/// Tracking Area Identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tai {
    pub plmn: Plmn,
    /// Tracking Area Code (24 bits)
    pub tac: u32,
}

/// User Location Information for NR: `NR-CGI(8) || TAI(6)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserLocationInfoNr {
    pub nr_cgi: NrCgi,
    pub tai: Tai,
}

impl UserLocationInfoNr {
    pub fn new(plmn: Plmn, nci: u64, tac: u32) -> Self {
        Self {
            nr_cgi: NrCgi {
                plmn,
                nci: nci & 0xF_FFFF_FFFF,
            },
            tai: Tai {
                plmn,
                tac: tac & 0x00FF_FFFF,
            },
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(14);
        out.put_slice(&self.nr_cgi.plmn.encode());
        out.put_slice(&(self.nr_cgi.nci & 0xF_FFFF_FFFF).to_be_bytes()[3..]);
        out.put_slice(&self.tai.plmn.encode());
        out.put_slice(&(self.tai.tac & 0x00FF_FFFF).to_be_bytes()[1..]);
        out
    }

    pub fn decode(mut value: &[u8]) -> NgapResult<Self> {
        let cgi_plmn = take_plmn(&mut value)?;
        let nci = take(&mut value, 5)?;
        let tai_plmn = take_plmn(&mut value)?;
        let tac = take_u24(&mut value)?;
        ensure_consumed(value, "UserLocationInformation")?;
        Ok(Self {
            nr_cgi: NrCgi {
                plmn: cgi_plmn,
                nci: u64::from_be_bytes([0, 0, 0, nci[0], nci[1], nci[2], nci[3], nci[4]]) & 0xF_FFFF_FFFF,
            },
            tai: Tai { plmn: tai_plmn, tac },
        })
    }
}

// ============================================================================
// Slice lists
// ============================================================================

fn encode_slices(out: &mut Vec<u8>, slices: &[SNssai]) -> NgapResult<()> {
    out.put_u8(count_u8(slices.len(), "slices")?);
    for s_nssai in slices {
        let encoded = s_nssai.encode();
        out.put_u8(encoded.len() as u8);
        out.put_slice(&encoded);
    }
    Ok(())
}

fn decode_slices(buf: &mut &[u8]) -> NgapResult<Vec<SNssai>> {
    let count = take_u8(buf)?;
    (0..count)
        .map(|_| {
            let len = take_u8(buf)? as usize;
            let value = take(buf, len)?;
            SNssai::decode(value)
                .ok_or_else(|| NgapError::InvalidIeValue(format!("S-NSSAI length {len}")))
        })
        .collect()
}

/// PLMN with the slices supported in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlmnSliceItem {
    pub plmn: Plmn,
    pub slices: Vec<SNssai>,
}

impl PlmnSliceItem {
    fn encode_into(&self, out: &mut Vec<u8>) -> NgapResult<()> {
        out.put_slice(&self.plmn.encode());
        encode_slices(out, &self.slices)
    }

    fn decode_from(buf: &mut &[u8]) -> NgapResult<Self> {
        Ok(Self {
            plmn: take_plmn(buf)?,
            slices: decode_slices(buf)?,
        })
    }
}

/// Encodes a PLMN Support List (NG Setup Response).
pub fn encode_plmn_support_list(items: &[PlmnSliceItem]) -> NgapResult<Vec<u8>> {
    let mut out = vec![count_u8(items.len(), "PLMNs")?];
    for item in items {
        item.encode_into(&mut out)?;
    }
    Ok(out)
}

pub fn decode_plmn_support_list(mut value: &[u8]) -> NgapResult<Vec<PlmnSliceItem>> {
    let count = take_u8(&mut value)?;
    let items = (0..count)
        .map(|_| PlmnSliceItem::decode_from(&mut value))
        .collect::<NgapResult<Vec<_>>>()?;
    ensure_consumed(value, "PLMNSupportList")?;
    Ok(items)
}

/// Supported TA item for NG Setup Request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedTaItem {
    /// Tracking Area Code (24 bits)
    pub tac: u32,
    pub broadcast_plmns: Vec<PlmnSliceItem>,
}

pub fn encode_supported_ta_list(items: &[SupportedTaItem]) -> NgapResult<Vec<u8>> {
    let mut out = vec![count_u8(items.len(), "TAs")?];
    for item in items {
        out.put_slice(&(item.tac & 0x00FF_FFFF).to_be_bytes()[1..]);
        out.put_u8(count_u8(item.broadcast_plmns.len(), "broadcast PLMNs")?);
        for plmn in &item.broadcast_plmns {
            plmn.encode_into(&mut out)?;
        }
    }
    Ok(out)
}

pub fn decode_supported_ta_list(mut value: &[u8]) -> NgapResult<Vec<SupportedTaItem>> {
    let count = take_u8(&mut value)?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let tac = take_u24(&mut value)?;
        let plmn_count = take_u8(&mut value)?;
        let broadcast_plmns = (0..plmn_count)
            .map(|_| PlmnSliceItem::decode_from(&mut value))
            .collect::<NgapResult<Vec<_>>>()?;
        items.push(SupportedTaItem { tac, broadcast_plmns });
    }
    ensure_consumed(value, "SupportedTAList")?;
    Ok(items)
}

// ============================================================================
// GUAMI
// ============================================================================

/// Globally Unique AMF Identifier: `PLMN(3) || region(1) || set(10 bits) pointer(6 bits)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guami {
    pub plmn: Plmn,
    pub amf_region_id: u8,
    /// AMF Set ID (10 bits)
    pub amf_set_id: u16,
    /// AMF Pointer (6 bits)
    pub amf_pointer: u8,
}

pub fn encode_guami_list(items: &[Guami]) -> NgapResult<Vec<u8>> {
    let mut out = vec![count_u8(items.len(), "GUAMIs")?];
    for guami in items {
        out.put_slice(&guami.plmn.encode());
        out.put_u8(guami.amf_region_id);
        out.put_u16(((guami.amf_set_id & 0x03FF) << 6) | u16::from(guami.amf_pointer & 0x3F));
    }
    Ok(out)
}

pub fn decode_guami_list(mut value: &[u8]) -> NgapResult<Vec<Guami>> {
    let count = take_u8(&mut value)?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let plmn = take_plmn(&mut value)?;
        let amf_region_id = take_u8(&mut value)?;
        let b = take(&mut value, 2)?;
        let set_pointer = u16::from_be_bytes([b[0], b[1]]);
        items.push(Guami {
            plmn,
            amf_region_id,
            amf_set_id: set_pointer >> 6,
            amf_pointer: (set_pointer & 0x3F) as u8,
        });
    }
    ensure_consumed(value, "ServedGUAMIList")?;
    Ok(items)
}
