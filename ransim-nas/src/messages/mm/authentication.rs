//! Authentication Messages
//!
//! - Authentication Request (network to UE)
//! - Authentication Response (UE to network)
//! - Authentication Reject (network to UE)
//! - Authentication Failure (UE to network)

use crate::codec::{decode_enum, CodecResult, IeSet, IeWriter, NasMessageBody};
use crate::enums::{MessageType, MmCause};
use crate::iei;

/// Authentication Request (network to UE)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationRequest {
    /// NAS key set identifier (3 bits)
    pub ng_ksi: u8,
    /// Anti-bidding down between architectures
    pub abba: Vec<u8>,
    pub rand: Option<[u8; 16]>,
    pub autn: Option<Vec<u8>>,
}

impl NasMessageBody for AuthenticationRequest {
    const MESSAGE_TYPE: MessageType = MessageType::AuthenticationRequest;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_u8(iei::NGKSI, self.ng_ksi & 0x07)?;
        w.put(iei::ABBA, &self.abba)?;
        w.put_opt(iei::RAND, self.rand.as_ref().map(|r| &r[..]))?;
        w.put_opt(iei::AUTN, self.autn.as_deref())
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            ng_ksi: ies.require_u8(iei::NGKSI, "ngKSI")? & 0x07,
            abba: ies.require(iei::ABBA, "ABBA")?.to_vec(),
            rand: ies.get_array::<16>(iei::RAND)?,
            autn: ies.get_vec(iei::AUTN),
        })
    }
}

/// Authentication Response (UE to network)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthenticationResponse {
    /// RES computed by the USIM
    pub response_parameter: Option<Vec<u8>>,
}

impl NasMessageBody for AuthenticationResponse {
    const MESSAGE_TYPE: MessageType = MessageType::AuthenticationResponse;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_opt(iei::AUTH_RESPONSE_PARAMETER, self.response_parameter.as_deref())
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            response_parameter: ies.get_vec(iei::AUTH_RESPONSE_PARAMETER),
        })
    }
}

/// Authentication Reject (network to UE)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthenticationReject;

impl NasMessageBody for AuthenticationReject {
    const MESSAGE_TYPE: MessageType = MessageType::AuthenticationReject;

    fn encode_ies(&self, _w: &mut IeWriter) -> CodecResult<()> {
        Ok(())
    }

    fn decode_ies(_ies: &IeSet) -> CodecResult<Self> {
        Ok(Self)
    }
}

/// Authentication Failure (UE to network)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationFailure {
    pub cause: MmCause,
    /// AUTS for synchronisation failures
    pub failure_parameter: Option<Vec<u8>>,
}

impl NasMessageBody for AuthenticationFailure {
    const MESSAGE_TYPE: MessageType = MessageType::AuthenticationFailure;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_u8(iei::MM_CAUSE, self.cause.into())?;
        w.put_opt(iei::AUTH_FAILURE_PARAMETER, self.failure_parameter.as_deref())
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            cause: decode_enum("5GMM cause", ies.require_u8(iei::MM_CAUSE, "5GMM cause")?)?,
            failure_parameter: ies.get_vec(iei::AUTH_FAILURE_PARAMETER),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_request() {
        let req = AuthenticationRequest {
            ng_ksi: 1,
            abba: vec![0x00, 0x00],
            rand: Some([0x23; 16]),
            autn: Some(vec![0x55; 16]),
        };
        let bytes = req.encode().unwrap();
        assert_eq!(bytes[1], 0x56);
        assert_eq!(AuthenticationRequest::decode(&bytes).unwrap(), req);
    }

    #[test]
    fn test_authentication_request_bad_rand_length() {
        let bytes = [0x00, 0x56, iei::NGKSI, 1, 0, iei::ABBA, 0, iei::RAND, 2, 0xAA, 0xBB];
        assert!(AuthenticationRequest::decode(&bytes).is_err());
    }

    #[test]
    fn test_authentication_response() {
        let rsp = AuthenticationResponse {
            response_parameter: Some(vec![0x11; 16]),
        };
        let bytes = rsp.encode().unwrap();
        assert_eq!(&bytes[..4], &[0x00, 0x57, iei::AUTH_RESPONSE_PARAMETER, 16]);
        assert_eq!(AuthenticationResponse::decode(&bytes).unwrap(), rsp);
    }

    #[test]
    fn test_authentication_failure() {
        let failure = AuthenticationFailure {
            cause: MmCause::SynchFailure,
            failure_parameter: Some(vec![0x01; 14]),
        };
        let bytes = failure.encode().unwrap();
        assert_eq!(AuthenticationFailure::decode(&bytes).unwrap(), failure);
        assert_eq!(AuthenticationReject.encode().unwrap(), vec![0x00, 0x58]);
    }
}
