//! Camera parameter management
//!
//! Parameters are short named scalars negotiated with the GCS over the
//! MAVLink extended-parameter protocol. The schema (name, numeric id, scalar
//! type) is a closed set shared by every camera; each camera owns a store of
//! current and supported values.

pub mod schema;
pub mod store;

pub use schema::{ParamSchema, SchemaEntry};
pub use store::ParamStore;

use mavlink::common::MavParamExtType;

use crate::camera::DeviceError;

/// Length of the `param_id` field on the wire (NUL-padded ASCII).
pub const PARAM_ID_LEN: usize = 16;

/// Length of the opaque `param_value` carrier on the wire.
pub const PARAM_VALUE_LEN: usize = 128;

/// Scalar type tag for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Uint8,
    Int32,
    Uint32,
    Real32,
}

impl ParamType {
    /// Number of leading bytes the value occupies in the 128-byte carrier.
    pub fn byte_width(self) -> usize {
        match self {
            ParamType::Uint8 => 1,
            ParamType::Int32 | ParamType::Uint32 | ParamType::Real32 => 4,
        }
    }

    pub fn to_mav(self) -> MavParamExtType {
        match self {
            ParamType::Uint8 => MavParamExtType::MAV_PARAM_EXT_TYPE_UINT8,
            ParamType::Int32 => MavParamExtType::MAV_PARAM_EXT_TYPE_INT32,
            ParamType::Uint32 => MavParamExtType::MAV_PARAM_EXT_TYPE_UINT32,
            ParamType::Real32 => MavParamExtType::MAV_PARAM_EXT_TYPE_REAL32,
        }
    }

    /// Map a wire type tag to the subset this daemon speaks.
    pub fn from_mav(mav: MavParamExtType) -> Option<Self> {
        match mav {
            MavParamExtType::MAV_PARAM_EXT_TYPE_UINT8 => Some(ParamType::Uint8),
            MavParamExtType::MAV_PARAM_EXT_TYPE_INT32 => Some(ParamType::Int32),
            MavParamExtType::MAV_PARAM_EXT_TYPE_UINT32 => Some(ParamType::Uint32),
            MavParamExtType::MAV_PARAM_EXT_TYPE_REAL32 => Some(ParamType::Real32),
            _ => None,
        }
    }
}

/// Parameter value (union of supported scalar types)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Uint8(u8),
    Int32(i32),
    Uint32(u32),
    Real32(f32),
}

impl ParamValue {
    pub fn param_type(self) -> ParamType {
        match self {
            ParamValue::Uint8(_) => ParamType::Uint8,
            ParamValue::Int32(_) => ParamType::Int32,
            ParamValue::Uint32(_) => ParamType::Uint32,
            ParamValue::Real32(_) => ParamType::Real32,
        }
    }

    /// Pack the scalar into the leading bytes of a zeroed 128-byte carrier,
    /// little-endian as on the wire.
    pub fn encode_wire(self) -> [u8; PARAM_VALUE_LEN] {
        let mut buf = [0u8; PARAM_VALUE_LEN];
        match self {
            ParamValue::Uint8(v) => buf[0] = v,
            ParamValue::Int32(v) => buf[..4].copy_from_slice(&v.to_le_bytes()),
            ParamValue::Uint32(v) => buf[..4].copy_from_slice(&v.to_le_bytes()),
            ParamValue::Real32(v) => buf[..4].copy_from_slice(&v.to_le_bytes()),
        }
        buf
    }

    /// Decode the leading bytes of a carrier according to `param_type`.
    ///
    /// Returns `None` only when the buffer is shorter than the scalar width.
    pub fn decode_wire(bytes: &[u8], param_type: ParamType) -> Option<Self> {
        if bytes.len() < param_type.byte_width() {
            return None;
        }
        let value = match param_type {
            ParamType::Uint8 => ParamValue::Uint8(bytes[0]),
            ParamType::Int32 => {
                ParamValue::Int32(i32::from_le_bytes(bytes[..4].try_into().ok()?))
            }
            ParamType::Uint32 => {
                ParamValue::Uint32(u32::from_le_bytes(bytes[..4].try_into().ok()?))
            }
            ParamType::Real32 => {
                ParamValue::Real32(f32::from_le_bytes(bytes[..4].try_into().ok()?))
            }
        };
        Some(value)
    }
}

/// Encode a parameter name into the NUL-padded 16-byte wire field.
pub fn encode_param_id(name: &str) -> [u8; PARAM_ID_LEN] {
    let mut id = [0u8; PARAM_ID_LEN];
    let bytes = name.as_bytes();
    let len = bytes.len().min(PARAM_ID_LEN);
    id[..len].copy_from_slice(&bytes[..len]);
    id
}

/// Decode a NUL-padded 16-byte wire field into a parameter name.
pub fn decode_param_id(id: &[u8]) -> String {
    let end = id.iter().position(|&b| b == 0).unwrap_or(id.len());
    String::from_utf8_lossy(&id[..end]).to_string()
}

/// Parameter-path error
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("unknown parameter {0:?}")]
    UnknownParam(String),

    #[error("parameter {name:?} expects {expected:?}, got {got:?}")]
    BadType {
        name: String,
        expected: ParamType,
        got: ParamType,
    },

    #[error("value outside the supported set for {0:?}")]
    Unsupported(String),

    #[error("parameter {0:?} has no value")]
    Missing(String),

    #[error("parameter wire type not supported")]
    UnsupportedWireType,

    #[error("device rejected {name:?}: {source}")]
    Device {
        name: String,
        #[source]
        source: DeviceError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_round_trip() {
        let cases = [
            ParamValue::Uint8(7),
            ParamValue::Int32(-40),
            ParamValue::Uint32(128),
            ParamValue::Real32(2.5),
        ];
        for value in cases {
            let wire = value.encode_wire();
            let back = ParamValue::decode_wire(&wire, value.param_type()).unwrap();
            assert_eq!(value, back);
        }
    }

    #[test]
    fn test_wire_trailing_bytes_zeroed() {
        let wire = ParamValue::Uint32(0xA1B2_C3D4).encode_wire();
        assert_eq!(&wire[..4], &0xA1B2_C3D4u32.to_le_bytes());
        assert!(wire[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_decode_short_buffer() {
        assert!(ParamValue::decode_wire(&[1, 2], ParamType::Uint32).is_none());
        assert!(ParamValue::decode_wire(&[], ParamType::Uint8).is_none());
    }

    #[test]
    fn test_param_id_round_trip() {
        let id = encode_param_id("brightness");
        assert_eq!(id.len(), PARAM_ID_LEN);
        assert_eq!(decode_param_id(&id), "brightness");
    }

    #[test]
    fn test_param_id_truncates_long_names() {
        let id = encode_param_id("a-very-long-parameter-name");
        assert_eq!(decode_param_id(&id).len(), PARAM_ID_LEN);
    }

    #[test]
    fn test_mav_type_mapping() {
        for ty in [
            ParamType::Uint8,
            ParamType::Int32,
            ParamType::Uint32,
            ParamType::Real32,
        ] {
            assert_eq!(ParamType::from_mav(ty.to_mav()), Some(ty));
        }
        assert_eq!(
            ParamType::from_mav(MavParamExtType::MAV_PARAM_EXT_TYPE_UINT64),
            None
        );
    }
}
