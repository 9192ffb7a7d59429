//! Extended-parameter protocol handlers
//!
//! PARAM_EXT_REQUEST_READ, PARAM_EXT_REQUEST_LIST and PARAM_EXT_SET against
//! the per-camera parameter stores. A failed set acks PARAM_ACK_FAILED with
//! the current value echoed back so the GCS can resync.

use mavlink::common::*;
use tracing::debug;

use crate::core::parameters::{
    decode_param_id, encode_param_id, ParamError, ParamType, ParamValue, PARAM_VALUE_LEN,
};

use super::super::components::ComponentRegistry;
use super::super::dispatcher::{Reply, ReplyBatch};

pub fn request_read(
    registry: &ComponentRegistry,
    req: &PARAM_EXT_REQUEST_READ_DATA,
) -> Vec<ReplyBatch> {
    let Some(component) = registry.lookup(req.target_component) else {
        return Vec::new();
    };
    let name = decode_param_id(&req.param_id);

    match component.get_param(&name) {
        Ok(value) => {
            let reply = MavMessage::PARAM_EXT_VALUE(PARAM_EXT_VALUE_DATA {
                param_count: 1,
                param_index: 0,
                param_id: req.param_id,
                param_value: value.encode_wire(),
                param_type: value.param_type().to_mav(),
            });
            vec![vec![Reply::to_peer(req.target_component, reply)]]
        }
        Err(err) => {
            debug!(param = %name, error = %err, "parameter read failed");
            let param_type = component
                .param_type(&name)
                .map(ParamType::to_mav)
                .unwrap_or(MavParamExtType::MAV_PARAM_EXT_TYPE_UINT32);
            let reply = MavMessage::PARAM_EXT_ACK(PARAM_EXT_ACK_DATA {
                param_id: req.param_id,
                param_value: [0u8; PARAM_VALUE_LEN],
                param_type,
                param_result: ParamAck::PARAM_ACK_FAILED,
            });
            vec![vec![Reply::to_peer(req.target_component, reply)]]
        }
    }
}

/// One PARAM_EXT_VALUE per stored parameter, `param_count` set to the total
/// and `param_index` to the position in schema order. Each value is its own
/// batch: a lost message does not abort the burst.
pub fn request_list(
    registry: &ComponentRegistry,
    req: &PARAM_EXT_REQUEST_LIST_DATA,
) -> Vec<ReplyBatch> {
    let Some(component) = registry.lookup(req.target_component) else {
        return Vec::new();
    };

    let entries = component.param_list();
    let count = entries.len() as u16;

    entries
        .iter()
        .enumerate()
        .map(|(index, &(name, value))| {
            vec![Reply::to_peer(
                req.target_component,
                MavMessage::PARAM_EXT_VALUE(PARAM_EXT_VALUE_DATA {
                    param_count: count,
                    param_index: index as u16,
                    param_id: encode_param_id(name),
                    param_value: value.encode_wire(),
                    param_type: value.param_type().to_mav(),
                }),
            )]
        })
        .collect()
}

pub fn set(registry: &mut ComponentRegistry, req: &PARAM_EXT_SET_DATA) -> Vec<ReplyBatch> {
    let Some(component) = registry.lookup_mut(req.target_component) else {
        return Vec::new();
    };
    let name = decode_param_id(&req.param_id);

    let result = match ParamType::from_mav(req.param_type) {
        Some(declared) => match ParamValue::decode_wire(&req.param_value, declared) {
            Some(value) => component.set_param(&name, value),
            None => Err(ParamError::UnsupportedWireType),
        },
        None => Err(ParamError::UnsupportedWireType),
    };

    let ack = match result {
        Ok(()) => PARAM_EXT_ACK_DATA {
            param_id: req.param_id,
            param_value: req.param_value,
            param_type: req.param_type,
            param_result: ParamAck::PARAM_ACK_ACCEPTED,
        },
        Err(err) => {
            debug!(param = %name, error = %err, "parameter set rejected");
            let current = component
                .get_param(&name)
                .map(ParamValue::encode_wire)
                .unwrap_or([0u8; PARAM_VALUE_LEN]);
            PARAM_EXT_ACK_DATA {
                param_id: req.param_id,
                param_value: current,
                param_type: req.param_type,
                param_result: ParamAck::PARAM_ACK_FAILED,
            }
        }
    };

    vec![vec![Reply::to_peer(
        req.target_component,
        MavMessage::PARAM_EXT_ACK(ack),
    )]]
}
