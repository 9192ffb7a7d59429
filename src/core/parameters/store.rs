//! Per-camera parameter store
//!
//! Holds the current value for each parameter a camera has set, plus an
//! optional supported-value set per parameter. An empty supported set means
//! "any value of the right type". Listing follows the schema's insertion
//! order, not the order values were stored in.

use std::collections::HashMap;

use super::schema::ParamSchema;
use super::{ParamError, ParamValue};

#[derive(Default)]
pub struct ParamStore {
    current: HashMap<&'static str, ParamValue>,
    supported: HashMap<&'static str, Vec<ParamValue>>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a prospective write without applying it.
    ///
    /// Returns the canonical (schema-owned) name on success.
    pub fn validate(&self, name: &str, value: ParamValue) -> Result<&'static str, ParamError> {
        let entry = ParamSchema::global()
            .lookup(name)
            .ok_or_else(|| ParamError::UnknownParam(name.to_string()))?;

        if value.param_type() != entry.param_type {
            return Err(ParamError::BadType {
                name: entry.name.to_string(),
                expected: entry.param_type,
                got: value.param_type(),
            });
        }

        if let Some(values) = self.supported.get(entry.name) {
            if !values.is_empty() && !values.contains(&value) {
                return Err(ParamError::Unsupported(entry.name.to_string()));
            }
        }

        Ok(entry.name)
    }

    pub fn set_current(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        let canonical = self.validate(name, value)?;
        self.current.insert(canonical, value);
        Ok(())
    }

    pub fn get_current(&self, name: &str) -> Result<ParamValue, ParamError> {
        let entry = ParamSchema::global()
            .lookup(name)
            .ok_or_else(|| ParamError::UnknownParam(name.to_string()))?;
        self.current
            .get(entry.name)
            .copied()
            .ok_or_else(|| ParamError::Missing(entry.name.to_string()))
    }

    /// Append to the supported set. Duplicates are permitted but pointless.
    pub fn set_supported(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        let entry = ParamSchema::global()
            .lookup(name)
            .ok_or_else(|| ParamError::UnknownParam(name.to_string()))?;

        if value.param_type() != entry.param_type {
            return Err(ParamError::BadType {
                name: entry.name.to_string(),
                expected: entry.param_type,
                got: value.param_type(),
            });
        }

        self.supported.entry(entry.name).or_default().push(value);
        Ok(())
    }

    /// Current values in schema order.
    pub fn list_current(&self) -> Vec<(&'static str, ParamValue)> {
        ParamSchema::global()
            .iter()
            .filter_map(|entry| self.current.get(entry.name).map(|&v| (entry.name, v)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::super::schema;
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut store = ParamStore::new();
        store
            .set_current(schema::BRIGHTNESS, ParamValue::Uint32(128))
            .unwrap();
        assert_eq!(
            store.get_current(schema::BRIGHTNESS).unwrap(),
            ParamValue::Uint32(128)
        );
    }

    #[test]
    fn test_round_trip_over_supported_set() {
        let mut store = ParamStore::new();
        for v in [0u32, 1, 2] {
            store
                .set_supported(schema::WHITE_BALANCE_MODE, ParamValue::Uint32(v))
                .unwrap();
        }
        for v in [0u32, 1, 2] {
            store
                .set_current(schema::WHITE_BALANCE_MODE, ParamValue::Uint32(v))
                .unwrap();
            assert_eq!(
                store.get_current(schema::WHITE_BALANCE_MODE).unwrap(),
                ParamValue::Uint32(v)
            );
        }
    }

    #[test]
    fn test_unknown_param() {
        let mut store = ParamStore::new();
        assert!(matches!(
            store.set_current("zoom", ParamValue::Uint32(1)),
            Err(ParamError::UnknownParam(_))
        ));
        assert!(matches!(
            store.get_current("zoom"),
            Err(ParamError::UnknownParam(_))
        ));
    }

    #[test]
    fn test_bad_type_leaves_store_unchanged() {
        let mut store = ParamStore::new();
        store
            .set_current(schema::BRIGHTNESS, ParamValue::Uint32(64))
            .unwrap();

        assert!(matches!(
            store.set_current(schema::BRIGHTNESS, ParamValue::Real32(64.0)),
            Err(ParamError::BadType { .. })
        ));
        assert_eq!(
            store.get_current(schema::BRIGHTNESS).unwrap(),
            ParamValue::Uint32(64)
        );
    }

    #[test]
    fn test_unsupported_value_rejected() {
        let mut store = ParamStore::new();
        store
            .set_supported(schema::EXPOSURE_MODE, ParamValue::Uint32(0))
            .unwrap();
        store
            .set_supported(schema::EXPOSURE_MODE, ParamValue::Uint32(1))
            .unwrap();

        assert!(matches!(
            store.set_current(schema::EXPOSURE_MODE, ParamValue::Uint32(9)),
            Err(ParamError::Unsupported(_))
        ));
        assert!(store
            .set_current(schema::EXPOSURE_MODE, ParamValue::Uint32(1))
            .is_ok());
    }

    #[test]
    fn test_missing_value() {
        let store = ParamStore::new();
        assert!(matches!(
            store.get_current(schema::GAIN),
            Err(ParamError::Missing(_))
        ));
    }

    #[test]
    fn test_list_follows_schema_order() {
        let mut store = ParamStore::new();
        // Insert in reverse of schema order
        store
            .set_current(schema::VIDEO_SNAPSHOT_SUPPORTED, ParamValue::Uint32(0))
            .unwrap();
        store
            .set_current(schema::HUE, ParamValue::Int32(-5))
            .unwrap();
        store
            .set_current(schema::CAMERA_MODE, ParamValue::Uint32(1))
            .unwrap();

        let names: Vec<&str> = store.list_current().iter().map(|(n, _)| *n).collect();
        assert_eq!(store.len(), 3);
        assert_eq!(
            names,
            vec![
                schema::CAMERA_MODE,
                schema::HUE,
                schema::VIDEO_SNAPSHOT_SUPPORTED
            ]
        );
    }
}
