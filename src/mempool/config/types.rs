//! Pool configuration values and validation
//!
//! `PoolConfig` is what the embedding layer hands the builder. Every field has
//! a default so partial JSON documents deserialize cleanly; `validate` is the
//! single place the parameters are checked before any memory is reserved.

use serde::{Deserialize, Serialize};

use crate::mempool::region::ObjectLayout;
use crate::mempool::ring::SlotRing;
use crate::mempool::traits::types_and_enums::PoolOperationError;

/// Staging bound: the largest batch one allocate/free call may carry
pub const MAX_BULK_SIZE: usize = 2048;

/// Prefix of the ring name derived from the pool name
pub const RING_NAME_PREFIX: &str = "idx_";

/// Ring names (prefix included) must be shorter than this
pub const RING_NAMESIZE: usize = 32;

/// Indexed pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Pool name, also used to derive the ring name
    pub name: String,
    /// Number of objects in the pool
    pub capacity: u32,
    /// Usable payload bytes per object
    pub element_size: usize,
    /// Bytes in front of each payload
    pub header_size: usize,
    /// Bytes after each payload
    pub trailer_size: usize,
    /// Largest batch accepted by a single allocate/free call
    pub max_bulk: usize,
    /// Ring capacity; defaults to the pool capacity
    pub ring_capacity: Option<u32>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            capacity: 1024,
            element_size: 2048,
            header_size: 0,
            trailer_size: 0,
            max_bulk: MAX_BULK_SIZE,
            ring_capacity: None,
        }
    }
}

impl PoolConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self, PoolOperationError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            PoolOperationError::configuration_error(format!("Invalid pool config JSON: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a JSON document
    pub fn to_json_string(&self) -> Result<String, PoolOperationError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            PoolOperationError::configuration_error(format!("Pool config not serializable: {}", e))
        })
    }

    /// Object layout described by the size fields
    pub fn layout(&self) -> Result<ObjectLayout, PoolOperationError> {
        ObjectLayout::checked_new(self.header_size, self.element_size, self.trailer_size)
    }

    /// Ring capacity actually used
    pub fn effective_ring_capacity(&self) -> u32 {
        self.ring_capacity.unwrap_or(self.capacity)
    }

    /// Name of the ring backing this pool
    pub fn ring_name(&self) -> String {
        format!("{}{}", RING_NAME_PREFIX, self.name)
    }

    /// Check every parameter, reporting the first problem found
    pub fn validate(&self) -> Result<(), PoolOperationError> {
        let reject = |msg: String| {
            log::warn!("Rejecting pool config '{}': {}", self.name, msg);
            Err(PoolOperationError::configuration_error(msg))
        };

        if self.name.is_empty() {
            return reject("pool name must not be empty".to_string());
        }
        if self.ring_name().len() >= RING_NAMESIZE {
            return reject(format!(
                "pool name too long: ring name '{}' must be shorter than {} bytes",
                self.ring_name(),
                RING_NAMESIZE
            ));
        }
        if self.capacity == 0 || self.capacity > SlotRing::MAX_CAPACITY {
            return reject(format!(
                "capacity {} outside 1..={}",
                self.capacity,
                SlotRing::MAX_CAPACITY
            ));
        }
        if self.max_bulk == 0 || self.max_bulk > MAX_BULK_SIZE {
            return reject(format!(
                "max_bulk {} outside 1..={}",
                self.max_bulk, MAX_BULK_SIZE
            ));
        }
        let ring_capacity = self.effective_ring_capacity();
        if ring_capacity < self.capacity || ring_capacity > SlotRing::MAX_CAPACITY {
            return reject(format!(
                "ring capacity {} must cover pool capacity {}",
                ring_capacity, self.capacity
            ));
        }

        let layout = self.layout()?;
        if layout.region_size(self.capacity).is_none() {
            return reject(format!(
                "{} objects of stride {} overflow the address space",
                self.capacity,
                layout.stride()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PoolConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_ring_capacity(), 1024);
        assert_eq!(config.layout().unwrap().stride(), 2048);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PoolConfig::from_json_str(
            r#"{ "name": "rx", "capacity": 4, "element_size": 64 }"#,
        )
        .unwrap();
        assert_eq!(config.name, "rx");
        assert_eq!(config.capacity, 4);
        assert_eq!(config.max_bulk, MAX_BULK_SIZE);
        assert_eq!(config.ring_capacity, None);
    }

    #[test]
    fn test_json_round_trip() {
        let config = PoolConfig {
            name: "tx".to_string(),
            header_size: 64,
            ring_capacity: Some(2048),
            ..PoolConfig::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(PoolConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_malformed_json_is_configuration_error() {
        assert!(matches!(
            PoolConfig::from_json_str("{ capacity: }"),
            Err(PoolOperationError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_name_too_long() {
        let config = PoolConfig {
            name: "x".repeat(RING_NAMESIZE - RING_NAME_PREFIX.len()),
            ..PoolConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PoolConfig {
            name: "x".repeat(RING_NAMESIZE - RING_NAME_PREFIX.len() - 1),
            ..PoolConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ring_smaller_than_pool_rejected() {
        let config = PoolConfig {
            capacity: 64,
            ring_capacity: Some(63),
            ..PoolConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bulk_bounds() {
        for max_bulk in [0, MAX_BULK_SIZE + 1] {
            let config = PoolConfig {
                max_bulk,
                ..PoolConfig::default()
            };
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_zero_stride_rejected() {
        let config = PoolConfig {
            element_size: 0,
            ..PoolConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
