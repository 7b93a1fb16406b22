//! Tests for configuration validation, JSON parsing, and fleet building.

use elastic_pool::{build_pools, FleetConfig, Pool, PoolConfig, PoolError};

fn base_config() -> PoolConfig {
    PoolConfig::new()
        .with_default_batch(2)
        .with_min_workers(1)
        .with_max_workers(4)
        .with_queue_capacity(16)
}

#[test]
fn valid_config_passes() {
    assert!(base_config().validate().is_ok());
}

#[test]
fn zero_max_workers_is_rejected() {
    let cfg = base_config().with_min_workers(0).with_max_workers(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn min_above_max_is_rejected() {
    let cfg = base_config().with_min_workers(8).with_max_workers(4);
    assert!(cfg.validate().is_err());
}

#[test]
fn zero_queue_capacity_is_rejected() {
    let cfg = base_config().with_queue_capacity(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn zero_admin_interval_is_rejected() {
    let cfg = base_config().with_admin_interval_ms(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn default_config_is_valid() {
    let cfg = PoolConfig::default();
    assert!(cfg.validate().is_ok());
    assert!(cfg.min_workers <= cfg.max_workers);
    assert!(cfg.queue_capacity > 0);
}

#[test]
fn fleet_requires_at_least_one_pool() {
    let fleet = FleetConfig {
        pools: std::collections::HashMap::new(),
    };
    assert!(fleet.validate().is_err());
}

#[test]
fn fleet_names_offending_pool() {
    let mut pools = std::collections::HashMap::new();
    pools.insert("bad".to_string(), base_config().with_queue_capacity(0));
    let fleet = FleetConfig { pools };
    let err = fleet.validate().unwrap_err();
    assert!(err.contains("bad"));
}

#[test]
fn fleet_parses_from_json_with_defaults() {
    let json = r#"{
        "pools": {
            "render": {
                "default_batch": 2,
                "min_workers": 1,
                "max_workers": 4,
                "queue_capacity": 16
            },
            "ingest": {
                "default_batch": 0,
                "min_workers": 2,
                "max_workers": 8,
                "queue_capacity": 32,
                "admin_interval_ms": 25
            }
        }
    }"#;

    let fleet = FleetConfig::from_json_str(json).unwrap();
    assert_eq!(fleet.pools.len(), 2);
    assert_eq!(fleet.pools["render"].admin_interval_ms, 50);
    assert_eq!(fleet.pools["ingest"].admin_interval_ms, 25);
    assert!(fleet.pools["render"].thread_stack_size.is_none());
}

#[test]
fn fleet_rejects_malformed_json() {
    assert!(FleetConfig::from_json_str("{ not json").is_err());
}

#[test]
fn fleet_rejects_invalid_values_in_json() {
    let json = r#"{
        "pools": {
            "broken": {
                "default_batch": 1,
                "min_workers": 9,
                "max_workers": 4,
                "queue_capacity": 16
            }
        }
    }"#;
    assert!(FleetConfig::from_json_str(json).is_err());
}

#[test]
fn build_pools_constructs_each_fleet_entry() {
    let json = r#"{
        "pools": {
            "render": {
                "default_batch": 1,
                "min_workers": 1,
                "max_workers": 2,
                "queue_capacity": 8
            },
            "ingest": {
                "default_batch": 1,
                "min_workers": 2,
                "max_workers": 4,
                "queue_capacity": 8
            }
        }
    }"#;

    let fleet = FleetConfig::from_json_str(json).unwrap();
    let pools = build_pools::<()>(&fleet).unwrap();
    assert_eq!(pools.len(), 2);
    assert_eq!(pools["render"].stats().live, 1);
    assert_eq!(pools["ingest"].stats().live, 2);

    for (_, pool) in pools {
        pool.destroy(false);
    }
}

#[test]
fn build_pools_rejects_invalid_fleet() {
    let mut pools = std::collections::HashMap::new();
    pools.insert("bad".to_string(), base_config().with_max_workers(0));
    let fleet = FleetConfig { pools };

    let err = build_pools::<()>(&fleet).unwrap_err();
    assert!(matches!(err, PoolError::InvalidConfig(_)));
}

#[test]
fn fleet_loading_composes_with_anyhow() -> elastic_pool::AppResult<()> {
    let json = r#"{
        "pools": {
            "solo": {
                "default_batch": 1,
                "min_workers": 1,
                "max_workers": 2,
                "queue_capacity": 4
            }
        }
    }"#;

    let fleet = FleetConfig::from_json_str(json).map_err(|e| anyhow::anyhow!(e))?;
    let pools = build_pools::<u32>(&fleet)?;
    assert_eq!(pools.len(), 1);
    for (_, pool) in pools {
        pool.destroy(true);
    }
    Ok(())
}

#[test]
fn pool_respects_configured_capacity() {
    let pool = Pool::<()>::create(base_config()).unwrap();
    assert_eq!(pool.stats().queue_capacity, 16);
    pool.destroy(false);
}
