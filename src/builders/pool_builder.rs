//! Builders to construct pools from configuration.

use std::collections::HashMap;

use tracing::error;

use crate::config::FleetConfig;
use crate::core::{Pool, PoolError};

/// Build one pool per fleet entry.
///
/// Fails fast on the first pool that cannot be validated or spawned; pools
/// already built at that point are destroyed before the error is returned.
///
/// # Errors
///
/// Returns [`PoolError::InvalidConfig`] for a bad fleet definition or
/// [`PoolError::Spawn`] when a pool's threads cannot be started.
pub fn build_pools<P: Send + 'static>(
    cfg: &FleetConfig,
) -> Result<HashMap<String, Pool<P>>, PoolError> {
    cfg.validate().map_err(PoolError::InvalidConfig)?;

    let mut pools = HashMap::new();
    for (name, pool_cfg) in &cfg.pools {
        match Pool::create(pool_cfg.clone()) {
            Ok(pool) => {
                pools.insert(name.clone(), pool);
            }
            Err(err) => {
                error!(pool = %name, error = %err, "fleet construction failed");
                for (_, pool) in pools {
                    pool.destroy(false);
                }
                return Err(err);
            }
        }
    }
    Ok(pools)
}
