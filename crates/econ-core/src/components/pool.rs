//! Resource Pool
//!
//! Shared raw-material stocks consumed by company production.

use bevy_ecs::prelude::*;
use econ_events::Resource;
use std::collections::BTreeMap;

/// Starting quantity of every resource.
pub const DEFAULT_RESOURCE_QUANTITY: u64 = 1000;

/// Quantity above which a resource starts to spoil.
pub const DECAY_THRESHOLD: u64 = 100_000;

/// Fraction lost per tick by a resource above the threshold.
pub const DECAY_RATE: f64 = 0.01;

/// Per-tick regeneration of a resource.
pub fn regeneration(resource: Resource) -> u64 {
    match resource {
        Resource::Water => 50,
        _ => 20,
    }
}

/// Resource: quantities of every raw material, keyed in stable order
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ResourcePool {
    quantities: BTreeMap<Resource, u64>,
}

impl ResourcePool {
    /// Every resource starting at `quantity`
    pub fn new(quantity: u64) -> Self {
        Self {
            quantities: Resource::ALL.iter().map(|&r| (r, quantity)).collect(),
        }
    }

    pub fn from_quantities(quantities: impl IntoIterator<Item = (Resource, u64)>) -> Self {
        Self {
            quantities: quantities.into_iter().collect(),
        }
    }

    /// Quantity on hand (zero for resources never stocked)
    pub fn get(&self, resource: Resource) -> u64 {
        self.quantities.get(&resource).copied().unwrap_or(0)
    }

    pub fn set(&mut self, resource: Resource, quantity: u64) {
        self.quantities.insert(resource, quantity);
    }

    /// Whether at least `amount` (possibly fractional) is available
    pub fn covers(&self, resource: Resource, amount: f64) -> bool {
        self.get(resource) as f64 >= amount
    }

    /// Remove up to `amount`, never going below zero
    pub fn withdraw(&mut self, resource: Resource, amount: u64) {
        let entry = self.quantities.entry(resource).or_insert(0);
        *entry = entry.saturating_sub(amount);
    }

    /// Apply one tick of regeneration, then spoil anything above the threshold
    pub fn regenerate(&mut self) {
        for (&resource, quantity) in self.quantities.iter_mut() {
            *quantity += regeneration(resource);
        }
        for quantity in self.quantities.values_mut() {
            if *quantity > DECAY_THRESHOLD {
                *quantity -= (*quantity as f64 * DECAY_RATE) as u64;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, u64)> + '_ {
        self.quantities.iter().map(|(&r, &q)| (r, q))
    }
}

impl Default for ResourcePool {
    fn default() -> Self {
        Self::new(DEFAULT_RESOURCE_QUANTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_stocks_everything() {
        let pool = ResourcePool::default();
        for resource in Resource::ALL {
            assert_eq!(pool.get(resource), 1000);
        }
    }

    #[test]
    fn test_regeneration_favours_water() {
        let mut pool = ResourcePool::default();
        pool.regenerate();
        assert_eq!(pool.get(Resource::Water), 1050);
        assert_eq!(pool.get(Resource::Steel), 1020);
        assert_eq!(pool.get(Resource::Labor), 1020);
        assert_eq!(pool.get(Resource::Energy), 1020);
    }

    #[test]
    fn test_decay_above_threshold() {
        let mut pool = ResourcePool::from_quantities([(Resource::Steel, 200_000)]);
        pool.regenerate();
        // 200_020 loses 1% (truncated)
        assert_eq!(pool.get(Resource::Steel), 200_020 - 2000);
    }

    #[test]
    fn test_withdraw_saturates() {
        let mut pool = ResourcePool::from_quantities([(Resource::Labor, 3)]);
        pool.withdraw(Resource::Labor, 5);
        assert_eq!(pool.get(Resource::Labor), 0);
        assert!(!pool.covers(Resource::Energy, 0.5));
        assert!(pool.covers(Resource::Energy, 0.0));
    }
}
