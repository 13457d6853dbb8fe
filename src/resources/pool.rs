//! The shared available-resource vector.
//!
//! Every request, release and forced reclaim goes through a `ResourcePool`.
//! The pool remembers the per-type totals it was created with so the
//! conservation law can be checked after each mutation.

use serde::Serialize;

use super::error::ResourceError;

/// Live count of unallocated units per resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourcePool {
    available: Vec<u32>,
    totals: Vec<u32>,
}

impl ResourcePool {
    /// Create a pool where every unit starts out unallocated.
    pub fn new(available: Vec<u32>) -> Self {
        let totals = available.clone();
        Self { available, totals }
    }

    /// Number of resource types.
    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    /// Current available counts, indexed by resource type.
    pub fn available(&self) -> &[u32] {
        &self.available
    }

    /// Capacity of each resource type, fixed at construction.
    pub fn totals(&self) -> &[u32] {
        &self.totals
    }

    /// Fail fast on a resource index outside `[0, len)`.
    pub fn check_index(&self, resource: usize) -> Result<(), ResourceError> {
        if resource < self.available.len() {
            Ok(())
        } else {
            Err(ResourceError::IndexOutOfRange {
                index: resource,
                len: self.available.len(),
            })
        }
    }

    /// Available units of one resource type.
    pub fn available_of(&self, resource: usize) -> Result<u32, ResourceError> {
        self.check_index(resource)?;
        Ok(self.available[resource])
    }

    /// Whether at least one unit of `resource` is free. Out-of-range indices
    /// report nothing free.
    pub fn has_free(&self, resource: usize) -> bool {
        self.available.get(resource).is_some_and(|&units| units > 0)
    }

    /// Take a single unit if one is free. Returns `false` when the type is
    /// exhausted, which is normal flow control rather than an error.
    pub(crate) fn take_one(&mut self, resource: usize) -> Result<bool, ResourceError> {
        self.check_index(resource)?;
        let slot = &mut self.available[resource];
        if *slot == 0 {
            return Ok(false);
        }
        *slot -= 1;
        Ok(true)
    }

    /// Return `units` of `resource` to the pool.
    ///
    /// Returning more than the type's capacity means units were created out of
    /// thin air somewhere, which is reported as an invariant violation.
    pub(crate) fn give_back(&mut self, resource: usize, units: u32) -> Result<(), ResourceError> {
        self.check_index(resource)?;
        let total = self.totals[resource];
        let slot = &mut self.available[resource];
        match slot.checked_add(units) {
            Some(next) if next <= total => {
                *slot = next;
                Ok(())
            }
            _ => Err(ResourceError::InvariantViolation(format!(
                "returning {} unit(s) of R{} would exceed its capacity of {} ({} available)",
                units, resource, total, slot
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_and_give_back() {
        let mut pool = ResourcePool::new(vec![1, 0]);

        assert_eq!(pool.take_one(0), Ok(true));
        assert_eq!(pool.available(), &[0, 0]);
        assert_eq!(pool.take_one(0), Ok(false));
        assert_eq!(pool.take_one(1), Ok(false));

        pool.give_back(0, 1).unwrap();
        assert_eq!(pool.available(), &[1, 0]);
        assert_eq!(pool.totals(), &[1, 0]);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut pool = ResourcePool::new(vec![2, 2]);

        assert_eq!(
            pool.take_one(2),
            Err(ResourceError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert!(pool.available_of(5).is_err());
        assert!(!pool.has_free(7));
        assert_eq!(pool.available(), &[2, 2]);
    }

    #[test]
    fn test_give_back_beyond_capacity() {
        let mut pool = ResourcePool::new(vec![3]);

        let err = pool.give_back(0, 1).unwrap_err();
        assert!(matches!(err, ResourceError::InvariantViolation(_)));
        assert_eq!(pool.available(), &[3]);
    }
}
