//! Single-use enforcement for governance grants.
//!
//! A grant id, once consumed by a committed operation, is rejected forever
//! with [`LedgerError::GrantAlreadyUsed`]. Unlike an LRU replay cache this
//! set is never evicted: grants have no epoch window that would make an old
//! id harmless.

use std::collections::BTreeSet;

use clubledger_types::{GovernanceGrant, GrantId, LedgerError, Result};

#[derive(Debug, Clone, Default)]
pub struct GrantGuard {
    consumed: BTreeSet<GrantId>,
}

impl GrantGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// `GrantAlreadyUsed` if the grant was consumed before.
    pub fn ensure_unused(&self, grant: &GovernanceGrant) -> Result<()> {
        if self.consumed.contains(&grant.id) {
            return Err(LedgerError::GrantAlreadyUsed(grant.id));
        }
        Ok(())
    }

    /// Mark a grant as consumed.
    ///
    /// # Errors
    /// `GrantAlreadyUsed` if it already was.
    pub fn consume(&mut self, grant: &GovernanceGrant) -> Result<()> {
        if !self.consumed.insert(grant.id) {
            return Err(LedgerError::GrantAlreadyUsed(grant.id));
        }
        tracing::debug!(grant = %grant.id, action = ?grant.action, "Governance grant consumed");
        Ok(())
    }

    #[must_use]
    pub fn is_consumed(&self, id: &GrantId) -> bool {
        self.consumed.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }

    /// Consumed ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &GrantId> {
        self.consumed.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubledger_types::{GrantAction, GrantScope, GrantTarget};

    fn grant(id: u64) -> GovernanceGrant {
        GovernanceGrant::dummy(
            id,
            GrantScope::RewardLedger,
            GrantAction::SetSupplyCap,
            GrantTarget::Ledger,
        )
    }

    #[test]
    fn first_use_succeeds() {
        let mut guard = GrantGuard::new();
        assert!(guard.ensure_unused(&grant(1)).is_ok());
        assert!(guard.consume(&grant(1)).is_ok());
        assert!(guard.is_consumed(&GrantId(1)));
    }

    #[test]
    fn reuse_rejected() {
        let mut guard = GrantGuard::new();
        guard.consume(&grant(1)).unwrap();
        assert!(matches!(
            guard.ensure_unused(&grant(1)),
            Err(LedgerError::GrantAlreadyUsed(GrantId(1)))
        ));
        assert!(guard.consume(&grant(1)).is_err());
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn distinct_grants_independent() {
        let mut guard = GrantGuard::new();
        guard.consume(&grant(1)).unwrap();
        assert!(guard.consume(&grant(2)).is_ok());
        assert_eq!(guard.iter().copied().collect::<Vec<_>>(), vec![GrantId(1), GrantId(2)]);
    }
}
