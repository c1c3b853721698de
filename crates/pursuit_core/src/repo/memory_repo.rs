//! In-process ledger stores.
//!
//! Three ordered maps keyed by identity, owned exclusively by the repository.
//! Useful for hosts that persist state themselves and for tests.

use crate::model::chronicle::{Chronicle, DeadlineMark, PriorityWeight};
use crate::model::identity::Identity;
use crate::repo::ledger_repo::{LedgerRepository, RepoError, RepoResult};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Map-backed implementation of `LedgerRepository`.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerRepository {
    chronicles: BTreeMap<Identity, Chronicle>,
    priorities: BTreeMap<Identity, PriorityWeight>,
    deadlines: BTreeMap<Identity, DeadlineMark>,
}

impl MemoryLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerRepository for MemoryLedgerRepository {
    fn get_chronicle(&self, identity: &Identity) -> RepoResult<Option<Chronicle>> {
        Ok(self.chronicles.get(identity).cloned())
    }

    fn insert_chronicle(&mut self, identity: &Identity, chronicle: &Chronicle) -> RepoResult<()> {
        match self.chronicles.entry(identity.clone()) {
            Entry::Occupied(_) => Err(RepoError::AlreadyExists(identity.clone())),
            Entry::Vacant(slot) => {
                slot.insert(chronicle.clone());
                Ok(())
            }
        }
    }

    fn replace_chronicle(
        &mut self,
        identity: &Identity,
        chronicle: &Chronicle,
    ) -> RepoResult<()> {
        let current = self
            .chronicles
            .get_mut(identity)
            .ok_or_else(|| RepoError::NotFound(identity.clone()))?;
        *current = chronicle.clone();
        Ok(())
    }

    fn delete_chronicle(&mut self, identity: &Identity) -> RepoResult<()> {
        self.chronicles
            .remove(identity)
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(identity.clone()))
    }

    fn get_priority(&self, identity: &Identity) -> RepoResult<Option<PriorityWeight>> {
        Ok(self.priorities.get(identity).copied())
    }

    fn upsert_priority(&mut self, identity: &Identity, weight: PriorityWeight) -> RepoResult<()> {
        self.priorities.insert(identity.clone(), weight);
        Ok(())
    }

    fn get_deadline(&self, identity: &Identity) -> RepoResult<Option<DeadlineMark>> {
        Ok(self.deadlines.get(identity).copied())
    }

    fn upsert_deadline(&mut self, identity: &Identity, mark: &DeadlineMark) -> RepoResult<()> {
        self.deadlines.insert(identity.clone(), *mark);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryLedgerRepository;
    use crate::model::chronicle::{Chronicle, VisionText};
    use crate::model::identity::Identity;
    use crate::repo::ledger_repo::{LedgerRepository, RepoError};

    fn chronicle(text: &str) -> Chronicle {
        Chronicle::new(VisionText::new(text).unwrap())
    }

    #[test]
    fn insert_refuses_to_overwrite() {
        let mut repo = MemoryLedgerRepository::new();
        let alice = Identity::new("alice").unwrap();

        repo.insert_chronicle(&alice, &chronicle("first")).unwrap();
        let err = repo.insert_chronicle(&alice, &chronicle("second")).unwrap_err();
        assert!(matches!(err, RepoError::AlreadyExists(ref id) if *id == alice));

        let stored = repo.get_chronicle(&alice).unwrap().unwrap();
        assert_eq!(stored.vision.as_str(), "first");
    }

    #[test]
    fn replace_and_delete_require_existing_chronicle() {
        let mut repo = MemoryLedgerRepository::new();
        let bob = Identity::new("bob").unwrap();

        assert!(matches!(
            repo.replace_chronicle(&bob, &chronicle("x")).unwrap_err(),
            RepoError::NotFound(_)
        ));
        assert!(matches!(
            repo.delete_chronicle(&bob).unwrap_err(),
            RepoError::NotFound(_)
        ));
    }
}
