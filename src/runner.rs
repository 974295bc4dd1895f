use tracing::{debug, error, info, warn};

use crate::catalog::CatalogState;
use crate::migration::{MigrationError, MigrationRegistry};
use crate::store::{CatalogStore, StoreError};

/// Applies and reverts registered migrations against a [`CatalogStore`].
///
/// Every run takes the store's exclusive lock and starts by replaying the
/// applied log against an empty catalog; a stored catalog that does not
/// match the replay is refused outright rather than silently re-run.
pub struct Runner<'a, S: CatalogStore> {
    registry: &'a MigrationRegistry,
    store: S,
}

impl<'a, S: CatalogStore> Runner<'a, S> {
    pub fn new(registry: &'a MigrationRegistry, store: S) -> Self {
        Self { registry, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Pending identifiers, in identifier order.
    pub fn plan_apply(&mut self) -> Result<Vec<&'static str>, MigrationError> {
        let applied = self
            .store
            .applied_migrations()
            .map_err(|e| store_error("plan", e))?;

        Ok(self
            .registry
            .ordered_identifiers()
            .into_iter()
            .filter(|name| !applied.iter().any(|a| a == name))
            .collect())
    }

    /// Applied identifiers in reverse application order, strict stack
    /// discipline. With a target, stops after (and including) it.
    pub fn plan_revert(&mut self, target: Option<&str>) -> Result<Vec<&'static str>, MigrationError> {
        let applied = self
            .store
            .applied_migrations()
            .map_err(|e| store_error("plan", e))?;

        let mut to_revert: Vec<&'static str> = self
            .registry
            .ordered_identifiers()
            .into_iter()
            .rev()
            .filter(|name| applied.iter().any(|a| a == name))
            .collect();

        if let Some(target) = target {
            let idx = to_revert
                .iter()
                .position(|&n| n == target)
                .ok_or_else(|| MigrationError::NotFound(target.to_string()))?;
            to_revert.truncate(idx + 1);
        }

        for name in &to_revert {
            let migration = self
                .registry
                .get(name)
                .ok_or_else(|| MigrationError::NotFound(name.to_string()))?;

            if !migration.is_reversible() {
                return Err(MigrationError::NotReversible(name.to_string()));
            }
        }

        Ok(to_revert)
    }

    /// Verifies that the stored catalog equals the replay of every applied
    /// migration over an empty catalog. An applied identifier missing from
    /// the registry, a failing replay, or a mismatched catalog all refuse
    /// the run.
    pub fn check_consistency(&mut self) -> Result<(), MigrationError> {
        let applied = self
            .store
            .applied_migrations()
            .map_err(|e| store_error("consistency check", e))?;
        let stored = self
            .store
            .load_catalog()
            .map_err(|e| store_error("consistency check", e))?;

        let mut replayed = CatalogState::new();
        for name in &applied {
            let migration = self.registry.get(name).ok_or_else(|| {
                MigrationError::InconsistentState(format!(
                    "applied migration {name} is not registered"
                ))
            })?;

            migration.apply(&mut replayed).map_err(|e| {
                MigrationError::InconsistentState(format!("replay of {name} failed: {e}"))
            })?;
        }

        if replayed != stored {
            return Err(MigrationError::InconsistentState(
                "stored catalog does not match the replay of the applied log".to_string(),
            ));
        }

        Ok(())
    }

    /// Apply every pending migration in identifier order.
    ///
    /// Each migration's catalog change and log entry are committed as one
    /// atomic step; a failure leaves earlier migrations committed and the
    /// failing one fully unapplied and unlogged.
    pub fn apply_all(&mut self) -> Result<Vec<String>, MigrationError> {
        self.lock()?;
        let result = self.apply_all_locked();
        self.unlock();
        result
    }

    fn apply_all_locked(&mut self) -> Result<Vec<String>, MigrationError> {
        self.check_consistency()?;

        let pending = self.plan_apply()?;
        debug!(pending = pending.len(), "planned forward migration run");

        let mut catalog = self
            .store
            .load_catalog()
            .map_err(|e| store_error("load", e))?;
        let mut applied = Vec::new();

        for name in pending {
            let migration = self
                .registry
                .get(name)
                .ok_or_else(|| MigrationError::NotFound(name.to_string()))?;

            let mut next = catalog.clone();
            if let Err(source) = migration.apply(&mut next) {
                error!(migration = name, %source, "migration failed to apply");
                return Err(MigrationError::ForwardFailed {
                    migration: name.to_string(),
                    source,
                    completed: applied,
                });
            }

            self.store
                .commit_applied(&next, name)
                .map_err(|e| store_error(name, e))?;

            info!(migration = name, "applied migration");
            catalog = next;
            applied.push(name.to_string());
        }

        Ok(applied)
    }

    /// Revert the most recently applied migration.
    /// `NothingApplied` when the log is empty; the catalog is untouched.
    pub fn revert_last(&mut self) -> Result<String, MigrationError> {
        self.lock()?;
        let result = self.revert_last_locked();
        self.unlock();
        result
    }

    fn revert_last_locked(&mut self) -> Result<String, MigrationError> {
        self.check_consistency()?;

        let applied = self
            .store
            .applied_migrations()
            .map_err(|e| store_error("revert", e))?;
        let name = applied.last().cloned().ok_or(MigrationError::NothingApplied)?;

        self.revert_one(&name)?;
        Ok(name)
    }

    /// Revert applied migrations in reverse order, back to and including
    /// `target` (or all of them when `target` is `None`).
    pub fn revert_to(&mut self, target: Option<&str>) -> Result<Vec<String>, MigrationError> {
        self.lock()?;
        let result = self.revert_to_locked(target);
        self.unlock();
        result
    }

    fn revert_to_locked(&mut self, target: Option<&str>) -> Result<Vec<String>, MigrationError> {
        self.check_consistency()?;

        let plan = self.plan_revert(target)?;
        debug!(count = plan.len(), "planned backward migration run");

        let mut reverted = Vec::new();
        for name in plan {
            self.revert_one(name)?;
            reverted.push(name.to_string());
        }

        Ok(reverted)
    }

    fn revert_one(&mut self, name: &str) -> Result<(), MigrationError> {
        let migration = self
            .registry
            .get(name)
            .ok_or_else(|| MigrationError::NotFound(name.to_string()))?;

        let catalog = self
            .store
            .load_catalog()
            .map_err(|e| store_error(name, e))?;

        let mut next = catalog.clone();
        match migration.revert(&mut next) {
            None => return Err(MigrationError::NotReversible(name.to_string())),
            Some(Err(source)) => {
                error!(migration = name, %source, "migration failed to revert");
                return Err(MigrationError::BackwardFailed {
                    migration: name.to_string(),
                    source,
                });
            }
            Some(Ok(())) => {}
        }

        self.store
            .commit_reverted(&next, name)
            .map_err(|e| store_error(name, e))?;

        info!(migration = name, "reverted migration");
        Ok(())
    }

    fn lock(&mut self) -> Result<(), MigrationError> {
        self.store.try_lock().map_err(|e| store_error("lock", e))
    }

    fn unlock(&mut self) {
        if let Err(e) = self.store.unlock() {
            warn!(%e, "failed to release the migration lock");
        }
    }
}

fn store_error(context: &str, e: StoreError) -> MigrationError {
    match e {
        StoreError::Contention => MigrationError::LockContention,
        other => MigrationError::Store {
            context: context.to_string(),
            message: other.to_string(),
        },
    }
}
