//! Reconciler: converge the desired set against the remote store.
//!
//! Records are processed in input order, sequentially. A failed remote call
//! is captured per record and the loop keeps going - one bad record must not
//! abort the batch. The identity index is updated after every successful
//! write so later steps in the same run (including `open`) see fresh ids.

use anyhow::{Context, Result};
use serde::Serialize;

use super::differ::{Action, plan};
use crate::client::{ClientError, RoleStore};
use crate::index::RoleIndex;
use crate::persona;
use crate::schema::{CreateRole, DesiredRole, RemoteRole};

/// Description given to roles auto-created by the open flow.
const OPEN_HINT: &str = "created automatically by rolesync";

#[derive(Debug, Clone, Serialize)]
pub struct RoleRef {
    pub name: String,
    pub role_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleError {
    pub name: String,
    pub error: String,
}

/// Per-record outcomes of one reconciliation run.
#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub created: Vec<RoleRef>,
    pub updated: Vec<RoleRef>,
    pub unchanged: Vec<String>,
    pub errors: Vec<RoleError>,
}

impl SyncReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn total(&self) -> usize {
        self.created.len() + self.updated.len() + self.unchanged.len() + self.errors.len()
    }
}

pub struct Reconciler<'a> {
    store: &'a dyn RoleStore,
    index: RoleIndex,
}

impl std::fmt::Debug for Reconciler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").field("index", &self.index).finish_non_exhaustive()
    }
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn RoleStore, index: RoleIndex) -> Self {
        Self { store, index }
    }

    /// Fetch the remote snapshot and build the identity index from it.
    ///
    /// A listing failure or a duplicate remote name aborts before any write.
    pub fn from_store(store: &'a dyn RoleStore) -> Result<Self> {
        let snapshot = store.list().context("could not fetch the remote role listing")?;
        let index = RoleIndex::build(snapshot)?;
        Ok(Self::new(store, index))
    }

    pub fn index(&self) -> &RoleIndex {
        &self.index
    }

    /// Converge every desired record, collecting per-record outcomes.
    pub fn reconcile(&mut self, desired: &[DesiredRole]) -> SyncReport {
        let mut report = SyncReport::default();

        for record in desired {
            match plan(record, self.index.get(&record.name)) {
                Action::NoOp => {
                    log::info!("unchanged: {}", record.name);
                    report.unchanged.push(record.name.clone());
                }
                Action::Create(payload) => match self.store.create(&payload) {
                    Ok(role) => {
                        log::info!("created: {} (role_id={})", role.name, role.role_id);
                        report.created.push(RoleRef {
                            name: role.name.clone(),
                            role_id: role.role_id,
                        });
                        self.index.insert(role);
                    }
                    Err(err) => report.errors.push(record_error(&record.name, &err)),
                },
                Action::Update { role_id, patch } => match self.store.update(role_id, &patch) {
                    Ok(role) => {
                        log::info!("updated: {} (role_id={})", role.name, role.role_id);
                        report.updated.push(RoleRef {
                            name: role.name.clone(),
                            role_id: role.role_id,
                        });
                        self.index.insert(role);
                    }
                    Err(err) => report.errors.push(record_error(&record.name, &err)),
                },
            }
        }

        report
    }

    /// Create-if-absent by name. The open flow reuses this so opening an
    /// unknown role creates it first.
    pub fn ensure(
        &mut self,
        name: &str,
        description_hint: Option<&str>,
    ) -> std::result::Result<RemoteRole, ClientError> {
        if let Some(existing) = self.index.get(name) {
            return Ok(existing.clone());
        }

        let payload = CreateRole {
            name: name.to_string(),
            description: description_hint.unwrap_or_default().to_string(),
            personality: persona::generate(name),
        };
        let role = self.store.create(&payload)?;
        log::info!("created: {} (role_id={})", role.name, role.role_id);
        self.index.insert(role.clone());
        Ok(role)
    }

    /// Resolve (or create) a role and fetch its session path.
    pub fn open(&mut self, name: &str) -> std::result::Result<(RemoteRole, String), ClientError> {
        let role = self.ensure(name, Some(OPEN_HINT))?;
        let path = self.store.open_session(role.role_id)?;
        Ok((role, path))
    }
}

fn record_error(name: &str, err: &ClientError) -> RoleError {
    log::warn!("failed: {name}: {err}");
    RoleError {
        name: name.to_string(),
        error: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    /// In-memory store with injectable per-name write failures.
    #[derive(Default)]
    struct FakeStore {
        roles: RefCell<Vec<RemoteRole>>,
        next_id: RefCell<i64>,
        fail_writes_for: HashSet<String>,
        creates: RefCell<usize>,
    }

    impl FakeStore {
        fn with_roles(roles: Vec<RemoteRole>) -> Self {
            let next_id = roles.iter().map(|r| r.role_id).max().unwrap_or(0) + 1;
            Self {
                roles: RefCell::new(roles),
                next_id: RefCell::new(next_id),
                ..Self::default()
            }
        }

        fn failing_for(names: &[&str]) -> Self {
            Self {
                fail_writes_for: names.iter().map(|n| (*n).to_string()).collect(),
                next_id: RefCell::new(1),
                ..Self::default()
            }
        }

        fn get(&self, name: &str) -> Option<RemoteRole> {
            self.roles.borrow().iter().find(|r| r.name == name).cloned()
        }
    }

    impl RoleStore for FakeStore {
        fn list(&self) -> crate::client::Result<Vec<RemoteRole>> {
            Ok(self.roles.borrow().clone())
        }

        fn create(&self, role: &CreateRole) -> crate::client::Result<RemoteRole> {
            if self.fail_writes_for.contains(&role.name) {
                return Err(ClientError::Http {
                    status: 500,
                    body: "injected failure".to_string(),
                });
            }
            *self.creates.borrow_mut() += 1;
            let mut next_id = self.next_id.borrow_mut();
            let created = RemoteRole {
                role_id: *next_id,
                name: role.name.clone(),
                description: Some(role.description.clone()),
                personality: serde_json::to_value(&role.personality).ok(),
            };
            *next_id += 1;
            self.roles.borrow_mut().push(created.clone());
            Ok(created)
        }

        fn update(
            &self,
            role_id: i64,
            patch: &crate::schema::UpdateRole,
        ) -> crate::client::Result<RemoteRole> {
            let mut roles = self.roles.borrow_mut();
            let role = roles
                .iter_mut()
                .find(|r| r.role_id == role_id)
                .ok_or(ClientError::Http {
                    status: 404,
                    body: "no such role".to_string(),
                })?;
            if self.fail_writes_for.contains(&role.name) {
                return Err(ClientError::Http {
                    status: 500,
                    body: "injected failure".to_string(),
                });
            }
            role.description = Some(patch.description.clone());
            role.personality = serde_json::to_value(&patch.personality).ok();
            Ok(role.clone())
        }

        fn delete(&self, role_id: i64) -> crate::client::Result<()> {
            self.roles.borrow_mut().retain(|r| r.role_id != role_id);
            Ok(())
        }

        fn open_session(&self, role_id: i64) -> crate::client::Result<String> {
            Ok(format!("/chat?session={role_id}"))
        }
    }

    fn desired(name: &str, description: Option<&str>) -> DesiredRole {
        DesiredRole {
            name: name.to_string(),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn creates_missing_roles() {
        let store = FakeStore::default();
        let mut reconciler = Reconciler::from_store(&store).unwrap();

        let report = reconciler.reconcile(&[desired("A", Some("x"))]);

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].name, "A");
        assert!(report.updated.is_empty());
        assert!(!report.has_errors());

        let stored = store.get("A").unwrap();
        assert_eq!(stored.description.as_deref(), Some("x"));
        assert_eq!(
            stored.personality,
            serde_json::to_value(persona::generate("A")).ok()
        );
        // Later lookups in the same run see the assigned id.
        assert_eq!(reconciler.index().get("A").unwrap().role_id, stored.role_id);
    }

    #[test]
    fn second_run_is_all_unchanged() {
        let store = FakeStore::default();
        let desired_set = [desired("A", Some("x")), desired("B", None)];

        let mut first = Reconciler::from_store(&store).unwrap();
        let report = first.reconcile(&desired_set);
        assert_eq!(report.created.len(), 2);

        // Fresh index, same remote state: nothing to do.
        let mut second = Reconciler::from_store(&store).unwrap();
        let report = second.reconcile(&desired_set);
        assert!(report.created.is_empty());
        assert!(report.updated.is_empty());
        assert_eq!(report.unchanged, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn updates_drifted_descriptions() {
        let store = FakeStore::default();
        Reconciler::from_store(&store)
            .unwrap()
            .reconcile(&[desired("A", Some("old"))]);

        let mut reconciler = Reconciler::from_store(&store).unwrap();
        let report = reconciler.reconcile(&[desired("A", Some("new"))]);

        assert_eq!(report.updated.len(), 1);
        assert_eq!(store.get("A").unwrap().description.as_deref(), Some("new"));
    }

    #[test]
    fn roles_absent_from_desired_are_left_alone() {
        let store = FakeStore::default();
        Reconciler::from_store(&store)
            .unwrap()
            .reconcile(&[desired("B", Some("keep"))]);
        let before = store.get("B").unwrap();

        let mut reconciler = Reconciler::from_store(&store).unwrap();
        let report = reconciler.reconcile(&[desired("A", None)]);

        assert_eq!(report.created.len(), 1);
        let after = store.get("B").unwrap();
        assert_eq!(after.role_id, before.role_id);
        assert_eq!(after.description, before.description);
        assert_eq!(after.personality, before.personality);
    }

    #[test]
    fn one_failing_record_does_not_abort_the_batch() {
        let store = FakeStore::failing_for(&["X"]);
        let mut reconciler = Reconciler::from_store(&store).unwrap();

        let report = reconciler.reconcile(&[desired("X", None), desired("Y", None)]);

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].name, "X");
        assert!(report.errors[0].error.contains("500"));
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].name, "Y");
    }

    #[test]
    fn duplicate_remote_names_abort_before_any_write() {
        let duplicate = vec![
            RemoteRole {
                role_id: 1,
                name: "A".to_string(),
                description: None,
                personality: None,
            },
            RemoteRole {
                role_id: 2,
                name: "A".to_string(),
                description: None,
                personality: None,
            },
        ];
        let store = FakeStore::with_roles(duplicate);
        let err = Reconciler::from_store(&store).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn ensure_returns_existing_without_a_write() {
        let store = FakeStore::default();
        let mut reconciler = Reconciler::from_store(&store).unwrap();
        let first = reconciler.ensure("A", None).unwrap();
        let second = reconciler.ensure("A", Some("ignored")).unwrap();
        assert_eq!(first.role_id, second.role_id);
        assert_eq!(*store.creates.borrow(), 1);
    }

    #[test]
    fn open_creates_missing_roles_first() {
        let store = FakeStore::default();
        let mut reconciler = Reconciler::from_store(&store).unwrap();

        let (role, path) = reconciler.open("A").unwrap();

        assert_eq!(path, format!("/chat?session={}", role.role_id));
        let stored = store.get("A").unwrap();
        assert_eq!(stored.description.as_deref(), Some(OPEN_HINT));
    }
}
