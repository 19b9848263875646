// ============================================================================
// Sitenav Core - Menu Service
// File: crates/sitenav-core/src/services/menu_service.rs
// ============================================================================
//! Menu tree orchestration: gesture resolution, optimistic local updates,
//! concurrent persistence fan-out, and refetch-based recovery.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::{join_all, BoxFuture};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use validator::Validate;

use sitenav_shared::EntityId;

use crate::domain::{MenuCreate, MenuDetails, MenuNode, MenuReplace};
use crate::error::DomainError;
use crate::gateway::MenuGateway;
use crate::services::event_bus::{EventBus, MenuEvent};
use crate::tree::{self, DropGesture, TreeNode};

/// Result of a resolved drop gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was applied and persisted; `updated` nodes were rewritten.
    Moved { updated: usize },
    /// Source and destination were identical; nothing was touched.
    Noop,
    /// A newer batch was issued while this one was in flight; its result
    /// was discarded wholesale.
    Superseded,
}

struct LocalState {
    nodes: Vec<MenuNode>,
    selection: Option<EntityId>,
    last_synced_at: Option<DateTime<Utc>>,
}

/// Menu service for one site's navigation tree.
///
/// All gesture resolution happens synchronously under the state lock; the
/// lock is never held across the persistence fan-out. Each batch captures a
/// monotonically increasing sequence number, and a batch that is no longer
/// the latest when its responses arrive is discarded.
pub struct MenuService<G: MenuGateway> {
    gateway: Arc<G>,
    events: Arc<EventBus>,
    site_id: EntityId,
    state: RwLock<LocalState>,
    batch_seq: AtomicU64,
}

impl<G: MenuGateway> MenuService<G> {
    pub fn new(gateway: Arc<G>, events: Arc<EventBus>, site_id: EntityId) -> Self {
        Self {
            gateway,
            events,
            site_id,
            state: RwLock::new(LocalState {
                nodes: Vec::new(),
                selection: None,
                last_synced_at: None,
            }),
            batch_seq: AtomicU64::new(0),
        }
    }

    pub fn site_id(&self) -> EntityId {
        self.site_id
    }

    /// Replaces local state wholesale with server truth.
    pub async fn refresh(&self) -> Result<usize, DomainError> {
        let nodes = self.gateway.fetch_menus(self.site_id).await?;
        let count = nodes.len();

        {
            let mut state = self.state.write().await;
            if let Some(selected) = state.selection {
                if !nodes.iter().any(|n| n.id == selected) {
                    state.selection = None;
                }
            }
            state.nodes = nodes;
            state.last_synced_at = Some(Utc::now());
        }

        self.events.publish(MenuEvent::TreeRefreshed {
            site_id: self.site_id,
            count,
        });
        Ok(count)
    }

    /// Snapshot of the flat node list.
    pub async fn nodes(&self) -> Vec<MenuNode> {
        self.state.read().await.nodes.clone()
    }

    /// Derived tree, all nodes.
    pub async fn tree(&self) -> Vec<TreeNode> {
        tree::build(&self.state.read().await.nodes)
    }

    /// Derived tree restricted to enabled nodes.
    pub async fn enabled_tree(&self) -> Vec<TreeNode> {
        tree::build_enabled(&self.state.read().await.nodes)
    }

    pub async fn selection(&self) -> Option<EntityId> {
        self.state.read().await.selection
    }

    pub async fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_synced_at
    }

    pub async fn select(&self, menu_id: Option<EntityId>) -> Result<(), DomainError> {
        {
            let mut state = self.state.write().await;
            if let Some(id) = menu_id {
                if !state.nodes.iter().any(|n| n.id == id) {
                    return Err(DomainError::MenuNotFound(id));
                }
            }
            state.selection = menu_id;
        }
        self.events.publish(MenuEvent::SelectionChanged { menu_id });
        Ok(())
    }

    /// Creates a root entry at the next available top-level order.
    pub async fn create_root(
        &self,
        name: String,
        url: Option<String>,
        icon: Option<String>,
    ) -> Result<MenuNode, DomainError> {
        self.create_at(None, name, url, icon).await
    }

    /// Creates a child entry at the next available order under `parent_id`.
    pub async fn create_child(
        &self,
        parent_id: EntityId,
        name: String,
        url: Option<String>,
        icon: Option<String>,
    ) -> Result<MenuNode, DomainError> {
        self.create_at(Some(parent_id), name, url, icon).await
    }

    async fn create_at(
        &self,
        parent_id: Option<EntityId>,
        name: String,
        url: Option<String>,
        icon: Option<String>,
    ) -> Result<MenuNode, DomainError> {
        let display_order = {
            let state = self.state.read().await;
            if let Some(parent_id) = parent_id {
                if !state.nodes.iter().any(|n| n.id == parent_id) {
                    return Err(DomainError::ParentNotFound(parent_id));
                }
            }
            tree::next_order(&state.nodes, parent_id)
        };

        let create = MenuCreate::new(self.site_id, name, url, icon, display_order, parent_id)
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;

        let created = self.gateway.create_menu(create).await?;
        info!("Created menu {} at order {}", created.id, display_order);

        self.refresh().await?;
        Ok(created)
    }

    /// Inline edit of display attributes; order and parent are resent
    /// unchanged because the backend replaces the full record.
    pub async fn update_details(&self, id: EntityId, details: MenuDetails) -> Result<(), DomainError> {
        let details = MenuDetails {
            name: details.name.trim().to_string(),
            url: details.url.map(|u| u.trim().to_string()),
            icon: details.icon.map(|i| i.trim().to_string()),
            enabled: details.enabled,
        };
        details
            .validate()
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;

        let payload = {
            let state = self.state.read().await;
            let node = state
                .nodes
                .iter()
                .find(|n| n.id == id)
                .ok_or(DomainError::MenuNotFound(id))?;
            MenuReplace {
                name: details.name,
                url: details.url,
                icon: details.icon,
                display_order: node.display_order,
                parent_id: node.parent_id,
                enabled: details.enabled,
            }
        };

        self.gateway.replace_menu(id, payload).await?;
        self.refresh().await?;
        Ok(())
    }

    /// Resolves a drop gesture and drives it through the full pipeline:
    /// resolve, cycle guard, renumber, optimistic apply, concurrent
    /// persistence, reconcile.
    pub async fn move_menu(&self, gesture: DropGesture) -> Result<MoveOutcome, DomainError> {
        let (command, payloads, seq) = {
            let mut state = self.state.write().await;

            // 1. Normalize the gesture; identical slot means nothing to do.
            let resolved = match tree::resolve(&state.nodes, &gesture)? {
                Some(resolved) => resolved,
                None => return Ok(MoveOutcome::Noop),
            };

            // 2. Reject cycle-closing moves before any mutation.
            tree::check_move(&state.nodes, &resolved.command)?;

            // 3. Splice and renumber, optimistically.
            let changed = tree::apply_move(&mut state.nodes, &resolved.command)?;
            info!(
                "Resolved {:?} for menu {}: {} nodes to rewrite",
                resolved.kind,
                resolved.command.menu_id,
                changed.len()
            );

            let payloads = replace_payloads(&state.nodes, &changed);
            let seq = self.batch_seq.fetch_add(1, Ordering::SeqCst) + 1;
            (resolved.command, payloads, seq)
        };

        // 4. Fan out one full-replace per changed node, all at once.
        let results = join_all(
            payloads
                .iter()
                .map(|(id, payload)| self.gateway.replace_menu(*id, payload.clone())),
        )
        .await;

        // 5. A newer batch owns the tree now; drop this one's outcome.
        if self.batch_seq.load(Ordering::SeqCst) != seq {
            debug!("Discarding stale persistence batch {}", seq);
            return Ok(MoveOutcome::Superseded);
        }

        self.reconcile(command.menu_id, results.len(), &results).await?;

        self.events.publish(MenuEvent::ReorderApplied {
            menu_id: command.menu_id,
            updated: payloads.len(),
        });
        Ok(MoveOutcome::Moved {
            updated: payloads.len(),
        })
    }

    /// Deletes a menu, promoting its children to the deleted node's former
    /// parent. The delete and every sibling rewrite go out in one batch.
    pub async fn delete_menu(&self, id: EntityId) -> Result<Option<EntityId>, DomainError> {
        let (payloads, next_selected, promoted, seq) = {
            let mut state = self.state.write().await;
            let target = state
                .nodes
                .iter()
                .find(|n| n.id == id)
                .cloned()
                .ok_or(DomainError::MenuNotFound(id))?;

            let next_selected = tree::next_selection(&state.nodes, &target);
            let promoted = state.nodes.iter().filter(|n| n.parent_id == Some(id)).count();

            let (_, changed) = tree::apply_delete_promote(&mut state.nodes, id)?;
            let payloads = replace_payloads(&state.nodes, &changed);
            state.selection = next_selected;
            let seq = self.batch_seq.fetch_add(1, Ordering::SeqCst) + 1;
            (payloads, next_selected, promoted, seq)
        };

        self.events.publish(MenuEvent::SelectionChanged {
            menu_id: next_selected,
        });

        let mut batch: Vec<BoxFuture<'_, Result<(), DomainError>>> =
            Vec::with_capacity(payloads.len() + 1);
        batch.push(Box::pin(async move { self.gateway.delete_menu(id).await }));
        for (node_id, payload) in &payloads {
            let node_id = *node_id;
            let payload = payload.clone();
            batch.push(Box::pin(async move {
                self.gateway.replace_menu(node_id, payload).await.map(|_| ())
            }));
        }
        let results = join_all(batch).await;

        if self.batch_seq.load(Ordering::SeqCst) != seq {
            debug!("Discarding stale persistence batch {}", seq);
            return Ok(next_selected);
        }

        self.reconcile(id, results.len(), &results).await?;

        self.events.publish(MenuEvent::MenuDeleted {
            menu_id: id,
            promoted,
        });
        Ok(next_selected)
    }

    /// Collapses per-node outcomes into one aggregate result. On any
    /// failure the whole batch counts as failed and local state is replaced
    /// by one authoritative refetch; there is no selective retry.
    async fn reconcile<T>(
        &self,
        menu_id: EntityId,
        total: usize,
        results: &[Result<T, DomainError>],
    ) -> Result<(), DomainError> {
        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed == 0 {
            // Success still refetches: a concurrent external change must not
            // survive in the optimistic copy.
            self.refresh().await?;
            return Ok(());
        }

        if results
            .iter()
            .any(|r| matches!(r, Err(DomainError::SessionExpired)))
        {
            warn!("Session expired mid-batch; discarding in-flight reorder state");
            self.events.publish(MenuEvent::SessionExpired);
            return Err(DomainError::SessionExpired);
        }

        warn!("{} of {} updates failed; refetching server truth", failed, total);
        self.events.publish(MenuEvent::ReorderFailed {
            menu_id,
            error: format!("{} of {} updates failed", failed, total),
        });
        self.refresh().await?;
        Err(DomainError::PersistenceFailed { failed, total })
    }
}

fn replace_payloads(nodes: &[MenuNode], changed: &[EntityId]) -> Vec<(EntityId, MenuReplace)> {
    changed
        .iter()
        .filter_map(|id| nodes.iter().find(|n| n.id == *id))
        .map(|node| (node.id, node.replace_payload()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::menu_gateway::MockMenuGateway;
    use crate::tree::test_fixtures::{node, ordered_ids, site};
    use crate::tree::DropTarget;
    use async_trait::async_trait;
    use sitenav_shared::new_id;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// In-memory server double. Replace calls can be failure-injected per
    /// node id or parked behind a gate to simulate slow responses.
    struct StubGateway {
        server: Mutex<Vec<MenuNode>>,
        fetch_calls: AtomicUsize,
        replace_calls: Mutex<Vec<(EntityId, MenuReplace)>>,
        delete_calls: Mutex<Vec<EntityId>>,
        reject_ids: Mutex<HashSet<EntityId>>,
        expire_ids: Mutex<HashSet<EntityId>>,
        gate_engaged: AtomicBool,
        gate: Semaphore,
    }

    impl StubGateway {
        fn new(server: Vec<MenuNode>) -> Arc<Self> {
            Arc::new(Self {
                server: Mutex::new(server),
                fetch_calls: AtomicUsize::new(0),
                replace_calls: Mutex::new(Vec::new()),
                delete_calls: Mutex::new(Vec::new()),
                reject_ids: Mutex::new(HashSet::new()),
                expire_ids: Mutex::new(HashSet::new()),
                gate_engaged: AtomicBool::new(false),
                gate: Semaphore::new(0),
            })
        }

        fn reject_replace_of(&self, id: EntityId) {
            self.reject_ids.lock().unwrap().insert(id);
        }

        fn expire_session_on(&self, id: EntityId) {
            self.expire_ids.lock().unwrap().insert(id);
        }

        fn hold_replaces(&self) {
            self.gate_engaged.store(true, Ordering::SeqCst);
        }

        fn stop_holding_replaces(&self) {
            self.gate_engaged.store(false, Ordering::SeqCst);
        }

        fn release_held(&self, count: usize) {
            self.gate.add_permits(count);
        }

        fn fetches(&self) -> usize {
            self.fetch_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MenuGateway for StubGateway {
        async fn fetch_menus(&self, _site_id: EntityId) -> Result<Vec<MenuNode>, DomainError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.server.lock().unwrap().clone())
        }

        async fn create_menu(&self, create: MenuCreate) -> Result<MenuNode, DomainError> {
            let created = MenuNode {
                id: new_id(),
                site_id: create.site_id,
                name: create.name,
                url: create.url,
                icon: create.icon,
                parent_id: create.parent_id,
                display_order: create.display_order,
                enabled: true,
            };
            self.server.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn replace_menu(&self, id: EntityId, replace: MenuReplace) -> Result<MenuNode, DomainError> {
            if self.gate_engaged.load(Ordering::SeqCst) {
                let permit = self.gate.acquire().await.expect("gate closed");
                permit.forget();
            }
            if self.expire_ids.lock().unwrap().contains(&id) {
                return Err(DomainError::SessionExpired);
            }
            if self.reject_ids.lock().unwrap().contains(&id) {
                return Err(DomainError::ValidationRejected("stale data".to_string()));
            }

            let mut server = self.server.lock().unwrap();
            let node = server
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or(DomainError::MenuNotFound(id))?;
            node.name = replace.name.clone();
            node.url = replace.url.clone();
            node.icon = replace.icon.clone();
            node.display_order = replace.display_order;
            node.parent_id = replace.parent_id;
            node.enabled = replace.enabled;
            let updated = node.clone();
            drop(server);

            self.replace_calls.lock().unwrap().push((id, replace));
            Ok(updated)
        }

        async fn delete_menu(&self, id: EntityId) -> Result<(), DomainError> {
            self.delete_calls.lock().unwrap().push(id);
            self.server.lock().unwrap().retain(|n| n.id != id);
            Ok(())
        }
    }

    fn service(stub: Arc<StubGateway>, site_id: EntityId) -> Arc<MenuService<StubGateway>> {
        Arc::new(MenuService::new(stub, Arc::new(EventBus::default()), site_id))
    }

    #[tokio::test]
    async fn test_root_reorder_persists_every_shifted_sibling() {
        let site_id = site();
        let a = node(site_id, "A", None, 0);
        let b = node(site_id, "B", None, 1);
        let c = node(site_id, "C", None, 2);
        let stub = StubGateway::new(vec![a.clone(), b.clone(), c.clone()]);
        let svc = service(stub.clone(), site_id);
        svc.refresh().await.unwrap();

        let outcome = svc
            .move_menu(DropGesture {
                menu_id: c.id,
                target: DropTarget::Root { index: 0 },
            })
            .await
            .unwrap();

        assert_eq!(outcome, MoveOutcome::Moved { updated: 3 });
        assert_eq!(stub.replace_calls.lock().unwrap().len(), 3);
        // Initial load plus the post-batch consistency refetch.
        assert_eq!(stub.fetches(), 2);

        let nodes = svc.nodes().await;
        assert_eq!(ordered_ids(&nodes, None), vec![c.id, a.id, b.id]);

        // Full-replace semantics: the payload resends display attributes.
        let calls = stub.replace_calls.lock().unwrap();
        let (_, payload) = calls.iter().find(|(id, _)| *id == c.id).unwrap();
        assert_eq!(payload.name, "C");
        assert_eq!(payload.display_order, 0);
    }

    #[tokio::test]
    async fn test_noop_drop_issues_zero_remote_calls() {
        let site_id = site();
        let a = node(site_id, "A", None, 0);
        let b = node(site_id, "B", None, 1);
        let initial = vec![a.clone(), b.clone()];

        let mut mock = MockMenuGateway::new();
        mock.expect_fetch_menus()
            .times(1)
            .returning(move |_| Ok(initial.clone()));
        // No replace/delete expectations: any persistence call panics.

        let svc = MenuService::new(Arc::new(mock), Arc::new(EventBus::default()), site_id);
        svc.refresh().await.unwrap();

        let outcome = svc
            .move_menu(DropGesture {
                menu_id: b.id,
                target: DropTarget::Root { index: 1 },
            })
            .await
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Noop);
    }

    #[tokio::test]
    async fn test_cycle_rejection_leaves_everything_untouched() {
        let site_id = site();
        let a = node(site_id, "A", None, 0);
        let a1 = node(site_id, "A1", Some(a.id), 0);
        let initial = vec![a.clone(), a1.clone()];

        let mut mock = MockMenuGateway::new();
        let fetched = initial.clone();
        mock.expect_fetch_menus()
            .times(1)
            .returning(move |_| Ok(fetched.clone()));

        let svc = MenuService::new(Arc::new(mock), Arc::new(EventBus::default()), site_id);
        svc.refresh().await.unwrap();

        let err = svc
            .move_menu(DropGesture {
                menu_id: a.id,
                target: DropTarget::Under {
                    parent_id: a1.id,
                    index: 0,
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::CycleDetected { .. }));
        assert_eq!(svc.nodes().await, initial);
    }

    #[tokio::test]
    async fn test_partial_failure_reports_aggregate_and_refetches_once() {
        // Reparent touching both sibling sets: three rewrites in one batch.
        let site_id = site();
        let a = node(site_id, "A", None, 0);
        let b = node(site_id, "B", None, 1);
        let b1 = node(site_id, "B1", Some(b.id), 0);
        let stub = StubGateway::new(vec![a.clone(), b.clone(), b1.clone()]);
        let events = Arc::new(EventBus::default());
        let svc = Arc::new(MenuService::new(stub.clone(), events.clone(), site_id));
        svc.refresh().await.unwrap();
        let mut rx = events.subscribe();
        let fetches_before = stub.fetches();

        stub.reject_replace_of(b1.id);
        let err = svc
            .move_menu(DropGesture {
                menu_id: a.id,
                target: DropTarget::Under {
                    parent_id: b.id,
                    index: 0,
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::PersistenceFailed { failed: 1, total: 3 }));
        assert_eq!(stub.fetches(), fetches_before + 1);

        let mut saw_failure = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, MenuEvent::ReorderFailed { .. }) {
                saw_failure = true;
            }
        }
        assert!(saw_failure);
    }

    #[tokio::test]
    async fn test_session_expiry_aborts_batch_without_refetch() {
        let site_id = site();
        let a = node(site_id, "A", None, 0);
        let b = node(site_id, "B", None, 1);
        let stub = StubGateway::new(vec![a.clone(), b.clone()]);
        let svc = service(stub.clone(), site_id);
        svc.refresh().await.unwrap();
        let fetches_before = stub.fetches();

        stub.expire_session_on(a.id);
        let err = svc
            .move_menu(DropGesture {
                menu_id: b.id,
                target: DropTarget::Root { index: 0 },
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::SessionExpired));
        assert_eq!(stub.fetches(), fetches_before);
    }

    #[tokio::test]
    async fn test_stale_batch_is_discarded() {
        let site_id = site();
        let a = node(site_id, "A", None, 0);
        let b = node(site_id, "B", None, 1);
        let c = node(site_id, "C", None, 2);
        let stub = StubGateway::new(vec![a.clone(), b.clone(), c.clone()]);
        let svc = service(stub.clone(), site_id);
        svc.refresh().await.unwrap();
        let fetches_before = stub.fetches();

        // First gesture: responses parked behind the gate.
        stub.hold_replaces();
        let first_svc = svc.clone();
        let first_menu = c.id;
        let first = tokio::spawn(async move {
            first_svc
                .move_menu(DropGesture {
                    menu_id: first_menu,
                    target: DropTarget::Root { index: 0 },
                })
                .await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Second gesture lands while the first batch is in flight.
        stub.stop_holding_replaces();
        let second = svc
            .move_menu(DropGesture {
                menu_id: b.id,
                target: DropTarget::Root { index: 0 },
            })
            .await
            .unwrap();
        assert!(matches!(second, MoveOutcome::Moved { .. }));
        let fetches_after_second = stub.fetches();

        // The earlier batch resolves last; its result must not win.
        stub.release_held(3);
        let first = first.await.unwrap().unwrap();
        assert_eq!(first, MoveOutcome::Superseded);
        assert_eq!(stub.fetches(), fetches_after_second);
        assert_eq!(fetches_after_second, fetches_before + 1);
    }

    #[tokio::test]
    async fn test_delete_promotes_children_and_advises_selection() {
        let site_id = site();
        let a = node(site_id, "A", None, 0);
        let b = node(site_id, "B", None, 1);
        let b1 = node(site_id, "B1", Some(b.id), 0);
        let b2 = node(site_id, "B2", Some(b.id), 1);
        let stub = StubGateway::new(vec![a.clone(), b.clone(), b1.clone(), b2.clone()]);
        let svc = service(stub.clone(), site_id);
        svc.refresh().await.unwrap();

        let selected = svc.delete_menu(b.id).await.unwrap();

        // Nearest preceding sibling becomes the selection.
        assert_eq!(selected, Some(a.id));
        assert_eq!(svc.selection().await, Some(a.id));
        assert_eq!(*stub.delete_calls.lock().unwrap(), vec![b.id]);
        // Both children were rewritten onto the root set.
        assert_eq!(stub.replace_calls.lock().unwrap().len(), 2);

        let nodes = svc.nodes().await;
        assert_eq!(ordered_ids(&nodes, None), vec![a.id, b1.id, b2.id]);
        assert!(crate::tree::invariants::violations(&nodes).is_empty());
    }

    #[tokio::test]
    async fn test_create_child_takes_next_available_order() {
        let site_id = site();
        let a = node(site_id, "A", None, 0);
        let stub = StubGateway::new(vec![a.clone()]);
        let svc = service(stub.clone(), site_id);
        svc.refresh().await.unwrap();

        let first = svc
            .create_child(a.id, "First".to_string(), Some("/first".to_string()), None)
            .await
            .unwrap();
        let second = svc
            .create_child(a.id, "Second".to_string(), None, None)
            .await
            .unwrap();

        assert_eq!(first.display_order, 0);
        assert_eq!(second.display_order, 1);
        assert_eq!(first.parent_id, Some(a.id));

        let err = svc
            .create_child(a.id, "   ".to_string(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }
}
