//! Parent-pointer hierarchies (departments and roles).
//!
//! Both hierarchies are stored as a single `parent_id` per node. Before a
//! parent is assigned we walk upward from the proposed parent and reject the
//! change if the walk reaches the node itself.

use std::collections::HashSet;
use std::future::Future;

use uuid::Uuid;

use crate::errors::AppResult;

/// Decide whether giving `node_id` the parent `proposed_parent` creates a cycle.
///
/// `parent_of` looks up a node and yields `Some(parent_id)` when the node
/// exists or `None` when it does not. A missing node ends the walk. A node
/// seen twice means the stored hierarchy already loops; that is reported as
/// a cycle and logged.
pub async fn creates_cycle<F, Fut>(
    node_id: Option<Uuid>,
    proposed_parent: Uuid,
    mut parent_of: F,
) -> AppResult<bool>
where
    F: FnMut(Uuid) -> Fut,
    Fut: Future<Output = AppResult<Option<Option<Uuid>>>>,
{
    // A node that does not exist yet cannot be anybody's ancestor
    let Some(node_id) = node_id else {
        return Ok(false);
    };

    if node_id == proposed_parent {
        return Ok(true);
    }

    let mut visited = HashSet::new();
    let mut current = Some(proposed_parent);

    while let Some(id) = current {
        if id == node_id {
            return Ok(true);
        }
        if !visited.insert(id) {
            tracing::warn!(node = %id, "Existing hierarchy already contains a cycle");
            return Ok(true);
        }
        current = parent_of(id).await?.flatten();
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(
        edges: HashMap<Uuid, Option<Uuid>>,
    ) -> impl FnMut(Uuid) -> std::future::Ready<AppResult<Option<Option<Uuid>>>> {
        move |id| std::future::ready(Ok(edges.get(&id).copied()))
    }

    #[tokio::test]
    async fn test_new_node_never_cycles() {
        let parent = Uuid::new_v4();
        let result = creates_cycle(None, parent, lookup(HashMap::new())).await;
        assert!(!result.unwrap());
    }

    #[tokio::test]
    async fn test_self_parent_is_cycle() {
        let id = Uuid::new_v4();
        assert!(creates_cycle(Some(id), id, lookup(HashMap::new()))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_descendant_as_parent_is_cycle() {
        // root -> child -> grandchild; make root's parent the grandchild
        let root = Uuid::new_v4();
        let child = Uuid::new_v4();
        let grandchild = Uuid::new_v4();
        let edges = HashMap::from([
            (root, None),
            (child, Some(root)),
            (grandchild, Some(child)),
        ]);

        assert!(creates_cycle(Some(root), grandchild, lookup(edges))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_unrelated_parent_is_fine() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let edges = HashMap::from([(a, None), (b, Some(a)), (c, None)]);

        assert!(!creates_cycle(Some(c), b, lookup(edges)).await.unwrap());
    }

    #[tokio::test]
    async fn test_existing_loop_is_reported_as_cycle() {
        let x = Uuid::new_v4();
        let y = Uuid::new_v4();
        let node = Uuid::new_v4();
        let edges = HashMap::from([(x, Some(y)), (y, Some(x))]);

        assert!(creates_cycle(Some(node), x, lookup(edges)).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_ancestor_ends_walk() {
        let node = Uuid::new_v4();
        let parent = Uuid::new_v4();
        let ghost = Uuid::new_v4();
        let edges = HashMap::from([(parent, Some(ghost))]);

        assert!(!creates_cycle(Some(node), parent, lookup(edges))
            .await
            .unwrap());
    }
}
