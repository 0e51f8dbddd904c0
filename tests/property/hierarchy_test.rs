//! Property-based tests for collection bulk insert.
//!
//! For arbitrary acyclic batches in arbitrary order, every inserted
//! collection must end up with an ancestor chain that terminates at the
//! synthetic root. Cyclic batches must be rejected wholesale.

use std::collections::HashMap;

use proptest::prelude::*;

use linkvault::database::Database;
use linkvault::repos::CollectionRepo;
use linkvault::types::collection::{Collection, ROOT_COLLECTION_ID};
use linkvault::types::errors::StoreError;

fn collection(id: usize, parent: &str) -> Collection {
    Collection {
        id: format!("c{id}"),
        name: format!("Collection {id}"),
        parent_id: parent.to_string(),
        is_favorite: false,
        updated_at: None,
        owner_id: "u1".to_string(),
    }
}

/// Strategy: a forest of up to 20 collections where collection `i` has its
/// parent drawn from the root or any earlier collection, so the batch is
/// acyclic by construction. The batch is then shuffled.
fn arb_acyclic_batch() -> impl Strategy<Value = Vec<Collection>> {
    (1usize..20)
        .prop_flat_map(|n| {
            let parents: Vec<BoxedStrategy<usize>> =
                (0..n).map(|i| (0..=i).boxed()).collect();
            parents
        })
        .prop_map(|parent_choice| {
            parent_choice
                .iter()
                .enumerate()
                .map(|(i, &p)| {
                    let parent = if p == i {
                        ROOT_COLLECTION_ID.to_string()
                    } else {
                        format!("c{p}")
                    };
                    collection(i, &parent)
                })
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn acyclic_batches_always_insert_with_chains_to_root(batch in arb_acyclic_batch()) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let repo = CollectionRepo::new(db.connection());

        repo.bulk_insert(&batch).expect("acyclic batch must insert");

        let all = repo.get_all().unwrap();
        prop_assert_eq!(all.len(), batch.len() + 1, "every member plus the root");

        let by_id: HashMap<String, String> = all
            .iter()
            .map(|c| (c.id.clone(), c.parent_id.clone()))
            .collect();
        for inserted in &batch {
            // Walk upward; the chain must hit the root within the number of
            // rows, or something cyclic slipped through.
            let mut current = inserted.id.clone();
            let mut steps = 0;
            while current != ROOT_COLLECTION_ID {
                current = by_id
                    .get(&current)
                    .cloned()
                    .expect("parent must exist in the store");
                steps += 1;
                prop_assert!(steps <= all.len(), "ancestor chain did not terminate");
            }
        }
    }

    #[test]
    fn cyclic_batches_are_rejected_and_leave_store_empty(
        cycle_len in 2usize..6,
        extra in 0usize..5,
    ) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let repo = CollectionRepo::new(db.connection());

        // c0 → c1 → ... → c(n-1) → c0, plus some innocent members.
        let mut batch: Vec<Collection> = (0..cycle_len)
            .map(|i| collection(i, &format!("c{}", (i + 1) % cycle_len)))
            .collect();
        for i in 0..extra {
            batch.push(collection(100 + i, ROOT_COLLECTION_ID));
        }

        let err = repo.bulk_insert(&batch).unwrap_err();
        prop_assert!(matches!(err, StoreError::CircularHierarchy(_)));
        prop_assert!(
            repo.get_all().unwrap().is_empty(),
            "a rejected batch must insert nothing, not even the root"
        );
    }
}
