//! Integration tests for the tier hierarchy data model

use strata::core::types::TierId;
use strata::generation::{ProceduralGenerator, TierSource};
use strata::tier::{TierAddress, TierLadder, TierLevel, TierSeed, TierTree};
use strata::SimError;

fn milky_way() -> (TierTree, TierId, TierId, TierId) {
    // Galaxy(1) -> Sector(2) -> System(3)
    //           -> Sector(4)
    let mut tree = TierTree::new(TierSeed::new("Milky Way", TierLevel::Galaxy)).unwrap();
    let root = tree.root_id();
    let orion = tree
        .insert_child(root, TierSeed::new("Orion Arm", TierLevel::Sector))
        .unwrap();
    let sol = tree
        .insert_child(orion, TierSeed::new("Sol", TierLevel::System))
        .unwrap();
    tree.insert_child(root, TierSeed::new("Perseus Arm", TierLevel::Sector))
        .unwrap();
    (tree, root, orion, sol)
}

#[test]
fn test_addresses_extend_parent_by_one_coordinate() {
    let (tree, root, orion, sol) = milky_way();

    assert_eq!(tree.get(root).unwrap().address, TierAddress::root());
    let orion_addr = &tree.get(orion).unwrap().address;
    let sol_addr = &tree.get(sol).unwrap().address;

    assert!(orion_addr.is_child_of(&TierAddress::root()));
    assert!(sol_addr.is_child_of(orion_addr));
    assert!(sol_addr.is_descendant_of(&TierAddress::root()));
    assert_eq!(sol_addr.depth(), orion_addr.depth() + 1);
    assert_eq!(tree.find_by_address(sol_addr), Some(sol));
    tree.validate().unwrap();
}

#[test]
fn test_sibling_addresses_are_unique() {
    let (tree, root, _, _) = milky_way();
    let addresses: Vec<_> = tree
        .children_of(root)
        .iter()
        .map(|c| tree.get(*c).unwrap().address.clone())
        .collect();
    assert_eq!(addresses.len(), 2);
    assert_ne!(addresses[0], addresses[1]);
}

#[test]
fn test_parent_index_and_ancestors() {
    let (tree, root, orion, sol) = milky_way();
    assert_eq!(tree.parent_of(sol), Some(orion));
    assert_eq!(tree.parent_of(root), None);
    assert_eq!(tree.ancestors(sol), vec![orion, root]);
}

#[test]
fn test_children_must_be_finer_and_same_ladder() {
    let (mut tree, _, orion, sol) = milky_way();

    let coarser = tree.insert_child(sol, TierSeed::new("Wrong", TierLevel::Sector));
    assert!(matches!(coarser, Err(SimError::InvalidHierarchy(_))));

    let same = tree.insert_child(orion, TierSeed::new("Peer", TierLevel::Sector));
    assert!(matches!(same, Err(SimError::InvalidHierarchy(_))));

    let foreign = tree.insert_child(sol, TierSeed::new("Chunk", TierLevel::Chunk));
    assert!(matches!(foreign, Err(SimError::InvalidHierarchy(_))));

    let unknown = tree.insert_child(TierId(999), TierSeed::new("Orphan", TierLevel::Planet));
    assert!(matches!(unknown, Err(SimError::TierNotFound(_))));
}

#[test]
fn test_invalid_seed_is_rejected() {
    let (mut tree, _, _, sol) = milky_way();
    let negative = TierSeed::new("Bad", TierLevel::Planet).with_population(-1.0, 10.0);
    assert!(matches!(tree.insert_child(sol, negative), Err(SimError::InvalidConfig(_))));

    let unstable = TierSeed::new("Bad", TierLevel::Planet).with_stability(1.5, 0.5, 0.5);
    assert!(matches!(tree.insert_child(sol, unstable), Err(SimError::InvalidConfig(_))));
}

#[test]
fn test_removing_a_tier_releases_its_subtree() {
    let (mut tree, root, orion, sol) = milky_way();
    let before = tree.len();

    let removed = tree.remove_subtree(orion).unwrap();
    let ids: Vec<TierId> = removed.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![orion, sol]);
    assert_eq!(tree.len(), before - 2);
    assert!(!tree.contains(sol));
    assert!(!tree.children_of(root).contains(&orion));
    tree.validate().unwrap();

    assert!(matches!(tree.remove_subtree(root), Err(SimError::InvalidHierarchy(_))));
}

#[test]
fn test_traversal_orders() {
    let (tree, root, orion, sol) = milky_way();
    let pre = tree.pre_order(root);
    let post = tree.post_order(root);

    assert_eq!(pre[0], root);
    assert_eq!(*post.last().unwrap(), root);
    let pos = |v: &[TierId], id: TierId| v.iter().position(|x| *x == id).unwrap();
    assert!(pos(&pre, orion) < pos(&pre, sol));
    assert!(pos(&post, sol) < pos(&post, orion));
    assert_eq!(tree.descendants(root).len(), tree.len() - 1);
}

#[test]
fn test_time_scales_strictly_increase_toward_coarse_levels() {
    for ladder in [TierLadder::Astronomical, TierLadder::Habitat] {
        for pair in ladder.levels().windows(2) {
            assert!(pair[1].time_scale() > pair[0].time_scale(), "{:?}", pair);
        }
    }
}

#[test]
fn test_every_tier_starts_abstract() {
    let tree = ProceduralGenerator::new(TierLadder::Habitat, 2, 5).build(4).unwrap();
    assert!(tree.iter().all(|t| t.is_abstract() && t.ticks_simulated == 0));
    assert_eq!(tree.root().level, TierLevel::Gigasegment);
}

#[test]
fn test_tree_serializes_for_snapshots() {
    let (tree, _, _, sol) = milky_way();
    let json = serde_json::to_string(&tree).unwrap();
    let restored: TierTree = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.len(), tree.len());
    assert_eq!(restored.get(sol), tree.get(sol));
    restored.validate().unwrap();
}
