use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

/// Checks ordering, balance, height cache and count. Returns the tree height.
fn validate_tree<K: Ord + fmt::Debug, V>(t: &AvlTree<K, V>) -> u32 {
    fn walk<'a, K: Ord + fmt::Debug, V>(
        link: &'a Link<K, V>,
        keys: &mut Vec<&'a K>,
        nodes: &mut usize,
    ) -> u32 {
        let Some(node) = link.as_deref() else {
            return 0;
        };
        *nodes += 1;

        let left = walk(&node.left, keys, nodes);
        keys.push(&node.key);
        let right = walk(&node.right, keys, nodes);

        assert_eq!(
            node.height,
            1 + left.max(right),
            "stored height of {:?} must match children",
            node.key
        );
        assert!(
            left.abs_diff(right) <= 1,
            "node {:?} out of balance: left={left} right={right}",
            node.key
        );
        node.height
    }

    let mut keys = Vec::new();
    let mut nodes = 0usize;
    let h = walk(&t.root, &mut keys, &mut nodes);

    // In-order keys are non-decreasing iff every subtree respects the order.
    for pair in keys.windows(2) {
        assert!(pair[0] <= pair[1], "keys out of order: {:?}", pair);
    }
    assert_eq!(nodes, t.len(), "reachable node count must match AvlTree::len");
    h
}

/// Removes one occurrence of `value` from the values stored under a key.
fn take_one(m: &mut BTreeMap<u8, Vec<u32>>, key: u8, value: u32) {
    let values = m.get_mut(&key).expect("model has the key");
    let pos = values
        .iter()
        .position(|v| *v == value)
        .expect("removed value was stored under the key");
    values.swap_remove(pos);
    if values.is_empty() {
        m.remove(&key);
    }
}

fn sorted_pairs<'a>(iter: impl Iterator<Item = (&'a u8, &'a u32)>) -> Vec<(u8, u32)> {
    let mut pairs: Vec<(u8, u32)> = iter.map(|(k, v)| (*k, *v)).collect();
    pairs.sort_unstable();
    pairs
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(#[proptest(strategy = "0u8..48")] u8, u32),
    #[proptest(weight = 3)]
    Delete(#[proptest(strategy = "0u8..48")] u8),
    #[proptest(weight = 2)]
    Find(#[proptest(strategy = "0u8..48")] u8),
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_multiset_equivalence(ops in prop::collection::vec(any::<Op>(), 0..=1000)) {
        let mut t: AvlTree<u8, u32> = AvlTree::new();
        // Duplicate keys are kept, so the model is a multimap.
        let mut m: BTreeMap<u8, Vec<u32>> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    t.insert(key, value);
                    m.entry(key).or_default().push(value);
                }
                Op::Delete(key) => {
                    match t.delete(&key) {
                        Some(value) => take_one(&mut m, key, value),
                        None => prop_assert!(!m.contains_key(&key)),
                    }
                }
                Op::Find(key) => {
                    match t.find(&key) {
                        Some(value) => prop_assert!(m[&key].contains(value)),
                        None => prop_assert!(!m.contains_key(&key)),
                    }
                }
            }

            validate_tree(&t);
            prop_assert_eq!(t.len(), m.values().map(Vec::len).sum::<usize>());
        }

        let expected = sorted_pairs(m.iter().flat_map(|(k, vs)| vs.iter().map(move |v| (k, v))));
        prop_assert_eq!(sorted_pairs(t.iter()), expected);
    }

    #[test]
    fn prop_recommend_collects_exactly_the_subtree(
        keys in prop::collection::vec(0u8..64, 1..=200),
        probe in 0u8..64,
    ) {
        // Each node contributes its own key, so the result names the subtree.
        let mut t: AvlTree<u8, Vec<u8>> = AvlTree::new();
        for &k in &keys {
            t.insert(k, vec![k]);
        }

        let mut got: Vec<u8> = t.recommend(&probe).into_iter().copied().collect();
        got.sort_unstable();

        let mut expected = Vec::new();
        let mut cur = t.root.as_deref();
        while let Some(node) = cur {
            match probe.cmp(&node.key) {
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Greater => cur = node.right.as_deref(),
                Ordering::Equal => {
                    subtree_keys(node, &mut expected);
                    break;
                }
            }
        }
        expected.sort_unstable();
        prop_assert_eq!(got, expected);
    }
}

fn subtree_keys<K: Copy, V>(node: &Node<K, V>, out: &mut Vec<K>) {
    out.push(node.key);
    for child in [&node.left, &node.right].into_iter().flatten() {
        subtree_keys(child, out);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u32> = (1..=7).collect();

    for_each_permutation(&keys, |perm| {
        let mut t: AvlTree<u32, u32> = AvlTree::new();
        for (i, k) in perm.iter().enumerate() {
            t.insert(*k, i as u32);
            validate_tree(&t);
        }

        // 7 keys fit in a perfect tree of height 3; AVL allows at most 4.
        let h = validate_tree(&t);
        assert!(h == 3 || h == 4, "height {h} for {perm:?}");

        let got: Vec<u32> = t.iter().map(|(k, _)| *k).collect();
        assert_eq!(got, keys);
        for (i, k) in perm.iter().enumerate() {
            assert_eq!(t.find(k), Some(&(i as u32)));
        }
    });
}

#[test]
fn exhaustive_delete_order_small_set() {
    let keys: Vec<u32> = (1..=7).collect();

    // Insert in a fixed order, then delete in all permutations.
    let base: AvlTree<u32, u32> = keys.iter().map(|&k| (k, k * 10)).collect();

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        for (removed, k) in perm.iter().enumerate() {
            assert_eq!(t.delete(k), Some(k * 10));
            assert_eq!(t.find(k), None);
            assert_eq!(t.len(), keys.len() - removed - 1);
            validate_tree(&t);
        }
        assert!(t.root.is_none());
    });
}

#[test]
fn exhaustive_duplicate_keys_small_set() {
    let keys: Vec<u32> = vec![1, 2, 2, 3, 3, 3];

    for_each_permutation(&keys, |perm| {
        let mut t: AvlTree<u32, ()> = AvlTree::new();
        for k in &perm {
            t.insert(*k, ());
        }
        validate_tree(&t);

        for k in &perm {
            assert!(t.delete(k).is_some());
            validate_tree(&t);
        }
        assert!(t.is_empty());
    });
}
