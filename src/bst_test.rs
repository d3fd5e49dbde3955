use std::collections::BTreeMap;
use std::ops::Bound;

use pretty_assertions::assert_eq;
use quickcheck_macros::quickcheck;
use rand::prelude::random;

use crate::bst::Bst;
use crate::map::OrderedMap;

#[test]
fn test_id() {
    let bst: Bst<i64, i64> = Bst::new("test-bst");
    assert_eq!(bst.id(), "test-bst".to_string());
    assert_eq!(bst.len(), 0);
    assert!(bst.is_empty());
}

// 50, 30, 70, 20, 40, 60, 80 loads a perfect tree of height 2.
fn sample_tree() -> Bst<i64, f64> {
    let keys = [50, 30, 70, 20, 40, 60, 80];
    let values = [1.1, 2.2, 3.3, 4.4, 5.5, 6.6, 7.7];
    let mut bst = Bst::new("sample");
    for (key, value) in keys.iter().zip(values.iter()) {
        assert!(bst.insert(*key, *value).is_none());
    }
    bst
}

#[test]
fn test_sample_tree() {
    let mut bst = sample_tree();
    assert_eq!(bst.len(), 7);
    assert_eq!(bst.max_height(), 2);

    let keys: Vec<i64> = bst.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![20, 30, 40, 50, 60, 70, 80]);

    // new nodes are red and stay red.
    let mut cursor = bst.begin();
    while let Some(node) = cursor.node() {
        assert!(node.is_red());
        cursor.move_next();
    }

    assert_eq!(bst.insert(40, 9.9), Some(5.5));
    assert_eq!(bst.len(), 7);

    // two children, 40 takes over the slot.
    assert_eq!(bst.erase(&30), Some(2.2));
    let keys: Vec<i64> = bst.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![20, 40, 50, 60, 70, 80]);
    assert_eq!(bst.max_height(), 2);

    // root, successor sits at depth 2.
    assert_eq!(bst.erase(&50), Some(1.1));
    let keys: Vec<i64> = bst.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec![20, 40, 60, 70, 80]);

    let (first, last) = bst.equal_range(&60);
    assert_eq!(first.entry(), Some((&60, &6.6)));
    assert_eq!(last.key(), Some(&70));

    // leaf and single child.
    assert_eq!(bst.erase(&80), Some(7.7));
    assert_eq!(bst.erase(&70), Some(3.3));
    assert_eq!(bst.erase(&45), None);
    assert_eq!(bst.len(), 3);

    let mut cursor = bst.max();
    let mut keys = vec![];
    while let Some(key) = cursor.key() {
        keys.push(*key);
        cursor.move_prev();
    }
    assert_eq!(keys, vec![60, 40, 20]);
}

#[test]
fn test_degenerate() {
    let n = 1000;
    let mut bst: Bst<i64, i64> = Bst::new("test-bst");
    for key in 0..n {
        bst.insert(key, key);
    }
    assert_eq!(bst.max_height(), (n - 1) as usize);
    assert_eq!(bst.begin().key(), Some(&0));
    assert_eq!(bst.max().key(), Some(&(n - 1)));
    assert_eq!(bst.iter().count(), n as usize);

    // erase from the middle of a chain.
    assert_eq!(bst.erase(&500), Some(500));
    assert_eq!(bst.max_height(), (n - 2) as usize);
    let mut cursor = bst.find(&499);
    cursor.move_next();
    assert_eq!(cursor.key(), Some(&501));
    cursor.move_prev();
    assert_eq!(cursor.key(), Some(&499));

    // erase the root of a chain.
    assert_eq!(bst.erase(&0), Some(0));
    assert_eq!(bst.begin().key(), Some(&1));
    assert_eq!(bst.len(), (n - 2) as usize);
}

#[test]
fn test_drop_long_chain() {
    let mut bst: Bst<u64, u64> = Bst::new("test-bst");
    for key in (0..20_000).rev() {
        bst.insert(key, key);
    }
    assert_eq!(bst.len(), 20_000);
    assert_eq!(bst.max_height(), 19_999);

    // copy walks the chain without recursing.
    let cloned = bst.clone();
    assert_eq!(cloned.len(), 20_000);
    assert_eq!(cloned.max_height(), 19_999);
    assert_eq!(cloned.max().key(), Some(&19_999));
    assert!(cloned.iter().eq(bst.iter()));
    drop(cloned);

    bst.clear();
    assert!(bst.is_empty());
    assert!(bst.begin().is_end());

    for key in 0..20_000 {
        bst.insert(key, key);
    }
    let taken = bst.take();
    assert!(bst.is_empty());
    assert_eq!(taken.len(), 20_000);
}

#[test]
fn test_empty() {
    let mut bst: Bst<i64, i64> = Bst::new("test-bst");
    assert!(bst.erase(&1).is_none());
    assert!(bst.begin() == bst.end());
    assert!(bst.max().is_end());
    assert_eq!(bst.max_height(), 0);
    assert_eq!(format!("{:?}", bst), "{}");

    bst.insert(1, 1);
    assert_eq!(bst.erase(&1), Some(1));
    assert!(bst.is_empty());
    assert!(bst.iter().next().is_none());
}

#[test]
fn test_clone() {
    let mut bst: Bst<i64, i64> = Bst::new("test-bst");
    for _ in 0..500 {
        let key = (random::<u16>() % 1000) as i64;
        bst.insert(key, key);
    }
    let mut cloned = bst.clone();
    assert!(cloned.iter().eq(bst.iter()));

    let keys: Vec<i64> = bst.iter().map(|(k, _)| *k).collect();
    for key in keys.iter() {
        assert_eq!(cloned.erase(key), Some(*key));
    }
    assert!(cloned.is_empty());
    assert_eq!(bst.len(), keys.len());
    for (key, value) in bst.iter_mut() {
        *value = -*key;
    }
    let mut cursor = bst.end();
    cursor.move_prev();
    assert_eq!(cursor.entry().map(|(k, v)| k + v), Some(0));
}

#[test]
fn test_crud() {
    let size = 1000;
    let mut bst: Bst<i64, i64> = Bst::new("test-bst");
    let mut refns = RefNodes::new(size);

    for _ in 0..50_000 {
        let key: i64 = (random::<i64>() % (size as i64)).abs();
        let value: i64 = random();
        match random::<u8>() % 4 {
            0 => {
                let absent = !bst.contains_key(&key);
                if absent {
                    bst.insert(key, value);
                }
                assert_eq!(absent, refns.create(key, value));
            }
            1 => assert_eq!(bst.insert(key, value), refns.set(key, value)),
            2 => assert_eq!(bst.erase(&key), refns.delete(key)),
            _ => assert_eq!(bst.get(&key).cloned(), refns.get(key)),
        }
        assert_eq!(bst.len(), refns.len());
    }

    let entry = |(k, v): (&i64, &i64)| (*k, *v);
    assert_eq!(bst.min().entry().map(entry), refns.first());
    assert_eq!(bst.max().entry().map(entry), refns.last());

    check_entries(bst.iter(), refns.iter());
    check_entries(bst.iter().rev(), refns.reverse(Bound::Unbounded, Bound::Unbounded));
    for _ in 0..1000 {
        let (low, high) = random_low_high(size);
        check_entries(bst.range::<i64, _>((low, high)), refns.range(low, high));
        check_entries(
            bst.range::<i64, _>((low, high)).rev(),
            refns.reverse(low, high),
        );
    }
}

#[quickcheck]
fn prop_bst_matches_btreemap(inserts: Vec<(u8, u16)>, erases: Vec<u8>) -> bool {
    let mut bst: Bst<u8, u16> = Bst::new("prop-bst");
    let mut btree = BTreeMap::new();
    for (key, value) in inserts {
        if bst.insert(key, value) != btree.insert(key, value) {
            return false;
        }
    }
    for key in erases {
        if bst.erase(&key) != btree.remove(&key) {
            return false;
        }
    }
    bst.len() == btree.len()
        && bst.iter().eq(btree.iter())
        && bst.iter().rev().eq(btree.iter().rev())
}

include!("./ref_test.rs");
