// Performance measurement for Llrb and Bst instances over random and
// sorted key loads:
// * insert
// * lookup via find
// * erase
// * full cursor walk

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rand::prelude::random;

use llrb_map::{Bst, Llrb, OrderedMap};

const N: u64 = 10_000;

fn random_keys() -> Vec<u64> {
    (0..N).map(|_| random::<u64>() % (N * 10)).collect()
}

fn insert(c: &mut Criterion) {
    let keys = random_keys();
    c.bench_function("llrb_insert_random", |b| {
        b.iter(|| {
            let mut llrb: Llrb<u64, u64> = Llrb::new("bench");
            for key in keys.iter() {
                llrb.insert(*key, *key);
            }
            llrb
        })
    });
    c.bench_function("bst_insert_random", |b| {
        b.iter(|| {
            let mut bst: Bst<u64, u64> = Bst::new("bench");
            for key in keys.iter() {
                bst.insert(*key, *key);
            }
            bst
        })
    });
    c.bench_function("llrb_insert_sorted", |b| {
        b.iter(|| {
            let mut llrb: Llrb<u64, u64> = Llrb::new("bench");
            for key in 0..N {
                llrb.insert(key, key);
            }
            llrb
        })
    });
}

fn find(c: &mut Criterion) {
    let keys = random_keys();
    let mut llrb: Llrb<u64, u64> = Llrb::new("bench");
    let mut bst: Bst<u64, u64> = Bst::new("bench");
    for key in keys.iter() {
        llrb.insert(*key, *key);
        bst.insert(*key, *key);
    }
    c.bench_function("llrb_find", |b| {
        b.iter(|| {
            for key in keys.iter() {
                black_box(llrb.find(key).value());
            }
        })
    });
    c.bench_function("bst_find", |b| {
        b.iter(|| {
            for key in keys.iter() {
                black_box(bst.find(key).value());
            }
        })
    });
    c.bench_function("llrb_cursor_walk", |b| {
        b.iter(|| {
            let mut cursor = llrb.begin();
            while !cursor.is_end() {
                black_box(cursor.key());
                cursor.move_next();
            }
        })
    });
}

fn erase(c: &mut Criterion) {
    let keys = random_keys();
    let llrb = Llrb::load_from("bench", (0..N * 10).map(|key| (key, key))).unwrap();
    c.bench_function("llrb_erase", |b| {
        b.iter(|| {
            let mut llrb = llrb.clone();
            for key in keys.iter() {
                llrb.erase(key);
            }
            llrb
        })
    });
}

criterion_group!(benches, insert, find, erase);
criterion_main!(benches);
