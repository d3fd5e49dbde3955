// Reference model for map tests: a dense vector indexed by key, keys
// must fall within `0..capacity`.
struct RefNodes {
    slots: Vec<Option<i64>>,
}

impl RefNodes {
    fn new(capacity: usize) -> RefNodes {
        RefNodes {
            slots: vec![None; capacity],
        }
    }

    fn get(&self, key: i64) -> Option<i64> {
        self.slots.get(key as usize).cloned().flatten()
    }

    fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    fn create(&mut self, key: i64, value: i64) -> bool {
        let slot = &mut self.slots[key as usize];
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }

    fn set(&mut self, key: i64, value: i64) -> Option<i64> {
        self.slots[key as usize].replace(value)
    }

    fn delete(&mut self, key: i64) -> Option<i64> {
        self.slots.get_mut(key as usize).and_then(Option::take)
    }

    fn first(&self) -> Option<(i64, i64)> {
        self.iter().next()
    }

    fn last(&self) -> Option<(i64, i64)> {
        self.iter().last()
    }

    fn iter(&self) -> std::vec::IntoIter<(i64, i64)> {
        self.range(Bound::Unbounded, Bound::Unbounded)
    }

    fn range(&self, low: Bound<i64>, high: Bound<i64>) -> std::vec::IntoIter<(i64, i64)> {
        let entries: Vec<(i64, i64)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(key, slot)| slot.map(|value| (key as i64, value)))
            .filter(|(key, _)| match low {
                Bound::Included(low) => *key >= low,
                Bound::Excluded(low) => *key > low,
                Bound::Unbounded => true,
            })
            .filter(|(key, _)| match high {
                Bound::Included(high) => *key <= high,
                Bound::Excluded(high) => *key < high,
                Bound::Unbounded => true,
            })
            .collect();
        entries.into_iter()
    }

    fn reverse(&self, low: Bound<i64>, high: Bound<i64>) -> std::vec::IntoIter<(i64, i64)> {
        let mut entries: Vec<(i64, i64)> = self.range(low, high).collect();
        entries.reverse();
        entries.into_iter()
    }
}

fn random_bound(size: usize) -> Bound<i64> {
    let key = (random::<u64>() % (size as u64)) as i64;
    match random::<u8>() % 3 {
        0 => Bound::Included(key),
        1 => Bound::Excluded(key),
        _ => Bound::Unbounded,
    }
}

fn random_low_high(size: usize) -> (Bound<i64>, Bound<i64>) {
    (random_bound(size), random_bound(size))
}

// compare two streams of entries item by item.
fn check_entries<'a, I, J>(iter: I, iter_ref: J)
where
    I: Iterator<Item = (&'a i64, &'a i64)>,
    J: Iterator<Item = (i64, i64)>,
{
    let (mut iter, mut iter_ref) = (iter, iter_ref);
    loop {
        match (iter.next(), iter_ref.next()) {
            (Some(item), Some(ref_item)) => {
                assert_eq!((*item.0, *item.1), ref_item);
            }
            (None, None) => break,
            (Some(item), None) => panic!("invalid item: {:?}", item),
            (None, Some(ref_item)) => panic!("invalid none: {:?}", ref_item),
        }
    }
}
