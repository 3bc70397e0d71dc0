use ewah_bitmap::{EwahBitmap, EwahBitmap32, EwahBitmap64};
use std::collections::{BTreeSet, HashSet};

#[test]
fn test_bitwise_operators() {
    let a = EwahBitmap64::bitmap_of(&[10, 20, 30]).unwrap();
    let b = EwahBitmap64::bitmap_of(&[20, 30, 40]).unwrap();

    let union = &a | &b;
    assert_eq!(union.iter().collect::<Vec<_>>(), [10, 20, 30, 40]);

    let intersection = &a & &b;
    assert_eq!(intersection.iter().collect::<Vec<_>>(), [20, 30]);

    let difference = &a - &b;
    assert_eq!(difference.iter().collect::<Vec<_>>(), [10]);

    let sym_diff = &a ^ &b;
    assert_eq!(sym_diff.iter().collect::<Vec<_>>(), [10, 40]);

    // owned left operand with a borrowed right one
    let owned = a.clone() & &b;
    assert_eq!(owned, intersection);
}

#[test]
fn test_bitwise_assign_operators() {
    let b = EwahBitmap32::bitmap_of(&[2, 3, 100]).unwrap();

    let mut x = EwahBitmap32::bitmap_of(&[1, 2]).unwrap();
    x |= &b;
    assert_eq!(x.iter().collect::<Vec<_>>(), [1, 2, 3, 100]);

    x &= EwahBitmap32::bitmap_of(&[2, 100, 101]).unwrap();
    assert_eq!(x.iter().collect::<Vec<_>>(), [2, 100]);
    assert_eq!(x.size_in_bits(), 102);

    x ^= &b;
    assert_eq!(x.iter().collect::<Vec<_>>(), [3]);

    x -= &b;
    assert!(x.is_empty());
    assert_eq!(x.size_in_bits(), 102);
}

#[test]
fn test_not_operator() {
    let mut a = EwahBitmap64::bitmap_of(&[0, 2, 4]).unwrap();
    a.set_size_in_bits(6, false);

    let b = !&a;
    assert_eq!(b.iter().collect::<Vec<_>>(), [1, 3, 5]);
    // the borrowed form leaves the operand alone
    assert_eq!(a.iter().collect::<Vec<_>>(), [0, 2, 4]);

    let c = !a;
    assert_eq!(c, b);
    assert_eq!((!c).iter().collect::<Vec<_>>(), [0, 2, 4]);
}

#[test]
fn test_not_over_runs() {
    let mut a = EwahBitmap32::new();
    a.add_stream_of_empty_words(false, 1_000);
    a.set_size_in_bits(a.size_in_bits() + 7, true);
    let b = !&a;
    assert_eq!(b.cardinality(), 32_000);
    assert_eq!(b.first_set_bit(), Some(0));
    assert!(!b.get(32_000));
    assert_eq!(b.size_in_bits(), 32_007);
}

#[test]
fn test_hash_set_membership() {
    let mut set = HashSet::new();
    set.insert(EwahBitmap64::bitmap_of(&[1, 2, 3]).unwrap());

    let mut same = EwahBitmap64::new();
    same.add_literal_word(0b1110);
    same.set_size_in_bits(1_000, false);
    assert!(set.contains(&same));

    assert!(!set.contains(&EwahBitmap64::bitmap_of(&[1, 2]).unwrap()));
    set.insert(same);
    assert_eq!(set.len(), 1);
}

#[test]
fn test_clone_is_independent() {
    let original = EwahBitmap32::bitmap_of(&[5, 500]).unwrap();
    let mut copy = original.clone();
    copy.set(50_000).unwrap();
    assert_eq!(original.iter().collect::<Vec<_>>(), [5, 500]);
    assert_eq!(copy.iter().collect::<Vec<_>>(), [5, 500, 50_000]);
}

#[test]
fn test_default_and_capacity() {
    let bitmap: EwahBitmap = EwahBitmap::default();
    assert!(bitmap.is_empty());
    assert_eq!(bitmap.size_in_bits(), 0);
    assert_eq!(bitmap.size_in_words(), 1);

    let mut sized = EwahBitmap64::with_capacity(64);
    assert!(sized.buffer().capacity() >= 64);
    sized.set(4_000).unwrap();
    assert_eq!(sized.first_set_bit(), Some(4_000));
}

#[test]
fn test_first_set_bit() {
    let mut bitmap = EwahBitmap32::new();
    assert_eq!(bitmap.first_set_bit(), None);
    bitmap.set_size_in_bits(100_000, false);
    assert_eq!(bitmap.first_set_bit(), None);
    bitmap.set(77_777).unwrap();
    assert_eq!(bitmap.first_set_bit(), Some(77_777));
    bitmap.set(64).unwrap();
    assert_eq!(bitmap.first_set_bit(), Some(64));
}

#[test]
fn test_intersects_and_empty() {
    let a = EwahBitmap64::bitmap_of(&[1, 1_000_000]).unwrap();
    let b = EwahBitmap64::bitmap_of(&[2, 999_999]).unwrap();
    assert!(!a.intersects(&b));
    assert!(a.and(&b).is_empty());

    let c = EwahBitmap64::bitmap_of(&[1_000_000]).unwrap();
    assert!(a.intersects(&c));
    assert!(!a.and(&c).is_empty());
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn arb_bit_indices()(
            indices in prop::collection::btree_set(0usize..5_000, 0..100)
        ) -> BTreeSet<usize> {
            indices
        }
    }

    fn build(indices: &BTreeSet<usize>) -> EwahBitmap32 {
        let mut bitmap = EwahBitmap32::new();
        for &i in indices {
            bitmap.set(i).unwrap();
        }
        bitmap
    }

    proptest! {
        #[test]
        fn prop_iter_matches_set(indices in arb_bit_indices()) {
            let bitmap = build(&indices);
            let collected: BTreeSet<usize> = bitmap.iter().collect();
            prop_assert_eq!(collected, indices);
        }

        #[test]
        fn prop_union_commutative(a in arb_bit_indices(), b in arb_bit_indices()) {
            let (x, y) = (build(&a), build(&b));
            prop_assert_eq!(&x | &y, &y | &x);
        }

        #[test]
        fn prop_intersection_commutative(a in arb_bit_indices(), b in arb_bit_indices()) {
            let (x, y) = (build(&a), build(&b));
            prop_assert_eq!(&x & &y, &y & &x);
        }

        #[test]
        fn prop_de_morgan(a in arb_bit_indices(), b in arb_bit_indices()) {
            let (mut x, mut y) = (build(&a), build(&b));
            x.set_size_in_bits(5_000, false);
            y.set_size_in_bits(5_000, false);
            prop_assert_eq!(!(&x | &y), &!&x & &!&y);
        }
    }
}
