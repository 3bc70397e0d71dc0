use std::collections::BTreeSet;

use ewah_bitmap::{EwahBitmap32, EwahBitmap64};
use proptest::prelude::*;

// Sparse positions clustered in a few regions so runs and literals mix
prop_compose! {
    fn arb_positions(max_bits: usize)
        (bases in prop::collection::vec(0..max_bits, 1..4),
         offsets in prop::collection::vec((0usize..4, 0usize..300), 0..120))
        -> BTreeSet<usize>
    {
        offsets
            .into_iter()
            .map(|(region, offset)| (bases[region % bases.len()] + offset).min(max_bits))
            .collect()
    }
}

// Whole words: dense literals, runs of ones and runs of zeros
prop_compose! {
    fn arb_words()
        (words in prop::collection::vec(
            prop_oneof![
                any::<u32>(),
                Just(0u32),
                Just(u32::MAX),
            ],
            0..200))
        -> Vec<u32>
    {
        words
    }
}

fn from_words(words: &[u32]) -> (EwahBitmap32, BTreeSet<usize>) {
    let mut bitmap = EwahBitmap32::new();
    let mut model = BTreeSet::new();
    for (i, &word) in words.iter().enumerate() {
        bitmap.add_word(word);
        model.extend((0..32).filter(|b| word >> b & 1 == 1).map(|b| i * 32 + b));
    }
    (bitmap, model)
}

fn positions(bitmap: &EwahBitmap64) -> Vec<usize> {
    bitmap.iter().collect()
}

proptest! {
    #[test]
    fn prop_set_matches_model(indices in prop::collection::vec(0usize..20_000, 0..300)) {
        let mut bitmap = EwahBitmap64::new();
        let mut model = BTreeSet::new();
        for &i in &indices {
            prop_assert_eq!(bitmap.set(i), Ok(model.insert(i)));
        }
        prop_assert_eq!(bitmap.iter().collect::<Vec<_>>(), model.iter().copied().collect::<Vec<_>>());
        prop_assert_eq!(bitmap.cardinality(), model.len());
        prop_assert_eq!(bitmap.first_set_bit(), model.first().copied());
        for &i in &indices {
            prop_assert!(bitmap.get(i), "bit {}", i);
            prop_assert_eq!(bitmap.get(i + 1), model.contains(&(i + 1)), "bit {}", i + 1);
        }
    }

    #[test]
    fn prop_binary_ops_match_model(
        a in arb_positions(50_000),
        b in arb_positions(50_000),
    ) {
        let va: Vec<usize> = a.iter().copied().collect();
        let vb: Vec<usize> = b.iter().copied().collect();
        let x = EwahBitmap64::bitmap_of(&va).unwrap();
        let y = EwahBitmap64::bitmap_of(&vb).unwrap();

        prop_assert_eq!(positions(&x.and(&y)), a.intersection(&b).copied().collect::<Vec<_>>());
        prop_assert_eq!(positions(&x.or(&y)), a.union(&b).copied().collect::<Vec<_>>());
        prop_assert_eq!(positions(&x.xor(&y)), a.symmetric_difference(&b).copied().collect::<Vec<_>>());
        prop_assert_eq!(positions(&x.and_not(&y)), a.difference(&b).copied().collect::<Vec<_>>());

        prop_assert_eq!(x.and_cardinality(&y), a.intersection(&b).count());
        prop_assert_eq!(x.or_cardinality(&y), a.union(&b).count());
        prop_assert_eq!(x.intersects(&y), !a.is_disjoint(&b));

        let size = x.size_in_bits().max(y.size_in_bits());
        prop_assert_eq!(x.or(&y).size_in_bits(), size);
        prop_assert_eq!(x.and(&y).size_in_bits(), size);
    }

    #[test]
    fn prop_word_streams_match_model(wa in arb_words(), wb in arb_words()) {
        let (x, ma) = from_words(&wa);
        let (y, mb) = from_words(&wb);
        prop_assert_eq!(x.size_in_bits(), wa.len() * 32);
        prop_assert_eq!(x.cardinality(), ma.len());
        prop_assert_eq!(x.iter().collect::<Vec<_>>(), ma.iter().copied().collect::<Vec<_>>());
        prop_assert_eq!(
            x.or(&y).iter().collect::<Vec<_>>(),
            ma.union(&mb).copied().collect::<Vec<_>>()
        );
        prop_assert_eq!(
            x.and(&y).iter().collect::<Vec<_>>(),
            ma.intersection(&mb).copied().collect::<Vec<_>>()
        );
        prop_assert_eq!(
            x.xor(&y).iter().collect::<Vec<_>>(),
            ma.symmetric_difference(&mb).copied().collect::<Vec<_>>()
        );

        let mut reversed: Vec<usize> = x.reverse_iter().collect();
        reversed.reverse();
        prop_assert_eq!(reversed, ma.iter().copied().collect::<Vec<_>>());
    }

    #[test]
    fn prop_negate_twice_is_identity(a in arb_positions(10_000), extra in 0usize..200) {
        let va: Vec<usize> = a.iter().copied().collect();
        let mut bitmap = EwahBitmap64::bitmap_of(&va).unwrap();
        bitmap.set_size_in_bits(bitmap.size_in_bits() + extra, false);
        let size = bitmap.size_in_bits();

        bitmap.negate();
        prop_assert_eq!(bitmap.size_in_bits(), size);
        prop_assert_eq!(bitmap.cardinality(), size - a.len());
        prop_assert!(bitmap.iter().all(|i| i < size && !a.contains(&i)));

        bitmap.negate();
        prop_assert_eq!(bitmap.size_in_bits(), size);
        prop_assert_eq!(positions(&bitmap), va);
    }

    #[test]
    fn prop_serialization_round_trip(a in arb_positions(100_000), negate in any::<bool>()) {
        let va: Vec<usize> = a.iter().copied().collect();
        let mut bitmap = EwahBitmap64::bitmap_of(&va).unwrap();
        if negate {
            bitmap.negate();
        }
        let bytes = bitmap.to_be_bytes().unwrap();
        let (decoded, rest) = EwahBitmap64::from_be_bytes(&bytes).unwrap();
        prop_assert!(rest.is_empty());
        prop_assert_eq!(decoded.size_in_bits(), bitmap.size_in_bits());
        prop_assert_eq!(decoded.words(), bitmap.words());

        let bytes = bitmap.to_le_bytes().unwrap();
        let (decoded, _) = EwahBitmap64::from_le_bytes(&bytes).unwrap();
        prop_assert_eq!(positions(&decoded), positions(&bitmap));
    }

    #[test]
    fn prop_threshold_matches_counting(
        inputs in prop::collection::vec(arb_positions(5_000), 1..5),
        k in 1usize..6,
    ) {
        let bitmaps: Vec<EwahBitmap64> = inputs
            .iter()
            .map(|set| EwahBitmap64::bitmap_of(&set.iter().copied().collect::<Vec<_>>()).unwrap())
            .collect();
        let refs: Vec<&EwahBitmap64> = bitmaps.iter().collect();
        let result = EwahBitmap64::threshold(k, &refs);

        let size = bitmaps.iter().map(|b| b.size_in_bits()).max().unwrap_or(0);
        let expected: Vec<usize> = (0..size)
            .filter(|i| inputs.iter().filter(|set| set.contains(i)).count() >= k)
            .collect();
        prop_assert_eq!(positions(&result), expected);
    }
}
