use ewah_bitmap::{Error, EwahBitmap, EwahBitmap32, EwahBitmap64, Word};

#[test]
fn test_new() {
    let bitmap = EwahBitmap64::new();
    assert!(bitmap.is_empty());
    assert_eq!(bitmap.size_in_bits(), 0);
    assert_eq!(bitmap.size_in_words(), 1);
    assert_eq!(bitmap.cardinality(), 0);
    assert_eq!(bitmap.first_set_bit(), None);
    assert_eq!(bitmap, EwahBitmap64::default());
}

#[test]
fn test_basic_operations() {
    let mut bitmap = EwahBitmap32::new();

    // Set some bits
    assert_eq!(bitmap.set(10), Ok(true));
    assert_eq!(bitmap.set(42), Ok(true));

    // Check the bits
    assert!(bitmap.get(10));
    assert!(bitmap.get(42));
    assert!(!bitmap.get(11));
    assert!(!bitmap.get(41));
    assert!(!bitmap.get(1_000));

    assert_eq!(bitmap.cardinality(), 2);
    assert_eq!(bitmap.size_in_bits(), 43);
    assert_eq!(bitmap.first_set_bit(), Some(10));
    assert!(!bitmap.is_empty());
}

#[test]
fn test_set_out_of_range() {
    let mut bitmap = EwahBitmap32::new();
    let max = EwahBitmap32::MAX_BIT_INDEX;
    assert_eq!(
        bitmap.set(max + 1),
        Err(Error::IndexOutOfRange {
            index: max + 1,
            max
        })
    );
    assert!(bitmap.is_empty());
    assert_eq!(bitmap.size_in_bits(), 0);

    assert_eq!(bitmap.set(max), Ok(true));
    assert!(bitmap.get(max));
    assert_eq!(bitmap.cardinality(), 1);
}

#[test]
fn test_uniform_words_compress() {
    let mut bitmap = EwahBitmap64::new();
    for _ in 0..100 {
        bitmap.add_word(0);
    }
    for _ in 0..100 {
        bitmap.add_word(u64::MAX);
    }
    assert_eq!(bitmap.size_in_words(), 2);
    assert_eq!(bitmap.size_in_bits(), 200 * 64);
    assert_eq!(bitmap.cardinality(), 100 * 64);
    assert_eq!(bitmap.first_set_bit(), Some(100 * 64));
}

#[test]
fn test_buffer_growth_keeps_literals() {
    let values: Vec<u32> = (0..1_000).map(|i| 0x1234_0000 | (i * 7 + 1)).collect();
    let mut bitmap = EwahBitmap32::new();
    for &value in &values {
        bitmap.add_literal_word(value);
    }
    assert_eq!(&bitmap.words()[1..], values.as_slice());
    assert!(bitmap.buffer().capacity() >= 1_001);

    bitmap.trim();
    assert_eq!(bitmap.buffer().capacity(), 1_001);
    assert_eq!(&bitmap.words()[1..], values.as_slice());
}

#[test]
fn test_add_stream_of_literal_words() {
    let words = [0b1010u64, 0, u64::MAX, 1 << 63];
    let mut bitmap = EwahBitmap64::new();
    bitmap.add_stream_of_literal_words(&words);
    assert_eq!(&bitmap.words()[1..], &words);
    assert_eq!(bitmap.cardinality(), 2 + 64 + 1);

    let mut negated = EwahBitmap64::new();
    negated.add_stream_of_negated_literal_words(&words);
    assert_eq!(negated.cardinality(), 4 * 64 - bitmap.cardinality());
    assert!(!negated.intersects(&bitmap));
}

#[test]
fn test_set_size_in_bits() {
    let mut bitmap = EwahBitmap32::bitmap_of(&[1]).unwrap();
    assert!(bitmap.set_size_in_bits(100, true));
    assert_eq!(bitmap.size_in_bits(), 100);
    assert_eq!(bitmap.cardinality(), 1 + 98);
    assert!(!bitmap.get(0));
    assert!(bitmap.get(99));

    assert!(!bitmap.set_size_in_bits(50, false));
    assert_eq!(bitmap.size_in_bits(), 100);

    assert!(bitmap.set_size_in_bits(1_000, false));
    assert_eq!(bitmap.cardinality(), 99);
    assert_eq!(bitmap.clear_iter().count(), 1_000 - 99);
}

#[test]
fn test_set_size_in_bits_within_last_word() {
    let mut bitmap = EwahBitmap64::bitmap_of(&[1, 3]).unwrap();
    assert_eq!(
        bitmap.set_size_in_bits_within_last_word(100),
        Err(Error::SizeOutsideLastWord {
            current: 4,
            requested: 100
        })
    );

    bitmap.set_size_in_bits_within_last_word(2).unwrap();
    assert_eq!(bitmap.size_in_bits(), 2);
    assert_eq!(bitmap.iter().collect::<Vec<_>>(), [1]);

    bitmap.set_size_in_bits_within_last_word(60).unwrap();
    assert_eq!(bitmap.size_in_bits(), 60);
    assert_eq!(bitmap.iter().collect::<Vec<_>>(), [1]);
}

#[test]
fn test_negate() {
    let mut bitmap = EwahBitmap32::bitmap_of(&[0, 2, 40]).unwrap();
    bitmap.set_size_in_bits(100, false);
    bitmap.negate();
    assert_eq!(bitmap.size_in_bits(), 100);
    assert_eq!(bitmap.cardinality(), 97);
    assert!(!bitmap.get(0));
    assert!(bitmap.get(1));
    assert!(!bitmap.get(40));
    assert!(bitmap.get(99));
    assert!(!bitmap.get(100));

    bitmap.negate();
    assert_eq!(bitmap.iter().collect::<Vec<_>>(), [0, 2, 40]);
}

#[test]
fn test_negate_full_words() {
    let mut bitmap = EwahBitmap64::new();
    bitmap.set_size_in_bits(64 * 5, false);
    bitmap.negate();
    assert_eq!(bitmap.cardinality(), 64 * 5);
    assert_eq!(bitmap.reverse_iter().next(), Some(64 * 5 - 1));

    let mut partial = EwahBitmap64::new();
    partial.set_size_in_bits(64 * 5 + 3, false);
    partial.negate();
    assert_eq!(partial.cardinality(), 64 * 5 + 3);
    assert!(!partial.get(64 * 5 + 3));
    assert_eq!(partial.reverse_iter().next(), Some(64 * 5 + 2));
}

#[test]
fn test_clear_and_swap() {
    let mut a = EwahBitmap64::bitmap_of(&[1, 2, 3]).unwrap();
    let mut b = EwahBitmap64::bitmap_of(&[1_000]).unwrap();
    a.swap(&mut b);
    assert_eq!(a.iter().collect::<Vec<_>>(), [1_000]);
    assert_eq!(b.iter().collect::<Vec<_>>(), [1, 2, 3]);
    assert_eq!(a.size_in_bits(), 1_001);

    a.clear();
    assert!(a.is_empty());
    assert_eq!(a.size_in_bits(), 0);
    assert_eq!(a.size_in_words(), 1);
    a.set(5).unwrap();
    assert_eq!(a.iter().collect::<Vec<_>>(), [5]);
}

#[test]
fn test_equality_and_clone() {
    let a = EwahBitmap32::bitmap_of(&[7, 300, 301]).unwrap();
    let mut b = a.clone();
    assert_eq!(a, b);
    b.set_size_in_bits(10_000, false);
    assert_eq!(a, b);
    b.set(9_999).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_sizes() {
    let bitmap = EwahBitmap32::bitmap_of(&[0, 1_000]).unwrap();
    assert_eq!(bitmap.size_in_bytes(), bitmap.size_in_words() * 4);
    assert_eq!(bitmap.serialized_size_in_bytes(), bitmap.size_in_bytes() + 12);
    assert_eq!(bitmap.to_be_bytes().unwrap().len(), bitmap.serialized_size_in_bytes());
}

fn check_word_limits<W: Word>() {
    assert_eq!(W::RUNNING_LENGTH_BITS, W::BITS / 2);
    assert_eq!(W::LITERAL_BITS, W::BITS / 2 - 1);
    assert_eq!(1 + W::RUNNING_LENGTH_BITS + W::LITERAL_BITS, W::BITS);
}

#[test]
fn test_word_limits() {
    check_word_limits::<u32>();
    check_word_limits::<u64>();
    assert_eq!(u32::LARGEST_RUNNING_LENGTH_COUNT, 65_535);
    assert_eq!(u32::LARGEST_LITERAL_COUNT, 32_767);
    assert_eq!(u64::LARGEST_RUNNING_LENGTH_COUNT, u32::MAX as usize);
    assert_eq!(u64::LARGEST_LITERAL_COUNT, (1 << 31) - 1);
}

#[test]
fn test_long_runs_span_marker_words() {
    let mut bitmap: EwahBitmap<u32> = EwahBitmap::new();
    let count = u32::LARGEST_RUNNING_LENGTH_COUNT * 2 + 10;
    bitmap.add_stream_of_empty_words(true, count);
    assert_eq!(bitmap.size_in_words(), 3);
    assert_eq!(bitmap.cardinality(), count * 32);
    assert_eq!(bitmap.ewah_iter().count(), 3);
}

#[test]
fn test_add_word_with_bits() {
    let mut bitmap = EwahBitmap32::new();
    bitmap.add_word(0);
    // only the low ten bits belong to the bitmap
    bitmap.add_word_with_bits(u32::MAX, 10).unwrap();
    assert_eq!(bitmap.size_in_bits(), 42);
    assert_eq!(bitmap.cardinality(), 10);
    assert_eq!(bitmap.iter().collect::<Vec<_>>(), (32..42).collect::<Vec<_>>());
    assert_eq!(bitmap.clear_iter().count(), 32);

    let (decoded, _) = EwahBitmap32::from_be_bytes(&bitmap.to_be_bytes().unwrap()).unwrap();
    assert_eq!(decoded.words(), bitmap.words());

    let other = EwahBitmap32::bitmap_of(&[0, 35, 100]).unwrap();
    let union = bitmap.or(&other);
    let mut expected = vec![0];
    expected.extend(32..42);
    expected.push(100);
    assert_eq!(union.iter().collect::<Vec<_>>(), expected);
    assert_eq!(union.size_in_bits(), 101);
    assert_eq!(bitmap.and(&other).iter().collect::<Vec<_>>(), [35]);

    let mut negated = bitmap.clone();
    negated.negate();
    assert_eq!(negated.iter().collect::<Vec<_>>(), (0..32).collect::<Vec<_>>());
}

#[test]
fn test_add_word_with_bits_rejects_misfits() {
    let mut bitmap = EwahBitmap64::new();
    assert_eq!(
        bitmap.add_word_with_bits(1, 0),
        Err(Error::InvalidWordAppend {
            bits: 0,
            size_in_bits: 0
        })
    );
    assert_eq!(
        bitmap.add_word_with_bits(1, 65),
        Err(Error::InvalidWordAppend {
            bits: 65,
            size_in_bits: 0
        })
    );

    bitmap.add_word_with_bits(u64::MAX, 64).unwrap();
    bitmap.add_word_with_bits(0, 3).unwrap();
    assert_eq!(bitmap.size_in_bits(), 67);
    assert_eq!(bitmap.cardinality(), 64);

    // the bitmap now ends inside a word
    assert_eq!(
        bitmap.add_word_with_bits(1, 1),
        Err(Error::InvalidWordAppend {
            bits: 1,
            size_in_bits: 67
        })
    );
    assert_eq!(bitmap.set(66), Ok(true));
    assert_eq!(bitmap.size_in_bits(), 67);
    assert_eq!(bitmap.cardinality(), 65);
}
