//! Demonstrates set operations with `EwahBitmap`
#![allow(clippy::many_single_char_names)]

use ewah_bitmap::{BitCounter, EwahBitmap32};

fn main() {
    println!("=== EwahBitmap Set Operations ===\n");

    let a = EwahBitmap32::bitmap_of(&[1, 2, 3, 5, 8]).expect("positions in range");
    let b = EwahBitmap32::bitmap_of(&[2, 3, 5, 7, 11]).expect("positions in range");

    println!("Set A: {a:?}");
    println!("Set B: {b:?}");
    println!();

    // Union (A ∪ B)
    println!("Union (A ∪ B): {:?}", a.or(&b));
    println!("Expected: {{1, 2, 3, 5, 7, 8, 11}}\n");

    // Intersection (A ∩ B)
    println!("Intersection (A ∩ B): {:?}", a.and(&b));
    println!("Expected: {{2, 3, 5}}\n");

    // Difference (A - B)
    println!("Difference (A - B): {:?}", a.and_not(&b));
    println!("Expected: {{1, 8}}\n");

    // Symmetric Difference (A △ B)
    println!("Symmetric Difference (A △ B): {:?}", a.xor(&b));
    println!("Expected: {{1, 7, 8, 11}}\n");

    // The same through operators
    println!("=== Operators ===\n");
    println!("&a | &b = {:?}", &a | &b);
    println!("&a & &b = {:?}", &a & &b);
    println!("&a - &b = {:?}", &a - &b);
    println!("&a ^ &b = {:?}", &a ^ &b);

    let mut c = a.clone();
    c |= &b;
    println!("c = a; c |= b -> {c:?}\n");

    // Counting without materializing the result
    println!("=== Counting ===\n");
    println!("|A ∩ B| = {}", a.and_cardinality(&b));
    println!("|A ∪ B| = {}", a.or_cardinality(&b));
    let mut counter = BitCounter::new();
    a.xor_to_container(&b, &mut counter);
    println!("|A △ B| = {} (streamed into a counter)", counter.count());
    println!("A intersects B? {}\n", a.intersects(&b));

    // N-ary operations
    println!("=== N-ary Operations ===\n");
    let d = EwahBitmap32::bitmap_of(&[3, 5, 8, 13]).expect("positions in range");
    let all = [&a, &b, &d];
    println!("A ∩ B ∩ D = {:?}", EwahBitmap32::and_all(&all).expect("three operands"));
    println!("A ∪ B ∪ D = {:?}", EwahBitmap32::or_all(&all).expect("three operands"));
    println!("in at least two of A, B, D: {:?}", EwahBitmap32::threshold(2, &all));

    // Complement below the size
    println!("\n=== Complement ===\n");
    let mut e = a.clone();
    e.set_size_in_bits(10, false);
    println!("E = {e:?} over 10 bits");
    println!("!E = {:?}", !&e);
}
