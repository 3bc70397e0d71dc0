//! Basic usage examples for `EwahBitmap`

use ewah_bitmap::EwahBitmap64;

fn main() {
    println!("=== EwahBitmap Basic Usage ===\n");

    // Create a new empty bitmap
    let mut bitmap = EwahBitmap64::new();
    println!("Created new bitmap");
    println!("Size: {} bits in {} words\n", bitmap.size_in_bits(), bitmap.size_in_words());

    // Set some bits, far apart so the gaps compress into runs
    for pos in [5, 10, 15, 100, 1_000_000] {
        bitmap.set(pos).expect("position in range");
    }

    println!("Set bits at positions: 5, 10, 15, 100, 1000000");
    println!("Number of set bits: {}", bitmap.cardinality());
    println!(
        "Size: {} bits stored in {} words ({} bytes serialized)\n",
        bitmap.size_in_bits(),
        bitmap.size_in_words(),
        bitmap.serialized_size_in_bytes()
    );

    // Check if specific bits are set
    println!("Checking individual bits:");
    for i in [0, 5, 10, 15, 20, 100, 999_999, 1_000_000] {
        println!("  Bit {}: {}", i, if bitmap.get(i) { "set" } else { "unset" });
    }

    // Iterate over set bits
    println!("\nIterating over set bits:");
    print!("  Set bits: ");
    for bit in &bitmap {
        print!("{bit} ");
    }
    println!("\n");

    // Setting a bit below the end splits the run it falls into
    println!("Setting bit 500000 inside the zero run");
    bitmap.set(500_000).expect("position in range");
    println!("Now {} words\n", bitmap.size_in_words());

    // Runs of identical bits
    println!("Runs of identical bits:");
    for chunk in bitmap.chunk_iter().take(6) {
        println!("  {} x {}", chunk.len, u8::from(chunk.bit));
    }

    if let Some(first) = bitmap.first_set_bit() {
        println!("\nFirst set bit: {first}");
    }
    if let Some(last) = bitmap.reverse_iter().next() {
        println!("Last set bit: {last}");
    }

    // Clear all bits
    println!("\nClearing all bits");
    bitmap.clear();
    println!("Number of set bits after clear: {}", bitmap.cardinality());
    println!("Is empty? {}", bitmap.is_empty());
}
