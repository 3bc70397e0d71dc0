//! Advanced usage patterns and features

use ewah_bitmap::{EwahBitmap32, EwahBitmap64, NonEmptyDetector};

fn main() {
    println!("=== EwahBitmap Advanced Features ===\n");

    // Appending whole words
    println!("Appending whole words:");
    let mut bitmap = EwahBitmap32::new();
    bitmap.add_stream_of_empty_words(false, 100_000);
    bitmap.add_literal_word(0b1011);
    bitmap.add_stream_of_empty_words(true, 3);
    bitmap.add_stream_of_literal_words(&[0xFFFF_0000, 0x0000_FFFF]);
    println!(
        "{} bits, {} set, stored in {} words",
        bitmap.size_in_bits(),
        bitmap.cardinality(),
        bitmap.size_in_words()
    );
    println!();

    // The compressed layout, block by block
    println!("Compressed blocks (running bit, run length, literal count):");
    for block in bitmap.ewah_iter() {
        println!(
            "  marker at {:>3}: {} x {}, then {} literals",
            block.position,
            block.running_length,
            u8::from(block.running_bit),
            block.literal_count()
        );
    }
    println!();

    // Resizing
    println!("Resizing:");
    let mut sized = EwahBitmap64::bitmap_of(&[1, 2]).expect("positions in range");
    sized.set_size_in_bits(200, true);
    println!("Pad to 200 with ones: {} set bits", sized.cardinality());
    sized.negate();
    println!("After negate: {sized:?}");
    println!();

    // Compose: select among the set bits of one bitmap
    println!("Compose:");
    let rows = EwahBitmap64::bitmap_of(&[10, 20, 30, 40, 50]).expect("positions in range");
    let pick = EwahBitmap64::bitmap_of(&[0, 2, 4]).expect("positions in range");
    println!("Rows {rows:?}, picking the 1st, 3rd and 5th: {:?}", rows.compose(&pick));
    println!();

    // Emptiness check that stops at the first set bit
    println!("Early exit sinks:");
    let a = EwahBitmap64::bitmap_of(&[3, 1 << 25]).expect("positions in range");
    let b = EwahBitmap64::bitmap_of(&[1 << 25]).expect("positions in range");
    let mut detector = NonEmptyDetector::new();
    a.and_to_container(&b, &mut detector);
    println!("A and B share a bit? {}", detector.is_non_empty());
    println!();

    // Binary layout
    println!("Binary layout:");
    let bytes = a.to_be_bytes().expect("fits the layout");
    println!("Encoded {} set bits in {} bytes", a.cardinality(), bytes.len());
    match EwahBitmap64::from_be_bytes(&bytes) {
        Ok((decoded, rest)) => {
            println!("Decoded {decoded:?}, {} trailing bytes", rest.len());
        }
        Err(err) => println!("Decode failed: {err}"),
    }
    if let Err(err) = EwahBitmap64::from_be_bytes(&bytes[..bytes.len() - 1]) {
        println!("Decoding a truncated copy: {err}");
    }

    let mut stream = Vec::new();
    a.serialize_into(&mut stream).expect("writes to a Vec");
    b.serialize_into(&mut stream).expect("writes to a Vec");
    let mut reader = stream.as_slice();
    while !reader.is_empty() {
        match EwahBitmap64::deserialize_from(&mut reader) {
            Ok(bitmap) => println!("Read back {bitmap:?} from the stream"),
            Err(err) => {
                println!("Stream error: {err}");
                break;
            }
        }
    }
}
