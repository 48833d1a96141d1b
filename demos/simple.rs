use serde::{Deserialize, Serialize};
use tsion::{decode, encode, from_value, to_value, Value};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Track {
    title: String,
    artist: String,
    plays: u64,
}

fn main() {
    // Two tracks by the same artist: the shared pieces are lifted into the
    // dictionary prefix and referenced, so the payload stays compact.
    let library = vec![
        Track {
            title: "First Light".to_string(),
            artist: "The Interned Strings".to_string(),
            plays: 42,
        },
        Track {
            title: "Second Light".to_string(),
            artist: "The Interned Strings".to_string(),
            plays: 42,
        },
    ];

    let value = to_value(&library).unwrap();
    let payload = encode(&value);
    println!("payload ({} bytes): {:?}", payload.len(), payload);

    let decoded: Value = decode(&payload).unwrap();
    let back: Vec<Track> = from_value(decoded).unwrap();
    assert_eq!(back, library);
    println!("round trip ok: {} tracks", back.len());
}
