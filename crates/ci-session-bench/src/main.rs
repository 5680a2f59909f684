//! Benchmark for the session codec and cookie pipeline.
//!
//! Loads sessions from a JSON array of objects, or synthesizes them when no
//! file is given, then times serialization and cookie encryption.

use std::fs;
use std::time::{Duration, Instant};

use ci_session::{Map, SessionCrypto, Value};
use tracing_subscriber::EnvFilter;

const KEY: &str = "bench encryption key";
const SYNTHETIC_SESSIONS: usize = 10_000;
const ITERS: u32 = 5;

/// Converts JSON into a session value.
///
/// Empty arrays become empty maps, which is how they decode.
fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(0.0)),
        },
        serde_json::Value::String(s) => Value::from(s.as_str()),
        serde_json::Value::Array(items) if items.is_empty() => Value::Map(Map::new()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(from_json).collect()),
        serde_json::Value::Object(fields) => Value::Map(
            fields
                .iter()
                .map(|(k, v)| (k.as_str(), from_json(v)))
                .collect(),
        ),
    }
}

fn synthesize(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let mut flash = Map::new();
            flash.insert("message", format!("Saved item {}", i));
            flash.insert("level", "success");

            let mut session = Map::new();
            session.insert("session_id", format!("{:032x}", i as u128 * 0x9e37_79b9_7f4a_7c15));
            session.insert("ip_address", format!("10.{}.{}.{}", (i >> 16) & 0xff, (i >> 8) & 0xff, i & 0xff));
            session.insert("user_agent", "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36");
            session.insert("last_activity", 1_500_000_000i64 + i as i64);
            session.insert("user_id", i as i64);
            session.insert("logged_in", i % 3 != 0);
            session.insert("score", i as f64 / 7.0);
            session.insert("groups", vec![Value::from("admin"), Value::from("editor")]);
            session.insert("flash", flash);
            Value::Map(session)
        })
        .collect()
}

fn throughput(bytes: usize, time: Duration) -> f64 {
    (bytes as f64 / 1_000_000.0) / time.as_secs_f64()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let sessions: Vec<Value> = match std::env::args().nth(1) {
        Some(path) => {
            println!("Loading sessions from: {}", path);
            let json_data = fs::read_to_string(&path).expect("Failed to read sessions file");

            let parse_start = Instant::now();
            let records: Vec<serde_json::Value> =
                serde_json::from_str(&json_data).expect("Failed to parse JSON");
            let sessions: Vec<Value> = records.iter().map(from_json).collect();
            println!("Loaded {} sessions in {:?}", sessions.len(), parse_start.elapsed());
            sessions
        }
        None => {
            println!("Synthesizing {} sessions", SYNTHETIC_SESSIONS);
            synthesize(SYNTHETIC_SESSIONS)
        }
    };
    tracing::info!(sessions = sessions.len(), "starting benchmark");

    // Benchmark encoding
    let encode_start = Instant::now();
    let mut encoded = Vec::new();
    for _ in 0..ITERS {
        encoded = sessions.iter().map(ci_session::encode).collect::<Vec<_>>();
    }
    let encode_time = encode_start.elapsed() / ITERS;
    let encoded_bytes: usize = encoded.iter().map(Vec::len).sum();

    println!(
        "\nEncode: {} bytes in {:?} (avg of {} iterations)",
        encoded_bytes, encode_time, ITERS
    );
    println!("  Throughput: {:.2} MB/s", throughput(encoded_bytes, encode_time));

    // Benchmark decoding
    let decode_start = Instant::now();
    let mut decoded = Vec::new();
    for _ in 0..ITERS {
        decoded = encoded
            .iter()
            .map(|bytes| ci_session::decode(bytes).expect("Failed to decode"))
            .collect::<Vec<_>>();
    }
    let decode_time = decode_start.elapsed() / ITERS;

    println!("\nDecode: {:?} (avg of {} iterations)", decode_time, ITERS);
    println!("  Throughput: {:.2} MB/s", throughput(encoded_bytes, decode_time));

    let mismatches = sessions
        .iter()
        .zip(&decoded)
        .filter(|(original, back)| back.as_ref() != Some(*original))
        .count();
    assert_eq!(mismatches, 0, "Decoded values should match the originals");

    // Benchmark cookie encryption
    let crypto = SessionCrypto::new(KEY);

    let encrypt_start = Instant::now();
    let cookies: Vec<String> = sessions
        .iter()
        .map(|v| crypto.encrypt_cookie(v).expect("Failed to encrypt cookie"))
        .collect();
    let encrypt_time = encrypt_start.elapsed();
    let cookie_bytes: usize = cookies.iter().map(String::len).sum();

    println!("\nEncrypt cookies: {} chars in {:?}", cookie_bytes, encrypt_time);
    println!("  Throughput: {:.2} MB/s (plaintext)", throughput(encoded_bytes, encrypt_time));
    println!(
        "  Per cookie: {:?}",
        encrypt_time / sessions.len().max(1) as u32
    );

    // Benchmark cookie decryption
    let decrypt_start = Instant::now();
    let opened: Vec<Value> = cookies
        .iter()
        .map(|c| crypto.decrypt_cookie(c).expect("Failed to decrypt cookie"))
        .collect();
    let decrypt_time = decrypt_start.elapsed();

    println!("\nDecrypt cookies: {:?}", decrypt_time);
    println!("  Throughput: {:.2} MB/s (cookie text)", throughput(cookie_bytes, decrypt_time));
    println!(
        "  Per cookie: {:?}",
        decrypt_time / sessions.len().max(1) as u32
    );
    assert_eq!(opened, sessions, "Cookie round trip should be lossless");

    println!("\n=== Summary ===");
    println!("Sessions: {}", sessions.len());
    println!(
        "Serialized: {} bytes (avg {:.0} per session)",
        encoded_bytes,
        encoded_bytes as f64 / sessions.len().max(1) as f64
    );
    println!(
        "Cookie text: {} chars ({:.2}x serialized)",
        cookie_bytes,
        cookie_bytes as f64 / encoded_bytes.max(1) as f64
    );
}
