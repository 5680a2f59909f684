//! Simple decoder to inspect legacy session cookies.
//!
//! Usage: `cargo run --example decode_cookie -- <cookie> [key]`
//!
//! The cookie must be the raw base64 text, not URL-encoded.

use ci_session::{SessionCrypto, Value, is_bare_session_id};

fn format_bytes(b: &[u8]) -> String {
    match std::str::from_utf8(b) {
        Ok(s) => {
            let preview: String = s.chars().take(80).collect();
            if s.chars().count() > 80 {
                format!("\"{}...\"", preview)
            } else {
                format!("\"{}\"", preview)
            }
        }
        Err(_) => format!("BYTES[{}] {}", b.len(), hex_preview(b)),
    }
}

fn hex_preview(b: &[u8]) -> String {
    b.iter().take(16).map(|x| format!("{:02x}", x)).collect()
}

fn print_value(v: &Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match v {
        Value::Null => println!("null"),
        Value::Bool(b) => println!("{}", b),
        Value::Integer(i) => println!("{}", i),
        Value::Float(f) => println!("{:?}", f),
        Value::Bytes(b) => println!("{}", format_bytes(b)),
        Value::List(items) => {
            println!("list[{}]", items.len());
            for (i, item) in items.iter().enumerate() {
                print!("{}  [{}] ", pad, i);
                print_value(item, indent + 1);
            }
        }
        Value::Map(map) => {
            println!("map{{{}}}", map.len());
            for (key, item) in map {
                print!("{}  {}: ", pad, String::from_utf8_lossy(key));
                print_value(item, indent + 1);
            }
        }
    }
}

fn main() {
    let mut args = std::env::args().skip(1);
    let Some(cookie) = args.next() else {
        eprintln!("usage: decode_cookie <cookie> [key]");
        std::process::exit(2);
    };
    let key = args.next().unwrap_or_else(|| "password".to_string());

    println!("Cookie length: {} chars", cookie.len());

    if is_bare_session_id(&cookie) {
        println!("Session id: {} (bare, no payload)", cookie);
        return;
    }

    let crypto = SessionCrypto::new(&key);
    let value = match crypto.decrypt_cookie(&cookie) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Failed to read cookie: {}", e);
            std::process::exit(1);
        }
    };

    match value.get("session_id").and_then(Value::as_str) {
        Some(id) => println!("Session id: {}", id),
        None => println!("Session id: (none)"),
    }

    println!("\n=== Payload ({}) ===", value.type_name());
    print_value(&value, 0);
}
