//! Integration test common infrastructure.
//!
//! Provides utilities for spawning test servers, seeding their player
//! store, and driving raw NUL-framed clients against them.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::{SeedPlayer, TestServer};

/// Lowercase hex SHA-256, as clients compute their login digests.
#[allow(dead_code)]
pub fn sha256_hex(input: &str) -> String {
    use sha2::{Digest, Sha256};
    Sha256::digest(input.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// A login handshake document.
#[allow(dead_code)]
pub fn login_message(username: &str, digest: &str) -> String {
    format!(
        "<msg t='sys'><body action='login' r='0'><login z='w1'>\
         <nick><![CDATA[{username}]]></nick><pword><![CDATA[{digest}]]></pword>\
         </login></body></msg>"
    )
}
