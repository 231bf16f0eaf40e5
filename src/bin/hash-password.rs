//! Prints a bcrypt hash for the admin login.
//!
//! Usage: `hash-password <PASSWORD>`, or set `ADMIN_PASSWORD` and run it
//! without arguments.

use bcrypt::{hash, DEFAULT_COST};
use std::env;

fn main() {
    let password = env::args()
        .nth(1)
        .or_else(|| env::var("ADMIN_PASSWORD").ok())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| {
            eprintln!("Usage: hash-password <PASSWORD>  (or set ADMIN_PASSWORD)");
            std::process::exit(1);
        });

    if password.len() < 8 {
        eprintln!("Warning: passwords shorter than 8 characters are easy to guess");
    }

    match hash(&password, DEFAULT_COST) {
        Ok(hashed) => {
            println!("Cost : {}", DEFAULT_COST);
            println!("Hash : {}\n", hashed);
            println!("# Add this to .env, then remove ADMIN_PASSWORD:");
            println!("ADMIN_HASH_PASSWORD={}", hashed);
        }
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            std::process::exit(1);
        }
    }
}
