use bcrypt::{hash, DEFAULT_COST};
use std::env;

use insights_backend::config::AppConfig;
use insights_backend::db::{models::NewAdmin, ContentStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let mut args = env::args().skip(1);
    let (Some(email), Some(password)) = (args.next(), args.next()) else {
        eprintln!("Usage: cargo run --bin seed-admin <EMAIL> <PASSWORD> [NAME]");
        std::process::exit(1);
    };
    let name = args.next();

    let email = email.trim().to_lowercase();
    if !email.contains('@') || password.len() < 8 {
        eprintln!("Need a valid email and a password of at least 8 characters");
        std::process::exit(1);
    }

    let config = AppConfig::from_env();
    if config.database.is_none() {
        eprintln!("DATABASE_URL is not set; refusing to seed the in-memory store");
        std::process::exit(1);
    }

    let password_hash = match tokio::task::spawn_blocking(move || hash(&password, DEFAULT_COST)).await {
        Ok(Ok(h)) => h,
        Ok(Err(e)) => {
            eprintln!("Error hashing password: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Hashing task failed: {}", e);
            std::process::exit(1);
        }
    };

    let store = match ContentStore::connect(config.database).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    match store
        .upsert_admin(NewAdmin {
            email,
            password_hash,
            name,
        })
        .await
    {
        Ok(admin) => println!("Admin ready: {} ({})", admin.email, admin.id),
        Err(e) => {
            eprintln!("Failed to save admin: {}", e);
            std::process::exit(1);
        }
    }
}
