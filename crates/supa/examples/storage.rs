//! Storage example: bucket management, file upload/download, signed URLs.
//!
//! Run with: cargo run --example storage -p supa
//!
//! Requires `SUPABASE_URL` and a service_role `SUPABASE_KEY` (e.g. from
//! `supabase start`). Set `RUST_LOG=supa_storage=debug` to see each request.

use supa::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let supa = Supa::from_env()?;
    let storage = supa.storage()?;

    let bucket_name = "example-bucket";

    // ── Clean up from previous runs ──
    let _ = storage.empty_bucket(bucket_name).await;
    let _ = storage.delete_bucket(bucket_name).await;

    // ── Create a bucket ──
    println!("=== Create bucket ===");
    let bucket = storage
        .create_bucket(bucket_name, BucketOptions::new().public(true))
        .await?;
    println!("  Created bucket: {} (approx. {})", bucket.name, bucket.created_at);

    // ── List buckets ──
    println!("\n=== List buckets ===");
    for b in storage.list_buckets().await? {
        println!("  {} (public: {}, created {})", b.name, b.public, b.created_at);
    }

    // ── Upload a file ──
    println!("\n=== Upload file ===");
    let content = b"Hello from the supa Rust client!";
    bucket
        .upload("docs/hello.txt", content.to_vec(), UploadOptions::new())
        .await?;
    println!("  Uploaded docs/hello.txt ({} bytes)", content.len());

    // ── Download the file ──
    println!("\n=== Download file ===");
    let data = bucket.download("docs/hello.txt").await?;
    println!("  Downloaded: {}", String::from_utf8_lossy(&data));

    // ── List files ──
    println!("\n=== List files ===");
    let files = bucket
        .list(Some("docs"), SearchOptions::new().sort_by("created_at", SortOrder::Desc))
        .await?;
    for f in &files {
        println!("  {} (size: {:?}, updated {})", f.name, f.size(), f.updated_at);
    }

    // ── Public URL (no HTTP call) ──
    println!("\n=== Public URL ===");
    println!("  {}", bucket.get_public_url(&format!("{}/docs/hello.txt", bucket.name)));

    // ── Signed URL ──
    println!("\n=== Signed URL (60s expiry) ===");
    println!("  {}", bucket.create_signed_url("docs/hello.txt", 60).await?);

    // ── Copy and move ──
    println!("\n=== Copy / move file ===");
    bucket.copy("docs/hello.txt", "docs/hello-copy.txt").await?;
    bucket.move_file("docs/hello-copy.txt", "docs/hello-moved.txt").await?;
    println!("  docs/hello.txt -> docs/hello-copy.txt -> docs/hello-moved.txt");

    // ── Remove files ──
    println!("\n=== Remove files ===");
    let removed = bucket
        .bulk_remove(&["docs/hello.txt", "docs/hello-moved.txt"])
        .await?;
    println!("  Removed {} files", removed.len());

    // ── Cleanup: delete bucket ──
    println!("\n=== Cleanup ===");
    bucket.empty().await?;
    bucket.delete().await?;
    println!("  Deleted bucket: {}", bucket_name);

    println!("\nDone!");
    Ok(())
}
