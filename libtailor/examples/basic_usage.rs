//! Basic usage example for the Tailor library.
//!
//! Resolves an image reference against a v1 registry and prints what a
//! container started from it would run.
//!
//! Run with: cargo run --example basic_usage -- localhost:5000/team/app:1.0

use libtailor::{Config, ImageReference, Resolver};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Tailor Library - Basic Usage Example\n");

    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "localhost:5000/team/app".to_string());
    let reference: ImageReference = input.parse()?;

    // Local registries usually speak plain HTTP
    let mut config = Config::default();
    config.registry.insecure_registries = vec!["localhost:5000".to_string()];

    let resolver = Resolver::new(&config)?;
    println!("Resolving {}...", reference);

    match resolver.resolve(&reference) {
        Ok(image) => {
            println!("✓ Image {}\n", image.id);
            println!("  cmd:        {:?}", image.cmd().unwrap_or_default());
            println!("  entrypoint: {:?}", image.entrypoint().unwrap_or_default());
            println!("  workdir:    {}", image.working_dir().unwrap_or("-"));
        }
        Err(e) => {
            eprintln!("✗ Failed to resolve: {}", e);
            eprintln!("  Make sure a v1 registry serving the image is running at localhost:5000");
        }
    }

    Ok(())
}
