// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic usage example for the settings engine.
//!
//! This example demonstrates:
//! - Declaring a group of typed settings with bounds and captions
//! - Loading the group from its file, falling back to defaults
//! - Applying command-line overrides
//! - Saving only when something changed
//!
//! To run this example:
//! ```bash
//! cargo run --example basic_usage -- --timeout 900 --Window.title "Hello"
//! ```
//!
//! The group file is written below the system temporary folder.

use propcfg::adapters::{CommandLineOverrides, DirectoryResolver};
use propcfg::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== Settings Engine: Basic Usage ===\n");

    let registry = Arc::new(Registry::new());
    let mut window = SettingsGroup::new("demo.Window", &registry);
    let title = window.define(
        "title",
        Setting::string("Untitled")
            .with_caption("Appearance")
            .with_description("Window title"),
    )?;
    let theme = window.define(
        "theme",
        Setting::enumeration("Light", ["Light", "Dark", "System"])
            .with_description("Color theme"),
    )?;
    let timeout = window.define(
        "timeout",
        Setting::integer(30)
            .with_bounds(1.0, 600.0)
            .with_caption("Network")
            .with_description("Socket timeout in seconds"),
    )?;
    let recent = window.define(
        "recent",
        Setting::string("notes.txt").with_description("Recently opened files"),
    )?;
    window.define("session", Setting::string("").internal())?;
    window.seal();

    let root = std::env::temp_dir().join("propcfg-demo");
    let engine = StorageEngine::builder()
        .with_program_name("basic_usage")
        .with_registry(Arc::clone(&registry))
        .with_resolver(Box::new(DirectoryResolver::new(&root)))
        .build()?;
    let path = engine.locate(window.id())?;
    println!("Group file: {}\n", path.display());

    // Example 1: Load, using defaults for anything missing
    println!("--- Example 1: Loading ---");
    match engine.load_group(window.id()) {
        Ok(GroupOutcome::LoadedIncomplete { missing }) => {
            println!("✗ Missing keys, using defaults: {}", missing.join(", "));
        }
        Ok(outcome) => println!("✓ {:?}", outcome),
        Err(e) => println!("✗ Keeping defaults: {}", e),
    }
    println!("  title   = {}", title.value());
    println!("  theme   = {}", theme.value());
    println!("  timeout = {}", timeout.get_i64(0).unwrap_or_default());

    // Example 2: Typed updates and bound clamping
    println!("\n--- Example 2: Updating ---");
    if let Err(e) = timeout.set("soon") {
        println!("✗ Rejected: {}", e);
    }
    theme.set("dark")?;
    println!("✓ theme = {}", theme.value());
    if recent.len() < 3 {
        recent.append("todo.txt");
    }
    println!("✓ recent = {:?}", recent.values());

    // Example 3: Command-line overrides
    println!("\n--- Example 3: Overrides ---");
    let overrides = CommandLineOverrides::from_env_args();
    for rejected in overrides.apply(window.settings()) {
        println!("✗ Ignored override for {}", rejected);
    }
    println!("  timeout = {}", timeout.value());

    // Example 4: Saving
    println!("\n--- Example 4: Saving ---");
    match engine.save_group(window.id())? {
        GroupOutcome::Skipped => println!("✓ Nothing changed, file left alone"),
        outcome => println!("✓ {:?}", outcome),
    }
    println!("\n{}", std::fs::read_to_string(&path)?);

    Ok(())
}
