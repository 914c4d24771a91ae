// Basic usage example for cfgtree
//
// Run with: cargo run --example basic_tree

use cfgtree::{ConstraintsBuilder, Item, NodeBuilder, ValueBuilder};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Describe the schema once; every value carries its own validation
    let root = NodeBuilder::new()
        .child(
            NodeBuilder::new()
                .name("app")
                .comment("General")
                .value(
                    ValueBuilder::new("name", "My App".to_string())
                        .comment("Application name")
                        .constrained(ConstraintsBuilder::new().min_length(1).max_length(64)),
                )
                .value(
                    ValueBuilder::new("theme", "light".to_string())
                        .comment("UI theme preference")
                        .constrained(ConstraintsBuilder::new().matches_regex("light|dark|auto")),
                ),
        )
        .child(
            NodeBuilder::new()
                .name("network")
                .comment("Network")
                .serialize_separately(true)
                .value(
                    ValueBuilder::new("port", 8080_u16)
                        .comment("Server port")
                        .constrained(ConstraintsBuilder::new().at_least(1024)),
                )
                .value(
                    ValueBuilder::aggregate(
                        "allowed_origins",
                        vec!["http://localhost:3000".to_string()],
                    )
                    .comment("CORS allowed origins")
                    .constrained(ConstraintsBuilder::new().max_size(8)),
                ),
        )
        .child(
            NodeBuilder::new().name("advanced").value(
                ValueBuilder::new("schema_version", 1_u32)
                    .comment("Bumped by migrations only")
                    .finality(true),
            ),
        )
        .build()?;

    println!("📦 cfgtree Basic Usage Example\n");
    print_tree(&root);

    // Listeners see every accepted change
    let theme = root.value::<String>("app.theme")?;
    theme.add_listener(|old, new| println!("🎨 theme changed: {old} -> {new}"));

    println!("\n🔧 Changing theme to 'dark'...");
    println!("accepted: {}", theme.set_value("dark".to_string()));

    println!("\n🔧 Changing theme to 'purple'...");
    println!("accepted: {}", theme.set_value("purple".to_string()));

    // External data goes through the same validation
    println!("\n📥 Applying external data...");
    for (path, data) in [
        ("network.port", json!(9000)),
        ("network.port", json!(80)),
        ("advanced.schema_version", json!(2)),
    ] {
        if let Some(Item::Value(value)) = root.resolve(path) {
            println!("{path} <- {data}: accepted = {}", value.apply_json(data.clone())?);
        }
    }

    println!("\n🔄 Resetting theme to default...");
    theme.reset_to_default();
    println!("✅ Theme reset to: {}\n", theme.get());

    print_tree(&root);
    Ok(())
}

fn print_tree(root: &cfgtree::Node) {
    root.walk(|item, depth| {
        let indent = "  ".repeat(depth - 1);
        match item {
            Item::Node(node) => {
                let marker = if node.is_serialized_separately() { " (own file)" } else { "" };
                println!("{indent}[{}]{marker}", node.name().unwrap_or_default());
            }
            Item::Value(value) => {
                let current = value
                    .current_json()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|e| format!("<{e}>"));
                let lock = if value.is_final() { " 🔒" } else { "" };
                println!("{indent}{} = {current}{lock}", value.name());
            }
        }
    });
}
