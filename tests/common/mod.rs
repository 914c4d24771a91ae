//! Common test utilities for cfgtree integration tests
//!
//! Provides a shared sample tree and helper functions.

#![allow(dead_code)]

use cfgtree::{ConstraintsBuilder, Node, NodeBuilder, ValueBuilder};
use std::sync::{Arc, Mutex};

/// Install a test logger once; `RUST_LOG=cfgtree=debug` shows rejections
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The `Foo` / `Bar` / `Baz` tree: one integer value that must lie outside (0, 5)
pub fn foo_tree() -> Arc<Node> {
    NodeBuilder::new()
        .name("Foo")
        .comment("Bar")
        .serialize_separately(false)
        .value(
            ValueBuilder::<i32>::scalar("Baz").constrained(
                ConstraintsBuilder::new()
                    .or()
                    .at_least(5)
                    .at_most(0)
                    .finish_composite(),
            ),
        )
        .build()
        .expect("sample tree builds")
}

/// A small application schema covering scalars, text and aggregates
pub fn app_tree() -> Arc<Node> {
    NodeBuilder::new()
        .child(
            NodeBuilder::new()
                .name("ui")
                .comment("Appearance")
                .value(
                    ValueBuilder::new("theme", "dark".to_string()).constrained(
                        ConstraintsBuilder::new().matches_regex("dark|light|system"),
                    ),
                )
                .value(
                    ValueBuilder::new("font_size", 14.0_f64)
                        .constrained(ConstraintsBuilder::new().at_least(8.0).at_most(32.0)),
                ),
        )
        .child(
            NodeBuilder::new()
                .name("network")
                .serialize_separately(true)
                .value(
                    ValueBuilder::new("port", 8080_u16)
                        .constrained(ConstraintsBuilder::new().at_least(1024)),
                )
                .value(
                    ValueBuilder::aggregate("allowed_origins", vec!["http://localhost".to_string()])
                        .constrained(ConstraintsBuilder::new().min_size(1).max_size(4)),
                ),
        )
        .value(ValueBuilder::new("schema_version", 1_u32).finality(true))
        .build()
        .expect("app tree builds")
}

/// Shared log of listener calls
pub type CallLog<T> = Arc<Mutex<Vec<T>>>;

pub fn call_log<T>() -> CallLog<T> {
    Arc::new(Mutex::new(Vec::new()))
}
