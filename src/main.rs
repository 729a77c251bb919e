use std::sync::Arc;

use colored::Colorize;
use serde_json::{json, Value};

use record_hooks::hooks::{hook_fn, HookConfig, HookRegistry};
use record_hooks::interceptor::HookedStore;
use record_hooks::lifecycle::{
    ChannelDispatcher, LifecycleConfig, RecordLifecycle, StoreAuditLog, WriteContext,
};
use record_hooks::logging;
use record_hooks::store::{Filter, MemoryStore, QueryExt, RecordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging system
    logging::init_logging()?;

    tracing::info!("=== Record hooks demo starting ===");

    // Users and their audit log live in separate collections
    let users = Arc::new(MemoryStore::new("users").with_unique_index("email"));
    let logs = Arc::new(MemoryStore::new("logs"));

    // Transition events are queued for an external consumer
    let (dispatcher, mut events) = ChannelDispatcher::unbounded();

    let lifecycle = RecordLifecycle::new(
        users.clone(),
        Arc::new(StoreAuditLog::new(logs.clone())),
        Arc::new(dispatcher),
        LifecycleConfig::default(),
    );

    // Reads never expose password hashes
    let strip_password = hook_fn(|data| async move {
        Ok(data.map_documents(|mut doc| {
            if let Some(obj) = doc.as_object_mut() {
                obj.remove("password");
            }
            doc
        }))
    });
    let registry = HookRegistry::from_config(
        HookConfig::new()
            .on("fetch-many", strip_password.clone())
            .on("fetch-one", vec![strip_password]),
    );
    let reads = HookedStore::new(users.clone(), Arc::new(registry));

    let writes = [
        json!({"_id": "u1", "name": "Ann", "email": "Ann@Example.com", "password": "x", "status": "active"}),
        json!({"_id": "u2", "name": "Bo", "email": "bo@example.com", "emails": ["ann@example.com"], "status": "active"}),
        json!({"_id": "u1", "name": "Ann", "email": "ann@example.com", "password": "x", "status": "inactive"}),
    ];

    for doc in writes {
        let id = doc["_id"].clone();
        match lifecycle.save(doc, WriteContext::new().actor("admin")).await {
            Ok(report) => println!(
                "{} {} ({} transition event(s))",
                "saved".green(),
                id,
                report.transitions.len()
            ),
            Err(e) => println!("{} {}: {}", "rejected".red(), id, e),
        }
    }

    println!("\n{}", "Users (via hooks):".bold());
    for user in reads.fetch_many(&Filter::new().into()).await? {
        println!("  {}", user);
    }

    let ann = reads.find_one(Filter::by_id("u1")).exec().await?;
    println!("\n{} {:?}", "Deferred fetch-one:".bold(), ann);

    println!("\n{}", "Audit log:".bold());
    for entry in logs.all().await {
        println!(
            "  [{}] {}",
            entry["code"].as_str().unwrap_or_default().cyan(),
            entry["message"].as_str().unwrap_or_default()
        );
    }

    println!("\n{}", "Transition events:".bold());
    while let Ok(event) = events.try_recv() {
        println!("  {} {} {}", event.domain, event.verb.to_string().yellow(), event.record_id);
    }

    let raw: Vec<Value> = users.fetch_many(&Filter::new().into()).await?;
    tracing::info!(records = raw.len(), "=== Record hooks demo shutting down ===");

    Ok(())
}
