use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use octopush_cli::AppConfig;
use octopush_core::{ResourceEvent, ResourceEventType, ResourceHook};
use octopush_notifications::{PipelineOutcome, Prepared, PushHook};
use octopush_storage::{InMemoryStore, RecordStore};
use serde_json::Value;

use crate::cli::{Operation, ReplayArgs};
use crate::output::{print_field, print_json, print_skipped, print_success};

pub async fn replay(cfg: &AppConfig, args: &ReplayArgs) -> Result<()> {
    if !cfg.push.enabled {
        print_skipped("push notifications are disabled (push.enabled = false)");
        return Ok(());
    }

    let store = InMemoryStore::new();
    let loaded = store
        .load_bundle(read_json(&args.resources)?)
        .with_context(|| format!("failed to load {}", args.resources.display()))?;
    tracing::info!(
        count = loaded,
        path = %args.resources.display(),
        "Loaded resource fixture"
    );

    let event = read_event(&args.event, args.operation)?;
    let store: Arc<dyn RecordStore> = Arc::new(store);
    let pipeline = Arc::new(cfg.push.build_pipeline(store)?);
    let hook = PushHook::new(pipeline.clone(), cfg.push.enabled);

    if !hook.matches(&event) {
        print_skipped(&format!(
            "{} events for {} are not handled by {}",
            event.event_type,
            event.resource_type,
            hook.name()
        ));
        return Ok(());
    }

    if args.dry_run {
        match pipeline.preview(&event).await? {
            Prepared::Skipped(reason) => print_skipped(&format!("skipped: {reason}")),
            Prepared::Ready(payload) => print_json(&payload)?,
        }
        return Ok(());
    }

    hook.on_start().await?;
    match pipeline.process(&event).await? {
        PipelineOutcome::Skipped(reason) => print_skipped(&format!("skipped: {reason}")),
        PipelineOutcome::Dispatched {
            outcome,
            device_count,
        } => {
            print_success(&format!(
                "notification delivered to {device_count} device(s)"
            ));
            print_field("Gateway", &cfg.push.gateway_url);
            print_field("Status", outcome.status);
            print_field("Elapsed", format!("{} ms", outcome.elapsed_ms));
            if !outcome.body.is_empty() {
                print_field("Response", outcome.body.trim_end());
            }
        }
    }
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Reads either a serialized `ResourceEvent` or a bare resource, in which case
/// the event is built from `operation`.
fn read_event(path: &Path, operation: Operation) -> Result<ResourceEvent> {
    let value = read_json(path)?;
    if value.get("event_type").is_some() {
        return serde_json::from_value(value)
            .with_context(|| format!("invalid event in {}", path.display()));
    }

    let resource_type = value
        .get("resourceType")
        .and_then(Value::as_str)
        .with_context(|| {
            format!(
                "{} holds neither an event nor a resource with resourceType",
                path.display()
            )
        })?
        .to_string();
    let id = match value.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let event_type = match operation {
        Operation::Create => ResourceEventType::Created,
        Operation::Update => ResourceEventType::Updated,
        Operation::Delete => ResourceEventType::Deleted,
    };
    let resource = event_type.is_write().then_some(value);

    Ok(ResourceEvent::new(event_type, resource_type, id, resource))
}
