//! Standalone demo harness
//!
//! Mounts two calendar widgets with no host platform present: file-backed
//! persistence, a shared in-process bus, and task callbacks pointed at the
//! configured backend. Run with `RUST_LOG=debug` to watch the save and
//! broadcast traffic.

mod ids;

use std::sync::Arc;

use anyhow::Context;
use flowcal_core::{
    ConfigCache, EventBus, IntegrationResolver, LogStatSink, StatRecorder,
};
use flowcal_domain::{Board, FlowNode, NodeUpdate, RuntimeConfig, WidgetConfig};
use flowcal_infra::{FileConfigCache, PlatformClientFactory, StandaloneTaskFactory};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::ids::WidgetIdGenerator;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn demo_widget(widget_id: i64, runtime: &RuntimeConfig) -> WidgetConfig {
    let mut node = FlowNode::new(format!("calendar-{widget_id}"));
    node.data.api_base_url = Some(runtime.api_base_url.clone());
    node.data.platform_api_url = runtime.platform_api_url.clone();
    WidgetConfig {
        widget_id,
        user_id: 1,
        role: "demo".to_string(),
        board: Board { id: 1, name: "Demo board".to_string(), parent_id: 0 },
        config: node,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let runtime = RuntimeConfig::from_env();
    info!(api_base_url = %runtime.api_base_url, "starting standalone harness");

    let cache_dir = std::env::var("FLOWCAL_CACHE_DIR")
        .unwrap_or_else(|_| ".flowcal-cache".to_string());
    let cache: Arc<dyn ConfigCache> =
        Arc::new(FileConfigCache::new(&cache_dir).context("opening config cache")?);
    let resolver = IntegrationResolver::new(
        EventBus::new(),
        cache,
        Arc::new(StandaloneTaskFactory),
        Arc::new(PlatformClientFactory),
    );

    // Host-assigned ids for the two permanent demo mounts; rehydrate the
    // first from any previous run.
    let mut first_config = demo_widget(1, &runtime);
    let restored = resolver.rehydrate(&mut first_config).await?;
    info!(restored, "widget 1 cold start");

    let first = resolver.resolve(first_config)?;
    let second = resolver.resolve(demo_widget(2, &runtime))?;

    let _watcher = second.subscribe(|message| {
        info!(?message, "widget 2 received");
        Ok(())
    });

    let moved = first.save_config(NodeUpdate::position(120.0, 80.0)).await?;
    info!(outcome = ?moved, "widget 1 moved");

    let pinned = first.save_config(NodeUpdate::pinned(true)).await?;
    info!(outcome = ?pinned, "widget 1 pinned");

    // While pinned, a position save is refused in full.
    let refused = first.save_config(NodeUpdate::position(0.0, 0.0)).await?;
    info!(outcome = ?refused, "widget 1 position save while pinned");

    let resized = first.save_config(NodeUpdate::size(900.0, 700.0)).await?;
    first.on_resize(900.0, 700.0);
    info!(outcome = ?resized, "widget 1 resized");

    // Dynamically added widgets get generated ids.
    let generator = WidgetIdGenerator::new();
    let scratch = resolver.resolve(demo_widget(generator.next_id(), &runtime))?;
    info!(label = %scratch.label, "scratch widget mounted");

    let stats = StatRecorder::new(1, 1, runtime.stats_queue_max_size, LogStatSink);
    stats.track_event("calendar_opened", None);
    stats.track_event("widget_pinned", Some(serde_json::json!({"isPinned": true})));
    stats.flush("shutdown");

    info!(config = ?first.widget_config().config.position, "final widget 1 position");
    Ok(())
}
