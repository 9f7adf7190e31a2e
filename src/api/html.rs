//! Server-rendered HTML pages.
//!
//! Every interpolated value goes through `html_escape`.

use chrono::Utc;
use html_escape::encode_text;

use crate::metrics::MetricsSnapshot;
use crate::properties::Property;

const STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 40px; background: #f5f5f5; }
.container { max-width: 1000px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; }
.card { background: #f8f9fa; border: 1px solid #dee2e6; border-radius: 6px; padding: 20px; margin: 15px 0; }
.card-title { color: #2c3e50; font-size: 1.2em; font-weight: bold; margin-bottom: 10px; }
.metric-value { font-size: 1.4em; color: #27ae60; font-weight: bold; }
.price { color: #27ae60; font-weight: bold; }
.muted { color: #7f8c8d; font-size: 0.9em; }
.rating { padding: 8px 16px; border-radius: 4px; color: white; display: inline-block; }
.excellent { background: #27ae60; }
.good { background: #f39c12; }
.fair { background: #e67e22; }
.poor { background: #e74c3c; }
.recommendations { background: #ecf0f1; padding: 15px; border-radius: 4px; margin-top: 15px; }
nav a { color: #3498db; margin-right: 12px; }
";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n<div class=\"container\">\n{}</div>\n</body>\n</html>\n",
        encode_text(title),
        STYLE,
        body
    )
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{}</li>\n", encode_text(item)))
        .collect()
}

fn property_card(property: &Property) -> String {
    format!(
        "<div class=\"card\">\n<div class=\"card-title\">{}</div>\n<p>{}</p>\n<p class=\"price\">{}</p>\n<p class=\"muted\">{} &middot; listed {}</p>\n</div>\n",
        encode_text(&property.title),
        encode_text(&property.description),
        encode_text(&property.price.formatted()),
        encode_text(&property.location),
        property.created_at.format("%Y-%m-%d %H:%M"),
    )
}

/// The listing page. `cache_notes` are shown as-is in the footer, one per line.
pub fn render_property_list(properties: &[Property], total_count: u64, cache_notes: &[String]) -> String {
    let cards: String = if properties.is_empty() {
        "<p>No properties available.</p>\n".to_string()
    } else {
        properties.iter().map(property_card).collect()
    };
    let notes: String = cache_notes
        .iter()
        .map(|note| format!("<p class=\"muted\">{}</p>\n", encode_text(note)))
        .collect();

    let body = format!(
        "<h1>Property Listings</h1>\n\
         <p class=\"muted\">{} properties</p>\n\
         {}\
         <div class=\"recommendations\">\n{}<p class=\"muted\">Rendered at {}</p>\n</div>\n\
         <nav><a href=\"?format=json\">View as JSON</a><a href=\"/properties/cache-status/\">Cache Status</a><a href=\"/properties/redis-metrics/\">Cache Metrics</a></nav>\n",
        total_count,
        cards,
        notes,
        timestamp(),
    );

    page("Property Listings", &body)
}

pub fn render_metrics_dashboard(metrics: &MetricsSnapshot) -> String {
    let perf = &metrics.cache_performance;

    let performance = format!(
        "<div class=\"card\">\n<div class=\"card-title\">Cache Performance</div>\n<div class=\"metric-value\">{:.2}% Hit Ratio</div>\n<div class=\"rating {}\">{}</div>\n<p><strong>Hits:</strong> {}</p>\n<p><strong>Misses:</strong> {}</p>\n<p><strong>Total Operations:</strong> {}</p>\n<p><strong>Expired Keys:</strong> {}</p>\n<p><strong>Evicted Keys:</strong> {}</p>\n</div>\n",
        perf.hit_ratio_percent,
        perf.performance_rating.css_class(),
        perf.performance_rating,
        perf.keyspace_hits,
        perf.keyspace_misses,
        perf.total_operations,
        perf.expired_keys,
        perf.evicted_keys,
    );
    let memory = format!(
        "<div class=\"card\">\n<div class=\"card-title\">Memory Usage</div>\n<p><strong>Used Memory:</strong> {}</p>\n<p><strong>Peak Memory:</strong> {}</p>\n</div>\n",
        encode_text(&metrics.memory_usage.used_memory_human),
        encode_text(&metrics.memory_usage.used_memory_peak_human),
    );
    let server = format!(
        "<div class=\"card\">\n<div class=\"card-title\">Server Information</div>\n<p><strong>Backend:</strong> {}</p>\n<p><strong>Version:</strong> {}</p>\n<p><strong>Uptime:</strong> {}</p>\n<p><strong>Connected Clients:</strong> {}</p>\n<p><strong>Commands Processed:</strong> {}</p>\n</div>\n",
        encode_text(&metrics.server_info.backend),
        encode_text(&metrics.server_info.redis_version),
        encode_text(&metrics.server_info.uptime_human),
        metrics.connection_stats.connected_clients,
        metrics.connection_stats.total_commands_processed,
    );
    let analysis = format!(
        "<div class=\"card\">\n<div class=\"card-title\">Cache Efficiency Analysis</div>\n<p>{}</p>\n<div class=\"recommendations\">\n<strong>Recommendations:</strong>\n<ul>\n{}</ul>\n</div>\n</div>\n",
        encode_text(&metrics.analysis.cache_efficiency),
        list_items(&metrics.analysis.recommendations),
    );

    let body = format!(
        "<h1>Cache Performance Metrics</h1>\n{}{}{}{}\
         <nav><a href=\"/properties/\">Back to Properties</a><a href=\"/properties/cache-status/\">Cache Status</a><a href=\"?format=json\">View as JSON</a></nav>\n",
        performance, memory, server, analysis,
    );

    page("Cache Metrics", &body)
}

pub fn render_metrics_error(error: &str, recommendations: &[String]) -> String {
    let body = format!(
        "<h1>Error Retrieving Cache Metrics</h1>\n\
         <p style=\"color: #e74c3c;\">{}</p>\n\
         <h3>Recommendations:</h3>\n<ul>\n{}</ul>\n\
         <nav><a href=\"/properties/\">Back to Properties</a></nav>\n",
        encode_text(error),
        list_items(recommendations),
    );

    page("Cache Metrics Error", &body)
}
