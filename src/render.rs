//! Turning events into printable lines.

use riskwatch_types::{EventKind, ModelEvent};
use serde_json::Value;

/// How `watch` prints events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One readable line per event.
    #[default]
    Human,
    /// One JSON object per line, exactly as received.
    Json,
}

/// Render one event as a single line.
pub fn render_event(event: &ModelEvent, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(event).unwrap_or_else(|_| event.kind.to_string()),
        OutputFormat::Human => render_human(event),
    }
}

fn render_human(event: &ModelEvent) -> String {
    let headline = match &event.kind {
        EventKind::ModelUpdated => "Model updated".to_string(),
        EventKind::Other(tag) => tag.clone(),
    };

    let mut line = format!("[{}] {}", event.timestamp, headline);
    for (key, value) in &event.payload {
        line.push_str("  ");
        line.push_str(key);
        line.push('=');
        match value {
            Value::String(s) => line.push_str(s),
            other => line.push_str(&other.to_string()),
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn human_line_for_model_update() {
        let event = ModelEvent::new(EventKind::ModelUpdated, "2025-01-01T00:00:00Z");
        assert_eq!(
            render_event(&event, OutputFormat::Human),
            "[2025-01-01T00:00:00Z] Model updated"
        );
    }

    #[test]
    fn human_line_lists_payload() {
        let event = ModelEvent::new("drift_detected", "2025-01-02T00:00:00Z")
            .with_field("feature", json!("fatalities"))
            .with_field("score", json!(0.4));
        assert_eq!(
            render_event(&event, OutputFormat::Human),
            "[2025-01-02T00:00:00Z] drift_detected  feature=fatalities  score=0.4"
        );
    }

    #[test]
    fn json_line_is_wire_format() {
        let event = ModelEvent::new(EventKind::ModelUpdated, "2025-01-01T00:00:00Z")
            .with_field("version", json!(4));
        let line = render_event(&event, OutputFormat::Json);
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(
            parsed,
            json!({"type": "model_updated", "timestamp": "2025-01-01T00:00:00Z", "version": 4})
        );
    }
}
