//! Prometheus registry for the command-line runner.

use once_cell::sync::Lazy;
use prometheus::{Encoder, Registry, TextEncoder};

/// Global metrics registry, holding every core metric.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    for metric in clipcurator_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
    registry
});

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipcurator_core::metrics;

    #[test]
    fn test_encoded_output_contains_core_metrics() {
        metrics::PAGES_SEARCHED.inc();
        metrics::API_UNITS.with_label_values(&["search"]).inc_by(100);

        let text = encode_metrics().unwrap();
        assert!(text.contains("curator_pages_searched_total"));
        assert!(text.contains("curator_api_units_total{kind=\"search\"}"));
    }
}
