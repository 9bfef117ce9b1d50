use std::fmt::Write;

pub struct MetricMetadata {
    name: &'static str,
    description: &'static str,
}

pub static METRIC_REQUEST_PROCESSING_SECONDS: MetricMetadata = MetricMetadata {
    name: "request_processing_seconds",
    description: "Latency of adapter requests (websocket receive loop iteration, REST page fetch)",
};

pub static METRIC_REQUEST_COUNT: MetricMetadata = MetricMetadata {
    name: "request_count",
    description: "Number of adapter requests issued per exchange",
};

pub static METRIC_HEARTBEAT_RESPONSES: MetricMetadata = MetricMetadata {
    name: "heartbeat_responses",
    description: "Number of heartbeat messages observed and suppressed per exchange",
};

pub static METRIC_BARS_EMITTED_TOTAL: MetricMetadata = MetricMetadata {
    name: "bars_emitted_total",
    description: "Number of bars emitted to the bars topic, by product_id and bar_type",
};

impl MetricMetadata {
    pub fn name(&self) -> String {
        self.name_with_prefix("tickstream_".to_string())
    }

    pub fn name_with_prefix(&self, mut prefix: String) -> String {
        let _ = prefix.write_str(self.name);
        prefix
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

pub static LABEL_EXCHANGE: &str = "exchange";
pub static LABEL_PRODUCT_ID: &str = "product_id";
pub static LABEL_BAR_TYPE: &str = "bar_type";
