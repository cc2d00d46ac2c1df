//! Request metrics for the two catalogs
//!
//! Tracks success rates, error counts, and response times per endpoint

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointMetrics {
    pub endpoint: String,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub average_response_time_ms: f64,
    pub total_response_time_ms: u64,
    pub rate_limit_hits: u64,
    pub challenge_blocks: u64,
}

impl EndpointMetrics {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            last_success: None,
            last_failure: None,
            last_error: None,
            average_response_time_ms: 0.0,
            total_response_time_ms: 0,
            rate_limit_hits: 0,
            challenge_blocks: 0,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.successful_requests as f64 / self.total_requests as f64) * 100.0
        }
    }

    pub fn record_success(&mut self, response_time: Duration) {
        self.total_requests += 1;
        self.successful_requests += 1;
        self.last_success = Some(Utc::now());

        let response_ms = response_time.as_millis() as u64;
        self.total_response_time_ms += response_ms;
        self.average_response_time_ms =
            self.total_response_time_ms as f64 / self.successful_requests as f64;
    }

    pub fn record_failure(&mut self, status: Option<u16>, error: String) {
        self.total_requests += 1;
        self.failed_requests += 1;
        self.last_failure = Some(Utc::now());
        self.last_error = Some(error);

        match status {
            Some(429) => self.rate_limit_hits += 1,
            // challenge pages answer 403 or 503 until cookies are valid
            Some(403) | Some(503) => self.challenge_blocks += 1,
            _ => {}
        }
    }
}

/// Per-endpoint metrics for one run
#[derive(Default)]
pub struct MetricsTracker {
    metrics: Mutex<HashMap<String, EndpointMetrics>>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entry<F: FnOnce(&mut EndpointMetrics)>(&self, endpoint: &str, f: F) {
        // counts stay usable after a poisoning panic
        let mut metrics = self.metrics.lock().unwrap_or_else(|e| e.into_inner());
        let entry = metrics
            .entry(endpoint.to_string())
            .or_insert_with(|| EndpointMetrics::new(endpoint.to_string()));
        f(entry);
    }

    pub fn record_success(&self, endpoint: &str, response_time: Duration) {
        self.with_entry(endpoint, |m| m.record_success(response_time));
        log::debug!("[{}] Success - Response time: {}ms", endpoint, response_time.as_millis());
    }

    pub fn record_failure(&self, endpoint: &str, status: Option<u16>, error: String) {
        self.with_entry(endpoint, |m| m.record_failure(status, error));
    }

    pub fn get_metrics(&self, endpoint: &str) -> Option<EndpointMetrics> {
        let metrics = self.metrics.lock().unwrap_or_else(|e| e.into_inner());
        metrics.get(endpoint).cloned()
    }

    pub fn get_all_metrics(&self) -> Vec<EndpointMetrics> {
        let metrics = self.metrics.lock().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<EndpointMetrics> = metrics.values().cloned().collect();
        all.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
        all
    }

    pub fn log_summary(&self) {
        for m in self.get_all_metrics() {
            log::info!(
                "[{}] {} requests, {} ok, {} failed ({:.2}% success), avg {:.0}ms, {} rate limited, {} challenge blocks",
                m.endpoint,
                m.total_requests,
                m.successful_requests,
                m.failed_requests,
                m.success_rate(),
                m.average_response_time_ms,
                m.rate_limit_hits,
                m.challenge_blocks
            );
            if let Some(last_error) = &m.last_error {
                log::info!("[{}] Last error: {}", m.endpoint, last_error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let tracker = MetricsTracker::new();
        tracker.record_success("catalog", Duration::from_millis(100));
        tracker.record_success("catalog", Duration::from_millis(300));
        tracker.record_failure("catalog", Some(500), "boom".to_string());
        tracker.record_failure("catalog", None, "reset".to_string());

        let m = tracker.get_metrics("catalog").unwrap();
        assert_eq!(m.total_requests, 4);
        assert_eq!(m.success_rate(), 50.0);
        assert_eq!(m.average_response_time_ms, 200.0);
        assert_eq!(m.last_error.as_deref(), Some("reset"));
    }

    #[test]
    fn test_failure_categories() {
        let tracker = MetricsTracker::new();
        tracker.record_failure("ranking", Some(429), "slow down".to_string());
        tracker.record_failure("ranking", Some(403), "challenge".to_string());

        let m = tracker.get_metrics("ranking").unwrap();
        assert_eq!(m.rate_limit_hits, 1);
        assert_eq!(m.challenge_blocks, 1);
    }

    #[test]
    fn test_all_metrics_sorted() {
        let tracker = MetricsTracker::new();
        tracker.record_success("ranking", Duration::from_millis(1));
        tracker.record_success("catalog", Duration::from_millis(1));
        let names: Vec<String> = tracker.get_all_metrics().into_iter().map(|m| m.endpoint).collect();
        assert_eq!(names, vec!["catalog", "ranking"]);
        assert!(tracker.get_metrics("missing").is_none());
    }
}
