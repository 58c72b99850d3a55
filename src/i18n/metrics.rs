//! Translation metrics for a single run.
//!
//! Counts how prompts were resolved: from the cache, by an API call, or not
//! at all. The coordinator owns one instance per run and logs the report at
//! the end.

use std::fmt;

#[derive(Debug, Default, Clone)]
pub struct TranslationMetrics {
    /// (prompt, language) pairs resolved from previously stored translations
    cache_hits: usize,

    /// (prompt, language) pairs that had no stored translation
    cache_misses: usize,

    /// Number of API calls made to the translation service
    api_calls: usize,

    /// Number of API calls that produced no usable translation
    api_failures: usize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    pub fn record_cache_miss(&mut self) {
        self.cache_misses += 1;
    }

    pub fn record_api_call(&mut self) {
        self.api_calls += 1;
    }

    pub fn record_api_failure(&mut self) {
        self.api_failures += 1;
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses
    }

    pub fn api_calls(&self) -> usize {
        self.api_calls
    }

    pub fn api_failures(&self) -> usize {
        self.api_failures
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits;
        let misses = self.cache_misses;
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        let calls = self.api_calls;
        let failures = self.api_failures.min(calls);
        let api_success_rate = if calls > 0 {
            ((calls - failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            api_calls: calls,
            api_failures: failures,
            api_success_rate,
        }
    }
}

/// Metrics report containing the statistics of a run.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub api_calls: usize,
    pub api_failures: usize,

    /// API success rate as a percentage (0-100)
    pub api_success_rate: f64,
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cache hits: {}, cache misses: {} ({:.1}% hit rate), api calls: {}, api failures: {} ({:.1}% success rate)",
            self.cache_hits,
            self.cache_misses,
            self.cache_hit_rate,
            self.api_calls,
            self.api_failures,
            self.api_success_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Counter Tests ====================

    #[test]
    fn test_record_cache_hit() {
        let mut metrics = TranslationMetrics::new();

        assert_eq!(metrics.cache_hits(), 0);
        metrics.record_cache_hit();
        assert_eq!(metrics.cache_hits(), 1);
        metrics.record_cache_hit();
        assert_eq!(metrics.cache_hits(), 2);
    }

    #[test]
    fn test_record_api_call_and_failure() {
        let mut metrics = TranslationMetrics::new();

        metrics.record_api_call();
        metrics.record_api_failure();
        metrics.record_cache_miss();

        assert_eq!(metrics.api_calls(), 1);
        assert_eq!(metrics.api_failures(), 1);
        assert_eq!(metrics.cache_misses(), 1);
    }

    #[test]
    fn test_instances_are_independent() {
        let mut first = TranslationMetrics::new();
        let second = TranslationMetrics::new();

        first.record_api_call();

        assert_eq!(first.api_calls(), 1);
        assert_eq!(second.api_calls(), 0);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = TranslationMetrics::new().report();

        assert_eq!(report.cache_hits, 0);
        assert_eq!(report.cache_hit_rate, 0.0);
        assert_eq!(report.api_calls, 0);
        assert_eq!(report.api_success_rate, 0.0);
    }

    #[test]
    fn test_report_cache_hit_rate() {
        let mut metrics = TranslationMetrics::new();

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();

        let report = metrics.report();
        assert_eq!(report.cache_hits, 3);
        assert_eq!(report.cache_misses, 1);
        assert_eq!(report.cache_hit_rate, 75.0);
    }

    #[test]
    fn test_report_api_success_rate() {
        let mut metrics = TranslationMetrics::new();

        // 4 calls, 1 failure = 75% success rate
        for _ in 0..4 {
            metrics.record_api_call();
        }
        metrics.record_api_failure();

        let report = metrics.report();
        assert_eq!(report.api_calls, 4);
        assert_eq!(report.api_failures, 1);
        assert_eq!(report.api_success_rate, 75.0);
    }

    #[test]
    fn test_report_display() {
        let mut metrics = TranslationMetrics::new();
        metrics.record_cache_hit();
        metrics.record_api_call();

        let line = metrics.report().to_string();
        assert!(line.contains("cache hits: 1"));
        assert!(line.contains("100.0% hit rate"));
        assert!(line.contains("api calls: 1"));
    }
}
