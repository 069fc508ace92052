use spantopo_core::config::AnalysisConfig;
use spantopo_core::model::database::DatabaseSlowStatement;
use spantopo_core::segment::SpanView;
use spantopo_core::time;

pub const DB_STATEMENT_TAG: &str = "db.statement";
pub const DB_TYPE_TAG: &str = "db.type";

/// Scans a database exit span's tags and returns a slow-statement record
/// when the span's latency strictly exceeds the threshold configured for
/// its `db.type`.
///
/// The two relevant tags may appear in either order, so the statement text
/// and the threshold check are evaluated independently and the slow flag is
/// decided only after the full tag set has been scanned.
pub fn detect(
    span: &SpanView,
    config: &AnalysisConfig,
    database_service_id: i32,
    latency_ms: i64,
    segment_id: &str,
    trace_id: Option<String>,
) -> Option<DatabaseSlowStatement> {
    let mut statement = String::new();
    let mut is_slow = false;

    for tag in &span.tags {
        match tag.key.as_str() {
            DB_STATEMENT_TAG => {
                statement = truncate(&tag.value, config.max_slow_sql_length);
            }
            DB_TYPE_TAG => {
                let threshold = config.db_latency_thresholds.threshold(&tag.value);
                if latency_ms > threshold {
                    is_slow = true;
                }
            }
            _ => {}
        }
    }

    if !is_slow {
        return None;
    }

    Some(DatabaseSlowStatement {
        id: format!("{segment_id}-{}", span.span_id),
        database_service_id,
        statement,
        latency_ms,
        trace_id,
        time_bucket: time::minute_bucket(span.start_time_ms),
    })
}

fn truncate(statement: &str, max_len: usize) -> String {
    match statement.char_indices().nth(max_len) {
        Some((idx, _)) => statement[..idx].to_string(),
        None => statement.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use spantopo_core::segment::{SpanLayer, SpanTag};

    use super::*;

    fn db_span(latency_ms: i64, tags: Vec<SpanTag>) -> SpanView {
        SpanView {
            span_id: 2,
            layer: SpanLayer::Database,
            start_time_ms: 1_700_000_000_000,
            end_time_ms: 1_700_000_000_000 + latency_ms,
            is_error: false,
            operation_id: 310,
            peer_id: 91,
            component_id: 33,
            tags,
            refs: Vec::new(),
        }
    }

    fn config() -> AnalysisConfig {
        let mut cfg = AnalysisConfig::default();
        cfg.db_latency_thresholds =
            spantopo_core::config::DbLatencyThresholds::parse("default:200,mysql:100").unwrap();
        cfg
    }

    #[test]
    fn latency_over_threshold_is_slow() {
        let span = db_span(
            150,
            vec![
                SpanTag::new(DB_TYPE_TAG, "mysql"),
                SpanTag::new(DB_STATEMENT_TAG, "select * from orders"),
            ],
        );
        let statement = detect(&span, &config(), 4, 150, "seg-1", None).unwrap();
        assert_eq!(statement.id, "seg-1-2");
        assert_eq!(statement.statement, "select * from orders");
        assert_eq!(statement.latency_ms, 150);
    }

    #[test]
    fn latency_under_threshold_is_not_slow() {
        let span = db_span(
            50,
            vec![
                SpanTag::new(DB_TYPE_TAG, "mysql"),
                SpanTag::new(DB_STATEMENT_TAG, "select 1"),
            ],
        );
        assert!(detect(&span, &config(), 4, 50, "seg-1", None).is_none());
    }

    #[test]
    fn latency_equal_to_threshold_is_not_slow() {
        let span = db_span(100, vec![SpanTag::new(DB_TYPE_TAG, "mysql")]);
        assert!(detect(&span, &config(), 4, 100, "seg-1", None).is_none());
    }

    #[test]
    fn tag_order_does_not_matter() {
        let statement_first = db_span(
            150,
            vec![
                SpanTag::new(DB_STATEMENT_TAG, "select * from orders"),
                SpanTag::new(DB_TYPE_TAG, "mysql"),
            ],
        );
        let type_first = db_span(
            150,
            vec![
                SpanTag::new(DB_TYPE_TAG, "mysql"),
                SpanTag::new(DB_STATEMENT_TAG, "select * from orders"),
            ],
        );

        let a = detect(&statement_first, &config(), 4, 150, "seg-1", None).unwrap();
        let b = detect(&type_first, &config(), 4, 150, "seg-1", None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn long_statements_are_truncated_to_the_cap() {
        let long_statement: String = "x".repeat(5000);
        let mut cfg = config();
        cfg.max_slow_sql_length = 2000;

        let span = db_span(
            300,
            vec![
                SpanTag::new(DB_TYPE_TAG, "mysql"),
                SpanTag::new(DB_STATEMENT_TAG, long_statement.clone()),
            ],
        );
        let statement = detect(&span, &cfg, 4, 300, "seg-1", None).unwrap();
        assert_eq!(statement.statement.chars().count(), 2000);
        assert_eq!(statement.statement, long_statement[..2000]);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("héllo", 10), "héllo");
    }

    #[test]
    fn unknown_db_type_uses_default_threshold() {
        let span = db_span(250, vec![SpanTag::new(DB_TYPE_TAG, "h2")]);
        assert!(detect(&span, &config(), 4, 250, "seg-1", None).is_some());

        let span = db_span(150, vec![SpanTag::new(DB_TYPE_TAG, "h2")]);
        assert!(detect(&span, &config(), 4, 150, "seg-1", None).is_none());
    }

    #[test]
    fn bucket_comes_from_the_span_itself() {
        let span = db_span(150, vec![SpanTag::new(DB_TYPE_TAG, "mysql")]);
        let statement = detect(&span, &config(), 4, 150, "seg-1", None).unwrap();
        assert_eq!(statement.time_bucket, time::minute_bucket(span.start_time_ms));
    }
}
