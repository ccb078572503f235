//! Natural-language path. The answer text is passed through, only trimmed of
//! the "… and N more data points" tail when configured to.

use chrono::{DateTime, Utc};
use floatpoint_inference::{normalise::strip_summary_suffix, InferenceBackend, InferenceError};
use floatpoint_store::{PersistenceRecord, QueryRow};

pub(super) async fn predict(
    backend: &dyn InferenceBackend,
    text: &str,
    strip_suffix: bool,
) -> Result<String, InferenceError> {
    let reply = backend.process_nl_query(text).await?;
    Ok(if strip_suffix { strip_summary_suffix(&reply.text) } else { reply.text })
}

pub(super) fn record(
    text: &str,
    answer: Result<&String, &InferenceError>,
    timestamp: DateTime<Utc>,
) -> PersistenceRecord {
    let row = match answer {
        Ok(answer) => QueryRow::nlp(text, Ok(answer.as_str()), timestamp),
        Err(e) => QueryRow::nlp(text, Err(&e.to_string()), timestamp),
    };
    PersistenceRecord::Query(row)
}
