//! BGC path: six readings out, labelled values back, normalised into six numbers.

use floatpoint_common::{BgcInput, BgcPrediction, PredictionResult, Region};
use floatpoint_inference::{normalise::normalise_bgc_reply, InferenceBackend, InferenceError};
use floatpoint_store::{PersistenceRecord, PredictionRow};

pub(super) async fn predict(
    backend: &dyn InferenceBackend,
    input: &BgcInput,
) -> Result<BgcPrediction, InferenceError> {
    let reply = backend.predict_bgc(input).await?;
    Ok(normalise_bgc_reply(&reply))
}

/// The region comes from the submitted readings, not the predicted ones.
pub(super) fn result(input: &BgcInput, prediction: BgcPrediction) -> PredictionResult {
    let region = Region::classify(input.temperature, input.salinity, input.pressure);
    PredictionResult::Bgc { prediction, region }
}

pub(super) fn record(
    input: &BgcInput,
    prediction: Result<&BgcPrediction, &InferenceError>,
) -> PersistenceRecord {
    let row = match prediction {
        Ok(p) => PredictionRow::new(input, Ok(p)),
        Err(e) => PredictionRow::new(input, Err(&e.to_string())),
    };
    PersistenceRecord::Prediction(row)
}
