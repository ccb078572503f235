//! Shared application state for the web server.

use std::sync::Arc;
use tracing::{info, warn};

use floatpoint_inference::{GradioBackend, GradioEndpoints};
use floatpoint_store::{IdentityResolver, PersistenceWriter, RecordStore, SupabaseClient, TableNames};

use crate::config::{Config, SupabaseConfig};
use crate::dispatch::{PredictOptions, Predictor};

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub predictor: Predictor,
    /// Also used directly by the history endpoints, which reject anonymous callers.
    pub identity: IdentityResolver,
    pub store: Option<Arc<dyn RecordStore>>,
    pub history_limit: usize,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        predictor: Predictor,
        identity: IdentityResolver,
        store: Option<Arc<dyn RecordStore>>,
        history_limit: usize,
    ) -> Self {
        Self { predictor, identity, store, history_limit }
    }

    /// Wire the Gradio backend and, when credentials are present, Supabase.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let inference = config.inference;
        let options = PredictOptions {
            timeout: inference.timeout(),
            strip_summary_suffix: inference.strip_summary_suffix,
        };
        let endpoints = GradioEndpoints {
            nlp: inference.nlp_endpoint,
            bgc: inference.bgc_endpoint,
            spatial_temporal: inference.spatial_endpoint,
        };
        let mut backend = GradioBackend::new(inference.base_url, endpoints)?;
        if let Some(token) = inference.api_token {
            backend = backend.with_api_token(token);
        }
        info!(space = %backend.base_url, timeout = ?options.timeout, "Inference backend ready");

        let auth_timeout = config.supabase.auth_timeout();
        let SupabaseConfig {
            url,
            anon_key,
            service_role_key,
            predictions_table,
            queries_table,
            history_limit,
            ..
        } = config.supabase;

        let (identity, store, writer) = match (url.filter(|u| !u.is_empty()), anon_key, service_role_key) {
            (Some(url), Some(anon), Some(service)) => {
                info!(%url, "Supabase identity and persistence enabled");
                let client = Arc::new(
                    SupabaseClient::new(url, anon, service)?.with_queries_table(queries_table.clone()),
                );
                let store: Arc<dyn RecordStore> = client.clone();
                let tables = TableNames { predictions: predictions_table, queries: queries_table };
                (
                    IdentityResolver::new(client).with_timeout(auth_timeout),
                    Some(store.clone()),
                    PersistenceWriter::new(store, tables),
                )
            }
            _ => {
                warn!("Supabase not configured; all requests are anonymous and nothing is persisted");
                (IdentityResolver::anonymous(), None, PersistenceWriter::disabled())
            }
        };

        let predictor = Predictor::new(Arc::new(backend), identity.clone(), writer, options);
        Ok(Self::new(predictor, identity, store, history_limit))
    }
}
