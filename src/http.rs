use std::sync::Arc;

use axum::{
    extract::{
        rejection::JsonRejection,
        Request,
        State,
    },
    http::{
        header,
        HeaderValue,
        Method,
        StatusCode,
    },
    middleware::{
        from_fn,
        Next,
    },
    response::{
        IntoResponse,
        Response,
    },
    routing::{
        get,
        post,
    },
    Json, Router,
};
use log::{
    info, warn
};
use mongodb::bson;
use serde_json::{
    json, Value
};

use crate::{
    config::StoreSettings,
    db::{
        self,
        Job, Model, Pipeline, Record,
    },
    error::ApiError,
    job::GenerateRequest,
    probe::{
        self,
        StatusReport,
    },
    schema,
    store::{
        self,
        DocumentStore,
        StoreError,
    },
};

const ALLOW_METHODS: &str = "GET,POST,PUT,PATCH,DELETE,OPTIONS";

#[derive(Clone)]
pub struct AppState {
    // `None` while no database is configured or reachable
    pub store: Option<Arc<dyn DocumentStore>>,

    pub settings: StoreSettings,
}

impl AppState {
    pub fn new(
        store: Option<Arc<dyn DocumentStore>>,
        settings: StoreSettings,
    ) -> Self {
        Self {
            store,
            settings,
        }
    }

    fn store(&self) -> Result<&dyn DocumentStore, StoreError> {
        self.store
            .as_deref()
            .ok_or(StoreError::Unavailable)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/test", get(status_handler))
        .route("/schema", get(schema_handler))
        .route("/models", post(create_model_handler).get(list_models_handler))
        .route("/pipelines", post(create_pipeline_handler).get(list_pipelines_handler))
        .route("/jobs", post(create_job_handler).get(list_jobs_handler))
        .route("/generate", post(generate_handler))
        .layer(from_fn(cors_middleware))
        .with_state(state)
}

// open to any origin, credentials included
async fn cors_middleware(
    req: Request,
    next: Next,
) -> Response {
    let origin = req.headers()
        .get(header::ORIGIN)
        .cloned();
    let requested_headers = req.headers()
        .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
        .cloned();
    let mut resp = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };
    let headers = resp.headers_mut();
    if origin.is_some() {
        headers.insert(header::VARY, HeaderValue::from_static("origin"));
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        origin.unwrap_or(HeaderValue::from_static("*")),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        requested_headers.unwrap_or(HeaderValue::from_static("*")),
    );
    resp
}

async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Model Studio API is running" }))
}

async fn status_handler(State(state): State<AppState>) -> Json<StatusReport> {
    Json(
        probe::status_report(
            state.store.as_deref(),
            &state.settings
        )
        .await
    )
}

async fn schema_handler() -> Json<Value> {
    Json(json!({ "collections": schema::collections() }))
}

// validates, stamps and inserts a record, returning its public id
async fn insert_record<T: Record>(
    state: &AppState,
    record: &T,
) -> Result<String, ApiError> {
    record.validate()
        .map_err(ApiError::Validation)?;
    let store = state.store()?;
    let mut doc = bson::to_document(record)
        .map_err(StoreError::from)?;
    store::stamp(&mut doc);
    let oid = store
        .insert(T::COLLECTION, doc)
        .await
        .map_err(|e| {
            warn!("DB insert into `{}` failed: `{e:?}`", T::COLLECTION);
            e
        })?;
    let id = store::id_string(&oid);
    info!("Inserted a record into `{}` with id `{id}`.", T::COLLECTION);
    Ok(id)
}

// an unavailable store reads as an empty collection
async fn list_records(
    state: &AppState,
    collection: &str,
) -> Result<Json<Value>, ApiError> {
    let Some(store) = state.store.as_deref() else {
        return Ok(Json(json!({ "items": [] })));
    };
    let docs = store
        .find_all(collection)
        .await
        .map_err(|e| {
            warn!("DB read of `{collection}` failed: `{e:?}`");
            e
        })?;
    let items: Vec<Value> = docs
        .into_iter()
        .map(store::to_public_json)
        .collect();
    Ok(Json(json!({ "items": items })))
}

async fn create_model_handler(
    State(state): State<AppState>,
    payload: Result<Json<Model>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(model) = payload?;
    let id = insert_record(&state, &model).await?;
    Ok(Json(json!({ "id": id })))
}

async fn list_models_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    list_records(&state, db::MODELS).await
}

async fn create_pipeline_handler(
    State(state): State<AppState>,
    payload: Result<Json<Pipeline>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(pipeline) = payload?;
    let id = insert_record(&state, &pipeline).await?;
    Ok(Json(json!({ "id": id })))
}

async fn list_pipelines_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    list_records(&state, db::PIPELINES).await
}

async fn create_job_handler(
    State(state): State<AppState>,
    payload: Result<Json<Job>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(job) = payload?;
    let id = insert_record(&state, &job).await?;
    Ok(Json(json!({ "id": id, "status": job.status.as_str() })))
}

async fn list_jobs_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    list_records(&state, db::JOBS).await
}

// enqueues nothing: the only effect is a queued job record
async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload?;
    let job = req.into_job();
    let job_id = insert_record(&state, &job).await?;
    Ok(Json(json!({ "job_id": job_id, "status": job.status.as_str() })))
}
