//! HTTP handlers for the storage API

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use super::store::{Store, StoreError};
use crate::{
    wire::{ErrorBody, GetObjectRequest, GetObjectResponse, PutObjectRequest},
    BucketCreated, Health, ObjectList, PutObjectResult,
};

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match self {
            StoreError::BucketExists(_) => StatusCode::BAD_REQUEST,
            StoreError::BucketNotFound(_) | StoreError::ObjectNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
        };
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn health() -> Json<Health> {
    let time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default();
    Json(Health {
        status: "ok".to_owned(),
        time,
    })
}

pub async fn list_buckets(State(store): State<Arc<Store>>) -> Json<Vec<String>> {
    let buckets = store.list_buckets();
    info!(count = buckets.len(), "Listed buckets");
    Json(buckets)
}

pub async fn create_bucket(
    State(store): State<Arc<Store>>,
    Path(bucket): Path<String>,
) -> Result<Json<BucketCreated>, StoreError> {
    store.create_bucket(&bucket)?;
    info!(bucket = %bucket, "Created bucket");
    Ok(Json(BucketCreated { bucket }))
}

pub async fn list_objects(
    State(store): State<Arc<Store>>,
    Path(bucket): Path<String>,
) -> Result<Json<ObjectList>, StoreError> {
    let objects = store.list_objects(&bucket)?;
    info!(bucket = %bucket, count = objects.len(), "Listed objects");
    Ok(Json(ObjectList { bucket, objects }))
}

pub async fn put_object(
    State(store): State<Arc<Store>>,
    Json(req): Json<PutObjectRequest>,
) -> Json<PutObjectResult> {
    let size = store.put_object(&req.bucket, &req.object_name, req.data.into_bytes());
    info!(bucket = %req.bucket, object = %req.object_name, size, "Stored object");
    Json(PutObjectResult {
        bucket: req.bucket,
        object: req.object_name,
        size: size as u64,
    })
}

pub async fn get_object(
    State(store): State<Arc<Store>>,
    Json(req): Json<GetObjectRequest>,
) -> Result<Json<GetObjectResponse>, StoreError> {
    let bytes = store.get_object(&req.bucket, &req.object_name)?;
    let data = String::from_utf8_lossy(&bytes).into_owned();
    info!(bucket = %req.bucket, object = %req.object_name, size = bytes.len(), "Read object");
    Ok(Json(GetObjectResponse {
        bucket: req.bucket,
        object: req.object_name,
        data: Some(data),
    }))
}
