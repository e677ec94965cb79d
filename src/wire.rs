use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub object_name: String,
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetObjectRequest {
    pub bucket: String,
    pub object_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetObjectResponse {
    pub bucket: String,
    pub object: String,
    #[serde(default)]
    pub data: Option<String>,
}

/// Body the server attaches to 4xx responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

pub const DETAIL_BUCKET_EXISTS: &str = "Bucket already exists";
pub const DETAIL_BUCKET_NOT_FOUND: &str = "Bucket not found";
pub const DETAIL_OBJECT_NOT_FOUND: &str = "Object not found";
