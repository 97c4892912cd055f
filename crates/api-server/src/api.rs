use axum::{
    Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use domain::{DomainError, ImageMime};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use application::{ConfirmCommand, ImagePayload, ListQuery, UploadCommand};

use crate::state::AppState;

use tower_http::cors::{Any, CorsLayer};

pub fn create_router(state: Arc<AppState>, uploads_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/upload", post(upload_reading))
        .route("/confirm", patch(confirm_reading))
        .route("/{customer_code}/list", get(list_readings))
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(uploads_dir),
        )
        .layer(cors)
        .with_state(state)
}

/// HTTP-facing wrapper for domain errors. Every failure renders as a uniform
/// `{ error_code, error_description }` payload.
struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            DomainError::InvalidData(_) => (StatusCode::BAD_REQUEST, "INVALID_DATA"),
            DomainError::InvalidType(_) => (StatusCode::BAD_REQUEST, "INVALID_TYPE"),
            DomainError::MeasureNotFound(_) => (StatusCode::NOT_FOUND, "MEASURE_NOT_FOUND"),
            DomainError::MeasuresNotFound => (StatusCode::NOT_FOUND, "MEASURES_NOT_FOUND"),
            DomainError::DoubleReport => (StatusCode::CONFLICT, "DOUBLE_REPORT"),
            DomainError::ConfirmationDuplicate => {
                (StatusCode::CONFLICT, "CONFIRMATION_DUPLICATE")
            }
            DomainError::ExtractionFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "EXTRACTION_FAILED")
            }
            DomainError::Storage(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
            }
        };

        let body = json!({
            "error_code": code,
            "error_description": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// Unwraps the JSON extractor so a malformed or missing body renders the same
/// `{ error_code, error_description }` payload as every other failure, rather
/// than axum's plain-text rejection.
fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, DomainError> {
    body.map(|Json(value)| value)
        .map_err(|e| DomainError::InvalidData(format!("request body is not valid JSON: {}", e)))
}

fn str_field<'a>(body: &'a Value, name: &str) -> Result<&'a str, DomainError> {
    body.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| DomainError::InvalidData(format!("{} must be a string", name)))
}

fn f64_field(body: &Value, name: &str) -> Result<f64, DomainError> {
    body.get(name)
        .and_then(Value::as_f64)
        .ok_or_else(|| DomainError::InvalidData(format!("{} must be a number", name)))
}

/// Parses a `data:image/...;base64,...` URI into decoded bytes plus a
/// validated MIME type.
fn parse_image_field(raw: &str) -> Result<ImagePayload, DomainError> {
    let rest = raw
        .strip_prefix("data:")
        .ok_or_else(|| DomainError::InvalidData("image must be a base64 data URI".to_string()))?;

    let (mime_type, encoded) = rest.split_once(";base64,").ok_or_else(|| {
        DomainError::InvalidData("image data URI must declare base64 encoding".to_string())
    })?;

    let mime = ImageMime::from_mime_type(mime_type).ok_or_else(|| {
        DomainError::InvalidData(format!("unsupported image type: {}", mime_type))
    })?;

    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| DomainError::InvalidData(format!("image is not valid base64: {}", e)))?;

    Ok(ImagePayload {
        bytes: Bytes::from(bytes),
        mime,
    })
}

async fn upload_reading(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;
    let image = parse_image_field(str_field(&body, "image")?)?;
    debug!(bytes = image.bytes.len(), mime = image.mime.mime_type(), "upload received");

    let cmd = UploadCommand::new(
        str_field(&body, "customer_code")?,
        str_field(&body, "measure_datetime")?,
        str_field(&body, "measure_type")?,
        image,
    )?;

    let receipt = state.readings.upload(cmd).await?;

    Ok(Json(json!({
        "image_url": state.absolute_image_url(&receipt.image_url),
        "measure_value": receipt.measure_value,
        "measure_uuid": receipt.measure_uuid,
    })))
}

async fn confirm_reading(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = json_body(body)?;
    let cmd = ConfirmCommand::new(
        str_field(&body, "measure_uuid")?,
        f64_field(&body, "confirmed_value")?,
    )?;

    state.readings.confirm(cmd).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(serde::Deserialize)]
struct ListParams {
    measure_type: Option<String>,
}

async fn list_readings(
    Path(customer_code): Path<String>,
    Query(params): Query<ListParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let query = ListQuery::new(&customer_code, params.measure_type.as_deref())?;
    let readings = state.readings.list(query).await?;

    let measures: Vec<_> = readings
        .measures
        .iter()
        .map(|m| {
            json!({
                "measure_uuid": m.measure_uuid,
                "measure_datetime": m.measure_datetime,
                "measure_type": m.measure_type,
                "has_confirmed": m.has_confirmed,
                "image_url": state.absolute_image_url(&m.image_url),
            })
        })
        .collect();

    Ok(Json(json!({
        "customer_code": readings.customer_code,
        "measures": measures,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL: &[u8] = b"\x89PNG\r\n\x1a\nfake";

    fn pixel_uri() -> String {
        format!("data:image/png;base64,{}", BASE64.encode(PIXEL))
    }

    #[test]
    fn test_image_field_decodes_data_uri() {
        let payload = parse_image_field(&pixel_uri()).unwrap();
        assert_eq!(payload.mime, ImageMime::Png);
        assert_eq!(&payload.bytes[..], PIXEL);
    }

    #[test]
    fn test_image_field_rejects_plain_base64() {
        let result = parse_image_field(&BASE64.encode(PIXEL));
        assert!(matches!(result, Err(DomainError::InvalidData(_))));
    }

    #[test]
    fn test_image_field_rejects_unknown_mime() {
        let uri = format!("data:application/pdf;base64,{}", BASE64.encode(PIXEL));
        let result = parse_image_field(&uri);
        assert!(matches!(result, Err(DomainError::InvalidData(_))));
    }

    #[test]
    fn test_image_field_rejects_bad_base64() {
        let result = parse_image_field("data:image/png;base64,@@not-base64@@");
        assert!(matches!(result, Err(DomainError::InvalidData(_))));
    }

    #[test]
    fn test_missing_string_field_is_invalid_data() {
        let body = json!({ "customer_code": 42 });
        let result = str_field(&body, "customer_code");
        assert!(matches!(result, Err(DomainError::InvalidData(_))));
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (
                DomainError::InvalidData("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::InvalidType("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::MeasureNotFound("x".into()),
                StatusCode::NOT_FOUND,
            ),
            (DomainError::MeasuresNotFound, StatusCode::NOT_FOUND),
            (DomainError::DoubleReport, StatusCode::CONFLICT),
            (DomainError::ConfirmationDuplicate, StatusCode::CONFLICT),
            (
                DomainError::ExtractionFailed("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DomainError::Storage("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let response = ApiError(error).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    mod router {
        use super::*;
        use crate::state::AppState;
        use application::ReadingLifecycleService;
        use async_trait::async_trait;
        use axum::body::Body;
        use axum::http::Request;
        use domain::{
            CustomerCode, ImageStore, MeasureType, MeterImageExtractor, NaturalKey, Reading,
            ReadingRepository, StoredImage,
        };
        use tower::ServiceExt;
        use uuid::Uuid;

        struct EmptyRepository;

        #[async_trait]
        impl ReadingRepository for EmptyRepository {
            async fn insert(&self, _reading: &Reading) -> Result<(), DomainError> {
                Ok(())
            }

            async fn update(&self, reading: &Reading) -> Result<(), DomainError> {
                Err(DomainError::MeasureNotFound(reading.id().to_string()))
            }

            async fn find_by_id(&self, _id: Uuid) -> Result<Option<Reading>, DomainError> {
                Ok(None)
            }

            async fn find_by_natural_key(
                &self,
                _key: &NaturalKey,
            ) -> Result<Option<Reading>, DomainError> {
                Ok(None)
            }

            async fn find_by_customer(
                &self,
                _customer_code: &CustomerCode,
                _measure_type: Option<MeasureType>,
            ) -> Result<Vec<Reading>, DomainError> {
                Ok(Vec::new())
            }
        }

        struct FixedExtractor;

        #[async_trait]
        impl MeterImageExtractor for FixedExtractor {
            async fn extract(&self, _image: &[u8], _mime: ImageMime) -> Result<String, DomainError> {
                Ok("1".to_string())
            }
        }

        struct NullImageStore;

        #[async_trait]
        impl ImageStore for NullImageStore {
            async fn store(
                &self,
                _bytes: &[u8],
                mime: ImageMime,
            ) -> Result<StoredImage, DomainError> {
                Ok(StoredImage {
                    file_name: format!("img{}", mime.extension()),
                    url_path: format!("/uploads/img{}", mime.extension()),
                })
            }

            async fn remove(&self, _file_name: &str) -> Result<(), DomainError> {
                Ok(())
            }
        }

        fn test_router() -> Router {
            let readings = ReadingLifecycleService::new(
                Arc::new(EmptyRepository),
                Arc::new(FixedExtractor),
                Arc::new(NullImageStore),
            );
            create_router(Arc::new(AppState::new(readings, None)), "uploads")
        }

        async fn send(request: Request<Body>) -> (StatusCode, Value) {
            let response = test_router().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, serde_json::from_slice(&bytes).unwrap())
        }

        #[tokio::test]
        async fn test_malformed_json_body_renders_uniform_error() {
            let request = Request::builder()
                .method("PATCH")
                .uri("/confirm")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap();

            let (status, body) = send(request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error_code"], "INVALID_DATA");
            assert!(body["error_description"].is_string());
        }

        #[tokio::test]
        async fn test_missing_body_renders_uniform_error() {
            let request = Request::builder()
                .method("POST")
                .uri("/upload")
                .body(Body::empty())
                .unwrap();

            let (status, body) = send(request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error_code"], "INVALID_DATA");
        }

        #[tokio::test]
        async fn test_listing_unknown_customer_renders_not_found_payload() {
            let request = Request::builder()
                .method("GET")
                .uri("/C1/list")
                .body(Body::empty())
                .unwrap();

            let (status, body) = send(request).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error_code"], "MEASURES_NOT_FOUND");
        }
    }
}
