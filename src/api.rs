use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{
    batch::{self, BatchError},
    AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[utoipa::path(get, path = "/health", tag = "certgen", responses((status=200, body=HealthResponse)))]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok".into() })
}

/// Multipart form consumed by `/generate-cert`.
#[derive(ToSchema)]
#[allow(dead_code)] // schema-only, never constructed
pub struct GenerateCertForm {
    /// Roster workbook (.xlsx); only the first worksheet is read.
    #[schema(value_type = String, format = Binary)]
    pub excel: String,
    /// Free-text unit name, e.g. "1CHD NAVAL UNIT".
    pub wing: String,
    /// Certificate type, sent as the `certType` part: "merit" or "participation".
    pub cert_type: String,
}

#[utoipa::path(
    post,
    path = "/generate-cert",
    tag = "certgen",
    request_body(content = GenerateCertForm, content_type = "multipart/form-data"),
    responses(
        (status=200, description="Zip archive with one certificate image per roster row", content_type="application/zip"),
        (status=400, description="Bad upload, unknown selector, or unsupported combination"),
        (status=500, description="Template asset or rendering failure")
    )
)]
pub async fn generate_cert(
    State(st): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut excel: Option<Vec<u8>> = None;
    let mut wing = String::new();
    let mut cert_type = String::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "excel" => excel = Some(field.bytes().await.map_err(bad_request)?.to_vec()),
            "wing" => wing = field.text().await.map_err(bad_request)?,
            "certType" => cert_type = field.text().await.map_err(bad_request)?,
            _ => {}
        }
    }

    let excel = excel.ok_or_else(|| bad_request("No file uploaded"))?;

    let archive = batch::generate_batch(&st.templates, &excel, &wing, &cert_type)
        .await
        .map_err(into_api_error)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", batch::ARCHIVE_NAME),
            ),
        ],
        archive,
    ))
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn bad_request<E: std::fmt::Display>(e: E) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"detail": e.to_string()})),
    )
}

fn into_api_error(e: BatchError) -> ApiError {
    let status = match e {
        BatchError::UnknownSelector(_)
        | BatchError::UnsupportedCombination(_)
        | BatchError::MalformedInput(_) => StatusCode::BAD_REQUEST,
        BatchError::TemplateAssetMissing(_) | BatchError::Render(_) | BatchError::Archive(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({"detail": e.to_string()})))
}
