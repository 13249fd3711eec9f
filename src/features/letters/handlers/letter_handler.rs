use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::guards::RequireLetterWrite;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::letters::dtos::{
    LetterFilter, LetterForm, LetterListResponseDto, LetterMultipartDto, LetterResponseDto,
    UploadedFile,
};
use crate::features::letters::services::LetterService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Read a letter form from a multipart stream.
///
/// Unknown fields are ignored; validation of the collected values happens in
/// the service so the rules stay independent of the transport.
async fn read_letter_form(mut multipart: Multipart) -> Result<LetterForm> {
    let mut form = LetterForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                let original_filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "surat.pdf".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                // An empty file part means no attachment was chosen
                if !data.is_empty() {
                    form.file = Some(UploadedFile {
                        data: data.to_vec(),
                        original_filename,
                        content_type,
                    });
                }
            }
            name @ ("type" | "number" | "letter_date" | "subject" | "sender_recipient"
            | "description" | "category_id") => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read field '{}': {}", name, e))
                })?;
                match name {
                    "type" => form.letter_type = Some(text),
                    "number" => form.number = Some(text),
                    "letter_date" => form.letter_date = Some(text),
                    "subject" => form.subject = Some(text),
                    "sender_recipient" => form.sender_recipient = Some(text),
                    "description" => form.description = Some(text),
                    "category_id" => form.category_id = Some(text),
                    _ => unreachable!(),
                }
            }
            other => {
                debug!("Ignoring unknown field: {}", other);
            }
        }
    }

    Ok(form)
}

/// List letters with filters and pagination
///
/// Results are ordered newest letter date first; the applied filter values
/// are echoed back in the payload.
#[utoipa::path(
    get,
    path = "/api/letters",
    params(LetterFilter, PaginationQuery),
    responses(
        (status = 200, description = "Paginated letter listing", body = ApiResponse<LetterListResponseDto>),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "letters"
)]
pub async fn list_letters(
    _user: AuthenticatedUser,
    State(service): State<Arc<LetterService>>,
    Query(filter): Query<LetterFilter>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<LetterListResponseDto>>> {
    let (letters, total) = service.list(&filter, &pagination).await?;

    Ok(Json(ApiResponse::success(
        Some(LetterListResponseDto { letters, filters: filter }),
        None,
        Some(Meta::paginated(total, &pagination)),
    )))
}

#[derive(Debug, Deserialize)]
pub struct ShowLetterQuery {
    /// Pass `download=1` to retrieve the stored PDF instead of the record
    pub download: Option<String>,
}

/// Get a letter, or download its attachment with `?download=1`
#[utoipa::path(
    get,
    path = "/api/letters/{id}",
    params(
        ("id" = Uuid, Path, description = "Letter id"),
        ("download" = Option<String>, Query, description = "Set to 1 to download the stored PDF")
    ),
    responses(
        (status = 200, description = "Letter detail or file content", body = ApiResponse<LetterResponseDto>),
        (status = 404, description = "Letter or backing file not found")
    ),
    security(("bearer_auth" = [])),
    tag = "letters"
)]
pub async fn get_letter(
    _user: AuthenticatedUser,
    State(service): State<Arc<LetterService>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ShowLetterQuery>,
) -> Result<Response> {
    if query.download.as_deref() == Some("1") {
        let (data, filename) = service.download(id).await?;

        let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));
        return Ok((
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            data,
        )
            .into_response());
    }

    let letter = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(letter), None, None)).into_response())
}

/// Create a letter (admin and staff only)
#[utoipa::path(
    post,
    path = "/api/letters",
    request_body(
        content = LetterMultipartDto,
        content_type = "multipart/form-data",
        description = "Letter fields with optional PDF attachment",
    ),
    responses(
        (status = 201, description = "Letter created", body = ApiResponse<LetterResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Role not permitted")
    ),
    security(("bearer_auth" = [])),
    tag = "letters"
)]
pub async fn create_letter(
    RequireLetterWrite(user): RequireLetterWrite,
    State(service): State<Arc<LetterService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<LetterResponseDto>>)> {
    let form = read_letter_form(multipart).await?;
    let letter = service.create(form, &user).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(letter),
            Some("Letter created successfully".to_string()),
            None,
        )),
    ))
}

/// Update a letter (admin and staff only)
///
/// Supplying a new file replaces the stored attachment.
#[utoipa::path(
    put,
    path = "/api/letters/{id}",
    params(("id" = Uuid, Path, description = "Letter id")),
    request_body(
        content = LetterMultipartDto,
        content_type = "multipart/form-data",
        description = "Letter fields with optional replacement PDF",
    ),
    responses(
        (status = 200, description = "Letter updated", body = ApiResponse<LetterResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Role not permitted"),
        (status = 404, description = "Letter not found")
    ),
    security(("bearer_auth" = [])),
    tag = "letters"
)]
pub async fn update_letter(
    RequireLetterWrite(_user): RequireLetterWrite,
    State(service): State<Arc<LetterService>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<LetterResponseDto>>> {
    let form = read_letter_form(multipart).await?;
    let letter = service.update(id, form).await?;

    Ok(Json(ApiResponse::success(
        Some(letter),
        Some("Letter updated successfully".to_string()),
        None,
    )))
}

/// Delete a letter and its stored attachment (admin and staff only)
#[utoipa::path(
    delete,
    path = "/api/letters/{id}",
    params(("id" = Uuid, Path, description = "Letter id")),
    responses(
        (status = 200, description = "Letter deleted"),
        (status = 403, description = "Role not permitted"),
        (status = 404, description = "Letter not found")
    ),
    security(("bearer_auth" = [])),
    tag = "letters"
)]
pub async fn delete_letter(
    RequireLetterWrite(_user): RequireLetterWrite,
    State(service): State<Arc<LetterService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Letter deleted successfully".to_string()),
        None,
    )))
}
