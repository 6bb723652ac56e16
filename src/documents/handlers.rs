use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{
    web::{self, Json, Path},
    HttpResponse, Responder,
};
use futures_util::TryStreamExt;
use log::{debug, error, info, warn};
use sanitize_filename::sanitize;

use super::models::{
    AssembleRequest, AssembleResponse, AssembleUploadForm, DocumentLink, FillRequest,
    TemplateListResponse, TemplateSummary,
};
use super::service::ServiceError;
use crate::assembler::{AssemblyError, ImagePage, ImagePurpose};
use crate::filler::FillError;
use crate::state::AppState;
use crate::templates::RepositoryError;
use crate::ErrorResponse;

const REQUEST_PART: &str = "request";

fn error_response(e: &ServiceError) -> HttpResponse {
    match e {
        ServiceError::Assembly(AssemblyError::EmptyResult) => {
            warn!("Nothing could be assembled");
            HttpResponse::UnprocessableEntity().json(ErrorResponse::unprocessable(&e.to_string()))
        }
        ServiceError::Fill(FillError::Repository {
            source: RepositoryError::InvalidId(_),
            ..
        })
        | ServiceError::Repository(RepositoryError::InvalidId(_)) => {
            warn!("Rejected request: {}", e);
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string()))
        }
        _ => {
            error!("Request failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Documents",
    get,
    path = "/templates",
    responses(
        (status = 200, description = "Known templates and whether a PDF is stored for each", body = TemplateListResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn list_templates(data: web::Data<AppState>) -> impl Responder {
    info!("Executing list_templates handler");
    match data.documents.list_templates().await {
        Ok(templates) => HttpResponse::Ok().json(TemplateListResponse {
            templates: templates.into_iter().map(TemplateSummary::from).collect(),
        }),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Documents",
    post,
    path = "/documents/fill",
    request_body(content = FillRequest, content_type = "application/json"),
    responses(
        (status = 201, description = "Document filled and stored", body = DocumentLink),
        (status = 400, description = "Invalid template id", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn fill_document(
    request: Json<FillRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let request = request.into_inner();
    info!("Executing fill_document handler for '{}'", request.template_id);

    match data
        .documents
        .fill_one(&request.template_id, &request.data, &request.confidence)
        .await
    {
        Ok(document) => HttpResponse::Created().json(DocumentLink::from(document)),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Documents",
    post,
    path = "/documents/assemble",
    request_body(content = AssembleRequest, content_type = "application/json"),
    responses(
        (status = 201, description = "Deal packet assembled and stored", body = AssembleResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 422, description = "No document or image could be assembled", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn assemble_documents(
    request: Json<AssembleRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let request = request.into_inner();
    info!(
        "Executing assemble_documents handler: {} templates, {} images",
        request.template_ids.len(),
        request.images.len()
    );

    let images = match request
        .images
        .iter()
        .map(|image| image.decode())
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(images) => images,
        Err(e) => {
            warn!("Rejected image payload: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e));
        }
    };

    assemble(&data, &request, &images).await
}

#[utoipa::path(
    context_path = "/api",
    tag = "Documents",
    post,
    path = "/documents/assemble/upload",
    request_body(content = inline(AssembleUploadForm), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Deal packet assembled and stored", body = AssembleResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 422, description = "No document or image could be assembled", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    )
)]
pub async fn assemble_upload(payload: Multipart, data: web::Data<AppState>) -> impl Responder {
    info!("Executing assemble_upload handler");
    match read_assemble_upload(payload).await {
        Ok((request, images)) => {
            debug!(
                "Multipart upload parsed: {} templates, {} images",
                request.template_ids.len(),
                images.len()
            );
            assemble(&data, &request, &images).await
        }
        Err(e) => {
            error!("Failed to read multipart upload: {}", e);
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e))
        }
    }
}

async fn assemble(data: &AppState, request: &AssembleRequest, images: &[ImagePage]) -> HttpResponse {
    match data
        .documents
        .assemble(&request.template_ids, &request.data, &request.confidence, images)
        .await
    {
        Ok(packet) => HttpResponse::Created().json(AssembleResponse::from(packet)),
        Err(e) => error_response(&e),
    }
}

/// Reads the `request` JSON part and every file part, in upload order.
async fn read_assemble_upload(
    mut payload: Multipart,
) -> Result<(AssembleRequest, Vec<ImagePage>), String> {
    let mut request: Option<AssembleRequest> = None;
    let mut images = Vec::new();

    while let Some(mut field) = payload.try_next().await.map_err(|e| e.to_string())? {
        let content_disposition = field
            .content_disposition()
            .ok_or("Content-Disposition not set")?;
        let field_name = content_disposition
            .get_name()
            .ok_or_else(|| "No field name".to_string())?
            .to_string();
        let file_name = content_disposition.get_filename().map(sanitize);
        let declared_type = field.content_type().map(|mime| mime.essence_str().to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(|e| e.to_string())? {
            bytes.extend_from_slice(&chunk);
        }

        if field_name == REQUEST_PART {
            let parsed: AssembleRequest = serde_json::from_slice(&bytes)
                .map_err(|e| format!("Invalid '{}' part: {}", REQUEST_PART, e))?;
            if !parsed.images.is_empty() {
                return Err("Send images as file parts, not inside the request part".to_string());
            }
            request = Some(parsed);
            continue;
        }

        let media_type = match declared_type.as_deref() {
            Some(mime) if mime != "application/octet-stream" => mime.to_string(),
            _ => file_name
                .as_deref()
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|mime| mime.essence_str().to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        };
        let purpose = field_name
            .parse::<ImagePurpose>()
            .unwrap_or_else(|never| match never {});
        debug!(
            "Received image part '{}' ({}, {} bytes)",
            field_name,
            media_type,
            bytes.len()
        );
        images.push(ImagePage::new(bytes, media_type, purpose));
    }

    let request = request.ok_or_else(|| format!("Missing '{}' part", REQUEST_PART))?;
    Ok((request, images))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Documents",
    get,
    path = "/downloads/{key}",
    responses(
        (status = 200, description = "Stored document", content_type = "application/pdf"),
        (status = 404, description = "Unknown or expired key", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    ),
    params(
        ("key" = String, Path, description = "Key returned by fill or assemble")
    )
)]
pub async fn download(key: Path<String>, data: web::Data<AppState>) -> impl Responder {
    let key = key.into_inner();
    info!("Executing download handler for key: {}", key);

    match data.documents.download(&key).await {
        Ok(Some(entry)) => HttpResponse::Ok()
            .content_type(entry.content_type)
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(sanitize(&entry.filename))],
            })
            .body(entry.bytes),
        Ok(None) => {
            debug!("No artifact for key {}", key);
            HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
                "Document '{}' not found or expired",
                key
            )))
        }
        Err(e) => error_response(&e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/templates").route(web::get().to(list_templates)))
        .service(web::resource("/documents/fill").route(web::post().to(fill_document)))
        .service(web::resource("/documents/assemble").route(web::post().to(assemble_documents)))
        .service(
            web::resource("/documents/assemble/upload").route(web::post().to(assemble_upload)),
        )
        .service(web::resource("/downloads/{key}").route(web::get().to(download)));
}
