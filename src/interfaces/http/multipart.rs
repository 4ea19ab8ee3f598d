use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, CONTENT_TYPE};
use actix_web::{web, HttpRequest};
use futures::{StreamExt, TryStreamExt};

use crate::domain::error::{AppError, Result};
use crate::domain::upload::{UploadSet, UploadedFile};

/// Read every file part of a multipart request into memory.
///
/// Non-multipart requests yield an empty set. Parts without a `filename`
/// are plain form fields and are drained but not kept. The byte limit
/// applies to the sum of all parts.
pub async fn collect_uploads(
    req: &HttpRequest,
    payload: web::Payload,
    max_bytes: usize,
) -> Result<UploadSet> {
    let mut uploads = UploadSet::default();
    if !is_multipart_form(req) {
        return Ok(uploads);
    }

    let mut multipart = Multipart::new(req.headers(), payload);
    let mut total_bytes = 0usize;

    while let Some(field) = multipart.next().await {
        let mut field = field.map_err(malformed)?;

        let (name, filename) = match field.content_disposition() {
            Some(disposition) => (
                disposition.get_name().map(str::to_string),
                part_filename(disposition),
            ),
            None => (None, None),
        };

        let mut content = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed)? {
            total_bytes += chunk.len();
            if total_bytes > max_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "Upload exceeds the {} byte limit",
                    max_bytes
                )));
            }
            content.extend_from_slice(&chunk);
        }

        if let (Some(name), Some(filename)) = (name, filename) {
            uploads.push(UploadedFile::new(name, filename, content));
        }
    }

    Ok(uploads)
}

/// Plain `filename`, or the RFC 5987 `filename*` value when that is all
/// the client sent.
fn part_filename(disposition: &ContentDisposition) -> Option<String> {
    disposition.get_filename().map(str::to_string).or_else(|| {
        disposition
            .get_filename_ext()
            .map(|ext| String::from_utf8_lossy(&ext.value).into_owned())
    })
}

fn is_multipart_form(req: &HttpRequest) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
        .unwrap_or(false)
}

fn malformed(err: actix_multipart::MultipartError) -> AppError {
    AppError::ParseError(format!("Malformed multipart payload: {}", err))
}
