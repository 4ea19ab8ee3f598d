use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::http::StatusCode;
use actix_web::{get, middleware, post, web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use tracing::{error, info, warn};

use crate::application::{CsvToExcelUseCase, MergeCsvUseCase};
use crate::domain::artifact::OutputArtifact;
use crate::domain::error::AppError;
use crate::infrastructure::config::ServerConfig;
use crate::infrastructure::response::ascii_fallback_name;

mod multipart;

pub use multipart::collect_uploads;

pub const INDEX_TEXT: &str = "API for merge CSV and CSV to Excel";
pub const GENERIC_SERVER_ERROR: &str = "Internal server error";

pub struct HttpState {
    pub config: ServerConfig,
    pub merge_use_case: MergeCsvUseCase,
    pub convert_use_case: CsvToExcelUseCase,
}

impl HttpState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            merge_use_case: MergeCsvUseCase::default(),
            convert_use_case: CsvToExcelUseCase::default(),
        }
    }
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(INDEX_TEXT)
}

#[post("/merge-csv")]
async fn merge_csv(
    data: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Payload,
) -> HttpResponse {
    let result = collect_uploads(&req, payload, data.config.max_upload_bytes)
        .await
        .and_then(|uploads| data.merge_use_case.execute(&uploads));

    match result {
        Ok(merged) => {
            info!(
                files_merged = merged.files_merged,
                files_skipped = merged.files_skipped,
                rows = merged.row_count,
                bytes = merged.artifact.size(),
                "Merged CSV uploads"
            );
            attachment_response(merged.artifact)
        }
        Err(err) => error_response(&err, data.config.expose_error_details),
    }
}

#[post("/csv-to-excel")]
async fn csv_to_excel(
    data: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Payload,
) -> HttpResponse {
    let result = collect_uploads(&req, payload, data.config.max_upload_bytes)
        .await
        .and_then(|uploads| data.convert_use_case.execute(&uploads));

    match result {
        Ok(converted) => {
            info!(
                filename = %converted.artifact.filename,
                rows = converted.row_count,
                columns = converted.column_count,
                bytes = converted.artifact.size(),
                "Converted CSV to XLSX"
            );
            attachment_response(converted.artifact)
        }
        Err(err) => error_response(&err, data.config.expose_error_details),
    }
}

async fn not_found(req: HttpRequest) -> HttpResponse {
    warn!(method = %req.method(), path = %req.path(), "No route matched");
    HttpResponse::NotFound().json(serde_json::json!({ "error": "Not found" }))
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::MissingInput(_) | AppError::NoValidInput(_) | AppError::ParseError(_) => {
            StatusCode::BAD_REQUEST
        }
        AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Translate an `AppError` into a JSON `{"error": ...}` response.
///
/// Client errors carry their message; server errors carry a generic message
/// unless `expose_details` is set.
pub fn error_response(err: &AppError, expose_details: bool) -> HttpResponse {
    let status = status_for(err);

    let message = if err.is_client_error() {
        warn!(error = %err, status = status.as_u16(), "Request rejected");
        err.message().to_string()
    } else {
        error!(error = %err, status = status.as_u16(), "Request failed");
        if expose_details {
            err.message().to_string()
        } else {
            GENERIC_SERVER_ERROR.to_string()
        }
    };

    HttpResponse::build(status).json(serde_json::json!({ "error": message }))
}

pub fn attachment_response(artifact: OutputArtifact) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(artifact.media_type)
        .insert_header(attachment_disposition(&artifact.filename))
        .body(artifact.content)
}

/// Plain `filename=` for printable ASCII names; otherwise an ASCII fallback
/// plus the exact name in `filename*`.
fn attachment_disposition(filename: &str) -> ContentDisposition {
    let printable_ascii = filename.chars().all(|c| c.is_ascii() && !c.is_ascii_control());

    let parameters = if printable_ascii {
        vec![DispositionParam::Filename(filename.to_string())]
    } else {
        vec![
            DispositionParam::Filename(ascii_fallback_name(filename)),
            DispositionParam::FilenameExt(ExtendedValue {
                charset: Charset::Ext("UTF-8".to_string()),
                language_tag: None,
                value: filename.as_bytes().to_vec(),
            }),
        ]
    };

    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters,
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(merge_csv)
        .service(csv_to_excel)
        .default_service(web::route().to(not_found));
}

pub fn start_server(config: &ServerConfig) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState::new(config.clone()));

    let mut server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Any origin, method and header

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_routes)
    });

    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    let server = server.bind(config.bind_address())?.run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::csv::CsvParser;
    use crate::infrastructure::xlsx::{XlsxWriter, XLSX_MEDIA_TYPE};
    use actix_web::http::header;
    use actix_web::test as actix_test;
    use calamine::{open_workbook_from_rs, Reader, Xlsx};
    use serde_json::json;
    use std::io::Cursor;

    const BOUNDARY: &str = "csvbridge-test-boundary";

    struct Part<'a> {
        name: &'a str,
        filename: Option<&'a str>,
        content: &'a str,
    }

    fn file<'a>(name: &'a str, filename: &'a str, content: &'a str) -> Part<'a> {
        Part {
            name,
            filename: Some(filename),
            content,
        }
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = String::new();
        for part in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match part.filename {
                Some(filename) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        part.name, filename
                    ));
                    body.push_str("Content-Type: application/octet-stream\r\n\r\n");
                }
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    part.name
                )),
            }
            body.push_str(part.content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body.into_bytes()
    }

    fn upload_request(uri: &str, parts: &[Part<'_>]) -> actix_test::TestRequest {
        actix_test::TestRequest::post()
            .uri(uri)
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart_body(parts))
    }

    macro_rules! app_with {
        ($state:expr) => {
            actix_test::init_service(
                App::new()
                    .wrap(Cors::permissive())
                    .app_data(web::Data::new($state))
                    .configure(configure_routes),
            )
            .await
        };
    }

    macro_rules! app {
        () => {
            app_with!(HttpState::new(ServerConfig::default()))
        };
    }

    fn disposition<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
        resp.headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[actix_web::test]
    async fn test_index() {
        let app = app!();
        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = actix_test::read_body(resp).await;
        assert_eq!(body, INDEX_TEXT.as_bytes());
    }

    #[actix_web::test]
    async fn test_merge_scenario() {
        let app = app!();
        let req = upload_request(
            "/merge-csv",
            &[
                file("files", "a.csv", "id|name\n1|Ann"),
                file("files", "b.csv", "id|city\n2|NYC"),
            ],
        );
        let resp = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv"
        );
        assert_eq!(disposition(&resp), "attachment; filename=\"merged_data.csv\"");
        let body = actix_test::read_body(resp).await;
        assert_eq!(body, "id,name\n1,Ann\n2,\n".as_bytes());
    }

    #[actix_web::test]
    async fn test_merge_ignores_plain_form_fields() {
        let app = app!();
        let req = upload_request(
            "/merge-csv",
            &[
                Part {
                    name: "files",
                    filename: None,
                    content: "not a file",
                },
                file("files", "a.csv", "id\n1\n2"),
            ],
        );
        let resp = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = actix_test::read_body(resp).await;
        assert_eq!(body, "id\n1\n2\n".as_bytes());
    }

    #[actix_web::test]
    async fn test_merge_without_files() {
        let app = app!();
        let req = upload_request("/merge-csv", &[file("other", "a.csv", "id\n1")]);
        let resp = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "No files provided" }));
    }

    #[actix_web::test]
    async fn test_merge_non_multipart_request() {
        let app = app!();
        let req = actix_test::TestRequest::post()
            .uri("/merge-csv")
            .set_json(json!({ "files": [] }));
        let resp = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "No files provided" }));
    }

    #[actix_web::test]
    async fn test_merge_only_non_csv() {
        let app = app!();
        let req = upload_request(
            "/merge-csv",
            &[
                file("files", "a.txt", "id\n1"),
                file("files", "b.CSV", "id\n2"),
            ],
        );
        let resp = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "No valid CSV files found" }));
    }

    #[actix_web::test]
    async fn test_merge_malformed_csv_is_client_error() {
        let app = app!();
        let req = upload_request("/merge-csv", &[file("files", "bad.csv", "id\n1|2")]);
        let resp = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({ "error": "Failed to parse 'bad.csv': Expected 1 fields in line 2, saw 2" })
        );
    }

    #[actix_web::test]
    async fn test_upload_limit() {
        let app = app_with!(HttpState::new(ServerConfig {
            max_upload_bytes: 8,
            ..ServerConfig::default()
        }));
        let req = upload_request("/merge-csv", &[file("files", "a.csv", "id|name\n1|Ann")]);
        let resp = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[actix_web::test]
    async fn test_convert_orders() {
        let app = app!();
        let req = upload_request(
            "/csv-to-excel",
            &[file("file", "orders.csv", "id|item\n1|pen\n2|ink\n3|cap")],
        );
        let resp = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            XLSX_MEDIA_TYPE
        );
        assert_eq!(disposition(&resp), "attachment; filename=\"orders.xlsx\"");

        let body = actix_test::read_body(resp).await;
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(body.to_vec())).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Sheet1".to_string()]);
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();
        let header: Vec<String> = range.rows().next().unwrap().iter().map(|c| c.to_string()).collect();
        assert_eq!(header, vec!["id".to_string(), "item".to_string()]);
        assert_eq!(range.height(), 4);
    }

    #[test]
    fn test_non_ascii_disposition() {
        let value = attachment_disposition("día.xlsx").to_string();
        assert!(value.starts_with("attachment; filename=\"d_a.xlsx\""));
        assert!(value.contains("filename*=UTF-8''d%C3%ADa.xlsx"));
    }

    #[test]
    fn test_ascii_disposition_keeps_name() {
        let value = attachment_disposition("a\"b.xlsx").to_string();
        assert_eq!(value, "attachment; filename=\"a\\\"b.xlsx\"");
        assert!(!value.contains("filename*"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&AppError::MissingInput("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&AppError::NoValidInput("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&AppError::ParseError("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&AppError::PayloadTooLarge("x".into())),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_for(&AppError::IoError("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_convert_extended_filename_only() {
        let app = app!();
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename*=UTF-8''orders.csv\r\n\r\nid|item\n1|pen\r\n--{b}--\r\n",
            b = BOUNDARY
        );
        let req = actix_test::TestRequest::post()
            .uri("/csv-to-excel")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body);
        let resp = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(disposition(&resp), "attachment; filename=\"orders.xlsx\"");
    }

    #[actix_web::test]
    async fn test_convert_missing_file() {
        let app = app!();
        let req = upload_request("/csv-to-excel", &[file("files", "orders.csv", "id\n1")]);
        let resp = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "No CSV file provided" }));
    }

    #[actix_web::test]
    async fn test_convert_wrong_suffix() {
        let app = app!();
        let req = upload_request("/csv-to-excel", &[file("file", "orders.xlsx", "id\n1")]);
        let resp = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "No CSV file provided" }));
    }

    fn failing_convert_state(expose_error_details: bool) -> HttpState {
        HttpState {
            config: ServerConfig {
                expose_error_details,
                ..ServerConfig::default()
            },
            merge_use_case: MergeCsvUseCase::default(),
            convert_use_case: CsvToExcelUseCase::new(
                CsvParser::new(),
                XlsxWriter::new().with_sheet_name("bad/name"),
            ),
        }
    }

    #[actix_web::test]
    async fn test_server_error_hides_details() {
        let app = app_with!(failing_convert_state(false));
        let req = upload_request("/csv-to-excel", &[file("file", "orders.csv", "id\n1")]);
        let resp = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": GENERIC_SERVER_ERROR }));
    }

    #[actix_web::test]
    async fn test_server_error_exposes_details_when_configured() {
        let app = app_with!(failing_convert_state(true));
        let req = upload_request("/csv-to-excel", &[file("file", "orders.csv", "id\n1")]);
        let resp = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        let message = body["error"].as_str().unwrap();
        assert_ne!(message, GENERIC_SERVER_ERROR);
        assert!(!message.is_empty());
    }

    #[actix_web::test]
    async fn test_cors_allows_any_origin() {
        let app = app!();
        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "http://example.com"));
        let resp = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://example.com"
        );
    }

    #[actix_web::test]
    async fn test_unknown_route() {
        let app = app!();
        let resp =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/nope").to_request()).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Not found" }));
    }
}
