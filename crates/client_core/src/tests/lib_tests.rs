use super::*;
use crate::error::{MALFORMED_RESPONSE_MESSAGE, TRANSPORT_ERROR_MESSAGE};
use axum::{
    extract::{Multipart, Path as UrlPath, State},
    http::{header, StatusCode as HttpStatus},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::{
    env, fs,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

#[derive(Debug, Clone)]
struct CapturedField {
    name: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone)]
struct MockState {
    status: HttpStatus,
    body: String,
    tx: Arc<Mutex<Option<oneshot::Sender<Vec<CapturedField>>>>>,
}

async fn handle_generate(
    State(state): State<MockState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        fields.push(CapturedField {
            name,
            file_name,
            content_type,
            bytes,
        });
    }
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(fields);
    }
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

async fn handle_static(UrlPath(name): UrlPath<String>) -> impl IntoResponse {
    if name == "output1.png" {
        (HttpStatus::OK, b"poster-bytes".to_vec())
    } else {
        (HttpStatus::NOT_FOUND, Vec::new())
    }
}

async fn spawn_poster_server(
    status: HttpStatus,
    body: impl Into<String>,
) -> Result<(String, oneshot::Receiver<Vec<CapturedField>>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel();
    let state = MockState {
        status,
        body: body.into(),
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/generate_posters", post(handle_generate))
        .route("/static/output/:name", get(handle_static))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), rx))
}

fn sample_upload() -> ImageUpload {
    ImageUpload {
        filename: "cover.png".to_string(),
        mime_type: Some("image/png".to_string()),
        bytes: b"\x89PNG fake cover".to_vec(),
    }
}

#[tokio::test]
async fn submits_single_image_part_and_parses_posters() {
    let (server_url, fields_rx) = spawn_poster_server(
        HttpStatus::OK,
        r#"{"title":"Dune","description":"A desert planet.","output_files":["p1.png","p2.png"]}"#,
    )
    .await
    .expect("spawn server");
    let client = PosterClient::new(server_url);

    let posters = client
        .generate_posters(sample_upload())
        .await
        .expect("generate");

    assert_eq!(posters.title, "Dune");
    assert_eq!(posters.description, "A desert planet.");
    assert_eq!(
        posters.outputs,
        vec![OutputFileId::from("p1.png"), OutputFileId::from("p2.png")]
    );

    let fields = fields_rx.await.expect("captured fields");
    assert_eq!(fields.len(), 1, "exactly one multipart part");
    let field = &fields[0];
    assert_eq!(field.name.as_deref(), Some("image"));
    assert_eq!(field.file_name.as_deref(), Some("cover.png"));
    assert_eq!(field.content_type.as_deref(), Some("image/png"));
    assert_eq!(field.bytes, b"\x89PNG fake cover".to_vec());
}

#[tokio::test]
async fn server_error_text_is_surfaced_verbatim() {
    let (server_url, _fields_rx) =
        spawn_poster_server(HttpStatus::INTERNAL_SERVER_ERROR, r#"{"error":"bad image"}"#)
            .await
            .expect("spawn server");
    let client = PosterClient::new(server_url);

    let err = client
        .generate_posters(sample_upload())
        .await
        .expect_err("must fail");

    assert!(matches!(err, GenerateError::Server(_)), "unexpected: {err:?}");
    assert_eq!(err.user_message(), "bad image");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn unparseable_error_body_falls_back_to_generic_message() {
    let (server_url, _fields_rx) =
        spawn_poster_server(HttpStatus::INTERNAL_SERVER_ERROR, "<html>oops</html>")
            .await
            .expect("spawn server");
    let client = PosterClient::new(server_url);

    let err = client
        .generate_posters(sample_upload())
        .await
        .expect_err("must fail");

    assert!(matches!(err, GenerateError::MalformedBody { status: 500, .. }));
    assert_eq!(err.user_message(), MALFORMED_RESPONSE_MESSAGE);
}

#[tokio::test]
async fn error_status_without_error_field_reports_unknown_error() {
    let (server_url, _fields_rx) = spawn_poster_server(HttpStatus::BAD_REQUEST, "{}")
        .await
        .expect("spawn server");
    let client = PosterClient::new(server_url);

    let err = client
        .generate_posters(sample_upload())
        .await
        .expect_err("must fail");

    assert_eq!(err.user_message(), shared::error::UNKNOWN_ERROR_MESSAGE);
}

#[tokio::test]
async fn success_without_poster_fields_yields_empty_set() {
    let (server_url, _fields_rx) = spawn_poster_server(
        HttpStatus::OK,
        r#"{"message":"Posters generated successfully","generated_count":0}"#,
    )
    .await
    .expect("spawn server");
    let client = PosterClient::new(server_url);

    let posters = client
        .generate_posters(sample_upload())
        .await
        .expect("generate");

    assert_eq!(posters, PosterSet::default());
}

#[tokio::test]
async fn unreachable_server_reports_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = PosterClient::new(format!("http://{addr}"));
    let err = client
        .generate_posters(sample_upload())
        .await
        .expect_err("must fail");

    assert!(matches!(err, GenerateError::Transport(_)), "unexpected: {err:?}");
    assert_eq!(err.user_message(), TRANSPORT_ERROR_MESSAGE);
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn fetches_static_poster_bytes() {
    let (server_url, _fields_rx) = spawn_poster_server(HttpStatus::OK, "{}")
        .await
        .expect("spawn server");
    let client = PosterClient::new(server_url);

    let url = client.poster_url(&OutputFileId::from("output1.png"));
    let bytes = client.fetch_poster(&url).await.expect("fetch");
    assert_eq!(bytes, b"poster-bytes".to_vec());

    let missing = client.poster_url(&OutputFileId::from("missing.png"));
    assert!(client.fetch_poster(&missing).await.is_err());
}

#[test]
fn poster_url_joins_static_output_path() {
    let id = OutputFileId::from("p1.png");
    assert_eq!(
        poster_url("http://127.0.0.1:5001", &id),
        "http://127.0.0.1:5001/static/output/p1.png"
    );
    assert_eq!(
        poster_url("http://127.0.0.1:5001/", &id),
        "http://127.0.0.1:5001/static/output/p1.png"
    );
    assert_eq!(
        PosterClient::new("https://posters.example/").poster_url(&id),
        "https://posters.example/static/output/p1.png"
    );
}

#[test]
fn interpret_response_preserves_output_order() {
    let posters = interpret_response(
        StatusCode::OK,
        br#"{"title":"t","description":"d","output_files":["a.png","b.png","c.png"]}"#,
    )
    .expect("success");
    let names: Vec<&str> = posters.outputs.iter().map(OutputFileId::as_str).collect();
    assert_eq!(names, ["a.png", "b.png", "c.png"]);
}

#[test]
fn interpret_response_accepts_success_with_mistyped_generated_count() {
    let posters = interpret_response(
        StatusCode::OK,
        br#"{"title":"Dune","description":"A desert planet.","output_files":["p1.png"],"generated_count":"1"}"#,
    )
    .expect("success");
    assert_eq!(posters.title, "Dune");
    assert_eq!(posters.outputs, vec![OutputFileId::from("p1.png")]);
}

#[test]
fn interpret_response_rejects_non_json_success_body() {
    let err = interpret_response(StatusCode::OK, b"not json").expect_err("must fail");
    assert!(matches!(err, GenerateError::MalformedBody { status: 200, .. }));
}

#[tokio::test]
async fn image_upload_reads_file_and_guesses_mime_type() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("poster_client_upload_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp dir");
    let path = temp_root.join("book.jpg");
    fs::write(&path, b"jpeg-bytes").expect("write");

    let upload = ImageUpload::from_path(&path).await.expect("read");
    assert_eq!(upload.filename, "book.jpg");
    assert_eq!(upload.mime_type.as_deref(), Some("image/jpeg"));
    assert_eq!(upload.bytes, b"jpeg-bytes".to_vec());

    let missing = ImageUpload::from_path(&temp_root.join("absent.png"))
        .await
        .expect_err("missing file");
    assert!(matches!(missing, GenerateError::ReadImage { .. }));
    assert!(missing.user_message().starts_with("Could not read absent.png"));

    fs::remove_dir_all(temp_root).expect("cleanup");
}
