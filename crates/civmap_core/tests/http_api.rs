use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use civmap_core::{
    ApiError, CivilizationApi, CivilizationFields, CivilizationForm, GeoEntityStore,
    HttpCivilizationApi, ImagePayload, SyncError, SyncGateway,
};
use reqwest::Url;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct ReceivedImage {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Debug, Default, Clone)]
struct ReceivedForm {
    text: HashMap<String, String>,
    image: Option<ReceivedImage>,
}

#[derive(Default)]
struct BackendState {
    records: Vec<Value>,
    next_id: i64,
    forms: Vec<ReceivedForm>,
}

type SharedState = Arc<Mutex<BackendState>>;

async fn read_form(mut multipart: Multipart) -> Result<ReceivedForm, StatusCode> {
    let mut form = ReceivedForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            form.image = Some(ReceivedImage {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            form.text.insert(name, value);
        }
    }
    Ok(form)
}

// Coordinates are echoed back as the strings received, like a text column.
fn record_json(id: i64, form: &ReceivedForm, previous_image: Option<Value>) -> Value {
    let image = form
        .image
        .as_ref()
        .and_then(|image| image.file_name.clone())
        .map(|name| Value::String(format!("/uploads/{name}")))
        .or(previous_image)
        .unwrap_or(Value::Null);
    json!({
        "id": id,
        "name": form.text.get("name"),
        "description": form.text.get("description"),
        "latitude": form.text.get("latitude"),
        "longitude": form.text.get("longitude"),
        "image": image,
    })
}

async fn list_civilizations(State(state): State<SharedState>) -> Json<Vec<Value>> {
    Json(state.lock().expect("state lock").records.clone())
}

async fn create_civilization(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let form = read_form(multipart).await?;
    let mut state = state.lock().expect("state lock");
    state.next_id += 1;
    let record = record_json(state.next_id, &form, None);
    state.records.push(record.clone());
    state.forms.push(form);
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_civilization(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<Value>, StatusCode> {
    let form = read_form(multipart).await?;
    let mut state = state.lock().expect("state lock");
    let index = state
        .records
        .iter()
        .position(|record| record["id"] == json!(id))
        .ok_or(StatusCode::NOT_FOUND)?;
    let previous_image = Some(state.records[index]["image"].clone()).filter(|v| !v.is_null());
    let record = record_json(id, &form, previous_image);
    state.records[index] = record.clone();
    state.forms.push(form);
    Ok(Json(record))
}

async fn delete_civilization(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> StatusCode {
    let mut state = state.lock().expect("state lock");
    let before = state.records.len();
    state.records.retain(|record| record["id"] != json!(id));
    if state.records.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn spawn_backend() -> (Url, SharedState) {
    let state = SharedState::default();
    let app = Router::new()
        .route(
            "/civilizations",
            get(list_civilizations).post(create_civilization),
        )
        .route(
            "/civilizations/:id",
            put(update_civilization).delete(delete_civilization),
        )
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server should run");
    });

    let url = Url::parse(&format!("http://{addr}/")).expect("valid url");
    (url, state)
}

fn gateway(url: Url) -> SyncGateway<HttpCivilizationApi> {
    SyncGateway::new(
        HttpCivilizationApi::new(url),
        Rc::new(RefCell::new(GeoEntityStore::new())),
    )
}

#[tokio::test]
async fn crud_roundtrip_over_http() {
    let (url, state) = spawn_backend().await;
    let gateway = gateway(url);

    let form = CivilizationForm::new(
        CivilizationFields::new("Rome", 41.9, 12.5).with_description("SPQR"),
    )
    .with_image(ImagePayload::from_bytes("wolf.png", vec![137, 80, 78, 71]));
    gateway.create(&form).await.expect("create should succeed");

    {
        let store = gateway.store();
        let store = store.borrow();
        assert_eq!(store.len(), 1);
        let record = &store.records()[0];
        assert_eq!(record.name, "Rome");
        assert_eq!(record.description, "SPQR");
        assert_eq!(record.latitude, 41.9);
        assert_eq!(record.longitude, 12.5);
        assert_eq!(record.image_ref.as_deref(), Some("/uploads/wolf.png"));
    }

    {
        let state = state.lock().expect("state lock");
        let received = &state.forms[0];
        assert_eq!(received.text.get("latitude").map(String::as_str), Some("41.9"));
        let image = received.image.as_ref().expect("image part should be sent");
        assert_eq!(image.file_name.as_deref(), Some("wolf.png"));
        assert_eq!(image.content_type.as_deref(), Some("image/png"));
        assert_eq!(image.bytes, vec![137, 80, 78, 71]);
    }

    let id = gateway.store().borrow().records()[0].id;
    gateway
        .update(id, &CivilizationForm::new(CivilizationFields::new("Roma", 41.9, 12.5)))
        .await
        .expect("update should succeed");
    {
        let store = gateway.store();
        let store = store.borrow();
        let record = store.get(id).expect("record should exist");
        assert_eq!(record.name, "Roma");
        assert_eq!(record.image_ref.as_deref(), Some("/uploads/wolf.png"));
    }
    assert!(state.lock().expect("state lock").forms[1].image.is_none());

    gateway.delete(id).await.expect("delete should succeed");
    assert!(gateway.store().borrow().is_empty());
    assert!(state.lock().expect("state lock").records.is_empty());
}

#[tokio::test]
async fn missing_record_maps_to_status_error() {
    let (url, _state) = spawn_backend().await;
    let gateway = gateway(url);

    let err = gateway
        .update(404, &CivilizationForm::new(CivilizationFields::new("Ghost", 0.0, 0.0)))
        .await
        .expect_err("update of a missing record should fail");
    assert!(matches!(
        err,
        SyncError::UpdateFailed {
            id: 404,
            source: ApiError::Status {
                method: "PUT",
                status: 404,
                ..
            }
        }
    ));

    let err = gateway.delete(404).await.expect_err("delete should fail");
    assert!(matches!(err, SyncError::DeleteFailed { id: 404, .. }));
}

#[tokio::test]
async fn unreachable_service_reports_fetch_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);

    let api = HttpCivilizationApi::new(Url::parse(&format!("http://{addr}/")).expect("valid url"));
    assert!(matches!(api.list().await, Err(ApiError::Request(_))));

    let gateway = gateway(Url::parse(&format!("http://{addr}/")).expect("valid url"));
    let err = gateway.list().await.expect_err("list should fail");
    assert!(matches!(err, SyncError::FetchFailed(ApiError::Request(_))));
}
