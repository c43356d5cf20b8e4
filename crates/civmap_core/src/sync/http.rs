//! reqwest-backed implementation of `CivilizationApi`.
//!
//! # Responsibility
//! - Map API calls onto the `/civilizations` REST endpoints.
//! - Package form fields and the optional image as multipart bodies.
//!
//! # Invariants
//! - The `image` part is sent only when an image was selected.
//! - Write response bodies are ignored; callers re-list for server truth.

use crate::config::ClientConfig;
use crate::model::civilization::{CivilizationForm, CivilizationId, CivilizationRecord};
use crate::sync::api::{ApiError, ApiResult, CivilizationApi};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};

const COLLECTION_PATH: &str = "civilizations";

/// HTTP client for the civilization REST service.
#[derive(Debug, Clone)]
pub struct HttpCivilizationApi {
    client: Client,
    base_url: Url,
}

impl HttpCivilizationApi {
    /// Creates a client against `base_url` with default reqwest settings.
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url: ensure_trailing_slash(base_url),
        }
    }

    /// Builds a client from configuration, applying the optional timeout.
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self::with_client(client, config.api_base_url.clone()))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn collection_url(&self) -> ApiResult<Url> {
        self.join(COLLECTION_PATH)
    }

    fn item_url(&self, id: CivilizationId) -> ApiResult<Url> {
        self.join(&format!("{COLLECTION_PATH}/{id}"))
    }

    fn join(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::InvalidRequest(format!("cannot build `{path}` url: {err}")))
    }
}

#[async_trait(?Send)]
impl CivilizationApi for HttpCivilizationApi {
    async fn list(&self) -> ApiResult<Vec<CivilizationRecord>> {
        let url = self.collection_url()?;
        let response = self.client.get(url).send().await?;
        let response = check_status("GET", response)?;
        Ok(response.json::<Vec<CivilizationRecord>>().await?)
    }

    async fn create(&self, form: &CivilizationForm) -> ApiResult<()> {
        let url = self.collection_url()?;
        let body = multipart_body(form)?;
        let response = self.client.post(url).multipart(body).send().await?;
        check_status("POST", response)?;
        Ok(())
    }

    async fn update(&self, id: CivilizationId, form: &CivilizationForm) -> ApiResult<()> {
        let url = self.item_url(id)?;
        let body = multipart_body(form)?;
        let response = self.client.put(url).multipart(body).send().await?;
        check_status("PUT", response)?;
        Ok(())
    }

    async fn delete(&self, id: CivilizationId) -> ApiResult<()> {
        let url = self.item_url(id)?;
        let response = self.client.delete(url).send().await?;
        check_status("DELETE", response)?;
        Ok(())
    }
}

fn multipart_body(form: &CivilizationForm) -> ApiResult<Form> {
    let fields = &form.fields;
    let mut body = Form::new()
        .text("name", fields.name.clone())
        .text("description", fields.description.clone())
        .text("latitude", fields.latitude.to_string())
        .text("longitude", fields.longitude.to_string());

    if let Some(image) = &form.image {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|err| {
                ApiError::InvalidRequest(format!(
                    "invalid content type `{}`: {err}",
                    image.content_type
                ))
            })?;
        body = body.part("image", part);
    }

    Ok(body)
}

fn check_status(method: &'static str, response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(ApiError::Status {
        method,
        path: response.url().path().to_string(),
        status: status.as_u16(),
    })
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
