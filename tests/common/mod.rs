// Shared helpers for the integration tests
//
// `FakeApi` is an in-process translation API that records every request it
// receives, so tests can assert on headers and submitted documents.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use i18n_harvest::harvest::Extractor;
use i18n_harvest::page::PageSession;
use i18n_harvest::parsers::html::{
    append_child, append_text, create_html_element, get_body, html_to_dom,
};
use i18n_harvest::remote::{StaticToken, TokenSource, TranslationClient};
use i18n_harvest::store::DomainStore;
use i18n_harvest::utils::PageLocation;

pub const PAGE_URL: &str = "https://acme.example.com/dashboard";

/// Nothing listens here; requests fail straight away
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9";

/// One request as the fake API saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub tenant: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct FakeState {
    languages: Vec<String>,
    documents: HashMap<String, Value>,
    requests: Vec<RecordedRequest>,
    fail_reads: bool,
}

#[derive(Clone)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
    pub base: String,
}

impl FakeApi {
    /// Serves the API on an ephemeral port of the current runtime
    pub async fn start(languages: &[&str]) -> Self {
        let state = Arc::new(Mutex::new(FakeState {
            languages: languages.iter().map(|l| l.to_string()).collect(),
            ..FakeState::default()
        }));

        let app = Router::new()
            .route("/v1/info", get(info))
            .route("/v1/translations/:lang", get(translation))
            .route("/v1/organization/translations/:lang", post(update))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state, base }
    }

    pub fn set_document(&self, language: &str, document: Value) {
        self.state
            .lock()
            .unwrap()
            .documents
            .insert(language.to_string(), document);
    }

    pub fn document(&self, language: &str) -> Option<Value> {
        self.state.lock().unwrap().documents.get(language).cloned()
    }

    /// Makes translation reads answer 500
    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Bodies of every submitted document, in order
    pub fn posts(&self) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == "POST")
            .filter_map(|request| request.body)
            .collect()
    }
}

fn record(
    state: &Mutex<FakeState>,
    method: &str,
    path: String,
    headers: &HeaderMap,
    body: Option<Value>,
) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    state.lock().unwrap().requests.push(RecordedRequest {
        method: method.to_string(),
        path,
        authorization: header("authorization"),
        tenant: header("x-nc-tenant"),
        body,
    });
}

async fn info(State(state): State<Arc<Mutex<FakeState>>>, headers: HeaderMap) -> Json<Value> {
    record(&state, "GET", "/v1/info".to_string(), &headers, None);
    let languages = state.lock().unwrap().languages.clone();
    Json(json!({ "languages": languages }))
}

async fn translation(
    State(state): State<Arc<Mutex<FakeState>>>,
    Path(lang): Path<String>,
    headers: HeaderMap,
) -> Response {
    record(&state, "GET", format!("/v1/translations/{}", lang), &headers, None);

    let state = state.lock().unwrap();
    if state.fail_reads {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let document = state.documents.get(&lang).cloned().unwrap_or_else(|| json!({}));
    Json(json!({ "translation": document })).into_response()
}

async fn update(
    State(state): State<Arc<Mutex<FakeState>>>,
    Path(lang): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    record(
        &state,
        "POST",
        format!("/v1/organization/translations/{}", lang),
        &headers,
        Some(body.clone()),
    );

    if let Some(document) = body.get("translation") {
        state
            .lock()
            .unwrap()
            .documents
            .insert(lang, document.clone());
    }
    StatusCode::OK
}

pub fn client(api_base: &str, token: Option<&str>) -> TranslationClient {
    let tokens: Arc<dyn TokenSource> = match token {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => Arc::new(StaticToken::none()),
    };
    let location = PageLocation::parse(PAGE_URL).unwrap();
    TranslationClient::new(&location, Some(api_base), tokens).unwrap()
}

pub fn session(html: &str, store: &DomainStore, client: TranslationClient) -> PageSession {
    PageSession::new(
        PageLocation::parse(PAGE_URL).unwrap(),
        html_to_dom(html.as_bytes(), "utf-8"),
        Extractor::default(),
        store.clone(),
        client,
    )
}

/// Appends `<tag data-i18n="key">text</tag>` to the body and records the change
pub fn append_annotated(session: &mut PageSession, tag: &str, key: &str, text: &str) {
    session.mutate(|dom| {
        let body = get_body(&dom.document).unwrap();
        let element = create_html_element(dom, tag, &[("data-i18n", key)]);
        append_text(dom, &element, text);
        append_child(dom, &body, &element);
    });
}
