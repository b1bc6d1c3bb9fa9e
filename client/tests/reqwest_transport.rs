//! End-to-end coverage for the reqwest transport against a local actix stub.
//!
//! The stub echoes what it received as JSON so assertions can inspect the
//! method, path, query, headers and body the adapter put on the wire.

use std::net::TcpListener;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use admin_client::domain::ports::{RestRequest, RestTransport, RestTransportError};
use admin_client::outbound::http::ReqwestTransport;
use reqwest::Url;
use serde_json::{Value, json};

struct StubServer {
    base_url: Url,
    handle: ServerHandle,
}

impl StubServer {
    fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let port = listener.local_addr().expect("listener address").port();
        let server = HttpServer::new(|| {
            App::new()
                .route("/rest/status/{code}", web::to(status))
                .default_service(web::to(echo))
        })
        .disable_signals()
        .workers(1)
        .listen(listener)
        .expect("listen on stub socket")
        .run();
        let handle = server.handle();
        actix_rt::spawn(server);
        Self {
            base_url: Url::parse(&format!("http://127.0.0.1:{port}/rest"))
                .expect("stub base url"),
            handle,
        }
    }

    fn transport(&self) -> ReqwestTransport {
        ReqwestTransport::new(self.base_url.clone(), Duration::from_secs(5))
            .expect("client builds")
    }

    async fn stop(self) {
        self.handle.stop(true).await;
    }
}

async fn echo(req: HttpRequest, body: web::Bytes) -> HttpResponse {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    HttpResponse::Ok().json(json!({
        "method": req.method().as_str(),
        "path": req.path(),
        "query": req.query_string(),
        "authorization": header("authorization"),
        "content_type": header("content-type"),
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn status(path: web::Path<u16>) -> HttpResponse {
    let code = actix_web::http::StatusCode::from_u16(path.into_inner())
        .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(code)
        .insert_header(("ETag", "\"3\""))
        .insert_header(("Location", "https://localhost:3000/rest/buecher/42"))
        .body("Titel darf nicht leer sein")
}

fn echoed(body: &str) -> Value {
    serde_json::from_str(body).expect("stub echoes json")
}

#[actix_rt::test]
async fn get_sends_query_and_headers_below_the_base() {
    let stub = StubServer::start();

    let response = stub
        .transport()
        .send(
            RestRequest::get("buecher")
                .with_query(vec![
                    ("titel".to_owned(), "a b".to_owned()),
                    ("schlagwoerter".to_owned(), "JAVASCRIPT".to_owned()),
                ])
                .with_header("Authorization", "Bearer t"),
        )
        .await
        .expect("stub answers");

    assert_eq!(response.status, 200);
    assert_eq!(response.status_text, "OK");
    let echoed = echoed(&response.body);
    assert_eq!(echoed["method"], "GET");
    assert_eq!(echoed["path"], "/rest/buecher");
    assert_eq!(echoed["query"], "titel=a+b&schlagwoerter=JAVASCRIPT");
    assert_eq!(echoed["authorization"], "Bearer t");
    stub.stop().await;
}

#[actix_rt::test]
async fn form_bodies_are_url_encoded() {
    let stub = StubServer::start();

    let response = stub
        .transport()
        .send(RestRequest::post("login").with_form(vec![
            ("username".to_owned(), "admin".to_owned()),
            ("password".to_owned(), "p&w".to_owned()),
        ]))
        .await
        .expect("stub answers");

    let echoed = echoed(&response.body);
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["content_type"], "application/x-www-form-urlencoded");
    assert_eq!(echoed["body"], "username=admin&password=p%26w");
    stub.stop().await;
}

#[actix_rt::test]
async fn json_bodies_carry_the_document() {
    let stub = StubServer::start();

    let response = stub
        .transport()
        .send(
            RestRequest::put("kunden/7")
                .with_header("If-Match", "\"1\"")
                .with_json(json!({ "nachname": "Delta" })),
        )
        .await
        .expect("stub answers");

    let echoed = echoed(&response.body);
    assert_eq!(echoed["method"], "PUT");
    assert_eq!(echoed["path"], "/rest/kunden/7");
    assert_eq!(echoed["content_type"], "application/json");
    let document: Value =
        serde_json::from_str(echoed["body"].as_str().expect("body is text")).expect("json body");
    assert_eq!(document, json!({ "nachname": "Delta" }));
    stub.stop().await;
}

#[actix_rt::test]
async fn error_statuses_come_back_as_responses() {
    let stub = StubServer::start();

    let response = stub
        .transport()
        .send(RestRequest::post("status/400"))
        .await
        .expect("4xx is still a response");

    assert_eq!(response.status, 400);
    assert_eq!(response.status_text, "Bad Request");
    assert!(!response.is_success());
    assert_eq!(response.body, "Titel darf nicht leer sein");
    stub.stop().await;
}

#[actix_rt::test]
async fn response_headers_are_exposed_case_insensitively() {
    let stub = StubServer::start();

    let response = stub
        .transport()
        .send(RestRequest::post("status/201"))
        .await
        .expect("stub answers");

    assert_eq!(response.status, 201);
    assert_eq!(response.header("etag"), Some("\"3\""));
    assert_eq!(
        response.header("LOCATION"),
        Some("https://localhost:3000/rest/buecher/42")
    );
    stub.stop().await;
}

#[actix_rt::test]
async fn refused_connections_map_to_network_errors() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
        listener.local_addr().expect("probe address").port()
    };
    let transport = ReqwestTransport::new(
        Url::parse(&format!("http://127.0.0.1:{port}/rest")).expect("base url"),
        Duration::from_secs(5),
    )
    .expect("client builds");

    let err = transport
        .send(RestRequest::get("buecher"))
        .await
        .expect_err("nothing listens on the port");

    assert!(
        matches!(err, RestTransportError::Network { .. }),
        "unexpected error: {err:?}"
    );
}
