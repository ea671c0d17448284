use actix_web::http::header::CONTENT_TYPE;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use mockito::{Matcher, Server};
use reqwest::Url;
use tensorflowrequest::receiver::Receiver;
use tensorflowrequest::server::routes;
use tensorflowrequest::tensorflow::TensorflowClient;
use tensorflowrequest::types::{ERROR_EVENT, RESPONSE_EVENT, TENSFORMATION_EVENT};

const PATH: &str = "/v1/models/detector:predict";

fn receiver(endpoint: &str) -> web::Data<Receiver> {
    let url = Url::parse(endpoint).unwrap();
    web::Data::new(Receiver::new(TensorflowClient::new(url)))
}

fn binary_request(ty: &str, body: &'static str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/")
        .insert_header(("ce-specversion", "1.0"))
        .insert_header(("ce-id", "1234"))
        .insert_header(("ce-type", ty.to_string()))
        .insert_header(("ce-source", "tensformation"))
        .insert_header((CONTENT_TYPE, "application/json"))
        .set_payload(body)
}

#[actix_web::test]
async fn binary_mode_prediction() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("content-type", "application/json")
        .match_body(Matcher::Exact(r#"{"instances":[{"b64":"AAAA"}]}"#.to_string()))
        .with_body(r#"{"predictions":[]}"#)
        .expect(1)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(receiver(&format!("{}{PATH}", server.url())))
            .configure(routes::configure),
    )
    .await;

    let req = binary_request(TENSFORMATION_EVENT, r#"{"b64":"AAAA","url":"http://caller"}"#)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    let headers = res.headers();
    assert_eq!(headers.get("ce-type").unwrap(), RESPONSE_EVENT);
    assert_eq!(headers.get("ce-source").unwrap(), "http://caller");
    assert_eq!(headers.get("ce-specversion").unwrap(), "1.0");
    assert!(headers.get("ce-time").is_some());
    assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");

    let body = test::read_body(res).await;
    assert_eq!(&body[..], br#"{"predictions":[]}"#);
    mock.assert_async().await;
}

#[actix_web::test]
async fn binary_mode_wrong_type() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

    let app = test::init_service(
        App::new()
            .app_data(receiver(&format!("{}{PATH}", server.url())))
            .configure(routes::configure),
    )
    .await;

    let req = binary_request("com.example.other", r#"{"b64":"AAAA","url":"http://caller"}"#)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("ce-type").unwrap(), ERROR_EVENT);
    assert_eq!(res.headers().get("ce-source").unwrap(), "wrongEventType");
    let body = test::read_body(res).await;
    assert_eq!(&body[..], br#""wrong event type""#);
    mock.assert_async().await;
}

#[actix_web::test]
async fn structured_mode_prediction() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(404)
        .with_body(r#"{"predictions":[]}"#)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(receiver(&format!("{}{PATH}", server.url())))
            .configure(routes::configure),
    )
    .await;

    let event = serde_json::json!({
        "specversion": "1.0",
        "id": "1234",
        "type": TENSFORMATION_EVENT,
        "source": "tensformation",
        "datacontenttype": "application/json",
        "data": {"b64": "AAAA", "url": "http://caller"}
    });
    let req = test::TestRequest::post()
        .uri("/")
        .insert_header((CONTENT_TYPE, "application/cloudevents+json"))
        .set_payload(event.to_string())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get(CONTENT_TYPE).unwrap(),
        "application/cloudevents+json"
    );
    let reply: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(reply["type"], RESPONSE_EVENT);
    assert_eq!(reply["source"], "http://caller");
    assert_eq!(reply["data"], serde_json::json!({"predictions": []}));
}

#[actix_web::test]
async fn inference_endpoint_down() {
    let app = test::init_service(
        App::new()
            .app_data(receiver("http://127.0.0.1:9/v1/models/detector:predict"))
            .configure(routes::configure),
    )
    .await;

    let req = binary_request(TENSFORMATION_EVENT, r#"{"b64":"AAAA","url":"http://caller"}"#)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("ce-type").unwrap(), ERROR_EVENT);
    assert_eq!(
        res.headers().get("ce-source").unwrap(),
        "requestingFromTensorflow"
    );
    let message: String = test::read_body_json(res).await;
    assert!(!message.is_empty());
}

#[actix_web::test]
async fn malformed_events_are_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(receiver("http://127.0.0.1:9/v1/models/detector:predict"))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/")
        .insert_header((CONTENT_TYPE, "application/json"))
        .set_payload(r#"{"b64":"AAAA","url":"http://caller"}"#)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert!(body["errors"][0].as_str().unwrap().contains("specversion"));
}

#[actix_web::test]
async fn source_with_control_characters_is_percent_encoded() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_body(r#"{"predictions":[]}"#)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(receiver(&format!("{}{PATH}", server.url())))
            .configure(routes::configure),
    )
    .await;

    let req = binary_request(
        TENSFORMATION_EVENT,
        r#"{"b64":"AAAA","url":"http://caller/a\nb/café"}"#,
    )
    .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("ce-type").unwrap(), RESPONSE_EVENT);
    assert_eq!(
        res.headers().get("ce-source").unwrap(),
        "http://caller/a%0Ab/caf%C3%A9"
    );
    let body = test::read_body(res).await;
    assert_eq!(&body[..], br#"{"predictions":[]}"#);
}

#[actix_web::test]
async fn plain_text_prediction_is_forwarded() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(503)
        .with_body("upstream connect error")
        .expect(2)
        .create_async()
        .await;

    let app = test::init_service(
        App::new()
            .app_data(receiver(&format!("{}{PATH}", server.url())))
            .configure(routes::configure),
    )
    .await;

    let req = binary_request(TENSFORMATION_EVENT, r#"{"b64":"AAAA","url":"http://caller"}"#)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("ce-type").unwrap(), RESPONSE_EVENT);
    assert_eq!(res.headers().get("ce-source").unwrap(), "http://caller");
    let body = test::read_body(res).await;
    assert_eq!(&body[..], b"upstream connect error");

    let event = serde_json::json!({
        "specversion": "1.0",
        "id": "1234",
        "type": TENSFORMATION_EVENT,
        "source": "tensformation",
        "data": {"b64": "AAAA", "url": "http://caller"}
    });
    let req = test::TestRequest::post()
        .uri("/")
        .insert_header((CONTENT_TYPE, "application/cloudevents+json"))
        .set_payload(event.to_string())
        .to_request();
    let reply: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(reply["type"], RESPONSE_EVENT);
    assert_eq!(reply["datacontenttype"], "application/json");
    assert_eq!(reply["data_base64"], "dXBzdHJlYW0gY29ubmVjdCBlcnJvcg==");
    assert!(reply.get("data").is_none());
}
