//! End-to-end tests for building clients from config files and options.

use nodegroups_client::{ClientOptions, Endpoint, Error, NodegroupsClient};
use nodegroups_core::config::{DEFAULT_URI, DEFAULT_USER_AGENT};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn default_parameters() {
    let client = NodegroupsClient::from_options(None, &ClientOptions::default()).unwrap();

    assert_eq!(client.param("uri.ro").unwrap().as_deref(), Some(DEFAULT_URI));
    assert_eq!(client.param("uri.rw").unwrap().as_deref(), Some(DEFAULT_URI));
    assert_eq!(client.param("ssl_cafile").unwrap(), None);
    assert_eq!(client.param("ssl_capath").unwrap(), None);
    assert_eq!(
        client.param("ssl_verify_hostname").unwrap().as_deref(),
        Some("true")
    );
    assert_eq!(
        client.param("user_agent").unwrap().as_deref(),
        Some(DEFAULT_USER_AGENT)
    );
    assert_eq!(client.last_error(), None);
}

#[test]
fn unknown_parameter_is_reported() {
    let client = NodegroupsClient::from_options(None, &ClientOptions::default()).unwrap();

    let err = client.param("perl.ssl_cafile").unwrap_err();
    assert!(matches!(err, Error::UnknownParameter(_)));
    assert!(client
        .last_error()
        .unwrap()
        .starts_with("perl.ssl_cafile"));
}

#[test]
fn explicit_options_beat_file_beat_defaults() {
    let file = write_config(
        "[uri]\nro = http://file-ro.example.com/api/\nrw = http://file-rw.example.com/api/\n\n[perl]\nuser_agent = from-file\n",
    );
    let options = ClientOptions::new().with_uri_rw("http://opt-rw.example.com/api/");

    let client = NodegroupsClient::from_options(Some(file.path()), &options).unwrap();
    assert_eq!(
        client.base_url(Endpoint::Ro).as_str(),
        "http://file-ro.example.com/api/"
    );
    assert_eq!(
        client.base_url(Endpoint::Rw).as_str(),
        "http://opt-rw.example.com/api/"
    );
    assert_eq!(client.config().user_agent, "from-file");
    assert!(client.config().ssl_verify_hostname);
}

#[test]
fn missing_config_file_fails_with_os_message() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("client.ini");

    let err = NodegroupsClient::from_options(Some(&missing), &ClientOptions::default())
        .err()
        .expect("construction should fail");

    assert!(matches!(err, Error::ConfigError(_)));
    assert!(
        err.detail().contains("No such file or directory"),
        "unexpected message: {}",
        err.detail()
    );
}

#[tokio::test]
async fn configured_client_talks_to_file_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/list_nodes"))
        .and(query_param("nodegroup", "web"))
        .and(query_param("outputFormat", "json"))
        .and(header("user-agent", "ops-tool/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "message": "OK",
            "records": [{"node": "web01.example.com"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = write_config(&format!(
        "[uri]\nro = {}/api\n\n[perl]\nuser_agent = ops-tool/1.0\n",
        server.uri()
    ));

    let client = NodegroupsClient::from_options(Some(file.path()), &ClientOptions::default())
        .unwrap();
    let nodes = client.list_nodes_from_nodegroup("web").await.unwrap();

    assert_eq!(nodes, vec!["web01.example.com".to_string()]);
}
