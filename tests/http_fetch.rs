//! End-to-end fetches against a one-shot HTTP responder on 127.0.0.1.

use geo::{Geometry, LineString, Point};
use geofetch::api::{RequestOptions, fetch_features, fetch_overpass, wiki_url};
use geofetch::config::{OverpassConfig, WikidataConfig, load_params};
use geofetch::domain::{BoundingBox, Tag};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

/// Serve a single request with `status` and `body`, reporting the request line.
fn serve_once(status: u16, body: &str) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
        }
        tx.send(request_line.trim_end().to_string()).unwrap();

        let response = format!(
            "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
    });

    (format!("http://{}", addr), rx)
}

fn overpass_config(url: String) -> OverpassConfig {
    OverpassConfig {
        url: format!("{}/api/interpreter", url),
        timeout_secs: 5,
        ..OverpassConfig::default()
    }
}

#[test]
fn test_overpass_sends_query_as_data_param() {
    let (url, requests) = serve_once(
        200,
        r#"{"elements": [
            {"type": "node", "id": 1, "lat": 1.0, "lon": 2.0, "tags": {"amenity": "bench"}},
            {"type": "way", "id": 2, "nodes": [5, 6], "geometry": [{"lat": 0, "lon": 0}, {"lat": 1, "lon": 1}]},
            {"type": "relation", "id": 3}
        ]}"#,
    );

    let bbox = BoundingBox::new(0.0, 0.0, 1.0, 2.0);
    let tags = vec![Tag::new("amenity", "bench")];
    let table = fetch_overpass(&bbox, &tags, &overpass_config(url)).unwrap();

    let request_line = requests.recv().unwrap();
    assert!(request_line.starts_with("GET /api/interpreter?data="));

    assert_eq!(table.len(), 3);
    assert_eq!(
        table.rows()[0].geometry,
        Some(Geometry::Point(Point::new(2.0, 1.0)))
    );
    assert_eq!(
        table.rows()[1].geometry,
        Some(Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)])))
    );
    assert!(table.rows()[2].geometry.is_none());
    assert!(!table.has_column("nodes"));
}

#[test]
fn test_overpass_error_status_gives_empty_table() {
    let (url, _requests) = serve_once(504, r#"{"error": "timeout"}"#);

    let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
    let table = fetch_overpass(&bbox, &[Tag::new("a", "b")], &overpass_config(url)).unwrap();
    assert!(table.is_empty());
}

#[test]
fn test_overpass_empty_elements_gives_empty_table() {
    let (url, _requests) = serve_once(200, r#"{"version": 0.6, "elements": []}"#);

    let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
    let table = fetch_overpass(&bbox, &[], &overpass_config(url)).unwrap();
    assert!(table.is_empty());
}

#[test]
fn test_features_joins_url_and_params() {
    let (url, requests) = serve_once(
        206,
        r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [5.7, 45.1]}, "properties": {"name": "A"}}
        ]}"#,
    );

    let params = vec![("limit".to_string(), "10".to_string())];
    let table = fetch_features(&url, "/v1/stations", &params, &RequestOptions::json_api()).unwrap();

    assert_eq!(requests.recv().unwrap(), "GET /v1/stations?limit=10 HTTP/1.1");
    assert_eq!(table.len(), 1);
    assert_eq!(table.crs().epsg(), 4326);
}

#[test]
fn test_features_empty_collection_gives_empty_table() {
    let (url, _requests) = serve_once(200, r#"{"type": "FeatureCollection", "features": []}"#);

    let table = fetch_features(&url, "/empty", &[], &RequestOptions::json_api()).unwrap();
    assert!(table.is_empty());
}

#[test]
fn test_features_error_status_gives_empty_table() {
    let (url, _requests) = serve_once(404, r#"{"detail": "not found"}"#);

    let table = fetch_features(&url, "/missing", &[], &RequestOptions::json_api()).unwrap();
    assert!(table.is_empty());
}

const PARAMS: &str = r#"
ranges:
    x: [-284221, -277648]
    y: [5987515, 5992714]
buffer_value: 200
csv:
    file: "game_QA.csv"
    sep: ";"
nb_questions: 5
"#;

#[test]
fn test_load_params_from_url() {
    let (url, requests) = serve_once(200, PARAMS);

    let params = load_params(&format!("{}/params.yml", url)).unwrap();

    assert_eq!(requests.recv().unwrap(), "GET /params.yml HTTP/1.1");
    assert_eq!(params.nb_questions, 5);
    assert_eq!(params.csv_sep, ";");
    assert_eq!(params.ranges.x, [-284221.0, -277648.0]);
}

#[test]
fn test_load_params_error_status_fails() {
    let (url, _requests) = serve_once(404, "not found");

    let err = load_params(&format!("{}/params.yml", url)).unwrap_err();
    assert!(format!("{:#}", err).contains("404"));
}

fn wikidata_config(url: &str) -> WikidataConfig {
    WikidataConfig {
        base_url: format!("{}/{{}}.json", url),
        wiki: "frwiki".to_string(),
    }
}

#[test]
fn test_wiki_url_reads_sitelink() {
    let (url, requests) = serve_once(
        200,
        r#"{"entities": {"Q1289": {"id": "Q1289", "sitelinks": {
            "frwiki": {"site": "frwiki", "title": "Grenoble", "url": "https://fr.wikipedia.org/wiki/Grenoble"}
        }}}}"#,
    );

    let link = wiki_url(Some("Q1289"), &wikidata_config(&url)).unwrap();

    assert_eq!(requests.recv().unwrap(), "GET /Q1289.json HTTP/1.1");
    assert_eq!(link.as_deref(), Some("https://fr.wikipedia.org/wiki/Grenoble"));
}

#[test]
fn test_wiki_url_error_status_fails() {
    let (url, _requests) = serve_once(500, r#"{"error": "internal"}"#);

    let err = wiki_url(Some("Q1289"), &wikidata_config(&url)).unwrap_err();
    assert!(err.to_string().contains("500"));
}
