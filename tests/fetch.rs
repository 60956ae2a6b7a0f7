use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bookdeck::data::{BookQuery, BookSource, HttpBookSource};
use bookdeck::model::Region;

const PAGE_ONE: &str = r#"[
    {
        "isbn": "978-1-4028-9462-6",
        "title": "The Quiet Harbor",
        "author": "Mina Solberg",
        "publisher": "Northlight Press",
        "uploaded": "2024-11-03T09:30:00Z",
        "cover": "https://covers.example/1.jpg",
        "likes": 7,
        "reviews": [
            {"text": "A slow burn.", "author": "Ida Renn", "company": "Daily Reader"}
        ]
    },
    {
        "isbn": "978-0-3851-2167-5",
        "title": "Marges",
        "author": "Colette Arnaud",
        "publisher": "Editions Rive",
        "uploaded": "2025-01-15T00:00:00Z",
        "cover": "https://covers.example/2.jpg"
    }
]"#;

fn sample_query() -> BookQuery {
    BookQuery {
        seed: 12345,
        page: 1,
        region: Region::En,
        reviews: 1,
    }
}

#[tokio::test]
async fn source_sends_all_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .and(query_param("seed", "12345"))
        .and(query_param("page", "1"))
        .and(query_param("region", "en"))
        .and(query_param("reviews", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE_ONE, "application/json"))
        .mount(&server)
        .await;

    let source = HttpBookSource::new(server.uri());
    let books = source.fetch_page(&sample_query()).await.expect("fetch ok");

    assert_eq!(books.len(), 2);
    assert_eq!(books[0].title, "The Quiet Harbor");
    assert_eq!(books[0].reviews.len(), 1);
    // Fields the generator omits fall back to defaults
    assert_eq!(books[1].likes, 0);
    assert!(books[1].reviews.is_empty());
}

#[tokio::test]
async fn source_passes_region_and_page_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .and(query_param("region", "fr"))
        .and(query_param("page", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
        .mount(&server)
        .await;

    let source = HttpBookSource::new(server.uri());
    let query = BookQuery {
        seed: 42,
        page: 4,
        region: Region::Fr,
        reviews: 3,
    };
    let books = source.fetch_page(&query).await.expect("fetch ok");
    assert!(books.is_empty());
}

#[tokio::test]
async fn source_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = HttpBookSource::new(server.uri());
    let err = source.fetch_page(&sample_query()).await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn source_fails_on_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
        .mount(&server)
        .await;

    let source = HttpBookSource::new(server.uri());
    let err = source.fetch_page(&sample_query()).await.unwrap_err();
    assert!(err.to_string().contains("parse"));
}

#[tokio::test]
async fn source_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_raw("[]", "application/json"),
        )
        .mount(&server)
        .await;

    let source = HttpBookSource::new(server.uri()).with_timeout(Duration::from_millis(50));
    let result = source.fetch_page(&sample_query()).await;
    assert!(result.is_err());
}
