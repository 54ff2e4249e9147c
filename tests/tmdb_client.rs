use fffinder_lib::{Film, TmdbClient, TmdbError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> TmdbClient {
    TmdbClient::new(Some("test-key".to_string()))
        .expect("client")
        .with_base_url(server.uri())
}

#[tokio::test]
async fn search_returns_first_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("query", "Shiva Baby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "results": [
                {"id": 1, "title": "Shiva Baby", "poster_path": "/first.jpg", "release_date": "2020-03-17"},
                {"id": 2, "title": "Shiva Baby (Short)", "poster_path": "/second.jpg"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let movie = client
        .search_movie("  Shiva   Baby ")
        .await
        .expect("search")
        .expect("a match");
    assert_eq!(movie.id, 1);
    assert_eq!(movie.poster_path.as_deref(), Some("/first.jpg"));
    assert_eq!(movie.release_date.as_deref(), Some("2020-03-17"));

    // answered from the cache
    let again = client.search_movie("shiva baby").await.expect("cached");
    assert_eq!(again.map(|m| m.id), Some(1));
}

#[tokio::test]
async fn concurrent_lookups_share_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_millis(100))
                .set_body_json(json!({"results": [{"id": 9, "title": "Tokyo Stories"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let (a, b) = tokio::join!(
        client.search_movie("Tokyo Stories"),
        client.search_movie("Tokyo Stories")
    );
    assert_eq!(a.expect("first").map(|m| m.id), Some(9));
    assert_eq!(b.expect("second").map(|m| m.id), Some(9));
}

#[tokio::test]
async fn no_results_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.search_movie("Unknown Film").await.expect("search"), None);
}

#[tokio::test]
async fn http_errors_are_reported_and_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    for _ in 0..2 {
        let err = client.search_movie("The Void").await.unwrap_err();
        assert!(matches!(err, TmdbError::Http(ref msg) if msg.contains("401")));
    }
}

#[tokio::test]
async fn enrich_film_sets_poster_and_tolerates_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "The New Boy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 3, "title": "The New Boy", "poster_path": "/newboy.jpg"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", "Echo Chamber"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let films = client
        .enrich_films(vec![
            Film::new("The New Boy", 2023, "Warwick Thornton"),
            Film::new("Echo Chamber", 2022, "Someone"),
        ])
        .await;

    assert_eq!(films[0].external_poster_path.as_deref(), Some("/newboy.jpg"));
    assert_eq!(films[1].external_poster_path, None);
}
