//! Edit session against a live catalog-server on an ephemeral port

use catalog_common::db::init_memory_database;
use catalog_common::models::ClassCode;
use catalog_server::{build_router, AppState};
use catalog_ui::{CatalogClient, EditSession, NoticeKind, PublisherChoice};
use sqlx::SqlitePool;

const TOKEN: &str = "editor-token";

async fn seed(pool: &SqlitePool) {
    for sql in [
        "INSERT INTO book (id, title, type, series) VALUES (1, 'Статистическая физика', 'Учебник', 'Теоретическая физика')",
        "INSERT INTO author (id, first_name, last_name) VALUES (1, 'Лев', 'Ландау')",
        "INSERT INTO author (id, first_name, last_name) VALUES (2, 'Евгений', 'Лифшиц')",
        "INSERT INTO book_author (book_id, author_id) VALUES (1, 1)",
        "INSERT INTO grnti (id, code, description) VALUES (1, '29.19.00', 'Физика твердых тел')",
        "INSERT INTO grnti (id, code, description) VALUES (2, '29.17.00', 'Физика плазмы')",
        "INSERT INTO book_udc_raw (book_id, udc_code) VALUES (1, '536.7')",
        "INSERT INTO publisher (id, name) VALUES (1, 'Наука')",
    ] {
        sqlx::query(sql).execute(pool).await.unwrap();
    }
}

/// Start the real router and return its base URL
async fn spawn_server(token: Option<&str>) -> String {
    let pool = init_memory_database().await.unwrap();
    seed(&pool).await;

    let app = build_router(AppState::new(pool, token.map(str::to_string)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_open_edit_submit() {
    let base_url = spawn_server(Some(TOKEN)).await;
    let client = CatalogClient::new(base_url, Some(TOKEN.to_string())).unwrap();
    let mut session = EditSession::new(client);

    session.open(1).await.unwrap();
    let form = session.form_mut().unwrap();
    assert_eq!(form.title, "Статистическая физика");
    assert_eq!(form.udc_raw, "536.7");

    let lifshitz = session
        .client()
        .search_authors("лифшиц")
        .await
        .unwrap()
        .remove(0);
    let plasma = session.client().search_grnti("плазм").await.unwrap().remove(0);

    let form = session.form_mut().unwrap();
    form.add_author(lifshitz);
    form.add_grnti(ClassCode::from(&plasma));
    form.edition_statement = "3-е изд.".to_string();
    form.pub_city = "Москва".to_string();
    form.set_publisher(PublisherChoice {
        id: 1,
        name: "Наука".to_string(),
    });
    form.pub_year = Some(1976);

    let notice = session.submit().await;
    assert_eq!(notice.kind, NoticeKind::Success, "{}", notice);
    assert_eq!(notice.text, "Book #1 saved");

    let book = session.book().unwrap();
    assert_eq!(book.edition_statement.as_deref(), Some("3-е изд."));
    assert_eq!(book.authors.len(), 2);
    assert_eq!(book.grntis[0].code, "29.17.00");
    assert_eq!(book.udc_raws[0].udc_code, "536.7");
    assert_eq!(book.publication_places[0].pub_year, Some(1976));

    let form = session.form().unwrap();
    assert_eq!(form.authors_field(), "Ландау Лев; Лифшиц Евгений");
    assert_eq!(form.pub_name_field(), "Наука");
}

#[tokio::test]
async fn test_missing_book_notice_uses_server_message() {
    let base_url = spawn_server(None).await;
    let mut session = EditSession::new(CatalogClient::new(base_url, None).unwrap());

    let notice = session.open(404).await.unwrap_err();
    assert!(notice.is_error());
    assert_eq!(notice.text, "Book 404 not found");
    assert!(session.form().is_none());
}

#[tokio::test]
async fn test_wrong_token_is_api_error() {
    let base_url = spawn_server(Some(TOKEN)).await;
    let client = CatalogClient::new(base_url, Some("nope".to_string())).unwrap();

    let err = client.get_book(1).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Invalid bearer token");
}

#[tokio::test]
async fn test_empty_search_returns_nothing() {
    let base_url = spawn_server(None).await;
    let client = CatalogClient::new(base_url, None).unwrap();

    assert!(client.search_grnti("  ").await.unwrap().is_empty());
    assert_eq!(client.search_publishers("нау").await.unwrap().len(), 1);
    assert!(client.search_bbk("22").await.unwrap().is_empty());
    assert!(client.search_udc("536").await.unwrap().is_empty());
}
