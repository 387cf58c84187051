//! Shared fixtures: catalog schema for both engines and a row seeder.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use mediacat_storage::{DuckDbBackend, RecentFeed, SqliteBackend, StorageEngine};
use mediacat_types::{Media, MediaKind};
use serde_json::{json, Map, Value};

pub const DUCKDB_SCHEMA: &str = r#"
    CREATE TABLE anime (
        id VARCHAR PRIMARY KEY,
        slug VARCHAR,
        cover_image VARCHAR,
        banner_image VARCHAR,
        trailer VARCHAR,
        status VARCHAR,
        season VARCHAR,
        title JSON,
        current_episode DOUBLE,
        mappings JSON,
        synonyms VARCHAR[],
        country_of_origin VARCHAR,
        description VARCHAR,
        duration DOUBLE,
        color VARCHAR,
        "year" INTEGER,
        rating JSON,
        popularity JSON,
        average_rating DOUBLE,
        average_popularity DOUBLE,
        genres VARCHAR[],
        format VARCHAR,
        relations JSON,
        total_episodes DOUBLE,
        episodes JSON,
        tags JSON,
        artwork JSON,
        characters JSON
    );

    CREATE TABLE manga (
        id VARCHAR PRIMARY KEY,
        slug VARCHAR,
        cover_image VARCHAR,
        banner_image VARCHAR,
        status VARCHAR,
        title JSON,
        mappings JSON,
        synonyms VARCHAR[],
        country_of_origin VARCHAR,
        description VARCHAR,
        current_chapter DOUBLE,
        total_volumes DOUBLE,
        color VARCHAR,
        "year" INTEGER,
        rating JSON,
        popularity JSON,
        average_rating DOUBLE,
        average_popularity DOUBLE,
        genres VARCHAR[],
        format VARCHAR,
        relations JSON,
        publisher VARCHAR,
        author VARCHAR,
        total_chapters DOUBLE,
        chapters JSON,
        tags JSON,
        artwork JSON,
        characters JSON
    );
"#;

pub const SQLITE_SCHEMA: &str = r#"
    CREATE TABLE anime (
        id TEXT PRIMARY KEY,
        slug TEXT,
        cover_image TEXT,
        banner_image TEXT,
        trailer TEXT,
        status TEXT,
        season TEXT,
        title TEXT,
        current_episode REAL,
        mappings TEXT,
        synonyms TEXT,
        country_of_origin TEXT,
        description TEXT,
        duration REAL,
        color TEXT,
        year INTEGER,
        rating TEXT,
        popularity TEXT,
        average_rating REAL,
        average_popularity REAL,
        genres TEXT,
        format TEXT,
        relations TEXT,
        total_episodes REAL,
        episodes TEXT,
        tags TEXT,
        artwork TEXT,
        characters TEXT
    );

    CREATE TABLE manga (
        id TEXT PRIMARY KEY,
        slug TEXT,
        cover_image TEXT,
        banner_image TEXT,
        status TEXT,
        title TEXT,
        mappings TEXT,
        synonyms TEXT,
        country_of_origin TEXT,
        description TEXT,
        current_chapter REAL,
        total_volumes REAL,
        color TEXT,
        year INTEGER,
        rating TEXT,
        popularity TEXT,
        average_rating REAL,
        average_popularity REAL,
        genres TEXT,
        format TEXT,
        relations TEXT,
        publisher TEXT,
        author TEXT,
        total_chapters REAL,
        chapters TEXT,
        tags TEXT,
        artwork TEXT,
        characters TEXT
    );
"#;

/// Installs a test log subscriber (`RUST_LOG=debug` to see query text).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One catalog row to insert.
#[derive(Debug, Clone)]
pub struct Seed {
    pub kind: MediaKind,
    pub id: String,
    pub format: String,
    /// Whole `episodes` / `chapters` document.
    pub progress: Value,
    /// Raw text written to the `title` column.
    pub title: String,
    pub season: Option<String>,
    pub genres: Vec<String>,
}

impl Seed {
    pub fn anime(id: &str, format: &str, latest_count: i64, updated_at: Value) -> Self {
        Self::new(MediaKind::Anime, id, format, latest_count, updated_at)
    }

    pub fn manga(id: &str, format: &str, latest_count: i64, updated_at: Value) -> Self {
        Self::new(MediaKind::Manga, id, format, latest_count, updated_at)
    }

    fn new(kind: MediaKind, id: &str, format: &str, latest_count: i64, updated_at: Value) -> Self {
        Self {
            kind,
            id: id.to_string(),
            format: format.to_string(),
            progress: progress_doc(kind, latest_count, updated_at),
            title: json!({ "romaji": format!("Title {id}"), "english": null }).to_string(),
            season: None,
            genres: vec!["Action".to_string(), "Fantasy".to_string()],
        }
    }

    pub fn title_text(mut self, raw: &str) -> Self {
        self.title = raw.to_string();
        self
    }

    pub fn progress(mut self, progress: Value) -> Self {
        self.progress = progress;
        self
    }

    pub fn season(mut self, season: &str) -> Self {
        self.season = Some(season.to_string());
        self
    }
}

/// `{"latest": {"<count key>": n, "updatedAt": ..}, "data": []}`
pub fn progress_doc(kind: MediaKind, latest_count: i64, updated_at: Value) -> Value {
    let mut latest = Map::new();
    latest.insert(kind.latest_count_key().to_string(), json!(latest_count));
    latest.insert("updatedAt".to_string(), updated_at);
    json!({ "latest": latest, "data": [] })
}

fn duckdb_list(items: &[String]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|item| format!("'{}'", item.replace('\'', "''")))
        .collect();
    format!("[{}]", quoted.join(", "))
}

pub fn insert_duckdb(conn: &duckdb::Connection, seed: &Seed) {
    let genres = duckdb_list(&seed.genres);
    let synonyms = duckdb_list(std::slice::from_ref(&seed.id));
    let rating = r#"{"anilist": 8.5}"#;
    match seed.kind {
        MediaKind::Anime => {
            let sql = format!(
                "INSERT INTO anime (id, slug, season, title, synonyms, genres, format, episodes, \"year\", rating) \
                 VALUES (?, ?, ?, ?::JSON, {synonyms}, {genres}, ?, ?::JSON, ?, ?::JSON)"
            );
            conn.execute(
                &sql,
                duckdb::params![
                    seed.id,
                    format!("slug-{}", seed.id),
                    seed.season,
                    seed.title,
                    seed.format,
                    seed.progress.to_string(),
                    2023,
                    rating,
                ],
            )
            .unwrap();
        }
        MediaKind::Manga => {
            let sql = format!(
                "INSERT INTO manga (id, slug, title, synonyms, genres, format, chapters, \"year\", rating, author) \
                 VALUES (?, ?, ?::JSON, {synonyms}, {genres}, ?, ?::JSON, ?, ?::JSON, ?)"
            );
            conn.execute(
                &sql,
                duckdb::params![
                    seed.id,
                    format!("slug-{}", seed.id),
                    seed.title,
                    seed.format,
                    seed.progress.to_string(),
                    2019,
                    rating,
                    "Test Author",
                ],
            )
            .unwrap();
        }
    }
}

pub fn insert_sqlite(conn: &rusqlite::Connection, seed: &Seed) {
    let genres = serde_json::to_string(&seed.genres).unwrap();
    let synonyms = serde_json::to_string(&[&seed.id]).unwrap();
    let rating = r#"{"anilist": 8.5}"#;
    match seed.kind {
        MediaKind::Anime => {
            conn.execute(
                "INSERT INTO anime (id, slug, season, title, synonyms, genres, format, episodes, year, rating) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    seed.id,
                    format!("slug-{}", seed.id),
                    seed.season,
                    seed.title,
                    synonyms,
                    genres,
                    seed.format,
                    seed.progress.to_string(),
                    2023,
                    rating,
                ],
            )
            .unwrap();
        }
        MediaKind::Manga => {
            conn.execute(
                "INSERT INTO manga (id, slug, title, synonyms, genres, format, chapters, year, rating, author) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    seed.id,
                    format!("slug-{}", seed.id),
                    seed.title,
                    synonyms,
                    genres,
                    seed.format,
                    seed.progress.to_string(),
                    2019,
                    rating,
                    "Test Author",
                ],
            )
            .unwrap();
        }
    }
}

pub fn duckdb_conn(seeds: &[Seed]) -> Arc<Mutex<duckdb::Connection>> {
    let conn = duckdb::Connection::open_in_memory().unwrap();
    conn.execute_batch(DUCKDB_SCHEMA).unwrap();
    for seed in seeds {
        insert_duckdb(&conn, seed);
    }
    Arc::new(Mutex::new(conn))
}

pub fn sqlite_conn(seeds: &[Seed]) -> Arc<Mutex<rusqlite::Connection>> {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch(SQLITE_SCHEMA).unwrap();
    for seed in seeds {
        insert_sqlite(&conn, seed);
    }
    Arc::new(Mutex::new(conn))
}

pub fn duckdb_backend(seeds: &[Seed]) -> DuckDbBackend {
    DuckDbBackend::open_with_conn(duckdb_conn(seeds))
}

pub fn sqlite_backend(seeds: &[Seed]) -> SqliteBackend {
    SqliteBackend::open_with_conn(sqlite_conn(seeds))
}

/// The same seeds loaded into each engine.
pub fn feeds(seeds: &[Seed]) -> Vec<(StorageEngine, RecentFeed)> {
    init_tracing();
    vec![
        (
            StorageEngine::DuckDb,
            RecentFeed::new(Arc::new(duckdb_backend(seeds))),
        ),
        (
            StorageEngine::Sqlite,
            RecentFeed::new(Arc::new(sqlite_backend(seeds))),
        ),
    ]
}

pub fn ids(items: &[Media]) -> Vec<&str> {
    items.iter().map(Media::id).collect()
}
