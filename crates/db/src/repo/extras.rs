use sqlx::SqlitePool;

/// Derived per-title data that is expensive to compute and never expires.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ExtrasRecord {
    pub tmdb_id: i64,
    pub songs_playlist_url: Option<String>,
    pub created_ts: i64,
    pub updated_ts: i64,
}

/// Fields to write on upsert. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtrasFields {
    pub songs_playlist_url: Option<String>,
}

/// Lookup the extras row for a TMDB id.
pub async fn lookup(pool: &SqlitePool, tmdb_id: i64) -> Result<Option<ExtrasRecord>, sqlx::Error> {
    let row: Option<(i64, Option<String>, i64, i64)> = sqlx::query_as(
        "SELECT tmdb_id, songs_playlist_url, created_ts, updated_ts \
         FROM movie_extras WHERE tmdb_id = ?",
    )
    .bind(tmdb_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(
        |(tmdb_id, songs_playlist_url, created_ts, updated_ts)| ExtrasRecord {
            tmdb_id,
            songs_playlist_url,
            created_ts,
            updated_ts,
        },
    ))
}

/// Create or overwrite the extras row for a TMDB id in one statement.
///
/// Concurrent upserts for the same id serialize in SQLite; the last one wins.
pub async fn upsert(
    pool: &SqlitePool,
    tmdb_id: i64,
    fields: &ExtrasFields,
) -> Result<ExtrasRecord, sqlx::Error> {
    let now = chrono::Utc::now().timestamp();
    let row: (i64, Option<String>, i64, i64) = sqlx::query_as(
        "INSERT INTO movie_extras (tmdb_id, songs_playlist_url, created_ts, updated_ts) \
         VALUES (?, ?, ?, ?) \
         ON CONFLICT(tmdb_id) DO UPDATE SET \
           songs_playlist_url = COALESCE(excluded.songs_playlist_url, movie_extras.songs_playlist_url), \
           updated_ts = excluded.updated_ts \
         RETURNING tmdb_id, songs_playlist_url, created_ts, updated_ts",
    )
    .bind(tmdb_id)
    .bind(fields.songs_playlist_url.as_deref())
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(ExtrasRecord {
        tmdb_id: row.0,
        songs_playlist_url: row.1,
        created_ts: row.2,
        updated_ts: row.3,
    })
}
