use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Opens the pool and bootstraps the schema. A dead store at boot is fatal;
/// callers should abort startup on error rather than serve requests.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(database_url)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    const TABLES: &[&str] = &[
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'member'
        )",
        "CREATE TABLE IF NOT EXISTS restaurants (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            cuisine TEXT NOT NULL,
            description TEXT NOT NULL,
            location TEXT,
            author_id TEXT NOT NULL REFERENCES users(id)
        )",
        "CREATE TABLE IF NOT EXISTS restaurant_images (
            restaurant_id TEXT NOT NULL REFERENCES restaurants(id),
            url TEXT NOT NULL,
            filename TEXT NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            restaurant_id TEXT NOT NULL REFERENCES restaurants(id),
            author_id TEXT NOT NULL REFERENCES users(id),
            body TEXT NOT NULL,
            rating INTEGER NOT NULL,
            image_url TEXT,
            image_filename TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS chat_messages (
            id TEXT PRIMARY KEY,
            room_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            body TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )",
    ];

    for table in TABLES {
        sqlx::query(table).execute(pool).await?;
    }
    Ok(())
}
