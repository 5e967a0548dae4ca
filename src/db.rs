use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub type Db = Pool<Sqlite>;

pub async fn connect(url: &str) -> Result<Db> {
    let opts = SqliteConnectOptions::from_str(url)?.foreign_keys(true);
    // An in-memory database lives and dies with its connection, so it must
    // never be spread across a pool.
    let mut pool = SqlitePoolOptions::new();
    if url.contains(":memory:") {
        pool = pool.max_connections(1).idle_timeout(None).max_lifetime(None);
    } else {
        pool = pool.max_connections(5);
    }
    Ok(pool.connect_with(opts).await?)
}

pub async fn migrate(db: &Db) -> Result<()> {
    // crate-relative path for sqlx migrations
    sqlx::migrate!("./migrations").run(db).await?;
    Ok(())
}
