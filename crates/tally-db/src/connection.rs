use std::fs;
use std::ops::Deref;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection},
    Connection as SqlConnection,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::schema;

/// A thread safe connection to the database
#[derive(Clone)]
pub struct Connection(Arc<Mutex<SqliteConnection>>);

impl Deref for Connection {
    type Target = Mutex<SqliteConnection>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Open a connection to the database
pub async fn open(filename: &str) -> Result<Connection> {
    let opts = SqliteConnectOptions::from_str(filename)?
        .create_if_missing(true)
        .foreign_keys(true);
    let conn = SqliteConnection::connect_with(&opts).await?;
    let conn = Connection(Arc::new(Mutex::new(conn)));
    debug!(filename, "opened database");
    Ok(conn)
}

pub struct TestHandle {
    filename: String,
}

impl Drop for TestHandle {
    fn drop(&mut self) {
        let path = Path::new(&self.filename);
        if path.exists() {
            fs::remove_file(path).unwrap();
        }
    }
}

/// Open a new test database connection.
/// The database will be created on each open.
pub async fn open_test() -> (TestHandle, Connection) {
    let filename = format!("/tmp/tally_test_{}.sqlite3", rand::random::<u64>());
    let handle = TestHandle {
        filename: filename.clone(),
    };

    let opts = SqliteConnectOptions::from_str(&filename)
        .unwrap()
        .create_if_missing(true)
        .foreign_keys(true);
    let conn = SqliteConnection::connect_with(&opts).await.unwrap();
    let conn = Connection(Arc::new(Mutex::new(conn)));

    // Install the schema
    schema::install(&conn).await.unwrap();

    (handle, conn)
}
