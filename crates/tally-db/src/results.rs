use sqlx::FromRow;

/// Row shape of an `INSERT ... RETURNING id`.
#[derive(Debug, Clone, FromRow)]
pub struct Id<T> {
    pub id: T,
}

/// True if the error is a violation of a UNIQUE constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(e) => {
            matches!(e.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}
