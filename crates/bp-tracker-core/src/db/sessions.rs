//! Session persistence. At most one session is stored.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Session;

impl Database {
    /// Store `session`, replacing any previous one.
    pub fn save_session(&self, session: &Session) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO session (
                id, token, user_id, username, full_name, email, signed_in_at
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                session.token,
                session.user_id,
                session.username,
                session.full_name,
                session.email,
                session.signed_in_at,
            ],
        )?;
        Ok(())
    }

    /// The stored session, if any.
    pub fn get_session(&self) -> DbResult<Option<Session>> {
        self.conn
            .query_row(
                r#"
                SELECT token, user_id, username, full_name, email, signed_in_at
                FROM session
                WHERE id = 1
                "#,
                [],
                |row| {
                    Ok(Session {
                        token: row.get(0)?,
                        user_id: row.get(1)?,
                        username: row.get(2)?,
                        full_name: row.get(3)?,
                        email: row.get(4)?,
                        signed_in_at: row.get(5)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Remove the stored session. Returns whether one existed.
    pub fn clear_session(&self) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM session", [])?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_get() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_session().unwrap().is_none());

        let mut session = Session::new("abc123".into(), 7, "jdoe".into());
        session.email = Some("jdoe@example.com".into());
        db.save_session(&session).unwrap();

        assert_eq!(db.get_session().unwrap(), Some(session));
    }

    #[test]
    fn test_save_replaces() {
        let db = Database::open_in_memory().unwrap();
        db.save_session(&Session::new("first".into(), 1, "a".into()))
            .unwrap();
        db.save_session(&Session::new("second".into(), 2, "b".into()))
            .unwrap();

        let session = db.get_session().unwrap().unwrap();
        assert_eq!(session.token, "second");
        assert_eq!(session.user_id, 2);
    }

    #[test]
    fn test_clear() {
        let db = Database::open_in_memory().unwrap();
        db.save_session(&Session::new("tok".into(), 1, "a".into()))
            .unwrap();

        assert!(db.clear_session().unwrap());
        assert!(!db.clear_session().unwrap());
        assert!(db.get_session().unwrap().is_none());
    }
}
