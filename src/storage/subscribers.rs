//! Chat users who contacted the bot.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::core::error::AppResult;
use crate::storage::db::now_timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscriber {
    pub id: i64,
    /// Telegram user id
    pub user_id: i64,
    pub first_name: Option<String>,
    pub username: Option<String>,
    pub joined_at: String,
    pub is_active: bool,
}

impl Subscriber {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Subscriber {
            id: row.get(0)?,
            user_id: row.get(1)?,
            first_name: row.get(2)?,
            username: row.get(3)?,
            joined_at: row.get(4)?,
            is_active: row.get::<_, i64>(5)? != 0,
        })
    }
}

/// Outcome of registering a chat user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberUpsert {
    Created,
    /// Was inactive, now active again
    Reactivated,
    Existing,
}

const SELECT_SUBSCRIBER: &str = "SELECT id, user_id, first_name, username, joined_at, is_active FROM subscribers";

/// Registers a user, or refreshes the name and handle of a returning one
/// and marks them active again.
pub fn upsert_subscriber(
    conn: &Connection,
    user_id: i64,
    first_name: Option<&str>,
    username: Option<&str>,
) -> AppResult<SubscriberUpsert> {
    let was_active: Option<i64> = conn
        .query_row(
            "SELECT is_active FROM subscribers WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;

    match was_active {
        None => {
            conn.execute(
                "INSERT INTO subscribers (user_id, first_name, username, joined_at, is_active)
                 VALUES (?1, ?2, ?3, ?4, 1)
                 ON CONFLICT(user_id) DO UPDATE SET is_active = 1",
                params![user_id, first_name, username, now_timestamp()],
            )?;
            Ok(SubscriberUpsert::Created)
        }
        Some(active) => {
            conn.execute(
                "UPDATE subscribers SET first_name = ?1, username = ?2, is_active = 1 WHERE user_id = ?3",
                params![first_name, username, user_id],
            )?;
            Ok(if active == 0 {
                SubscriberUpsert::Reactivated
            } else {
                SubscriberUpsert::Existing
            })
        }
    }
}

pub fn get_subscriber(conn: &Connection, user_id: i64) -> AppResult<Option<Subscriber>> {
    let sql = format!("{} WHERE user_id = ?1", SELECT_SUBSCRIBER);
    Ok(conn.query_row(&sql, params![user_id], Subscriber::from_row).optional()?)
}

pub fn list_active_subscribers(conn: &Connection) -> AppResult<Vec<Subscriber>> {
    let sql = format!("{} WHERE is_active = 1 ORDER BY joined_at, id", SELECT_SUBSCRIBER);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], Subscriber::from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn count_active_subscribers(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM subscribers WHERE is_active = 1", [], |row| {
        row.get(0)
    })?)
}

/// Soft (de)activation. Returns `false` for an unknown user.
pub fn set_subscriber_active(conn: &Connection, user_id: i64, active: bool) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE subscribers SET is_active = ?1 WHERE user_id = ?2",
        params![active as i64, user_id],
    )?;
    Ok(changed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::test_connection;

    #[test]
    fn test_repeat_contact_keeps_one_record() {
        let conn = test_connection();
        assert_eq!(
            upsert_subscriber(&conn, 42, Some("Ann"), Some("ann")).unwrap(),
            SubscriberUpsert::Created
        );
        assert_eq!(
            upsert_subscriber(&conn, 42, Some("Ann"), Some("ann")).unwrap(),
            SubscriberUpsert::Existing
        );
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM subscribers WHERE user_id = 42", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_returning_user_is_reactivated_and_refreshed() {
        let conn = test_connection();
        upsert_subscriber(&conn, 7, Some("Bob"), None).unwrap();
        assert!(set_subscriber_active(&conn, 7, false).unwrap());
        assert_eq!(count_active_subscribers(&conn).unwrap(), 0);

        assert_eq!(
            upsert_subscriber(&conn, 7, Some("Robert"), Some("bobby")).unwrap(),
            SubscriberUpsert::Reactivated
        );
        let sub = get_subscriber(&conn, 7).unwrap().unwrap();
        assert!(sub.is_active);
        assert_eq!(sub.first_name.as_deref(), Some("Robert"));
        assert_eq!(sub.username.as_deref(), Some("bobby"));
    }

    #[test]
    fn test_list_active_only() {
        let conn = test_connection();
        upsert_subscriber(&conn, 1, None, None).unwrap();
        upsert_subscriber(&conn, 2, None, None).unwrap();
        upsert_subscriber(&conn, 3, None, None).unwrap();
        set_subscriber_active(&conn, 2, false).unwrap();

        let ids: Vec<i64> = list_active_subscribers(&conn)
            .unwrap()
            .into_iter()
            .map(|s| s.user_id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(!set_subscriber_active(&conn, 99, true).unwrap());
    }
}
