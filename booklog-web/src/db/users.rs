//! Users and login sessions
//!
//! Accounts live in the `users` table (the single canonical user table);
//! sessions are bearer-token rows in `user_sessions`. Passwords are stored
//! as salted SHA-256 digests in the `password_hash`/`password_salt` columns.

use booklog_common::db::models::{SessionUser, UserMin};
use booklog_common::{Error, Result, Validator};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Minimum password length enforced at registration
const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate and create a new account.
///
/// A duplicate username is reported as a validation error on `username`
/// rather than a store failure, so the registration form can re-render.
pub async fn register_user(db: &SqlitePool, username: &str, password: &str) -> Result<UserMin> {
    let mut v = Validator::new();
    v.presence("username", username);
    v.presence("password", password);
    v.min_length("password", password, MIN_PASSWORD_LENGTH);

    if !username.trim().is_empty() {
        let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(db)
            .await?;
        if taken.is_some() {
            v.add("username", "is already taken");
        }
    }

    if let Some(errors) = v.errors() {
        return Err(Error::Validation(errors));
    }

    let salt = generate_salt();
    let hash = hash_password(&salt, password);

    let result =
        sqlx::query("INSERT INTO users (username, password_hash, password_salt) VALUES (?, ?, ?)")
            .bind(username)
            .bind(&hash)
            .bind(&salt)
            .execute(db)
            .await?;

    Ok(UserMin {
        id: result.last_insert_rowid(),
        username: username.to_string(),
    })
}

/// Check a username/password pair.
///
/// Unknown user and wrong password both come back as `None`; callers cannot
/// tell which.
pub async fn verify_login(
    db: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<UserMin>> {
    let row = sqlx::query(
        "SELECT id, username, password_hash, password_salt FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let salt: String = row.get("password_salt");
    let hash: String = row.get("password_hash");
    if hash_password(&salt, password) != hash {
        return Ok(None);
    }

    Ok(Some(UserMin {
        id: row.get("id"),
        username: row.get("username"),
    }))
}

/// Resolve a path-embedded username to its user row.
pub async fn find_user_by_username(db: &SqlitePool, username: &str) -> Result<UserMin> {
    let row = sqlx::query("SELECT id, username FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user {}", username)))?;

    Ok(UserMin {
        id: row.get("id"),
        username: row.get("username"),
    })
}

/// Open a new session for a user and return its bearer token.
pub async fn create_session(db: &SqlitePool, user_id: i64) -> Result<String> {
    let token = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO user_sessions (id, user_id) VALUES (?, ?)")
        .bind(&token)
        .bind(user_id)
        .execute(db)
        .await?;

    Ok(token)
}

/// Drop a session. Unknown tokens are a no-op.
pub async fn delete_session(db: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM user_sessions WHERE id = ?")
        .bind(token)
        .execute(db)
        .await?;

    Ok(())
}

/// Look a session token up and join it to its user.
pub async fn session_user(db: &SqlitePool, token: &str) -> Result<Option<SessionUser>> {
    let row = sqlx::query(
        "SELECT user_sessions.id AS session_id, users.id AS user_id, users.username \
         FROM user_sessions JOIN users ON user_sessions.user_id = users.id \
         WHERE user_sessions.id = ?",
    )
    .bind(token)
    .fetch_optional(db)
    .await?;

    Ok(row.map(|row| SessionUser {
        session_id: row.get("session_id"),
        user_id: row.get("user_id"),
        username: row.get("username"),
    }))
}

fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use booklog_common::db::init::create_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_register_and_login_round_trip() {
        let pool = test_pool().await;

        let user = register_user(&pool, "alice", "correct horse").await.unwrap();
        assert!(user.id > 0);

        let found = verify_login(&pool, "alice", "correct horse").await.unwrap();
        assert_eq!(found, Some(user));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_alike() {
        let pool = test_pool().await;
        register_user(&pool, "alice", "correct horse").await.unwrap();

        let wrong = verify_login(&pool, "alice", "battery staple").await.unwrap();
        let unknown = verify_login(&pool, "mallory", "battery staple").await.unwrap();
        assert!(wrong.is_none());
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn test_register_validates_fields() {
        let pool = test_pool().await;

        let err = register_user(&pool, "", "").await.unwrap_err();
        match err {
            Error::Validation(errors) => {
                assert!(errors.get("username").is_some());
                assert!(errors.get("password").is_some());
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let err = register_user(&pool, "alice", "short").await.unwrap_err();
        match err {
            Error::Validation(errors) => {
                assert_eq!(
                    errors.get("password").unwrap(),
                    &["must be at least 8 characters"]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_username() {
        let pool = test_pool().await;
        register_user(&pool, "alice", "correct horse").await.unwrap();

        let err = register_user(&pool, "alice", "battery staple").await.unwrap_err();
        match err {
            Error::Validation(errors) => {
                assert_eq!(errors.get("username").unwrap(), &["is already taken"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let pool = test_pool().await;
        let user = register_user(&pool, "alice", "correct horse").await.unwrap();

        let token = create_session(&pool, user.id).await.unwrap();

        let session = session_user(&pool, &token).await.unwrap().unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.username, "alice");

        delete_session(&pool, &token).await.unwrap();
        assert!(session_user(&pool, &token).await.unwrap().is_none());

        // deleting again stays quiet
        delete_session(&pool, &token).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_session_token_is_none() {
        let pool = test_pool().await;
        assert!(session_user(&pool, "no-such-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_salts_differ_between_users() {
        let pool = test_pool().await;
        register_user(&pool, "alice", "correct horse").await.unwrap();
        register_user(&pool, "bob", "correct horse").await.unwrap();

        let hashes: Vec<String> = sqlx::query_scalar("SELECT password_hash FROM users")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_ne!(hashes[0], hashes[1]);
    }
}
