//! Token revocation list kept in Redis.
//!
//! JWTs are stateless, so logout records the token id until the token would
//! have expired anyway. The auth extractor rejects any listed id.

use redis::AsyncCommands;

use crate::errors::AppError;

const KEY_PREFIX: &str = "studyhall:revoked:";

fn revoked_key(jti: &str) -> String {
    format!("{KEY_PREFIX}{jti}")
}

/// Mark a token id as revoked for `ttl_secs` seconds.
pub async fn revoke(client: &redis::Client, jti: &str, ttl_secs: u64) -> Result<(), AppError> {
    if ttl_secs == 0 {
        return Ok(());
    }
    let mut conn = client.get_multiplexed_async_connection().await?;
    let _: () = conn.set_ex(revoked_key(jti), 1u8, ttl_secs).await?;
    tracing::debug!(jti, ttl_secs, "Token revoked");
    Ok(())
}

/// Whether a token id has been revoked.
pub async fn is_revoked(client: &redis::Client, jti: &str) -> Result<bool, AppError> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let exists: bool = conn.exists(revoked_key(jti)).await?;
    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(revoked_key("abc"), "studyhall:revoked:abc");
    }
}
