use redis::{Client, RedisError, aio::ConnectionManager};
use serde::Serialize;

const DELETE_IF_EQUALS: &str = r"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
";

/// JSON-over-Redis key/value wrapper.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    /// Get the raw stored JSON for a key.
    pub async fn get_raw(&self, key: &str) -> redis::RedisResult<Option<String>> {
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await
    }

    /// Set a value with optional TTL (in seconds), replacing any previous value.
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: Option<u64>,
    ) -> redis::RedisResult<()> {
        let serialized = serde_json::to_string(value).map_err(|e| {
            redis::RedisError::from((
                redis::ErrorKind::TypeError,
                "Serialization error",
                e.to_string(),
            ))
        })?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(serialized);

        if let Some(ttl) = ttl_seconds {
            cmd.arg("EX").arg(ttl);
        }

        cmd.query_async(&mut self.connection.clone()).await
    }

    /// Delete `key` only while it still holds `expected`, in one server-side step.
    ///
    /// Returns whether this call removed it. A value overwritten since it was read
    /// is left alone.
    pub async fn delete_if_equals(&self, key: &str, expected: &str) -> redis::RedisResult<bool> {
        let removed: i64 = redis::Script::new(DELETE_IF_EQUALS)
            .key(key)
            .arg(expected)
            .invoke_async(&mut self.connection.clone())
            .await?;
        Ok(removed > 0)
    }
}

/// Cache key generators
pub mod keys {
    /// Pending OTP for a phone number
    pub fn otp(phone: &str) -> String {
        format!("otp:{}", phone)
    }
}

#[cfg(test)]
mod tests {
    use super::keys;

    #[test]
    fn otp_keys_are_namespaced_by_phone() {
        assert_eq!(keys::otp("+919876543210"), "otp:+919876543210");
    }
}
