// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Redis-backed ordered key-value store.
//!
//! Redis has no ordered keyspace, so ordering is kept in a sorted set:
//!
//! - every key is a member of `index_key` with score 0, which makes
//!   `ZRANGEBYLEX` a byte-wise range scan;
//! - every value lives in a plain string entry named `index_key`, a NUL
//!   byte, then the key. Stores with different index keys therefore share a
//!   database without touching each other's values.
//!
//! `put` writes both in one `MULTI`/`EXEC` pipeline. `range_scan` is a
//! `ZRANGEBYLEX [lower (upper` followed by one `MGET`.

use std::future::Future;

use async_trait::async_trait;
use parking_lot::RwLock;
use redis::aio::MultiplexedConnection;
use redis::{Client, ErrorKind, RedisError, RedisResult};
use tracing::{debug, info, instrument, warn};

use super::{redact_url, Key, KeyRange, KvStore, StoreConfig, StoreError, Value};

/// Redis store with a lazily established, shared connection.
///
/// One multiplexed connection is shared by all callers; each call clones
/// the handle, so no caller ever holds the connection exclusively. When a
/// call fails with a connection-class error the handle is dropped and the
/// next call reconnects.
pub struct RedisStore {
    client: Client,
    config: StoreConfig,
    conn: RwLock<Option<MultiplexedConnection>>,
}

impl RedisStore {
    /// Creates a client for `config.url`. Does not connect.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let client = Client::open(config.url.as_str())
            .map_err(|e| StoreError::InvalidConfig(format!("invalid url {}: {}", config.url, e)))?;

        Ok(Self {
            client,
            config,
            conn: RwLock::new(None),
        })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns true if a connection is currently cached.
    pub fn is_connected(&self) -> bool {
        self.conn.read().is_some()
    }

    /// Round-trips a `PING`.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let cmd = redis::cmd("PING");
        self.execute("ping", move |mut conn| async move {
            let _: String = cmd.query_async(&mut conn).await?;
            Ok(())
        })
        .await
    }

    async fn connection(&self) -> Result<MultiplexedConnection, StoreError> {
        let cached = self.conn.read().clone();
        if let Some(conn) = cached {
            return Ok(conn);
        }

        let connect = self.client.get_multiplexed_async_connection();
        let conn = match tokio::time::timeout(self.config.connect_timeout, connect).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(classify(e)),
            Err(_) => {
                return Err(StoreError::unavailable(format!(
                    "connect timed out after {:?}",
                    self.config.connect_timeout
                )))
            }
        };
        info!(url = %redact_url(&self.config.url), "connected to redis");

        // Another task may have connected concurrently; keep the first.
        let mut slot = self.conn.write();
        Ok(slot.get_or_insert(conn).clone())
    }

    fn invalidate(&self) {
        if self.conn.write().take().is_some() {
            warn!(url = %redact_url(&self.config.url), "dropping redis connection, will reconnect on next use");
        }
    }

    /// Runs one round trip under the operation deadline.
    async fn execute<T, F, Fut>(&self, op: &'static str, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(MultiplexedConnection) -> Fut + Send,
        Fut: Future<Output = RedisResult<T>> + Send,
        T: Send,
    {
        let conn = self.connection().await?;
        match tokio::time::timeout(self.config.op_timeout, f(conn)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                let err = classify(e);
                if err.is_transient() {
                    self.invalidate();
                } else {
                    tracing::error!(op, error = %err, "redis rejected request");
                }
                Err(err)
            }
            Err(_) => {
                self.invalidate();
                Err(StoreError::unavailable(format!(
                    "{} timed out after {:?}",
                    op, self.config.op_timeout
                )))
            }
        }
    }

    /// Name of the string entry holding the value of `key`.
    fn value_key(&self, key: &[u8]) -> Vec<u8> {
        let index = self.config.index_key.as_bytes();
        let mut name = Vec::with_capacity(index.len() + 1 + key.len());
        name.extend_from_slice(index);
        name.push(0);
        name.extend_from_slice(key);
        name
    }

    fn lex_bound(prefix: u8, key: &Key) -> Vec<u8> {
        let mut bound = Vec::with_capacity(1 + key.as_bytes().len());
        bound.push(prefix);
        bound.extend_from_slice(key.as_bytes());
        bound
    }
}

#[async_trait]
impl KvStore for RedisStore {
    #[instrument(skip_all, fields(key_len = key.as_bytes().len()))]
    async fn get(&self, key: &Key) -> Result<Option<Value>, StoreError> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(self.value_key(key.as_bytes()));

        let value = self
            .execute("get", move |mut conn| async move {
                let value: Option<Vec<u8>> = cmd.query_async(&mut conn).await?;
                Ok(value)
            })
            .await?;
        Ok(value.map(Value::new))
    }

    #[instrument(skip_all, fields(key_len = key.as_bytes().len(), value_len = value.as_bytes().len()))]
    async fn put(&self, key: Key, value: Value) -> Result<(), StoreError> {
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("ZADD")
            .arg(&self.config.index_key)
            .arg(0)
            .arg(key.as_bytes())
            .ignore()
            .cmd("SET")
            .arg(self.value_key(key.as_bytes()))
            .arg(value.as_bytes())
            .ignore();

        self.execute("put", move |mut conn| async move {
            let _: () = pipe.query_async(&mut conn).await?;
            Ok(())
        })
        .await
    }

    #[instrument(skip_all)]
    async fn range_scan(&self, range: &KeyRange) -> Result<Vec<(Key, Value)>, StoreError> {
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let mut zrange = redis::cmd("ZRANGEBYLEX");
        zrange
            .arg(&self.config.index_key)
            .arg(Self::lex_bound(b'[', &range.lower))
            .arg(Self::lex_bound(b'(', &range.upper));

        let members = self
            .execute("range_scan", move |mut conn| async move {
                let members: Vec<Vec<u8>> = zrange.query_async(&mut conn).await?;
                Ok(members)
            })
            .await?;

        if members.is_empty() {
            debug!(entries = 0, "range scan");
            return Ok(Vec::new());
        }

        let mut mget = redis::cmd("MGET");
        for member in &members {
            mget.arg(self.value_key(member));
        }
        let values = self
            .execute("range_scan", move |mut conn| async move {
                let values: Vec<Option<Vec<u8>>> = mget.query_async(&mut conn).await?;
                Ok(values)
            })
            .await?;

        if values.len() != members.len() {
            return Err(StoreError::RequestRejected(format!(
                "MGET returned {} values for {} keys",
                values.len(),
                members.len()
            )));
        }

        // A member whose value is gone was removed by an external process
        // between the two commands.
        let entries: Vec<(Key, Value)> = members
            .into_iter()
            .zip(values)
            .filter_map(|(k, v)| v.map(|v| (Key::new(k), Value::new(v))))
            .collect();

        debug!(entries = entries.len(), "range scan");
        Ok(entries)
    }
}

/// Maps a Redis error onto the store taxonomy.
fn classify(err: RedisError) -> StoreError {
    let transient = err.is_io_error()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
        || err.is_timeout()
        || matches!(
            err.kind(),
            ErrorKind::BusyLoadingError
                | ErrorKind::TryAgain
                | ErrorKind::ClusterDown
                | ErrorKind::MasterDown
        );

    if transient {
        StoreError::unavailable(err.to_string())
    } else {
        StoreError::RequestRejected(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    #[test]
    fn test_open_does_not_connect() {
        let store = RedisStore::open(StoreConfig::new("redis://127.0.0.1:1/0")).unwrap();
        assert!(!store.is_connected());
    }

    #[test]
    fn test_open_rejects_bad_url() {
        let result = RedisStore::open(StoreConfig::new("not a url"));
        assert!(matches!(result, Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_open_validates_config() {
        let config = StoreConfig::default().with_op_timeout(Duration::ZERO);
        assert!(matches!(RedisStore::open(config), Err(StoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_lex_bounds() {
        let key = Key::new(vec![0x01, 0x00, 0xff]);
        assert_eq!(RedisStore::lex_bound(b'[', &key), vec![b'[', 0x01, 0x00, 0xff]);
        assert_eq!(RedisStore::lex_bound(b'(', &key), vec![b'(', 0x01, 0x00, 0xff]);
    }

    #[test]
    fn test_classify() {
        let io: RedisError = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset").into();
        assert!(classify(io).is_transient());

        let loading: RedisError = (ErrorKind::BusyLoadingError, "loading").into();
        assert!(classify(loading).is_transient());

        let wrong_type: RedisError = (ErrorKind::TypeError, "WRONGTYPE").into();
        assert!(matches!(classify(wrong_type), StoreError::RequestRejected(_)));

        let response: RedisError = (ErrorKind::ResponseError, "ERR syntax error").into();
        assert!(matches!(classify(response), StoreError::RequestRejected(_)));
    }

    #[test]
    fn test_value_keys_are_namespaced_by_index() {
        let a = RedisStore::open(StoreConfig::default().with_index_key("tenant-a:index")).unwrap();
        let b = RedisStore::open(StoreConfig::default().with_index_key("tenant-b:index")).unwrap();
        let key = [0x01, 0x00, 0x00, 0x00, 0x02, b'u', b'1'];

        assert_ne!(a.value_key(&key), b.value_key(&key));
        assert_eq!(a.value_key(&key), [b"tenant-a:index\0".as_slice(), &key[..]].concat());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let config = StoreConfig::new("redis://127.0.0.1:1/0")
            .with_connect_timeout(Duration::from_millis(200));
        let store = RedisStore::open(config).unwrap();

        let err = store.get(&Key::from("k")).await.unwrap_err();
        assert!(err.is_transient(), "expected Unavailable, got {:?}", err);
        assert!(!store.is_connected());
    }

    /// Answers every RESP command with `+PONG` for `PING` and `+OK` otherwise.
    async fn serve_resp(stream: TcpStream) {
        let (read, mut write) = stream.into_split();
        let mut reader = BufReader::new(read);
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                return;
            }
            let Some(count) = line.trim_end().strip_prefix('*').and_then(|n| n.parse::<usize>().ok())
            else {
                return;
            };

            let mut args = Vec::with_capacity(count);
            for _ in 0..count {
                line.clear();
                if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                    return;
                }
                let Some(len) = line.trim_end().strip_prefix('$').and_then(|n| n.parse::<usize>().ok())
                else {
                    return;
                };
                let mut arg = vec![0u8; len + 2];
                if reader.read_exact(&mut arg).await.is_err() {
                    return;
                }
                arg.truncate(len);
                args.push(arg);
            }

            let is_ping = args.first().is_some_and(|cmd| cmd.eq_ignore_ascii_case(b"PING"));
            let reply: &[u8] = if is_ping { b"+PONG\r\n" } else { b"+OK\r\n" };
            if write.write_all(reply).await.is_err() {
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_silent_server_hits_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let config = StoreConfig::new(format!("redis://{}", addr))
            .with_connect_timeout(Duration::from_millis(200))
            .with_op_timeout(Duration::from_millis(200));
        let store = RedisStore::open(config).unwrap();

        let started = Instant::now();
        let err = store.ping().await.unwrap_err();

        assert!(err.is_transient(), "expected Unavailable, got {:?}", err);
        assert!(err.to_string().contains("timed out"), "unexpected error: {}", err);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!store.is_connected());
    }

    #[tokio::test]
    async fn test_reconnects_after_dropped_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((first, _)) = listener.accept().await {
                drop(first);
            }
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve_resp(stream));
            }
        });

        let config = StoreConfig::new(format!("redis://{}", addr))
            .with_connect_timeout(Duration::from_secs(1))
            .with_op_timeout(Duration::from_secs(1));
        let store = RedisStore::open(config).unwrap();

        let err = store.ping().await.unwrap_err();
        assert!(err.is_transient(), "expected Unavailable, got {:?}", err);
        assert!(!store.is_connected());

        store.ping().await.unwrap();
        assert!(store.is_connected());
        store.ping().await.unwrap();
    }

    /// Requires a running Redis; set `MINUTESTORE_TEST_REDIS_URL`.
    #[tokio::test]
    #[ignore]
    async fn test_roundtrip_against_redis() {
        let Ok(url) = std::env::var("MINUTESTORE_TEST_REDIS_URL") else {
            return;
        };
        let index = format!("minutestore:test:{}", rand::random::<u64>());
        let store = RedisStore::open(StoreConfig::new(url).with_index_key(index)).unwrap();

        store.ping().await.unwrap();
        for k in ["aaa", "bbb", "ccc", "ddd"] {
            store.put(Key::from(k), Value::from(k)).await.unwrap();
        }

        let results = store
            .range_scan(&KeyRange::new(Key::from("bbb"), Key::from("ddd")))
            .await
            .unwrap();
        let values: Vec<_> = results.iter().map(|(_, v)| v.as_bytes().to_vec()).collect();
        assert_eq!(values, vec![b"bbb".to_vec(), b"ccc".to_vec()]);
        assert_eq!(store.get(&Key::from("aaa")).await.unwrap(), Some(Value::from("aaa")));
    }

    /// Requires a running Redis; set `MINUTESTORE_TEST_REDIS_URL`.
    #[tokio::test]
    #[ignore]
    async fn test_index_keys_isolate_values() {
        let Ok(url) = std::env::var("MINUTESTORE_TEST_REDIS_URL") else {
            return;
        };
        let run = rand::random::<u64>();
        let open = |tenant: &str| {
            RedisStore::open(
                StoreConfig::new(url.as_str()).with_index_key(format!("minutestore:test:{}:{}", run, tenant)),
            )
            .unwrap()
        };
        let a = open("a");
        let b = open("b");

        a.put(Key::from("k"), Value::from("from-a")).await.unwrap();
        b.put(Key::from("k"), Value::from("from-b")).await.unwrap();

        assert_eq!(a.get(&Key::from("k")).await.unwrap(), Some(Value::from("from-a")));
        let scanned = a
            .range_scan(&KeyRange::new(Key::from("a"), Key::from("z")))
            .await
            .unwrap();
        assert_eq!(scanned, vec![(Key::from("k"), Value::from("from-a"))]);
    }
}
