//! Runs against a real server when `KV_TEST_REDIS_URL` is set, e.g.
//! `KV_TEST_REDIS_URL=redis://127.0.0.1:6379/15 cargo test -p kv-actor --test redis_test`.
//! Without it every test returns early.

use kv_actor::{Backend, KvEngine, KvError, RedisEngine};
use std::collections::HashMap;

async fn connect() -> Option<RedisEngine> {
    let url = std::env::var("KV_TEST_REDIS_URL").ok()?;
    Some(RedisEngine::connect(&url).await.expect("redis connection"))
}

#[tokio::test]
async fn test_counter_survives_reconnect() {
    let Some(engine) = connect().await else {
        return;
    };
    engine.del(vec!["kvtest:nextID".into()]).await.unwrap();

    assert_eq!(engine.incr("kvtest:nextID").await, Ok(1));
    let url = engine.url().to_string();
    drop(engine);

    let engine = RedisEngine::connect(&url).await.unwrap();
    assert_eq!(engine.incr("kvtest:nextID").await, Ok(2));
    engine.del(vec!["kvtest:nextID".into()]).await.unwrap();
}

#[tokio::test]
async fn test_hash_scan_and_wrong_type() {
    let Some(engine) = connect().await else {
        return;
    };
    let backend = Backend::from(engine);
    let keys: Vec<String> = (1..=25).map(|i| format!("kvscan:order:{i}")).collect();
    backend.del(keys.clone()).await.unwrap();

    for key in &keys {
        backend
            .hset(key, HashMap::from([("abc".into(), "1".into())]))
            .await
            .unwrap();
    }
    let mut found = backend.scan_all(Some("kvscan:order:*")).await.unwrap();
    found.sort();
    found.dedup();
    assert_eq!(found.len(), 25);

    assert_eq!(
        backend.get(&keys[0]).await,
        Err(KvError::WrongType(keys[0].clone()))
    );
    assert_eq!(backend.hset(&keys[0], HashMap::new()).await, Ok(0));
    assert_eq!(backend.del(keys).await, Ok(25));
}
