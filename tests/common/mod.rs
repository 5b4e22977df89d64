#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use lifebridge::database::embedding_repo;
use lifebridge::services::embedding_service::{encode_vector, Embedder, Embedding};

// One connection so every query sees the same in-memory database.
pub async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");

    let ddl = [
        "CREATE TABLE users (
            id_user INTEGER PRIMARY KEY,
            name TEXT,
            surname TEXT,
            email TEXT,
            role TEXT,
            city TEXT,
            is_deleted INTEGER DEFAULT 0
        )",
        "CREATE TABLE hobbies (
            id_hobby INTEGER PRIMARY KEY,
            name TEXT,
            category TEXT
        )",
        "CREATE TABLE user_hobbies (
            id_user INTEGER NOT NULL,
            id_hobby INTEGER NOT NULL,
            UNIQUE(id_user, id_hobby)
        )",
        "CREATE TABLE user_embeddings (
            id_user INTEGER NOT NULL UNIQUE,
            vector TEXT NOT NULL,
            model TEXT NOT NULL,
            updated_at TEXT
        )",
    ];
    for stmt in ddl {
        sqlx::query(stmt).execute(&pool).await.expect("schema");
    }

    pool
}

pub async fn insert_user(pool: &SqlitePool, id: i64, name: &str, role: &str, city: Option<&str>) {
    sqlx::query(
        "INSERT INTO users (id_user, name, surname, email, role, city, is_deleted)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
    )
    .bind(id)
    .bind(name)
    .bind("Tester")
    .bind(format!("{}@example.com", name.to_lowercase()))
    .bind(role)
    .bind(city)
    .execute(pool)
    .await
    .expect("insert user");
}

pub async fn soft_delete_user(pool: &SqlitePool, id: i64) {
    sqlx::query("UPDATE users SET is_deleted = 1 WHERE id_user = ?1")
        .bind(id)
        .execute(pool)
        .await
        .expect("soft delete user");
}

pub async fn assign_hobby(pool: &SqlitePool, user_id: i64, hobby_id: i64, name: &str) {
    sqlx::query("INSERT OR IGNORE INTO hobbies (id_hobby, name) VALUES (?1, ?2)")
        .bind(hobby_id)
        .bind(name)
        .execute(pool)
        .await
        .expect("insert hobby");
    sqlx::query("INSERT INTO user_hobbies (id_user, id_hobby) VALUES (?1, ?2)")
        .bind(user_id)
        .bind(hobby_id)
        .execute(pool)
        .await
        .expect("assign hobby");
}

pub async fn store_vector(pool: &SqlitePool, user_id: i64, vector: &[f32]) {
    embedding_repo::upsert_user_embedding(pool, user_id, &encode_vector(vector), "stub-hash")
        .await
        .expect("store vector");
}

// Deterministic hash-based embedder: similar text produces similar vectors,
// repeated calls produce identical ones. Counts calls so tests can assert
// that short-circuits never reach the encoder.
pub struct StubEmbedder {
    dims: usize,
    calls: AtomicUsize,
}

impl StubEmbedder {
    pub fn new(dims: usize) -> Arc<Self> {
        Arc::new(Self {
            dims,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.trim().is_empty() {
            bail!("refusing to embed empty text");
        }

        let mut vector = vec![0.0f32; self.dims];
        for (i, byte) in text.bytes().enumerate() {
            vector[(byte as usize + i) % self.dims] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }

    fn model_name(&self) -> &str {
        "stub-hash"
    }

    fn dimension(&self) -> usize {
        self.dims
    }
}
