//! Relational Knowledge Store (L4): facts, preferences, static character
//! traits, and the derived character trait relationship graph.
//!
//! All character-name parameters are normalized (see
//! `memory_core::normalize_character_name`) before being bound into queries,
//! per spec: "All character lookups apply the normalization rule before
//! binding parameters."

use chrono::Utc;
use memory_core::normalize_character_name;
use tracing::{info, instrument, warn};

use crate::error::StorageError;
use crate::models::{CharacterTrait, CharacterTraitRelationship, Fact, Preference, TraitRelationKind};
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct KnowledgeStore {
    pool_manager: SqlitePoolManager,
}

impl KnowledgeStore {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let store = Self { pool_manager };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS facts (
                user_id TEXT NOT NULL,
                entity_name TEXT NOT NULL,
                entity_type TEXT NOT NULL,
                relationship_type TEXT NOT NULL,
                confidence REAL NOT NULL,
                emotional_context TEXT,
                attributed_character TEXT,
                source_conversation TEXT,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, entity_name, relationship_type)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS preferences (
                user_id TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                confidence REAL NOT NULL,
                last_seen TEXT NOT NULL,
                PRIMARY KEY (user_id, key)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS character_traits (
                character TEXT NOT NULL,
                trait_type TEXT NOT NULL,
                trait_name TEXT NOT NULL,
                trait_value TEXT NOT NULL,
                intensity REAL NOT NULL DEFAULT 0.0,
                importance INTEGER NOT NULL DEFAULT 5,
                context TEXT,
                PRIMARY KEY (character, trait_type, trait_name)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS character_trait_relationships (
                character TEXT NOT NULL,
                source TEXT NOT NULL,
                target TEXT NOT NULL,
                relationship_type TEXT NOT NULL,
                strength REAL NOT NULL,
                context TEXT,
                PRIMARY KEY (character, source, target, relationship_type)
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Upserts on `(user_id, entity_name, relationship_type)`: confidence
    /// becomes `max(old, new)`, emotional context takes the latest value.
    #[instrument(skip(self, fact))]
    pub async fn upsert_fact(&self, fact: &Fact) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();
        sqlx::query(
            r#"
            INSERT INTO facts (user_id, entity_name, entity_type, relationship_type, confidence, emotional_context, attributed_character, source_conversation, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, entity_name, relationship_type) DO UPDATE SET
                confidence = MAX(confidence, excluded.confidence),
                emotional_context = excluded.emotional_context,
                entity_type = excluded.entity_type,
                attributed_character = excluded.attributed_character,
                source_conversation = excluded.source_conversation,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&fact.user_id)
        .bind(&fact.entity_name)
        .bind(&fact.entity_type)
        .bind(&fact.relationship_type)
        .bind(fact.confidence)
        .bind(&fact.emotional_context)
        .bind(&fact.attributed_character)
        .bind(&fact.source_conversation)
        .bind(fact.updated_at)
        .execute(pool)
        .await?;

        info!(user_id = %fact.user_id, entity = %fact.entity_name, "upserted fact");
        Ok(())
    }

    /// Upserts on `(user_id, key)`: value and confidence are overwritten, timestamp bumped.
    #[instrument(skip(self, pref))]
    pub async fn upsert_preference(&self, pref: &Preference) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();
        sqlx::query(
            r#"
            INSERT INTO preferences (user_id, key, value, confidence, last_seen)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id, key) DO UPDATE SET
                value = excluded.value,
                confidence = excluded.confidence,
                last_seen = excluded.last_seen
            "#,
        )
        .bind(&pref.user_id)
        .bind(&pref.key)
        .bind(&pref.value)
        .bind(pref.confidence)
        .bind(pref.last_seen)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn get_user_facts(&self, user_id: &str, limit: i64) -> Result<Vec<Fact>, StorageError> {
        let pool = self.pool_manager.pool();
        let facts = sqlx::query_as::<_, Fact>(
            "SELECT * FROM facts WHERE user_id = ? ORDER BY confidence DESC, updated_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(facts)
    }

    pub async fn get_user_preferences(&self, user_id: &str, limit: i64) -> Result<Vec<Preference>, StorageError> {
        let pool = self.pool_manager.pool();
        let prefs = sqlx::query_as::<_, Preference>(
            "SELECT * FROM preferences WHERE user_id = ? ORDER BY confidence DESC, last_seen DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(prefs)
    }

    /// Static, author-loaded traits for a character. Read-only from the
    /// pipeline's perspective; seeded by `seed_character_trait` at service start.
    pub async fn get_character_traits(&self, character: &str) -> Result<Vec<CharacterTrait>, StorageError> {
        let character = normalize_character_name(character);
        let pool = self.pool_manager.pool();
        let traits = sqlx::query_as::<_, CharacterTrait>(
            "SELECT * FROM character_traits WHERE character = ?",
        )
        .bind(&character)
        .fetch_all(pool)
        .await?;
        Ok(traits)
    }

    pub async fn seed_character_trait(&self, trait_row: &CharacterTrait) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();
        sqlx::query(
            r#"
            INSERT INTO character_traits (character, trait_type, trait_name, trait_value, intensity, importance, context)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(character, trait_type, trait_name) DO UPDATE SET
                trait_value = excluded.trait_value,
                intensity = excluded.intensity,
                importance = excluded.importance,
                context = excluded.context
            "#,
        )
        .bind(normalize_character_name(&trait_row.character))
        .bind(&trait_row.trait_type)
        .bind(&trait_row.trait_name)
        .bind(&trait_row.trait_value)
        .bind(trait_row.intensity)
        .bind(trait_row.importance)
        .bind(&trait_row.context)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Deletes all derived relationships for `character` so the graph can be
    /// rebuilt from scratch. The rebuild itself (reading traits, deriving
    /// edges, writing them back via [`upsert_character_trait_relationship`])
    /// is owned by the `self-knowledge` crate's graph builder.
    #[instrument(skip(self))]
    pub async fn clear_character_graph(&self, character: &str) -> Result<(), StorageError> {
        let character = normalize_character_name(character);
        let pool = self.pool_manager.pool();
        sqlx::query("DELETE FROM character_trait_relationships WHERE character = ?")
            .bind(&character)
            .execute(pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, rel))]
    pub async fn upsert_character_trait_relationship(
        &self,
        rel: &CharacterTraitRelationship,
    ) -> Result<(), StorageError> {
        let character = normalize_character_name(&rel.character);
        let pool = self.pool_manager.pool();
        sqlx::query(
            r#"
            INSERT INTO character_trait_relationships (character, source, target, relationship_type, strength, context)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(character, source, target, relationship_type) DO UPDATE SET
                strength = excluded.strength,
                context = excluded.context
            "#,
        )
        .bind(&character)
        .bind(&rel.source)
        .bind(&rel.target)
        .bind(rel.relationship_type.as_str())
        .bind(rel.strength)
        .bind(&rel.context)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn query_character_graph(
        &self,
        character: &str,
        trait_prefix: Option<&str>,
    ) -> Result<Vec<CharacterTraitRelationship>, StorageError> {
        let character = normalize_character_name(character);
        let pool = self.pool_manager.pool();

        let rows: Vec<(String, String, String, String, f64, Option<String>)> = if let Some(prefix) = trait_prefix {
            let like = format!("{}%", prefix);
            sqlx::query_as(
                "SELECT character, source, target, relationship_type, strength, context FROM character_trait_relationships WHERE character = ? AND source LIKE ?",
            )
            .bind(&character)
            .bind(&like)
            .fetch_all(pool)
            .await?
        } else {
            sqlx::query_as(
                "SELECT character, source, target, relationship_type, strength, context FROM character_trait_relationships WHERE character = ?",
            )
            .bind(&character)
            .fetch_all(pool)
            .await?
        };

        let mut out = Vec::with_capacity(rows.len());
        for (character, source, target, relationship_type, strength, context) in rows {
            let Some(kind) = TraitRelationKind::parse(&relationship_type) else {
                warn!(relationship_type = %relationship_type, "unknown trait relationship kind, skipping");
                continue;
            };
            out.push(CharacterTraitRelationship {
                character,
                source,
                target,
                relationship_type: kind,
                strength,
                context,
            });
        }
        Ok(out)
    }

    /// Rebuilds `character`'s derived relationship graph in one transaction:
    /// clears existing edges, then writes the given freshly-computed set.
    #[instrument(skip(self, relationships))]
    pub async fn replace_character_graph(
        &self,
        character: &str,
        relationships: &[CharacterTraitRelationship],
    ) -> Result<(), StorageError> {
        let normalized = normalize_character_name(character);
        let pool = self.pool_manager.pool();
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM character_trait_relationships WHERE character = ?")
            .bind(&normalized)
            .execute(&mut *tx)
            .await?;

        for rel in relationships {
            sqlx::query(
                r#"
                INSERT INTO character_trait_relationships (character, source, target, relationship_type, strength, context)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(character, source, target, relationship_type) DO UPDATE SET
                    strength = excluded.strength,
                    context = excluded.context
                "#,
            )
            .bind(&normalized)
            .bind(&rel.source)
            .bind(&rel.target)
            .bind(rel.relationship_type.as_str())
            .bind(rel.strength)
            .bind(&rel.context)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(character = %normalized, count = relationships.len(), updated_at = %Utc::now(), "rebuilt character trait graph");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fact_upsert_takes_max_confidence() {
        let store = KnowledgeStore::new("sqlite::memory:").await.unwrap();
        store
            .upsert_fact(&Fact::new("u1", "coffee", "beverage", "likes", 0.4))
            .await
            .unwrap();
        store
            .upsert_fact(&Fact::new("u1", "coffee", "beverage", "likes", 0.9))
            .await
            .unwrap();
        store
            .upsert_fact(&Fact::new("u1", "coffee", "beverage", "likes", 0.2))
            .await
            .unwrap();

        let facts = store.get_user_facts("u1", 10).await.unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].confidence, 0.9);
    }

    #[tokio::test]
    async fn preference_upsert_overwrites_value() {
        let store = KnowledgeStore::new("sqlite::memory:").await.unwrap();
        store
            .upsert_preference(&Preference::new("u1", "language", "en", 0.5))
            .await
            .unwrap();
        store
            .upsert_preference(&Preference::new("u1", "language", "fr", 0.8))
            .await
            .unwrap();

        let prefs = store.get_user_preferences("u1", 10).await.unwrap();
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].value, "fr");
        assert_eq!(prefs[0].confidence, 0.8);
    }

    #[tokio::test]
    async fn character_graph_rebuild_is_idempotent() {
        let store = KnowledgeStore::new("sqlite::memory:").await.unwrap();
        let rel = CharacterTraitRelationship {
            character: "Elena".to_string(),
            source: "value.honesty".to_string(),
            target: "communication:direct_style".to_string(),
            relationship_type: TraitRelationKind::LeadsTo,
            strength: 0.8,
            context: None,
        };

        store.replace_character_graph("Elena", &[rel.clone()]).await.unwrap();
        store.replace_character_graph("Elena", &[rel]).await.unwrap();

        let graph = store.query_character_graph("elena", None).await.unwrap();
        assert_eq!(graph.len(), 1);
    }
}
