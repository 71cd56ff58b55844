//! Prompt Storage
//! Mission: Persist and query published prompts with SQLite

use crate::auth::models::Identity;
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, params_from_iter, Connection};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A published prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub prompt: String,
    pub category: String,
    pub tags: Vec<String>,
    pub author: String,
    pub author_id: String,
    pub created_at: String,
    pub likes: u32,
    pub liked_by: Vec<String>,
}

/// Fields supplied by the client when publishing a prompt.
#[derive(Debug, Deserialize)]
pub struct NewPrompt {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Prompt storage with SQLite backend.
pub struct PromptStore {
    db_path: String,
}

impl PromptStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS prompts (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                prompt TEXT NOT NULL,
                category TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                author TEXT NOT NULL,
                author_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                likes INTEGER NOT NULL DEFAULT 0,
                liked_by TEXT NOT NULL DEFAULT '[]'
            )",
            [],
        )?;

        Ok(())
    }

    /// List prompts, newest first, optionally narrowed by category and/or a
    /// free-text search over title, body, tags, and author. Both filters
    /// match case-insensitive substrings; a category of `all` means no
    /// category filter.
    pub fn list(&self, category: Option<&str>, search: Option<&str>) -> Result<Vec<Prompt>> {
        let mut sql = String::from(
            "SELECT id, title, prompt, category, tags, author, author_id,
                    created_at, likes, liked_by
             FROM prompts",
        );
        let mut clauses: Vec<&str> = Vec::new();
        let mut bind_values: Vec<String> = Vec::new();

        if let Some(cat) = category.filter(|c| !c.is_empty() && *c != "all") {
            clauses.push("category LIKE ?");
            bind_values.push(format!("%{cat}%"));
        }

        if let Some(q) = search.filter(|s| !s.is_empty()) {
            clauses.push("(title LIKE ? OR prompt LIKE ? OR tags LIKE ? OR author LIKE ?)");
            let pattern = format!("%{q}%");
            bind_values.extend(std::iter::repeat(pattern).take(4));
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let conn = self.open()?;
        let mut stmt = conn.prepare(&sql)?;
        let prompts = stmt
            .query_map(params_from_iter(bind_values), row_to_prompt)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(prompts)
    }

    /// Publish a new prompt authored by the given identity.
    pub fn create(&self, new: &NewPrompt, author: &Identity) -> Result<Prompt> {
        let prompt = Prompt {
            id: Uuid::new_v4().to_string(),
            title: new.title.clone(),
            prompt: new.prompt.clone(),
            category: new.category.clone(),
            tags: new.tags.clone(),
            author: author.username.clone(),
            author_id: author.id.clone(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            likes: 0,
            liked_by: Vec::new(),
        };

        let conn = self.open()?;
        conn.execute(
            "INSERT INTO prompts (id, title, prompt, category, tags, author,
                                  author_id, created_at, likes, liked_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                prompt.id,
                prompt.title,
                prompt.prompt,
                prompt.category,
                serde_json::to_string(&prompt.tags)?,
                prompt.author,
                prompt.author_id,
                prompt.created_at,
                prompt.likes,
                serde_json::to_string(&prompt.liked_by)?,
            ],
        )?;

        info!("📝 Prompt published: \"{}\" by {}", prompt.title, prompt.author);

        Ok(prompt)
    }

    /// Toggle the given user's like on a prompt.
    ///
    /// Returns `None` if the prompt does not exist, otherwise the new like
    /// count and whether the user now likes it.
    pub fn toggle_like(&self, prompt_id: &str, user_id: &str) -> Result<Option<(u32, bool)>> {
        let conn = self.open()?;

        let mut stmt = conn.prepare("SELECT likes, liked_by FROM prompts WHERE id = ?1")?;
        let row = stmt.query_row(params![prompt_id], |row| {
            let likes: u32 = row.get(0)?;
            let liked_by: String = row.get(1)?;
            Ok((likes, liked_by))
        });

        let (likes, liked_by_json) = match row {
            Ok(found) => found,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut liked_by: Vec<String> =
            serde_json::from_str(&liked_by_json).unwrap_or_default();

        let is_liked = liked_by.iter().any(|id| id == user_id);
        let (likes, is_liked) = if is_liked {
            liked_by.retain(|id| id != user_id);
            (likes.saturating_sub(1), false)
        } else {
            liked_by.push(user_id.to_string());
            (likes + 1, true)
        };

        conn.execute(
            "UPDATE prompts SET likes = ?1, liked_by = ?2 WHERE id = ?3",
            params![likes, serde_json::to_string(&liked_by)?, prompt_id],
        )?;

        Ok(Some((likes, is_liked)))
    }
}

fn row_to_prompt(row: &rusqlite::Row<'_>) -> rusqlite::Result<Prompt> {
    let tags: String = row.get(4)?;
    let liked_by: String = row.get(9)?;
    Ok(Prompt {
        id: row.get(0)?,
        title: row.get(1)?,
        prompt: row.get(2)?,
        category: row.get(3)?,
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        author: row.get(5)?,
        author_id: row.get(6)?,
        created_at: row.get(7)?,
        likes: row.get(8)?,
        liked_by: serde_json::from_str(&liked_by).unwrap_or_default(),
    })
}
