//! Magazine article records.

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::article::ArticleRecord;
use crate::models::report::MediaAttachment;

pub fn insert_article(conn: &Connection, record: &ArticleRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO articles (id, owner_id, title, author, body_text,
         photo_encoded, photo_width, photo_height, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.id,
            record.owner_id,
            record.title,
            record.author,
            record.body_text,
            record.photo.as_ref().map(|p| p.encoded.clone()),
            record.photo.as_ref().map(|p| p.width),
            record.photo.as_ref().map(|p| p.height),
            record.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_article(conn: &Connection, article_id: &str) -> Result<ArticleRecord, DatabaseError> {
    conn.query_row(
        "SELECT id, owner_id, title, author, body_text,
                photo_encoded, photo_width, photo_height, created_at
         FROM articles WHERE id = ?1",
        params![article_id],
        map_article_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
            entity_type: "Article".into(),
            id: article_id.into(),
        },
        other => DatabaseError::Sqlite(other),
    })
}

pub fn list_articles(conn: &Connection) -> Result<Vec<ArticleRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, title, author, body_text,
                photo_encoded, photo_width, photo_height, created_at
         FROM articles
         ORDER BY created_at ASC, rowid ASC",
    )?;

    let rows = stmt.query_map([], map_article_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn delete_article(conn: &Connection, article_id: &str) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM articles WHERE id = ?1", params![article_id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Article".into(),
            id: article_id.into(),
        });
    }
    Ok(())
}

fn map_article_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ArticleRecord> {
    let photo_encoded: Option<String> = row.get(5)?;
    let photo = match photo_encoded {
        Some(encoded) => Some(MediaAttachment {
            encoded,
            width: row.get(6)?,
            height: row.get(7)?,
            position: 0,
        }),
        None => None,
    };

    Ok(ArticleRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        author: row.get(3)?,
        body_text: row.get(4)?,
        photo,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn make_article(id: &str, photo: Option<MediaAttachment>) -> ArticleRecord {
        ArticleRecord {
            id: id.into(),
            owner_id: "owner-1".into(),
            title: "Life at the forward post".into(),
            author: "CPL OKELLO".into(),
            body_text: "Routine has its own rhythm out here.".into(),
            photo,
            created_at: "2025-03-01 09:00:00".into(),
        }
    }

    #[test]
    fn article_round_trip_with_photo() {
        let conn = open_memory_database().unwrap();
        let photo = MediaAttachment {
            encoded: "data:image/jpeg;base64,QUJD".into(),
            width: 400,
            height: 300,
            position: 0,
        };
        insert_article(&conn, &make_article("a1", Some(photo))).unwrap();

        let fetched = get_article(&conn, "a1").unwrap();
        assert_eq!(fetched.author, "CPL OKELLO");
        let photo = fetched.photo.unwrap();
        assert_eq!(photo.width, 400);
    }

    #[test]
    fn article_without_photo() {
        let conn = open_memory_database().unwrap();
        insert_article(&conn, &make_article("a1", None)).unwrap();

        let fetched = get_article(&conn, "a1").unwrap();
        assert!(fetched.photo.is_none());
    }

    #[test]
    fn delete_missing_article_is_not_found() {
        let conn = open_memory_database().unwrap();
        let result = delete_article(&conn, "nope");
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
