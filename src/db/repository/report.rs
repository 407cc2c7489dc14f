//! Report records and their ordered attachment rows.

use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::enums::ReportStatus;
use crate::models::report::{MediaAttachment, ReportRecord};

/// Inserts a report and its attachment rows atomically.
///
/// Attachment rows are written in `record.attachments` order with a dense
/// `position` column starting at 0.
pub fn insert_report(conn: &Connection, record: &ReportRecord) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO reports (id, owner_id, day_label, unit, title,
         signing_officer, markup_text, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.id,
            record.owner_id,
            record.day_label,
            record.unit,
            record.title,
            record.signing_officer,
            record.markup_text,
            record.status.as_str(),
            record.created_at,
        ],
    )?;

    for (position, attachment) in record.attachments.iter().enumerate() {
        insert_attachment_row(&tx, &record.id, attachment, position)?;
    }

    tx.commit()?;
    Ok(())
}

/// Fetches a single report with its attachments, or NotFound.
pub fn get_report(conn: &Connection, report_id: &str) -> Result<ReportRecord, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, owner_id, day_label, unit, title, signing_officer,
                    markup_text, status, created_at
             FROM reports WHERE id = ?1",
            params![report_id],
            map_report_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
                entity_type: "Report".into(),
                id: report_id.into(),
            },
            other => DatabaseError::Sqlite(other),
        })?;

    let mut record = row.into_record()?;
    record.attachments = list_attachments(conn, report_id)?;
    Ok(record)
}

/// Lists all reports in ascending creation order, attachments included.
///
/// Creation order is the contract the consolidation windower depends on:
/// `created_at` is `%Y-%m-%d %H:%M:%S` text, with rowid breaking ties for
/// reports created in the same second.
pub fn list_reports_ascending(conn: &Connection) -> Result<Vec<ReportRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, day_label, unit, title, signing_officer,
                markup_text, status, created_at
         FROM reports
         ORDER BY created_at ASC, rowid ASC",
    )?;

    let rows = stmt.query_map([], map_report_row)?;

    let mut reports = Vec::new();
    for row in rows {
        let mut record = row?.into_record()?;
        record.attachments = list_attachments(conn, &record.id)?;
        reports.push(record);
    }
    Ok(reports)
}

/// Overwrites the markup body wholesale. The flat text is the persisted
/// form: there is no structured re-edit.
pub fn update_report_text(
    conn: &Connection,
    report_id: &str,
    markup_text: &str,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE reports SET markup_text = ?1 WHERE id = ?2",
        params![markup_text, report_id],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Report".into(),
            id: report_id.into(),
        });
    }
    Ok(())
}

pub fn set_report_status(
    conn: &Connection,
    report_id: &str,
    status: ReportStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE reports SET status = ?1 WHERE id = ?2",
        params![status.as_str(), report_id],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Report".into(),
            id: report_id.into(),
        });
    }
    Ok(())
}

/// Hard-deletes a report. Attachment rows go with it (ON DELETE CASCADE).
pub fn delete_report(conn: &Connection, report_id: &str) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM reports WHERE id = ?1", params![report_id])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Report".into(),
            id: report_id.into(),
        });
    }
    Ok(())
}

// ─── Attachment rows ──────────────────────────────────────────────────────────

/// Lists a report's attachments in stored position order.
pub fn list_attachments(
    conn: &Connection,
    report_id: &str,
) -> Result<Vec<MediaAttachment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT encoded, width, height, position
         FROM report_attachments
         WHERE report_id = ?1
         ORDER BY position ASC",
    )?;

    let rows = stmt.query_map(params![report_id], |row| {
        Ok(MediaAttachment {
            encoded: row.get(0)?,
            width: row.get(1)?,
            height: row.get(2)?,
            position: row.get::<_, i64>(3)? as usize,
        })
    })?;

    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn count_attachments(conn: &Connection, report_id: &str) -> Result<usize, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM report_attachments WHERE report_id = ?1",
        params![report_id],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Appends attachment rows starting at the given position.
pub fn append_attachments(
    conn: &Connection,
    report_id: &str,
    attachments: &[MediaAttachment],
    start_position: usize,
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    for (offset, attachment) in attachments.iter().enumerate() {
        insert_attachment_row(&tx, report_id, attachment, start_position + offset)?;
    }
    tx.commit()?;
    Ok(())
}

/// Removes the attachment at the given position and compacts the positions
/// of the remainder.
pub fn remove_attachment_at(
    conn: &Connection,
    report_id: &str,
    index: usize,
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    let deleted = tx.execute(
        "DELETE FROM report_attachments WHERE report_id = ?1 AND position = ?2",
        params![report_id, index as i64],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "ReportAttachment".into(),
            id: format!("{report_id}#{index}"),
        });
    }

    tx.execute(
        "UPDATE report_attachments SET position = position - 1
         WHERE report_id = ?1 AND position > ?2",
        params![report_id, index as i64],
    )?;

    tx.commit()?;
    Ok(())
}

/// Replaces all attachment rows wholesale.
pub fn replace_attachments(
    conn: &Connection,
    report_id: &str,
    attachments: &[MediaAttachment],
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM report_attachments WHERE report_id = ?1",
        params![report_id],
    )?;
    for (position, attachment) in attachments.iter().enumerate() {
        insert_attachment_row(&tx, report_id, attachment, position)?;
    }
    tx.commit()?;
    Ok(())
}

fn insert_attachment_row(
    conn: &Connection,
    report_id: &str,
    attachment: &MediaAttachment,
    position: usize,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO report_attachments (id, report_id, position, encoded, width, height)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            uuid::Uuid::new_v4().to_string(),
            report_id,
            position as i64,
            attachment.encoded,
            attachment.width,
            attachment.height,
        ],
    )?;
    Ok(())
}

/// Raw row shape; enum conversion happens in `into_record` so a corrupt
/// stored status surfaces as `DatabaseError::InvalidEnum`.
struct ReportRow {
    id: String,
    owner_id: String,
    day_label: String,
    unit: String,
    title: String,
    signing_officer: String,
    markup_text: String,
    status: String,
    created_at: String,
}

impl ReportRow {
    fn into_record(self) -> Result<ReportRecord, DatabaseError> {
        Ok(ReportRecord {
            id: self.id,
            owner_id: self.owner_id,
            day_label: self.day_label,
            unit: self.unit,
            title: self.title,
            signing_officer: self.signing_officer,
            markup_text: self.markup_text,
            status: ReportStatus::from_str(&self.status)?,
            attachments: Vec::new(),
            created_at: self.created_at,
        })
    }
}

fn map_report_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReportRow> {
    Ok(ReportRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        day_label: row.get(2)?,
        unit: row.get(3)?,
        title: row.get(4)?,
        signing_officer: row.get(5)?,
        markup_text: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn test_db() -> Connection {
        open_memory_database().expect("in-memory DB")
    }

    fn make_record(id: &str, day_label: &str, created_at: &str) -> ReportRecord {
        ReportRecord {
            id: id.into(),
            owner_id: "owner-1".into(),
            day_label: day_label.into(),
            unit: "2BN".into(),
            title: format!("2BN SITREP - {day_label}"),
            signing_officer: "MAJ KASULE".into(),
            markup_text: "*1. OPERATIONAL NARRATIVE*\nQuiet day.".into(),
            attachments: vec![],
            status: ReportStatus::Submitted,
            created_at: created_at.into(),
        }
    }

    fn make_attachment(position: usize) -> MediaAttachment {
        MediaAttachment {
            encoded: format!("data:image/jpeg;base64,QUJD{position}"),
            width: 600,
            height: 400,
            position,
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = test_db();
        let mut record = make_record("r1", "Day 1", "2025-03-01 08:00:00");
        record.attachments = vec![make_attachment(0), make_attachment(1)];

        insert_report(&conn, &record).unwrap();
        let fetched = get_report(&conn, "r1").unwrap();

        assert_eq!(fetched.day_label, "Day 1");
        assert_eq!(fetched.status, ReportStatus::Submitted);
        assert_eq!(fetched.attachments.len(), 2);
        assert_eq!(fetched.attachments[0].position, 0);
        assert_eq!(fetched.attachments[1].position, 1);
    }

    #[test]
    fn get_missing_report_is_not_found() {
        let conn = test_db();
        let result = get_report(&conn, "nope");
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn list_orders_by_creation() {
        let conn = test_db();
        insert_report(&conn, &make_record("r2", "Day 2", "2025-03-02 08:00:00")).unwrap();
        insert_report(&conn, &make_record("r1", "Day 1", "2025-03-01 08:00:00")).unwrap();
        insert_report(&conn, &make_record("r3", "Day 1", "2025-03-03 08:00:00")).unwrap();

        let reports = list_reports_ascending(&conn).unwrap();
        let ids: Vec<&str> = reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn corrupt_stored_status_is_invalid_enum() {
        let conn = test_db();
        insert_report(&conn, &make_record("r1", "Day 1", "2025-03-01 08:00:00")).unwrap();
        conn.execute(
            "UPDATE reports SET status = 'bogus_status' WHERE id = 'r1'",
            [],
        )
        .unwrap();

        let result = get_report(&conn, "r1");
        assert!(matches!(result, Err(DatabaseError::InvalidEnum { .. })));

        let result = list_reports_ascending(&conn);
        assert!(matches!(result, Err(DatabaseError::InvalidEnum { .. })));
    }

    #[test]
    fn update_text_overwrites_wholesale() {
        let conn = test_db();
        insert_report(&conn, &make_record("r1", "Day 1", "2025-03-01 08:00:00")).unwrap();
        update_report_text(&conn, "r1", "*OVERALL*\nRevised.").unwrap();

        let fetched = get_report(&conn, "r1").unwrap();
        assert_eq!(fetched.markup_text, "*OVERALL*\nRevised.");
    }

    #[test]
    fn delete_cascades_attachments() {
        let conn = test_db();
        let mut record = make_record("r1", "Day 1", "2025-03-01 08:00:00");
        record.attachments = vec![make_attachment(0)];
        insert_report(&conn, &record).unwrap();

        delete_report(&conn, "r1").unwrap();

        let orphans: i64 = conn
            .query_row("SELECT COUNT(*) FROM report_attachments", [], |r| r.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn remove_attachment_compacts_positions() {
        let conn = test_db();
        let mut record = make_record("r1", "Day 1", "2025-03-01 08:00:00");
        record.attachments = vec![make_attachment(0), make_attachment(1), make_attachment(2)];
        insert_report(&conn, &record).unwrap();

        remove_attachment_at(&conn, "r1", 1).unwrap();

        let remaining = list_attachments(&conn, "r1").unwrap();
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0].position, 0);
        assert_eq!(remaining[1].position, 1);
        assert!(remaining[1].encoded.ends_with("QUJD2"));
    }

    #[test]
    fn replace_attachments_wholesale() {
        let conn = test_db();
        let mut record = make_record("r1", "Day 1", "2025-03-01 08:00:00");
        record.attachments = vec![make_attachment(0), make_attachment(1)];
        insert_report(&conn, &record).unwrap();

        replace_attachments(&conn, "r1", &[make_attachment(0)]).unwrap();

        assert_eq!(count_attachments(&conn, "r1").unwrap(), 1);
    }

    #[test]
    fn set_status_round_trips() {
        let conn = test_db();
        insert_report(&conn, &make_record("r1", "Day 1", "2025-03-01 08:00:00")).unwrap();
        set_report_status(&conn, "r1", ReportStatus::Archived).unwrap();

        let fetched = get_report(&conn, "r1").unwrap();
        assert_eq!(fetched.status, ReportStatus::Archived);
    }
}
