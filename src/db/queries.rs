use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::models::QuizRun;

pub const QUIZ_SNAPSHOT: &str = "quiz";
pub const CONFIGURATOR_SNAPSHOT: &str = "configurator";
pub const LEAD_SNAPSHOT: &str = "contact";

pub fn save_snapshot<T: Serialize>(conn: &Connection, key: &str, value: &T) -> Result<()> {
    let payload = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize snapshot {key}"))?;
    conn.execute(
        "INSERT INTO snapshots (key, payload, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
        params![key, payload, chrono::Utc::now().timestamp_millis()],
    )
    .context("Failed to save snapshot")?;
    Ok(())
}

/// `Ok(None)` when nothing was saved under `key`.
pub fn load_snapshot<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Option<T>> {
    let payload: Option<String> = conn
        .query_row(
            "SELECT payload FROM snapshots WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to load snapshot")?;

    payload
        .map(|p| {
            serde_json::from_str(&p).with_context(|| format!("Snapshot {key} is not valid JSON"))
        })
        .transpose()
}

pub fn delete_snapshot(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM snapshots WHERE key = ?1", params![key])
        .context("Failed to delete snapshot")?;
    Ok(())
}

pub fn insert_quiz_run(conn: &Connection, run: &QuizRun) -> Result<i64> {
    conn.execute(
        "INSERT INTO quiz_runs (company_name, industry, total_score, max_score, percentage, suggested_agent, answers, completed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            run.company_name,
            run.industry,
            run.total_score,
            run.max_score,
            run.percentage,
            run.suggested_agent,
            run.answers,
            run.completed_at,
        ],
    )
    .context("Failed to insert quiz run")?;
    Ok(conn.last_insert_rowid())
}

pub fn recent_runs(conn: &Connection, limit: usize) -> Result<Vec<QuizRun>> {
    let mut stmt = conn.prepare(
        "SELECT id, company_name, industry, total_score, max_score, percentage, suggested_agent, answers, completed_at
         FROM quiz_runs
         ORDER BY completed_at DESC, id DESC
         LIMIT ?1",
    )?;

    let results = stmt
        .query_map(params![limit as i64], |row| {
            Ok(QuizRun {
                id: Some(row.get(0)?),
                company_name: row.get(1)?,
                industry: row.get(2)?,
                total_score: row.get(3)?,
                max_score: row.get(4)?,
                percentage: row.get(5)?,
                suggested_agent: row.get(6)?,
                answers: row.get(7)?,
                completed_at: row.get(8)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to get quiz runs")?;

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configurator::{AgentConfig, Channel, Skill};
    use crate::contact::lead::{ContactUpdate, UserContact};
    use crate::db::schema::initialize_db;
    use crate::quiz::{Industry, QuestionBank, QuizEngine, QuizSnapshot};
    use std::sync::Arc;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize_db(&conn).unwrap();
        conn
    }

    fn completed_engine(company: &str) -> QuizEngine {
        let mut engine = QuizEngine::new(Arc::new(QuestionBank::standard().unwrap()));
        engine.select_industry(Industry::Healthcare).unwrap();
        for v in ["1-5", "<5", "email", "phone", ">25", ">40", "manual"] {
            engine.answer(&[v]).unwrap();
        }
        engine.submit_company_name(company).unwrap();
        engine
    }

    #[test]
    fn test_snapshot_overwrite_and_delete() {
        let conn = memory_db();
        assert!(load_snapshot::<AgentConfig>(&conn, CONFIGURATOR_SNAPSHOT)
            .unwrap()
            .is_none());

        let mut config = AgentConfig::new();
        config.toggle_channel(Channel::Voice);
        save_snapshot(&conn, CONFIGURATOR_SNAPSHOT, &config).unwrap();
        config.toggle_channel(Channel::Email);
        save_snapshot(&conn, CONFIGURATOR_SNAPSHOT, &config).unwrap();

        let loaded: AgentConfig = load_snapshot(&conn, CONFIGURATOR_SNAPSHOT).unwrap().unwrap();
        assert_eq!(loaded, config);

        delete_snapshot(&conn, CONFIGURATOR_SNAPSHOT).unwrap();
        assert!(load_snapshot::<AgentConfig>(&conn, CONFIGURATOR_SNAPSHOT)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_saved_configuration_is_edited_then_reset() {
        let conn = memory_db();
        let mut config = AgentConfig::new();
        config.apply(Some(Industry::Healthcare), &[Channel::Voice], &[Skill::Booking]);
        save_snapshot(&conn, CONFIGURATOR_SNAPSHOT, &config).unwrap();

        let mut reloaded: AgentConfig = load_snapshot(&conn, CONFIGURATOR_SNAPSHOT).unwrap().unwrap();
        reloaded.apply(None, &[Channel::Email], &[]);
        assert_eq!(reloaded.industry, Some(Industry::Healthcare));
        assert_eq!(reloaded.channels(), &[Channel::Voice, Channel::Email]);
        save_snapshot(&conn, CONFIGURATOR_SNAPSHOT, &reloaded).unwrap();

        let mut cleared: AgentConfig = load_snapshot(&conn, CONFIGURATOR_SNAPSHOT).unwrap().unwrap();
        assert_eq!(cleared.estimated_savings(), (25 + 10 + 15) * 4);
        cleared.reset();
        save_snapshot(&conn, CONFIGURATOR_SNAPSHOT, &cleared).unwrap();
        let loaded: AgentConfig = load_snapshot(&conn, CONFIGURATOR_SNAPSHOT).unwrap().unwrap();
        assert_eq!(loaded, AgentConfig::default());
    }

    #[test]
    fn test_lead_contact_persists() {
        let conn = memory_db();
        let mut lead = UserContact::default();
        lead.update(ContactUpdate {
            whatsapp: Some("+20 100 555 0000".to_string()),
            ..Default::default()
        });
        lead.submit().unwrap();
        save_snapshot(&conn, LEAD_SNAPSHOT, &lead).unwrap();

        let loaded: UserContact = load_snapshot(&conn, LEAD_SNAPSHOT).unwrap().unwrap();
        assert!(loaded.submitted);
        assert_eq!(loaded.whatsapp, "+20 100 555 0000");
    }

    #[test]
    fn test_quiz_snapshot_survives_store() {
        let conn = memory_db();
        let engine = completed_engine("Acme Dental");
        save_snapshot(&conn, QUIZ_SNAPSHOT, &engine.snapshot()).unwrap();

        let loaded: QuizSnapshot = load_snapshot(&conn, QUIZ_SNAPSHOT).unwrap().unwrap();
        assert_eq!(loaded, engine.snapshot());
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let conn = memory_db();
        conn.execute(
            "INSERT INTO snapshots (key, payload, updated_at) VALUES ('quiz', '{not json', 0)",
            [],
        )
        .unwrap();
        assert!(load_snapshot::<QuizSnapshot>(&conn, QUIZ_SNAPSHOT).is_err());
    }

    #[test]
    fn test_completed_runs_listed_newest_first() {
        let conn = memory_db();
        let first = QuizRun::from_engine(&completed_engine("First Clinic")).unwrap().unwrap();
        let mut second = QuizRun::from_engine(&completed_engine("Second Clinic")).unwrap().unwrap();
        second.completed_at = first.completed_at + 1000;

        insert_quiz_run(&conn, &first).unwrap();
        insert_quiz_run(&conn, &second).unwrap();

        let runs = recent_runs(&conn, 10).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].company_name, "Second Clinic");
        assert_eq!(runs[1].percentage, 74);
        assert_eq!(runs[1].max_score, 125);
        assert_eq!(runs[1].suggested_agent, "Full AI Suite");
        assert_eq!(runs[1].industry, "healthcare");

        assert_eq!(recent_runs(&conn, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_unfinished_quiz_is_not_a_run() {
        let mut engine = QuizEngine::new(Arc::new(QuestionBank::standard().unwrap()));
        engine.select_industry(Industry::Other).unwrap();
        assert!(QuizRun::from_engine(&engine).unwrap().is_none());
    }
}
