use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::quiz::QuizEngine;

/// A finished quiz as stored in `quiz_runs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRun {
    pub id: Option<i64>,
    pub company_name: String,
    pub industry: String,
    pub total_score: i64,
    pub max_score: i64,
    pub percentage: i64,
    pub suggested_agent: String,
    /// JSON array of answers.
    pub answers: String,
    /// Milliseconds since the epoch.
    pub completed_at: i64,
}

impl QuizRun {
    /// `None` until the engine reaches `Completed`.
    pub fn from_engine(engine: &QuizEngine) -> Result<Option<Self>> {
        let results = engine.results();
        let (Some(percentage), Some(industry), Some(completed_at)) = (
            engine.final_percentage(),
            results.industry,
            results.completed_at,
        ) else {
            return Ok(None);
        };
        let tier = engine
            .recommendation()?
            .context("Completed quiz has no recommendation")?;

        Ok(Some(Self {
            id: None,
            company_name: results.company_name.clone(),
            industry: industry.key().to_string(),
            total_score: results.total_score as i64,
            max_score: engine.max_score().unwrap_or(0) as i64,
            percentage: percentage as i64,
            suggested_agent: tier.suggested_agent.to_string(),
            answers: serde_json::to_string(&results.answers)
                .context("Failed to serialize answers")?,
            completed_at: completed_at.timestamp_millis(),
        }))
    }
}
