use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use super::bank::{Industry, Question, QuestionBank};
use super::language::Language;
use super::tiers::{recommendation_for, Recommendation};
use super::QuizError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "index", rename_all = "kebab-case")]
pub enum Step {
    Unstarted,
    Answering(usize),
    CollectingCompanyName,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    Multi(Vec<String>),
}

impl Answer {
    pub fn values(&self) -> Vec<&str> {
        match self {
            Answer::Single(v) => vec![v.as_str()],
            Answer::Multi(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub question_id: String,
    pub answer: Answer,
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResults {
    pub industry: Option<Industry>,
    pub company_name: String,
    pub answers: Vec<QuizAnswer>,
    pub total_score: u32,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Why a quiz action was refused. The engine is unchanged whenever one of these is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Declined {
    #[error("not allowed at this step")]
    WrongStep,
    #[error("select at least one option")]
    EmptySelection,
    #[error("this question takes a single option")]
    TooManyValues,
    #[error("option `{0}` selected twice")]
    DuplicateValue(String),
    #[error("`{0}` is not an option for this question")]
    UnknownValue(String),
    #[error("already at the first question")]
    AtFirstQuestion,
    #[error("company name is required")]
    EmptyCompanyName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSnapshot {
    pub step: Step,
    pub results: QuizResults,
    #[serde(default)]
    pub language: Language,
}

pub struct QuizEngine {
    bank: Arc<QuestionBank>,
    step: Step,
    results: QuizResults,
    language: Language,
}

impl QuizEngine {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self {
            bank,
            step: Step::Unstarted,
            results: QuizResults::default(),
            language: Language::default(),
        }
    }

    pub fn from_snapshot(bank: Arc<QuestionBank>, snapshot: QuizSnapshot) -> Result<Self, QuizError> {
        let QuizSnapshot { step, results, language } = snapshot;
        let engine = Self {
            bank,
            step,
            results,
            language,
        };
        engine.check_consistent()?;
        Ok(engine)
    }

    pub fn snapshot(&self) -> QuizSnapshot {
        QuizSnapshot {
            step: self.step,
            results: self.results.clone(),
            language: self.language,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Switching language keeps every answer; only displayed text changes.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn results(&self) -> &QuizResults {
        &self.results
    }

    pub fn industry(&self) -> Option<Industry> {
        self.results.industry
    }

    /// Question sequence for the selected industry; empty before one is chosen.
    pub fn questions(&self) -> Vec<&Question> {
        match self.results.industry {
            Some(industry) => self.bank.sequence(industry),
            None => Vec::new(),
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.step {
            Step::Answering(i) => self.questions().get(i).copied(),
            _ => None,
        }
    }

    /// Values previously recorded for a question, used to preselect on revisit.
    pub fn previous_selection(&self, question_id: &str) -> Vec<&str> {
        self.results
            .answers
            .iter()
            .find(|a| a.question_id == question_id)
            .map(|a| a.answer.values())
            .unwrap_or_default()
    }

    /// Percent of the way through the quiz, counting the company name step.
    pub fn progress(&self) -> u32 {
        let steps = self.questions().len() + 1;
        match self.step {
            Step::Unstarted => 0,
            Step::Answering(i) => ((i + 1) * 100 / steps) as u32,
            Step::CollectingCompanyName | Step::Completed => 100,
        }
    }

    pub fn select_industry(&mut self, industry: Industry) -> Result<(), Declined> {
        if self.step != Step::Unstarted {
            return Err(Declined::WrongStep);
        }
        self.results.industry = Some(industry);
        self.step = Step::Answering(0);
        log::debug!("quiz started for {}", industry);
        Ok(())
    }

    /// Record an answer for the current question and advance. Returns its score.
    pub fn answer(&mut self, values: &[&str]) -> Result<u32, Declined> {
        let (Step::Answering(index), Some(industry)) = (self.step, self.results.industry) else {
            return Err(Declined::WrongStep);
        };
        let bank = Arc::clone(&self.bank);
        let sequence = bank.sequence(industry);
        let question = *sequence.get(index).ok_or(Declined::WrongStep)?;

        if values.is_empty() {
            return Err(Declined::EmptySelection);
        }
        if !question.is_multi() && values.len() > 1 {
            return Err(Declined::TooManyValues);
        }
        let mut seen = HashSet::new();
        let mut score = 0;
        for &value in values {
            if !seen.insert(value) {
                return Err(Declined::DuplicateValue(value.to_string()));
            }
            let option = question
                .option(value)
                .ok_or_else(|| Declined::UnknownValue(value.to_string()))?;
            score += option.score;
        }

        let answer = if question.is_multi() {
            Answer::Multi(values.iter().map(|v| v.to_string()).collect())
        } else {
            Answer::Single(values[0].to_string())
        };
        self.record(&question.id, answer, score);

        self.step = if index + 1 < sequence.len() {
            Step::Answering(index + 1)
        } else {
            Step::CollectingCompanyName
        };
        Ok(score)
    }

    fn record(&mut self, question_id: &str, answer: Answer, score: u32) {
        let results = &mut self.results;
        match results.answers.iter_mut().find(|a| a.question_id == question_id) {
            Some(existing) => {
                results.total_score = results.total_score - existing.score + score;
                existing.answer = answer;
                existing.score = score;
            }
            None => {
                results.total_score += score;
                results.answers.push(QuizAnswer {
                    question_id: question_id.to_string(),
                    answer,
                    score,
                });
            }
        }
    }

    /// Step back one question. Recorded answers are kept.
    pub fn back(&mut self) -> Result<(), Declined> {
        self.step = match self.step {
            Step::Answering(0) => return Err(Declined::AtFirstQuestion),
            Step::Answering(i) => Step::Answering(i - 1),
            Step::CollectingCompanyName => Step::Answering(self.questions().len().saturating_sub(1)),
            Step::Unstarted | Step::Completed => return Err(Declined::WrongStep),
        };
        Ok(())
    }

    pub fn submit_company_name(&mut self, name: &str) -> Result<(), Declined> {
        if self.step != Step::CollectingCompanyName {
            return Err(Declined::WrongStep);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(Declined::EmptyCompanyName);
        }
        self.results.company_name = name.to_string();
        self.results.completed_at = Some(Utc::now());
        self.step = Step::Completed;
        Ok(())
    }

    pub fn max_score(&self) -> Option<u32> {
        self.results.industry.map(|i| self.bank.max_score(i))
    }

    /// Rounded half up and capped at 100, since multi-select answers can exceed the maximum.
    pub fn final_percentage(&self) -> Option<u32> {
        if self.step != Step::Completed {
            return None;
        }
        let max = self.max_score()? as u64;
        if max == 0 {
            return Some(0);
        }
        let total = self.results.total_score as u64;
        let pct = (total * 200 + max) / (2 * max);
        Some(pct.min(100) as u32)
    }

    pub fn recommendation(&self) -> Result<Option<&'static Recommendation>, QuizError> {
        self.final_percentage().map(recommendation_for).transpose()
    }

    /// Back to the industry choice. The language setting is kept.
    pub fn reset(&mut self) {
        self.step = Step::Unstarted;
        self.results = QuizResults::default();
    }

    fn check_consistent(&self) -> Result<(), QuizError> {
        let fail = |msg: String| Err(QuizError::Snapshot(msg));
        let questions = self.questions();

        if self.step != Step::Completed && self.results.completed_at.is_some() {
            return fail("unfinished quiz has a completion time".into());
        }
        match (self.step, self.results.industry) {
            (Step::Unstarted, Some(_)) => return fail("unstarted quiz has an industry".into()),
            (Step::Unstarted, None) => {}
            (_, None) => return fail("quiz in progress without an industry".into()),
            (Step::Answering(i), Some(_)) if i >= questions.len() => {
                return fail(format!("question index {} out of range", i))
            }
            (Step::Completed, Some(_)) if self.results.completed_at.is_none() => {
                return fail("completed quiz without a completion time".into())
            }
            _ => {}
        }

        if matches!(self.step, Step::CollectingCompanyName | Step::Completed) {
            if let Some(missing) = questions
                .iter()
                .find(|q| !self.results.answers.iter().any(|a| a.question_id == q.id))
            {
                return fail(format!("finished quiz is missing an answer for `{}`", missing.id));
            }
        }

        for answer in &self.results.answers {
            let Some(question) = questions.iter().find(|q| q.id == answer.question_id) else {
                return fail(format!("unknown question `{}`", answer.question_id));
            };
            let expected: Option<u32> = answer
                .answer
                .values()
                .iter()
                .map(|v| question.option(v).map(|o| o.score))
                .sum();
            if expected != Some(answer.score) {
                return fail(format!("score mismatch for `{}`", answer.question_id));
            }
        }

        let sum: u32 = self.results.answers.iter().map(|a| a.score).sum();
        if sum != self.results.total_score {
            return fail(format!(
                "total {} does not match answers ({})",
                self.results.total_score, sum
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::tiers::Priority;

    fn engine() -> QuizEngine {
        QuizEngine::new(Arc::new(QuestionBank::standard().unwrap()))
    }

    fn lowest_values(engine: &QuizEngine) -> Vec<String> {
        engine
            .questions()
            .iter()
            .map(|q| {
                q.options()
                    .iter()
                    .min_by_key(|o| o.score)
                    .map(|o| o.value.clone())
                    .unwrap()
            })
            .collect()
    }

    fn highest_values(engine: &QuizEngine) -> Vec<String> {
        engine
            .questions()
            .iter()
            .map(|q| {
                q.options()
                    .iter()
                    .max_by_key(|o| o.score)
                    .map(|o| o.value.clone())
                    .unwrap()
            })
            .collect()
    }

    fn answer_all(engine: &mut QuizEngine, values: &[String]) {
        for v in values {
            engine.answer(&[v.as_str()]).unwrap();
        }
    }

    #[test]
    fn test_total_is_sum_of_answers() {
        let mut e = engine();
        e.select_industry(Industry::RealEstate).unwrap();
        let mut expected = 0;
        expected += e.answer(&["21-50"]).unwrap();
        expected += e.answer(&["15-30"]).unwrap();
        expected += e.answer(&["whatsapp", "email", "social"]).unwrap();
        expected += e.answer(&["miss"]).unwrap();

        assert_eq!(expected, 15 + 15 + 12 + 20);
        assert_eq!(e.results().total_score, expected);
        let sum: u32 = e.results().answers.iter().map(|a| a.score).sum();
        assert_eq!(sum, e.results().total_score);
    }

    #[test]
    fn test_revisit_replaces_previous_answer() {
        let mut e = engine();
        e.select_industry(Industry::Construction).unwrap();
        e.answer(&["50+"]).unwrap();
        e.answer(&["30+"]).unwrap();
        assert_eq!(e.results().total_score, 40);

        e.back().unwrap();
        e.back().unwrap();
        assert_eq!(e.step(), Step::Answering(0));
        assert_eq!(e.previous_selection("team-size"), vec!["50+"]);

        e.answer(&["1-5"]).unwrap();
        assert_eq!(e.results().answers.len(), 2);
        assert_eq!(e.results().total_score, 25);
        assert_eq!(e.step(), Step::Answering(1));
    }

    #[test]
    fn test_all_lowest_answers_score() {
        let mut e = engine();
        e.select_industry(Industry::Healthcare).unwrap();
        let lows = lowest_values(&e);
        answer_all(&mut e, &lows);
        e.submit_company_name("Clinic").unwrap();

        assert_eq!(e.results().total_score, 33);
        assert_eq!(e.max_score(), Some(125));
        assert_eq!(e.final_percentage(), Some(26));
        assert_eq!(e.recommendation().unwrap().unwrap().priority, Priority::Low);
    }

    #[test]
    fn test_percentage_bounds_for_every_industry() {
        for industry in Industry::ALL {
            let mut best = engine();
            best.select_industry(industry).unwrap();
            let highs = highest_values(&best);
            answer_all(&mut best, &highs);
            best.submit_company_name("Top").unwrap();
            assert_eq!(best.results().total_score, best.max_score().unwrap(), "{}", industry);
            assert_eq!(best.final_percentage(), Some(100), "{}", industry);

            let mut worst = engine();
            worst.select_industry(industry).unwrap();
            let lows = lowest_values(&worst);
            answer_all(&mut worst, &lows);
            worst.submit_company_name("Low").unwrap();
            let min = worst.results().total_score as f64;
            let max = worst.max_score().unwrap() as f64;
            let expected = (min / max * 100.0).round() as u32;
            assert_eq!(worst.final_percentage(), Some(expected), "{}", industry);
        }
    }

    #[test]
    fn test_percentage_capped_when_multi_select_exceeds_max() {
        let mut e = engine();
        e.select_industry(Industry::Ecommerce).unwrap();
        e.answer(&["50+"]).unwrap();
        e.answer(&["30+"]).unwrap();
        e.answer(&["whatsapp", "phone", "email", "social"]).unwrap();
        let rest: Vec<String> = highest_values(&e)[3..].to_vec();
        answer_all(&mut e, &rest);
        e.submit_company_name("Shop").unwrap();

        assert!(e.results().total_score > e.max_score().unwrap());
        assert_eq!(e.final_percentage(), Some(100));
    }

    #[test]
    fn test_healthcare_scenario() {
        let mut e = engine();
        e.select_industry(Industry::Healthcare).unwrap();
        e.answer(&["1-5"]).unwrap();
        e.answer(&["<5"]).unwrap();
        e.answer(&["email"]).unwrap();
        e.answer(&["phone"]).unwrap();
        e.answer(&[">25"]).unwrap();
        e.answer(&[">40"]).unwrap();
        e.answer(&["manual"]).unwrap();
        assert_eq!(e.step(), Step::CollectingCompanyName);
        assert_eq!(e.final_percentage(), None);

        e.submit_company_name("  Acme Dental  ").unwrap();
        assert_eq!(e.results().company_name, "Acme Dental");
        assert!(e.results().completed_at.is_some());
        assert_eq!(e.results().total_score, 93);
        assert_eq!(e.final_percentage(), Some(74));

        let tier = e.recommendation().unwrap().unwrap();
        assert_eq!(tier.title, "High Automation Potential");
        assert_eq!(tier.suggested_agent, "Full AI Suite");
    }

    #[test]
    fn test_invalid_answers_are_declined() {
        let mut e = engine();
        assert_eq!(e.answer(&["1-5"]), Err(Declined::WrongStep));

        e.select_industry(Industry::Other).unwrap();
        assert_eq!(e.answer(&[]), Err(Declined::EmptySelection));
        assert_eq!(e.answer(&["1-5", "6-20"]), Err(Declined::TooManyValues));
        assert_eq!(e.answer(&["7"]), Err(Declined::UnknownValue("7".to_string())));
        assert_eq!(e.step(), Step::Answering(0));

        e.answer(&["1-5"]).unwrap();
        e.answer(&["<5"]).unwrap();
        assert_eq!(
            e.answer(&["email", "email"]),
            Err(Declined::DuplicateValue("email".to_string()))
        );
        assert_eq!(e.results().total_score, 10);
        assert_eq!(e.step(), Step::Answering(2));
    }

    #[test]
    fn test_step_guards() {
        let mut e = engine();
        assert_eq!(e.back(), Err(Declined::WrongStep));
        assert_eq!(e.submit_company_name("x"), Err(Declined::WrongStep));

        e.select_industry(Industry::Other).unwrap();
        assert_eq!(e.select_industry(Industry::Healthcare), Err(Declined::WrongStep));
        assert_eq!(e.back(), Err(Declined::AtFirstQuestion));

        let lows = lowest_values(&e);
        answer_all(&mut e, &lows);
        assert_eq!(e.progress(), 100);
        assert_eq!(e.submit_company_name("   "), Err(Declined::EmptyCompanyName));

        e.back().unwrap();
        assert_eq!(e.step(), Step::Answering(lows.len() - 1));
        e.answer(&[lows.last().unwrap().as_str()]).unwrap();
        e.submit_company_name("Ops Co").unwrap();

        assert_eq!(e.back(), Err(Declined::WrongStep));
        assert_eq!(e.answer(&["1-5"]), Err(Declined::WrongStep));
    }

    #[test]
    fn test_reset_returns_to_unstarted() {
        let mut e = engine();
        e.select_industry(Industry::RealEstate).unwrap();
        e.answer(&["6-20"]).unwrap();
        e.reset();
        assert_eq!(e.step(), Step::Unstarted);
        assert_eq!(e.results(), &QuizResults::default());
        assert!(e.questions().is_empty());
        assert_eq!(e.progress(), 0);
    }

    #[test]
    fn test_snapshot_restores_mid_quiz() {
        let bank = Arc::new(QuestionBank::standard().unwrap());
        let mut e = QuizEngine::new(Arc::clone(&bank));
        e.select_industry(Industry::Healthcare).unwrap();
        e.answer(&["6-20"]).unwrap();
        e.answer(&["5-15"]).unwrap();
        e.answer(&["whatsapp", "phone"]).unwrap();

        let json = serde_json::to_string(&e.snapshot()).unwrap();
        assert!(json.contains("\"step\":\"answering\""));
        let restored =
            QuizEngine::from_snapshot(bank, serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(restored.step(), Step::Answering(3));
        assert_eq!(restored.results(), e.results());
    }

    #[test]
    fn test_tampered_snapshot_rejected() {
        let bank = Arc::new(QuestionBank::standard().unwrap());
        let mut e = QuizEngine::new(Arc::clone(&bank));
        e.select_industry(Industry::Healthcare).unwrap();
        e.answer(&["6-20"]).unwrap();

        let mut snapshot = e.snapshot();
        snapshot.results.total_score = 99;
        assert!(matches!(
            QuizEngine::from_snapshot(Arc::clone(&bank), snapshot),
            Err(QuizError::Snapshot(_))
        ));

        let mut snapshot = e.snapshot();
        snapshot.step = Step::Answering(40);
        assert!(QuizEngine::from_snapshot(bank, snapshot).is_err());
    }

    #[test]
    fn test_finished_snapshot_needs_every_answer() {
        let bank = Arc::new(QuestionBank::standard().unwrap());
        let mut e = QuizEngine::new(Arc::clone(&bank));
        e.select_industry(Industry::Other).unwrap();
        e.answer(&["1-5"]).unwrap();

        let mut snapshot = e.snapshot();
        snapshot.step = Step::CollectingCompanyName;
        assert!(matches!(
            QuizEngine::from_snapshot(Arc::clone(&bank), snapshot.clone()),
            Err(QuizError::Snapshot(_))
        ));

        snapshot.step = Step::Completed;
        snapshot.results.company_name = "Half Done".to_string();
        snapshot.results.completed_at = Some(Utc::now());
        assert!(matches!(
            QuizEngine::from_snapshot(Arc::clone(&bank), snapshot),
            Err(QuizError::Snapshot(_))
        ));

        let mut snapshot = e.snapshot();
        snapshot.results.completed_at = Some(Utc::now());
        assert!(matches!(
            QuizEngine::from_snapshot(Arc::clone(&bank), snapshot),
            Err(QuizError::Snapshot(_))
        ));

        let lows = lowest_values(&e)[1..].to_vec();
        answer_all(&mut e, &lows);
        e.submit_company_name("Whole").unwrap();
        assert!(QuizEngine::from_snapshot(bank, e.snapshot()).is_ok());
    }

    #[test]
    fn test_language_survives_snapshot_and_reset() {
        let bank = Arc::new(QuestionBank::standard().unwrap());
        let mut e = QuizEngine::new(Arc::clone(&bank));
        e.set_language(Language::Ar);
        e.select_industry(Industry::Healthcare).unwrap();
        e.answer(&["6-20"]).unwrap();

        let json = serde_json::to_string(&e.snapshot()).unwrap();
        assert!(json.contains("\"language\":\"ar\""));
        let mut restored =
            QuizEngine::from_snapshot(bank, serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(restored.language(), Language::Ar);
        assert_eq!(restored.results(), e.results());

        restored.reset();
        assert_eq!(restored.language(), Language::Ar);
    }

    #[test]
    fn test_snapshot_without_language_defaults_to_english() {
        let bank = Arc::new(QuestionBank::standard().unwrap());
        let json = r#"{"step":{"step":"unstarted"},"results":{"industry":null,"companyName":"","answers":[],"totalScore":0,"completedAt":null}}"#;
        let e = QuizEngine::from_snapshot(bank, serde_json::from_str(json).unwrap()).unwrap();
        assert_eq!(e.language(), Language::En);
    }
}
