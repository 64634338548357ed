use serde::Serialize;

use super::{Language, QuizError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Inclusive percentage bounds.
    pub range: (u32, u32),
    pub title: &'static str,
    pub title_ar: &'static str,
    pub description: &'static str,
    pub description_ar: &'static str,
    pub suggested_agent: &'static str,
    pub suggested_agent_ar: &'static str,
    pub priority: Priority,
}

impl Recommendation {
    pub fn contains(&self, percentage: u32) -> bool {
        percentage >= self.range.0 && percentage <= self.range.1
    }

    pub fn title_in(&self, language: Language) -> &'static str {
        language.pick(self.title, self.title_ar)
    }

    pub fn description_in(&self, language: Language) -> &'static str {
        language.pick(self.description, self.description_ar)
    }

    pub fn suggested_agent_in(&self, language: Language) -> &'static str {
        language.pick(self.suggested_agent, self.suggested_agent_ar)
    }
}

pub static RECOMMENDATIONS: [Recommendation; 4] = [
    Recommendation {
        range: (0, 30),
        title: "You're Already Optimized!",
        title_ar: "أنت محسّن بالفعل!",
        description: "Your operations are already quite efficient. Consider advanced AI solutions to take your business to the next level.",
        description_ar: "عملياتك فعّالة بالفعل. فكر في حلول الذكاء الاصطناعي المتقدمة للارتقاء بعملك.",
        suggested_agent: "Custom AI Integration",
        suggested_agent_ar: "تكامل ذكاء اصطناعي مخصص",
        priority: Priority::Low,
    },
    Recommendation {
        range: (31, 60),
        title: "Room for Improvement",
        title_ar: "مجال للتحسين",
        description: "You have moderate automation potential. Targeted solutions could save you 10-20 hours per week.",
        description_ar: "لديك إمكانات أتمتة معتدلة. الحلول المستهدفة يمكن أن توفر لك 10-20 ساعة أسبوعياً.",
        suggested_agent: "WhatsApp Automation",
        suggested_agent_ar: "أتمتة واتساب",
        priority: Priority::Medium,
    },
    Recommendation {
        range: (61, 85),
        title: "High Automation Potential",
        title_ar: "إمكانات أتمتة عالية",
        description: "Your business could significantly benefit from AI agents. You could save 20-40 hours per week.",
        description_ar: "يمكن لعملك الاستفادة بشكل كبير من وكلاء الذكاء الاصطناعي. يمكنك توفير 20-40 ساعة أسبوعياً.",
        suggested_agent: "Full AI Suite",
        suggested_agent_ar: "حزمة الذكاء الاصطناعي الكاملة",
        priority: Priority::High,
    },
    Recommendation {
        range: (86, 100),
        title: "Critical: Automate Now!",
        title_ar: "حرج: تحتاج للأتمتة الآن!",
        description: "Your operations have significant inefficiencies. AI automation could transform your business and save 40+ hours per week.",
        description_ar: "عملياتك بها أوجه قصور كبيرة. أتمتة الذكاء الاصطناعي يمكن أن تحول عملك وتوفر أكثر من 40 ساعة أسبوعياً.",
        suggested_agent: "Complete Digital Transformation",
        suggested_agent_ar: "تحول رقمي كامل",
        priority: Priority::Critical,
    },
];

pub fn recommendation_for(percentage: u32) -> Result<&'static Recommendation, QuizError> {
    lookup(&RECOMMENDATIONS, percentage)
}

/// Exactly one tier must contain `percentage`; anything else means the table is broken.
pub fn lookup(table: &[Recommendation], percentage: u32) -> Result<&Recommendation, QuizError> {
    let mut matches = table.iter().filter(|r| r.contains(percentage));
    match (matches.next(), matches.next()) {
        (Some(tier), None) => Ok(tier),
        (None, _) => Err(QuizError::Configuration(format!(
            "no recommendation covers {}%",
            percentage
        ))),
        (Some(a), Some(b)) => Err(QuizError::Configuration(format!(
            "{}% falls in both \"{}\" and \"{}\"",
            percentage, a.title, b.title
        ))),
    }
}

/// Checks that the tiers partition 0..=100.
pub fn validate(table: &[Recommendation]) -> Result<(), QuizError> {
    for tier in table {
        if tier.range.0 > tier.range.1 {
            return Err(QuizError::Configuration(format!(
                "\"{}\" has an inverted range",
                tier.title
            )));
        }
    }
    (0..=100).try_for_each(|p| lookup(table, p).map(|_| ()))
}
