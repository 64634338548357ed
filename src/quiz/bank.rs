use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use super::{Language, QuizError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Industry {
    RealEstate,
    Healthcare,
    Construction,
    Ecommerce,
    Other,
}

impl Industry {
    pub const ALL: [Industry; 5] = [
        Industry::RealEstate,
        Industry::Healthcare,
        Industry::Construction,
        Industry::Ecommerce,
        Industry::Other,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Industry::RealEstate => "real-estate",
            Industry::Healthcare => "healthcare",
            Industry::Construction => "construction",
            Industry::Ecommerce => "ecommerce",
            Industry::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Industry::RealEstate => "Real Estate",
            Industry::Healthcare => "Healthcare",
            Industry::Construction => "Construction",
            Industry::Ecommerce => "E-commerce",
            Industry::Other => "Other Industry",
        }
    }

    pub fn label_ar(&self) -> &'static str {
        match self {
            Industry::RealEstate => "العقارات",
            Industry::Healthcare => "الرعاية الصحية",
            Industry::Construction => "المقاولات والبناء",
            Industry::Ecommerce => "التجارة الإلكترونية",
            Industry::Other => "صناعة أخرى",
        }
    }

    pub fn label_in(&self, language: Language) -> &'static str {
        language.pick(self.label(), self.label_ar())
    }
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Industry {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Industry::ALL
            .into_iter()
            .find(|i| i.key() == wanted)
            .ok_or_else(|| QuizError::UnknownIndustry(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Single,
    Multi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub label_ar: String,
    pub score: u32,
}

impl QuizOption {
    pub fn label_in(&self, language: Language) -> &str {
        language.pick(&self.label, &self.label_ar)
    }
}

/// A question whose options were checked at construction: at least one, values distinct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub prompt_ar: String,
    pub kind: QuestionKind,
    options: Vec<QuizOption>,
}

impl Question {
    pub fn new(
        id: &str,
        prompt: &str,
        prompt_ar: &str,
        kind: QuestionKind,
        options: Vec<QuizOption>,
    ) -> Result<Self, QuizError> {
        if options.is_empty() {
            return Err(QuizError::Configuration(format!(
                "question `{}` has no options",
                id
            )));
        }
        let mut seen = HashSet::new();
        for opt in &options {
            if !seen.insert(opt.value.as_str()) {
                return Err(QuizError::Configuration(format!(
                    "question `{}` repeats option value `{}`",
                    id, opt.value
                )));
            }
        }
        Ok(Self {
            id: id.to_string(),
            prompt: prompt.to_string(),
            prompt_ar: prompt_ar.to_string(),
            kind,
            options,
        })
    }

    /// Options are `(value, label, arabic label, score)`.
    pub fn single(
        id: &str,
        prompt: &str,
        prompt_ar: &str,
        options: &[(&str, &str, &str, u32)],
    ) -> Result<Self, QuizError> {
        Self::new(id, prompt, prompt_ar, QuestionKind::Single, to_options(options))
    }

    pub fn multi(
        id: &str,
        prompt: &str,
        prompt_ar: &str,
        options: &[(&str, &str, &str, u32)],
    ) -> Result<Self, QuizError> {
        Self::new(id, prompt, prompt_ar, QuestionKind::Multi, to_options(options))
    }

    pub fn prompt_in(&self, language: Language) -> &str {
        language.pick(&self.prompt, &self.prompt_ar)
    }

    pub fn options(&self) -> &[QuizOption] {
        &self.options
    }

    pub fn option(&self, value: &str) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.value == value)
    }

    pub fn is_multi(&self) -> bool {
        self.kind == QuestionKind::Multi
    }

    /// Best single choice. For multi-select this is still one option, not the sum.
    pub fn max_score(&self) -> u32 {
        self.options.iter().map(|o| o.score).max().unwrap_or(0)
    }

    pub fn min_score(&self) -> u32 {
        self.options.iter().map(|o| o.score).min().unwrap_or(0)
    }
}

fn to_options(options: &[(&str, &str, &str, u32)]) -> Vec<QuizOption> {
    options
        .iter()
        .map(|&(value, label, label_ar, score)| QuizOption {
            value: value.to_string(),
            label: label.to_string(),
            label_ar: label_ar.to_string(),
            score,
        })
        .collect()
}

/// Common questions plus one question set per industry.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    common: Vec<Question>,
    specific: Vec<(Industry, Vec<Question>)>,
}

impl QuestionBank {
    pub fn new(
        common: Vec<Question>,
        specific: Vec<(Industry, Vec<Question>)>,
    ) -> Result<Self, QuizError> {
        let bank = Self { common, specific };
        for industry in Industry::ALL {
            let mut ids = HashSet::new();
            for q in bank.sequence(industry) {
                if !ids.insert(q.id.as_str()) {
                    return Err(QuizError::Configuration(format!(
                        "question id `{}` appears twice for {}",
                        q.id, industry
                    )));
                }
            }
        }
        Ok(bank)
    }

    /// Full question order for an industry: common questions first, then its own.
    pub fn sequence(&self, industry: Industry) -> Vec<&Question> {
        let own = self
            .specific
            .iter()
            .find(|(i, _)| *i == industry)
            .map(|(_, qs)| qs.as_slice())
            .unwrap_or(&[]);
        self.common.iter().chain(own.iter()).collect()
    }

    pub fn max_score(&self, industry: Industry) -> u32 {
        self.sequence(industry).iter().map(|q| q.max_score()).sum()
    }

    pub fn min_score(&self, industry: Industry) -> u32 {
        self.sequence(industry).iter().map(|q| q.min_score()).sum()
    }

    pub fn standard() -> Result<Self, QuizError> {
        let common = vec![
            Question::single(
                "team-size",
                "How many people are on your team?",
                "كم عدد أعضاء فريقك؟",
                &[
                    ("1-5", "1-5 people", "1-5 أشخاص", 5),
                    ("6-20", "6-20 people", "6-20 شخص", 10),
                    ("21-50", "21-50 people", "21-50 شخص", 15),
                    ("50+", "50+ people", "أكثر من 50", 20),
                ],
            )?,
            Question::single(
                "manual-hours",
                "How many hours per week does your team spend on repetitive tasks?",
                "كم ساعة أسبوعياً يقضيها فريقك في المهام المتكررة؟",
                &[
                    ("<5", "Less than 5 hours", "أقل من 5 ساعات", 5),
                    ("5-15", "5-15 hours", "5-15 ساعة", 10),
                    ("15-30", "15-30 hours", "15-30 ساعة", 15),
                    ("30+", "30+ hours", "أكثر من 30 ساعة", 20),
                ],
            )?,
            Question::multi(
                "channels",
                "Which communication channels do you use with customers?",
                "ما قنوات التواصل التي تستخدمها مع العملاء؟",
                &[
                    ("whatsapp", "WhatsApp", "واتساب", 5),
                    ("phone", "Phone Calls", "مكالمات هاتفية", 5),
                    ("email", "Email", "بريد إلكتروني", 3),
                    ("social", "Social Media", "وسائل التواصل", 4),
                ],
            )?,
        ];

        let real_estate = vec![
            Question::single(
                "re-inquiries",
                "How do you handle property inquiries after hours?",
                "كيف تتعامل مع استفسارات العقارات خارج أوقات العمل؟",
                &[
                    ("miss", "We miss them until next day", "نفقدها حتى اليوم التالي", 20),
                    ("auto-reply", "Basic auto-reply", "رد تلقائي بسيط", 10),
                    ("always-on", "Someone is always available", "شخص متاح دائماً", 5),
                ],
            )?,
            Question::single(
                "re-response-time",
                "What is your average response time to new leads?",
                "ما متوسط وقت الرد على العملاء المحتملين الجدد؟",
                &[
                    ("minutes", "Within minutes", "خلال دقائق", 5),
                    ("1-2h", "1-2 hours", "1-2 ساعة", 10),
                    ("same-day", "Same day", "نفس اليوم", 15),
                    ("next-day", "Next day or later", "اليوم التالي أو بعده", 20),
                ],
            )?,
            Question::single(
                "re-lead-tracking",
                "How do you track and follow up with leads?",
                "كيف تتابع العملاء المحتملين؟",
                &[
                    ("crm", "CRM system", "نظام CRM", 5),
                    ("spreadsheet", "Spreadsheets", "جداول بيانات", 15),
                    ("manual", "Notes and memory", "ملاحظات وذاكرة", 20),
                ],
            )?,
            Question::single(
                "re-viewings",
                "How many property viewings do you schedule per week?",
                "كم عدد المعاينات العقارية أسبوعياً؟",
                &[
                    ("<10", "Less than 10", "أقل من 10", 5),
                    ("10-30", "10-30", "10-30", 10),
                    ("30-50", "30-50", "30-50", 15),
                    ("50+", "50+", "أكثر من 50", 20),
                ],
            )?,
        ];

        let healthcare = vec![
            Question::single(
                "hc-booking",
                "How do patients currently book appointments?",
                "كيف يحجز المرضى المواعيد حالياً؟",
                &[
                    ("phone", "Phone calls only", "مكالمات هاتفية فقط", 20),
                    ("whatsapp", "WhatsApp messages", "رسائل واتساب", 15),
                    ("online", "Online booking system", "نظام حجز إلكتروني", 5),
                    ("walkin", "Walk-ins mostly", "زيارات مباشرة غالباً", 10),
                ],
            )?,
            Question::single(
                "hc-noshow",
                "What is your no-show rate for appointments?",
                "ما نسبة عدم الحضور للمواعيد؟",
                &[
                    ("<5", "Less than 5%", "أقل من 5%", 5),
                    ("5-15", "5-15%", "5-15%", 10),
                    ("15-25", "15-25%", "15-25%", 15),
                    (">25", "More than 25%", "أكثر من 25%", 20),
                ],
            )?,
            Question::single(
                "hc-calls",
                "What percentage of calls go unanswered during busy hours?",
                "ما نسبة المكالمات التي لا يُرد عليها خلال أوقات الذروة؟",
                &[
                    ("none", "Almost none", "تقريباً لا شيء", 5),
                    ("10-20", "10-20%", "10-20%", 10),
                    ("20-40", "20-40%", "20-40%", 15),
                    (">40", "More than 40%", "أكثر من 40%", 20),
                ],
            )?,
            Question::single(
                "hc-reminders",
                "How do you send appointment reminders?",
                "كيف ترسل تذكيرات المواعيد؟",
                &[
                    ("automated", "Automated system", "نظام آلي", 5),
                    ("manual", "Manual calls/messages", "مكالمات/رسائل يدوية", 20),
                    ("none", "We don't send reminders", "لا نرسل تذكيرات", 15),
                ],
            )?,
        ];

        let construction = vec![
            Question::single(
                "cn-progress",
                "How do you track daily progress reports from sites?",
                "كيف تتابع تقارير التقدم اليومية من المواقع؟",
                &[
                    ("digital", "Digital system with photos", "نظام رقمي مع صور", 5),
                    ("whatsapp", "WhatsApp groups", "مجموعات واتساب", 10),
                    ("calls", "Phone calls", "مكالمات هاتفية", 15),
                    ("paper", "Paper reports", "تقارير ورقية", 20),
                ],
            )?,
            Question::single(
                "cn-invoices",
                "How are invoices validated against project budgets?",
                "كيف يتم التحقق من الفواتير مقابل ميزانيات المشاريع؟",
                &[
                    ("automated", "Automated matching", "مطابقة آلية", 5),
                    ("manual", "Manual review", "مراجعة يدوية", 20),
                    ("spot", "Spot checks only", "فحوصات عشوائية فقط", 15),
                ],
            )?,
            Question::single(
                "cn-subcontractor",
                "How do you manage subcontractor payments?",
                "كيف تدير مدفوعات المقاولين الفرعيين؟",
                &[
                    ("integrated", "Integrated payment system", "نظام دفع متكامل", 5),
                    ("spreadsheet", "Spreadsheet tracking", "تتبع بجداول البيانات", 15),
                    ("manual", "Manual process", "عملية يدوية", 20),
                ],
            )?,
            Question::single(
                "cn-bidding",
                "How long does it take to prepare a project bid?",
                "كم يستغرق إعداد عرض سعر لمشروع؟",
                &[
                    ("<1d", "Less than a day", "أقل من يوم", 5),
                    ("1-3d", "1-3 days", "1-3 أيام", 10),
                    ("3-7d", "3-7 days", "3-7 أيام", 15),
                    (">1w", "More than a week", "أكثر من أسبوع", 20),
                ],
            )?,
        ];

        let ecommerce = vec![
            Question::single(
                "ec-abandoned",
                "What happens when a customer abandons their cart?",
                "ماذا يحدث عندما يتخلى عميل عن سلة التسوق؟",
                &[
                    ("automated", "Automated recovery sequence", "تسلسل استرداد آلي", 5),
                    ("single", "Single reminder email", "بريد تذكيري واحد", 10),
                    ("nothing", "Nothing", "لا شيء", 20),
                ],
            )?,
            Question::single(
                "ec-order-updates",
                "How do customers track their orders?",
                "كيف يتتبع العملاء طلباتهم؟",
                &[
                    ("whatsapp", "Real-time WhatsApp updates", "تحديثات واتساب فورية", 5),
                    ("email", "Email notifications", "إشعارات بريدية", 10),
                    ("call", "They have to call us", "يجب أن يتصلوا بنا", 20),
                ],
            )?,
            Question::single(
                "ec-reviews",
                "How do you collect customer reviews?",
                "كيف تجمع تقييمات العملاء؟",
                &[
                    ("automated", "Automated post-delivery request", "طلب آلي بعد التسليم", 5),
                    ("manual", "Manual outreach", "تواصل يدوي", 15),
                    ("none", "We don't actively collect", "لا نجمعها بشكل نشط", 20),
                ],
            )?,
            Question::single(
                "ec-support",
                "How do customers reach support?",
                "كيف يصل العملاء للدعم؟",
                &[
                    ("multichannel", "Live chat + WhatsApp", "دردشة مباشرة + واتساب", 5),
                    ("whatsapp", "WhatsApp only", "واتساب فقط", 10),
                    ("email", "Email only", "بريد إلكتروني فقط", 15),
                    ("none", "No dedicated support", "لا يوجد دعم مخصص", 20),
                ],
            )?,
        ];

        let other = vec![
            Question::single(
                "ot-biggest-bottleneck",
                "What is your biggest operational bottleneck?",
                "ما أكبر عقبة تشغيلية لديك؟",
                &[
                    ("communication", "Customer communication", "التواصل مع العملاء", 15),
                    ("data-entry", "Data entry and paperwork", "إدخال البيانات والأعمال الورقية", 20),
                    ("scheduling", "Scheduling and booking", "الجدولة والحجز", 15),
                    ("payments", "Payment processing", "معالجة المدفوعات", 15),
                ],
            )?,
            Question::single(
                "ot-automation-tried",
                "Have you tried automation before?",
                "هل جربت الأتمتة من قبل؟",
                &[
                    ("yes-success", "Yes, successfully", "نعم، بنجاح", 5),
                    ("yes-failed", "Yes, but it failed", "نعم، لكنها فشلت", 15),
                    ("never", "No, never tried", "لا، لم أجرب", 10),
                ],
            )?,
            Question::single(
                "ot-budget",
                "What is your monthly budget for business tools?",
                "ما ميزانيتك الشهرية لأدوات العمل؟",
                &[
                    ("<100", "Less than $100", "أقل من $100", 5),
                    ("100-500", "$100-500", "$100-500", 10),
                    ("500-2000", "$500-2000", "$500-2000", 15),
                    (">2000", "More than $2000", "أكثر من $2000", 20),
                ],
            )?,
        ];

        Self::new(
            common,
            vec![
                (Industry::RealEstate, real_estate),
                (Industry::Healthcare, healthcare),
                (Industry::Construction, construction),
                (Industry::Ecommerce, ecommerce),
                (Industry::Other, other),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_bank_is_valid() {
        let bank = QuestionBank::standard().unwrap();
        for industry in Industry::ALL {
            let seq = bank.sequence(industry);
            assert_eq!(seq[0].id, "team-size");
            assert_eq!(seq[1].id, "manual-hours");
            assert_eq!(seq[2].id, "channels");
            assert!(seq.len() > 3, "{} has no specific questions", industry);
        }
    }

    #[test]
    fn test_max_score_uses_best_single_option() {
        let bank = QuestionBank::standard().unwrap();
        // 20 + 20 + 5 (channels: best single, not 17) + 4 * 20
        assert_eq!(bank.max_score(Industry::Healthcare), 125);
        // 20 + 20 + 5 + 20 + 15 + 20
        assert_eq!(bank.max_score(Industry::Other), 100);
        assert_eq!(bank.min_score(Industry::Healthcare), 33);
    }

    #[test]
    fn test_duplicate_option_values_rejected() {
        let err = Question::single("q", "?", "؟", &[("a", "A", "أ", 1), ("a", "Also A", "أ", 2)])
            .unwrap_err();
        assert!(matches!(err, QuizError::Configuration(_)));
    }

    #[test]
    fn test_empty_options_rejected() {
        assert!(Question::multi("q", "?", "؟", &[]).is_err());
    }

    #[test]
    fn test_duplicate_question_ids_rejected() {
        let q = Question::single("dup", "?", "؟", &[("a", "A", "أ", 1)]).unwrap();
        let result = QuestionBank::new(vec![q.clone()], vec![(Industry::Other, vec![q])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_every_question_is_translated() {
        let bank = QuestionBank::standard().unwrap();
        for industry in Industry::ALL {
            assert_ne!(industry.label_in(Language::Ar), industry.label());
            for q in bank.sequence(industry) {
                assert!(!q.prompt_ar.is_empty(), "{} has no Arabic prompt", q.id);
                for opt in q.options() {
                    assert!(!opt.label_ar.is_empty(), "{}/{} has no Arabic label", q.id, opt.value);
                }
            }
        }
        let first = &bank.sequence(Industry::Other)[0];
        assert_eq!(first.prompt_in(Language::Ar), "كم عدد أعضاء فريقك؟");
        assert_eq!(first.options()[3].label_in(Language::Ar), "أكثر من 50");
        assert_eq!(first.options()[3].label_in(Language::En), "50+ people");
    }

    #[test]
    fn test_industry_parsing() {
        assert_eq!("real-estate".parse::<Industry>().unwrap(), Industry::RealEstate);
        assert_eq!(" Healthcare ".parse::<Industry>().unwrap(), Industry::Healthcare);
        assert_eq!(
            "mining".parse::<Industry>().unwrap_err(),
            QuizError::UnknownIndustry("mining".to_string())
        );
    }
}
