use serde::Serialize;

use crate::quiz::{Industry, Language};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    LeadGen,
    Support,
    Operations,
    Marketing,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::LeadGen => "lead-gen",
            Category::Support => "support",
            Category::Operations => "operations",
            Category::Marketing => "marketing",
        }
    }
}

/// A ready-made automation flow that can be requested over WhatsApp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub name_ar: &'static str,
    pub description: &'static str,
    pub description_ar: &'static str,
    /// `None` means the template fits every industry.
    pub industry: Option<Industry>,
    pub category: Category,
    pub nodes: u32,
    pub downloads: u32,
    pub rating: f32,
}

impl WorkflowTemplate {
    pub fn name_in(&self, language: Language) -> &'static str {
        language.pick(self.name, self.name_ar)
    }

    pub fn description_in(&self, language: Language) -> &'static str {
        language.pick(self.description, self.description_ar)
    }

    pub fn fits(&self, industry: Industry) -> bool {
        self.industry.map_or(true, |i| i == industry)
    }
}

pub static TEMPLATES: [WorkflowTemplate; 6] = [
    WorkflowTemplate {
        id: "whatsapp-lead-qualifier",
        name: "WhatsApp Lead Qualifier",
        name_ar: "تأهيل العملاء عبر واتساب",
        description: "Auto-respond to inquiries, qualify leads, and schedule appointments via WhatsApp.",
        description_ar: "الرد التلقائي على الاستفسارات، تأهيل العملاء، وجدولة المواعيد عبر واتساب.",
        industry: Some(Industry::RealEstate),
        category: Category::LeadGen,
        nodes: 12,
        downloads: 1240,
        rating: 4.8,
    },
    WorkflowTemplate {
        id: "appointment-booking",
        name: "Appointment Booking Bot",
        name_ar: "روبوت حجز المواعيد",
        description: "WhatsApp-based booking with Google Calendar integration and reminders.",
        description_ar: "حجز عبر واتساب مع تكامل تقويم Google والتذكيرات.",
        industry: Some(Industry::Healthcare),
        category: Category::Operations,
        nodes: 15,
        downloads: 890,
        rating: 4.9,
    },
    WorkflowTemplate {
        id: "order-status-notifier",
        name: "Order Status Notifier",
        name_ar: "إشعارات حالة الطلب",
        description: "Automatic WhatsApp updates for order confirmation, shipping, and delivery.",
        description_ar: "تحديثات واتساب تلقائية لتأكيد الطلب والشحن والتسليم.",
        industry: Some(Industry::Ecommerce),
        category: Category::Support,
        nodes: 8,
        downloads: 2100,
        rating: 4.7,
    },
    WorkflowTemplate {
        id: "invoice-validator",
        name: "Invoice Validator",
        name_ar: "مدقق الفواتير",
        description: "Cross-reference invoices against project budgets automatically.",
        description_ar: "مقارنة الفواتير بميزانيات المشاريع تلقائياً.",
        industry: Some(Industry::Construction),
        category: Category::Operations,
        nodes: 18,
        downloads: 560,
        rating: 4.6,
    },
    WorkflowTemplate {
        id: "abandoned-cart-recovery",
        name: "Abandoned Cart Recovery",
        name_ar: "استرداد سلات التسوق المهجورة",
        description: "Multi-channel recovery sequences for cart abandonment.",
        description_ar: "تسلسلات استرداد متعددة القنوات لسلات التسوق المهجورة.",
        industry: Some(Industry::Ecommerce),
        category: Category::Marketing,
        nodes: 10,
        downloads: 1850,
        rating: 4.8,
    },
    WorkflowTemplate {
        id: "daily-progress-report",
        name: "Daily Progress Report",
        name_ar: "تقرير التقدم اليومي",
        description: "Telegram bot for field workers to submit photos and GPS updates.",
        description_ar: "روبوت تيليجرام لإرسال الصور وتحديثات GPS من العمال.",
        industry: Some(Industry::Construction),
        category: Category::Operations,
        nodes: 14,
        downloads: 420,
        rating: 4.5,
    },
];

/// Templates for one industry, or the whole catalog when `industry` is `None`. Catalog order is kept.
pub fn for_industry(industry: Option<Industry>) -> Vec<&'static WorkflowTemplate> {
    TEMPLATES
        .iter()
        .filter(|t| industry.map_or(true, |i| t.fits(i)))
        .collect()
}

pub fn find(id: &str) -> Option<&'static WorkflowTemplate> {
    let id = id.trim();
    TEMPLATES.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_filter_by_industry() {
        let ids: Vec<&str> = for_industry(Some(Industry::Ecommerce)).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["order-status-notifier", "abandoned-cart-recovery"]);
        assert_eq!(for_industry(None).len(), TEMPLATES.len());
        assert!(for_industry(Some(Industry::Other)).is_empty());
    }

    #[test]
    fn test_catalog_wide_template_fits_everything() {
        let mut general = TEMPLATES[0].clone();
        general.industry = None;
        assert!(Industry::ALL.iter().all(|&i| general.fits(i)));
        assert!(!TEMPLATES[0].fits(Industry::Healthcare));
    }

    #[test]
    fn test_find_and_ids_unique() {
        assert_eq!(find(" invoice-validator ").map(|t| t.nodes), Some(18));
        assert!(find("missing").is_none());
        let ids: HashSet<&str> = TEMPLATES.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), TEMPLATES.len());
    }

    #[test]
    fn test_localized_text() {
        let t = find("appointment-booking").unwrap();
        assert_eq!(t.name_in(Language::Ar), "روبوت حجز المواعيد");
        assert_eq!(t.description_in(Language::En), t.description);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(&TEMPLATES[1]).unwrap();
        assert_eq!(json["industry"], "healthcare");
        assert_eq!(json["category"], "operations");
        assert_eq!(json["nameAr"], "روبوت حجز المواعيد");
    }
}
