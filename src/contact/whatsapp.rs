use anyhow::{bail, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::configurator::AgentConfig;
use crate::quiz::QuizResults;
use crate::workflows::WorkflowTemplate;

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped, so spaces become `%20`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `https://wa.me/<digits>?text=<message>`. Formatting characters in the number are dropped.
pub fn link(number: &str, message: &str) -> Result<String> {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        bail!("WhatsApp number {:?} contains no digits", number);
    }
    Ok(format!(
        "https://wa.me/{}?text={}",
        digits,
        utf8_percent_encode(message, URI_COMPONENT)
    ))
}

pub fn quiz_report_message(results: &QuizResults, percentage: u32, suggested_agent: &str) -> String {
    let industry = results.industry.map(|i| i.label()).unwrap_or("Unknown");
    format!(
        "Hi! I just completed the Automation Readiness Quiz.\n\n\
         Company: {}\n\
         Industry: {}\n\
         Score: {}/100\n\
         Recommendation: {}\n\n\
         I'd like to learn more about how ParSec can help automate my business.",
        results.company_name, industry, percentage, suggested_agent
    )
}

pub fn quote_message(config: &AgentConfig) -> String {
    let industry = config.industry.map(|i| i.label()).unwrap_or("Not selected");
    let channels: Vec<&str> = config.channels().iter().map(|c| c.label()).collect();
    let skills: Vec<&str> = config.skills().iter().map(|s| s.label()).collect();
    format!(
        "Hi! I just configured my ideal AI Agent:\n\n\
         Industry: {}\n\
         Channels: {}\n\
         Skills: {}\n\
         Estimated Savings: {} hours/month\n\n\
         I'd like to get a quote for building this agent.",
        industry,
        channels.join(", "),
        skills.join(", "),
        config.estimated_savings()
    )
}

pub fn template_request_message(template: &WorkflowTemplate) -> String {
    format!(
        "Hi! I'd like to download the \"{}\" workflow template.\n\n\
         Please send me the JSON file and setup guide.",
        template.name
    )
}
