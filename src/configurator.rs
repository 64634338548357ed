use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::quiz::Industry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    Whatsapp,
    Voice,
    Email,
    Telegram,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Whatsapp, Channel::Voice, Channel::Email, Channel::Telegram];

    pub fn key(&self) -> &'static str {
        match self {
            Channel::Whatsapp => "whatsapp",
            Channel::Voice => "voice",
            Channel::Email => "email",
            Channel::Telegram => "telegram",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Channel::Whatsapp => "WhatsApp",
            Channel::Voice => "Voice Calls",
            Channel::Email => "Email",
            Channel::Telegram => "Telegram",
        }
    }

    /// Hours per week an agent on this channel takes off the team.
    pub fn weekly_hours(&self) -> u32 {
        match self {
            Channel::Whatsapp => 15,
            Channel::Voice => 25,
            Channel::Email => 10,
            Channel::Telegram => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Skill {
    LeadQualification,
    Booking,
    Support,
    Payments,
    Reminders,
    DataEntry,
}

impl Skill {
    pub const ALL: [Skill; 6] = [
        Skill::LeadQualification,
        Skill::Booking,
        Skill::Support,
        Skill::Payments,
        Skill::Reminders,
        Skill::DataEntry,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Skill::LeadQualification => "lead-qualification",
            Skill::Booking => "booking",
            Skill::Support => "support",
            Skill::Payments => "payments",
            Skill::Reminders => "reminders",
            Skill::DataEntry => "data-entry",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Skill::LeadQualification => "Lead Qualification",
            Skill::Booking => "Appointment Booking",
            Skill::Support => "Customer Support",
            Skill::Payments => "Payment Processing",
            Skill::Reminders => "Reminders",
            Skill::DataEntry => "Data Entry",
        }
    }

    pub fn weekly_hours(&self) -> u32 {
        match self {
            Skill::LeadQualification => 20,
            Skill::Booking => 15,
            Skill::Support => 18,
            Skill::Payments => 25,
            Skill::Reminders => 8,
            Skill::DataEntry => 22,
        }
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Channel::ALL
            .into_iter()
            .find(|c| c.key() == wanted)
            .ok_or_else(|| format!("unknown channel `{}` (expected one of: whatsapp, voice, email, telegram)", s))
    }
}

impl FromStr for Skill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Skill::ALL
            .into_iter()
            .find(|k| k.key() == wanted)
            .ok_or_else(|| format!("unknown skill `{}`", s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub industry: Option<Industry>,
    channels: Vec<Channel>,
    skills: Vec<Skill>,
    estimated_savings: u32,
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// Monthly hours saved for the current selection.
    pub fn estimated_savings(&self) -> u32 {
        self.estimated_savings
    }

    pub fn set_industry(&mut self, industry: Industry) {
        self.industry = Some(industry);
    }

    /// Adds the channel at the end, or removes it if already selected.
    pub fn toggle_channel(&mut self, channel: Channel) {
        toggle(&mut self.channels, channel);
        self.recompute();
    }

    pub fn toggle_skill(&mut self, skill: Skill) {
        toggle(&mut self.skills, skill);
        self.recompute();
    }

    /// Applies one round of edits: replace the industry if given, then toggle each
    /// listed channel and skill once, however often it is repeated.
    pub fn apply(&mut self, industry: Option<Industry>, channels: &[Channel], skills: &[Skill]) {
        if let Some(industry) = industry {
            self.set_industry(industry);
        }
        for channel in unique(channels) {
            self.toggle_channel(channel);
        }
        for skill in unique(skills) {
            self.toggle_skill(skill);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn recompute(&mut self) {
        let weekly: u32 = self.channels.iter().map(Channel::weekly_hours).sum::<u32>()
            + self.skills.iter().map(Skill::weekly_hours).sum::<u32>();
        self.estimated_savings = weekly * 4;
    }
}

fn unique<T: Copy + PartialEq>(items: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for &item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn toggle<T: PartialEq>(items: &mut Vec<T>, item: T) {
    match items.iter().position(|x| *x == item) {
        Some(idx) => {
            items.remove(idx);
        }
        None => items.push(item),
    }
}
