use serde::{Deserialize, Serialize};

/// Details a visitor leaves so the team can follow up. Kept locally between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContact {
    pub name: String,
    pub whatsapp: String,
    pub email: String,
    pub submitted: bool,
}

/// Fields to overwrite; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LeadError {
    #[error("a WhatsApp number is required")]
    MissingWhatsApp,
}

impl UserContact {
    /// Blank or whitespace-only values are ignored.
    pub fn update(&mut self, update: ContactUpdate) {
        let fields = [
            (update.name, &mut self.name),
            (update.whatsapp, &mut self.whatsapp),
            (update.email, &mut self.email),
        ];
        for (value, slot) in fields {
            if let Some(v) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                *slot = v;
            }
        }
    }

    pub fn has_whatsapp(&self) -> bool {
        self.whatsapp.chars().any(|c| c.is_ascii_digit())
    }

    pub fn submit(&mut self) -> Result<(), LeadError> {
        if !self.has_whatsapp() {
            return Err(LeadError::MissingWhatsApp);
        }
        self.submitted = true;
        Ok(())
    }
}
