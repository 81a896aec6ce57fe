use serde::{Deserialize, Serialize};

/// Body of `GET /api/v3/profile`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub s: Option<String>,
    #[serde(default)]
    pub data: Option<Profile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
    pub email_id: Option<String>,
    pub fy_id: Option<String>,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("-")
    }

    pub fn display_email(&self) -> &str {
        self.email_id.as_deref().unwrap_or("-")
    }
}
