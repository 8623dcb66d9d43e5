//! Request/Response DTOs
//!
//! Request fields are optional at the serde level so that missing fields
//! surface as validation errors rather than JSON rejections.

use serde::{Deserialize, Serialize};

// ==================== Auth Types ====================

/// Registration request
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Password change request
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Token response
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Plain message response
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ==================== Profile Types ====================

/// Skills as either a comma-separated string or a list
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum SkillsInput {
    Csv(String),
    List(Vec<String>),
}

impl SkillsInput {
    /// Split, trim and drop blank entries
    pub fn into_skills(self) -> Vec<String> {
        let items: Vec<String> = match self {
            SkillsInput::Csv(csv) => csv.split(',').map(str::to_string).collect(),
            SkillsInput::List(list) => list,
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Create or update profile request
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ProfileRequest {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Option<SkillsInput>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

/// Add experience request
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

/// Add education request
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct EducationRequest {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub fieldofstudy: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skills_from_csv() {
        let request: ProfileRequest =
            serde_json::from_str(r#"{"skills": "rust, go ,, sql "}"#).unwrap();
        assert_eq!(
            request.skills.unwrap().into_skills(),
            vec!["rust", "go", "sql"]
        );
    }

    #[test]
    fn test_skills_from_list() {
        let request: ProfileRequest =
            serde_json::from_str(r#"{"skills": [" rust", ""]}"#).unwrap();
        assert_eq!(request.skills.unwrap().into_skills(), vec!["rust"]);
    }

    #[test]
    fn test_missing_fields_deserialize() {
        let request: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert!(request.name.is_none() && request.email.is_none() && request.password.is_none());
    }
}
