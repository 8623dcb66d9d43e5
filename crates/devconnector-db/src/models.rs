//! Database models

use crate::utils::{decode_date, decode_datetime};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;

// ==================== Users ====================

/// User identity model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub avatar: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub password_hash: String,
}

/// Public view of a user, embedded in profiles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub avatar: String,
}

// ==================== Profiles ====================

/// Social network links of a profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Social {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

/// Work experience entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Experience {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

/// New experience entry (for insertion)
#[derive(Debug, Clone)]
pub struct NewExperience {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

/// Education entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Education {
    pub id: String,
    pub school: String,
    pub degree: String,
    #[serde(rename = "fieldofstudy")]
    pub field_of_study: String,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

/// New education entry (for insertion)
#[derive(Debug, Clone)]
pub struct NewEducation {
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

/// Developer profile with its owner and nested entries populated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub user: UserSummary,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    #[serde(rename = "githubusername")]
    pub github_username: Option<String>,
    pub social: Social,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating or updating a profile
///
/// `None` keeps the stored value on update. The social block is always
/// replaced as a whole.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub github_username: Option<String>,
    pub social: Social,
}

/// Flat profile row, before the owner and nested entries are attached
#[derive(Debug, Clone)]
pub(crate) struct ProfileRecord {
    pub id: i64,
    pub user: UserSummary,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub github_username: Option<String>,
    pub social: Social,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRecord {
    /// Apply an update on top of the stored values
    pub(crate) fn merge(&mut self, fields: ProfileFields) {
        fn keep(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }

        keep(&mut self.company, fields.company);
        keep(&mut self.website, fields.website);
        keep(&mut self.location, fields.location);
        keep(&mut self.bio, fields.bio);
        keep(&mut self.github_username, fields.github_username);
        self.status = fields.status;
        self.skills = fields.skills;
        self.social = fields.social;
    }

    pub(crate) fn into_profile(
        self,
        experience: Vec<Experience>,
        education: Vec<Education>,
    ) -> Profile {
        Profile {
            id: self.id,
            user: self.user,
            company: self.company,
            website: self.website,
            location: self.location,
            status: self.status,
            skills: self.skills,
            bio: self.bio,
            github_username: self.github_username,
            social: self.social,
            experience,
            education,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            avatar: row.try_get("avatar")?,
            password_hash: row.try_get("password_hash")?,
            created_at: decode_datetime(&row.try_get::<String, _>("created_at")?)?,
            updated_at: decode_datetime(&row.try_get::<String, _>("updated_at")?)?,
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for ProfileRecord {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let skills: String = row.try_get("skills")?;
        let skills: Vec<String> =
            serde_json::from_str(&skills).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(ProfileRecord {
            id: row.try_get("id")?,
            user: UserSummary {
                id: row.try_get("user_id")?,
                name: row.try_get("user_name")?,
                avatar: row.try_get("user_avatar")?,
            },
            company: row.try_get("company")?,
            website: row.try_get("website")?,
            location: row.try_get("location")?,
            status: row.try_get("status")?,
            skills,
            bio: row.try_get("bio")?,
            github_username: row.try_get("github_username")?,
            social: Social {
                youtube: row.try_get("youtube")?,
                twitter: row.try_get("twitter")?,
                facebook: row.try_get("facebook")?,
                linkedin: row.try_get("linkedin")?,
                instagram: row.try_get("instagram")?,
            },
            created_at: decode_datetime(&row.try_get::<String, _>("created_at")?)?,
            updated_at: decode_datetime(&row.try_get::<String, _>("updated_at")?)?,
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Experience {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Experience {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            company: row.try_get("company")?,
            location: row.try_get("location")?,
            from: decode_date(&row.try_get::<String, _>("from_date")?)?,
            to: row
                .try_get::<Option<String>, _>("to_date")?
                .map(|s| decode_date(&s))
                .transpose()?,
            current: row.try_get("current")?,
            description: row.try_get("description")?,
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Education {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Education {
            id: row.try_get("id")?,
            school: row.try_get("school")?,
            degree: row.try_get("degree")?,
            field_of_study: row.try_get("field_of_study")?,
            from: decode_date(&row.try_get::<String, _>("from_date")?)?,
            to: row
                .try_get::<Option<String>, _>("to_date")?
                .map(|s| decode_date(&s))
                .transpose()?,
            current: row.try_get("current")?,
            description: row.try_get("description")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProfileRecord {
        ProfileRecord {
            id: 1,
            user: UserSummary {
                id: 7,
                name: "Jane".to_string(),
                avatar: "avatar".to_string(),
            },
            company: Some("Acme".to_string()),
            website: Some("https://acme.dev".to_string()),
            location: None,
            status: "Developer".to_string(),
            skills: vec!["rust".to_string()],
            bio: Some("hello".to_string()),
            github_username: None,
            social: Social {
                twitter: Some("@jane".to_string()),
                ..Default::default()
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_keeps_omitted_fields() {
        let mut profile = record();
        profile.merge(ProfileFields {
            location: Some("Berlin".to_string()),
            status: "Senior Developer".to_string(),
            skills: vec!["rust".to_string(), "sql".to_string()],
            ..Default::default()
        });

        assert_eq!(profile.company.as_deref(), Some("Acme"));
        assert_eq!(profile.website.as_deref(), Some("https://acme.dev"));
        assert_eq!(profile.location.as_deref(), Some("Berlin"));
        assert_eq!(profile.bio.as_deref(), Some("hello"));
        assert_eq!(profile.status, "Senior Developer");
        assert_eq!(profile.skills, vec!["rust", "sql"]);
    }

    #[test]
    fn test_merge_replaces_social_block() {
        let mut profile = record();
        profile.merge(ProfileFields {
            status: "Developer".to_string(),
            skills: vec!["rust".to_string()],
            social: Social {
                youtube: Some("yt".to_string()),
                ..Default::default()
            },
            ..Default::default()
        });

        assert_eq!(profile.social.twitter, None);
        assert_eq!(profile.social.youtube.as_deref(), Some("yt"));
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: 1,
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            avatar: "avatar".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@x.com");
    }

    #[test]
    fn test_education_field_of_study_wire_name() {
        let education = Education {
            id: "e1".to_string(),
            school: "MIT".to_string(),
            degree: "BSc".to_string(),
            field_of_study: "CS".to_string(),
            from: NaiveDate::from_ymd_opt(2010, 9, 1).unwrap(),
            to: None,
            current: true,
            description: None,
        };

        let json = serde_json::to_value(&education).unwrap();
        assert_eq!(json["fieldofstudy"], "CS");
        assert_eq!(json["from"], "2010-09-01");
    }
}
