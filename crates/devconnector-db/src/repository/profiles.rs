//! Profile operations

use chrono::Utc;
use sqlx::Row;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{
    Education, Experience, NewEducation, NewExperience, Profile, ProfileFields, ProfileRecord,
};
use crate::repository::Database;
use crate::utils::DATE_FORMAT;

const PROFILE_SELECT: &str = r#"
    SELECT p.id, p.user_id, u.name AS user_name, u.avatar AS user_avatar,
           p.company, p.website, p.location, p.status, p.skills, p.bio,
           p.github_username, p.youtube, p.twitter, p.facebook, p.linkedin,
           p.instagram, p.created_at, p.updated_at
    FROM profiles p
    JOIN users u ON u.id = p.user_id
"#;

impl Database {
    // ==================== Profile Operations ====================

    async fn get_profile_record(&self, user_id: i64) -> Result<Option<ProfileRecord>, DbError> {
        let result = sqlx::query(&format!("{} WHERE p.user_id = ?", PROFILE_SELECT))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        result
            .map(|row| ProfileRecord::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Get the profile owned by a user
    pub async fn get_profile_by_user(&self, user_id: i64) -> Result<Option<Profile>, DbError> {
        match self.get_profile_record(user_id).await? {
            Some(record) => Ok(Some(self.populate(record).await?)),
            None => Ok(None),
        }
    }

    /// List all profiles, most recently created first
    pub async fn list_profiles(&self) -> Result<Vec<Profile>, DbError> {
        let rows = sqlx::query(&format!("{} ORDER BY p.id DESC", PROFILE_SELECT))
            .fetch_all(&self.pool)
            .await?;
        let records = rows
            .iter()
            .map(|row| ProfileRecord::try_from(row).map_err(DbError::from))
            .collect::<Result<Vec<_>, _>>()?;

        let mut experiences: HashMap<i64, Vec<Experience>> = HashMap::new();
        for row in sqlx::query("SELECT * FROM experiences ORDER BY seq DESC")
            .fetch_all(&self.pool)
            .await?
        {
            let profile_id: i64 = row.try_get("profile_id")?;
            experiences
                .entry(profile_id)
                .or_default()
                .push(Experience::try_from(&row)?);
        }

        let mut educations: HashMap<i64, Vec<Education>> = HashMap::new();
        for row in sqlx::query("SELECT * FROM educations ORDER BY seq DESC")
            .fetch_all(&self.pool)
            .await?
        {
            let profile_id: i64 = row.try_get("profile_id")?;
            educations
                .entry(profile_id)
                .or_default()
                .push(Education::try_from(&row)?);
        }

        Ok(records
            .into_iter()
            .map(|record| {
                let experience = experiences.remove(&record.id).unwrap_or_default();
                let education = educations.remove(&record.id).unwrap_or_default();
                record.into_profile(experience, education)
            })
            .collect())
    }

    /// Create the user's profile, or update it if one exists
    pub async fn upsert_profile(
        &self,
        user_id: i64,
        fields: ProfileFields,
    ) -> Result<Profile, DbError> {
        let now = Utc::now();

        let Some(mut record) = self.get_profile_record(user_id).await? else {
            let skills = encode_skills(&fields.skills)?;
            sqlx::query(
                r#"
                INSERT INTO profiles (user_id, company, website, location, status, skills, bio,
                                      github_username, youtube, twitter, facebook, linkedin,
                                      instagram, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(user_id)
            .bind(&fields.company)
            .bind(&fields.website)
            .bind(&fields.location)
            .bind(&fields.status)
            .bind(skills)
            .bind(&fields.bio)
            .bind(&fields.github_username)
            .bind(&fields.social.youtube)
            .bind(&fields.social.twitter)
            .bind(&fields.social.facebook)
            .bind(&fields.social.linkedin)
            .bind(&fields.social.instagram)
            .bind(now.to_rfc3339())
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from_insert(e, format!("Profile for user {}", user_id)))?;

            return self.require_profile(user_id).await;
        };

        record.merge(fields);
        sqlx::query(
            r#"
            UPDATE profiles
            SET company = ?, website = ?, location = ?, status = ?, skills = ?, bio = ?,
                github_username = ?, youtube = ?, twitter = ?, facebook = ?, linkedin = ?,
                instagram = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&record.company)
        .bind(&record.website)
        .bind(&record.location)
        .bind(&record.status)
        .bind(encode_skills(&record.skills)?)
        .bind(&record.bio)
        .bind(&record.github_username)
        .bind(&record.social.youtube)
        .bind(&record.social.twitter)
        .bind(&record.social.facebook)
        .bind(&record.social.linkedin)
        .bind(&record.social.instagram)
        .bind(now.to_rfc3339())
        .bind(record.id)
        .execute(&self.pool)
        .await?;

        self.require_profile(user_id).await
    }

    /// Prepend an experience entry to the user's profile
    pub async fn add_experience(
        &self,
        user_id: i64,
        experience: NewExperience,
    ) -> Result<Profile, DbError> {
        let profile_id = self.profile_id(user_id).await?;

        sqlx::query(
            r#"
            INSERT INTO experiences (id, profile_id, title, company, location, from_date,
                                     to_date, current, description)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(profile_id)
        .bind(&experience.title)
        .bind(&experience.company)
        .bind(&experience.location)
        .bind(experience.from.format(DATE_FORMAT).to_string())
        .bind(experience.to.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(experience.current)
        .bind(&experience.description)
        .execute(&self.pool)
        .await?;

        self.touch_profile(profile_id).await?;
        self.require_profile(user_id).await
    }

    /// Remove an experience entry; unknown ids leave the profile unchanged
    pub async fn remove_experience(&self, user_id: i64, experience_id: &str) -> Result<Profile, DbError> {
        let profile_id = self.profile_id(user_id).await?;

        let result = sqlx::query("DELETE FROM experiences WHERE id = ? AND profile_id = ?")
            .bind(experience_id)
            .bind(profile_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() > 0 {
            self.touch_profile(profile_id).await?;
        }

        self.require_profile(user_id).await
    }

    /// Prepend an education entry to the user's profile
    pub async fn add_education(
        &self,
        user_id: i64,
        education: NewEducation,
    ) -> Result<Profile, DbError> {
        let profile_id = self.profile_id(user_id).await?;

        sqlx::query(
            r#"
            INSERT INTO educations (id, profile_id, school, degree, field_of_study, from_date,
                                    to_date, current, description)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(profile_id)
        .bind(&education.school)
        .bind(&education.degree)
        .bind(&education.field_of_study)
        .bind(education.from.format(DATE_FORMAT).to_string())
        .bind(education.to.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(education.current)
        .bind(&education.description)
        .execute(&self.pool)
        .await?;

        self.touch_profile(profile_id).await?;
        self.require_profile(user_id).await
    }

    /// Remove an education entry; unknown ids leave the profile unchanged
    pub async fn remove_education(&self, user_id: i64, education_id: &str) -> Result<Profile, DbError> {
        let profile_id = self.profile_id(user_id).await?;

        let result = sqlx::query("DELETE FROM educations WHERE id = ? AND profile_id = ?")
            .bind(education_id)
            .bind(profile_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() > 0 {
            self.touch_profile(profile_id).await?;
        }

        self.require_profile(user_id).await
    }

    // ==================== Helpers ====================

    async fn profile_id(&self, user_id: i64) -> Result<i64, DbError> {
        let row = sqlx::query("SELECT id FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Profile for user {}", user_id)))?;
        Ok(row.try_get("id")?)
    }

    async fn touch_profile(&self, profile_id: i64) -> Result<(), DbError> {
        sqlx::query("UPDATE profiles SET updated_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(profile_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn require_profile(&self, user_id: i64) -> Result<Profile, DbError> {
        self.get_profile_by_user(user_id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Profile for user {}", user_id)))
    }

    async fn populate(&self, record: ProfileRecord) -> Result<Profile, DbError> {
        let experience = sqlx::query("SELECT * FROM experiences WHERE profile_id = ? ORDER BY seq DESC")
            .bind(record.id)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(Experience::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let education = sqlx::query("SELECT * FROM educations WHERE profile_id = ? ORDER BY seq DESC")
            .bind(record.id)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(Education::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(record.into_profile(experience, education))
    }
}

fn encode_skills(skills: &[String]) -> Result<String, DbError> {
    Ok(serde_json::to_string(skills)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Social};
    use chrono::NaiveDate;

    async fn setup() -> (Database, i64) {
        let db = Database::in_memory().await.unwrap();
        let user = db
            .insert_user(NewUser {
                name: "Jane".to_string(),
                email: "jane@example.com".to_string(),
                avatar: "avatar".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        (db, user.id)
    }

    fn fields(status: &str) -> ProfileFields {
        ProfileFields {
            company: Some("Acme".to_string()),
            status: status.to_string(),
            skills: vec!["rust".to_string(), "sql".to_string()],
            social: Social {
                twitter: Some("@jane".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn experience(title: &str) -> NewExperience {
        NewExperience {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: None,
            from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            to: None,
            current: true,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_update_profile() {
        let (db, user_id) = setup().await;

        let created = db.upsert_profile(user_id, fields("Developer")).await.unwrap();
        assert_eq!(created.user.id, user_id);
        assert_eq!(created.user.name, "Jane");
        assert_eq!(created.skills, vec!["rust", "sql"]);
        assert_eq!(created.social.twitter.as_deref(), Some("@jane"));

        let mut update = fields("Lead");
        update.company = None;
        update.social = Social::default();
        let updated = db.upsert_profile(user_id, update).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.status, "Lead");
        assert_eq!(updated.company.as_deref(), Some("Acme"));
        assert_eq!(updated.social, Social::default());
        assert_eq!(db.list_profiles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_experience_entries_are_prepended_and_removable() {
        let (db, user_id) = setup().await;
        db.upsert_profile(user_id, fields("Developer")).await.unwrap();

        db.add_experience(user_id, experience("First")).await.unwrap();
        let profile = db.add_experience(user_id, experience("Second")).await.unwrap();
        let titles: Vec<_> = profile.experience.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Second", "First"]);

        let second_id = profile.experience[0].id.clone();
        let profile = db.remove_experience(user_id, &second_id).await.unwrap();
        assert_eq!(profile.experience.len(), 1);
        assert_eq!(profile.experience[0].title, "First");

        let unchanged = db.remove_experience(user_id, "no-such-id").await.unwrap();
        assert_eq!(unchanged.experience.len(), 1);
    }

    #[tokio::test]
    async fn test_education_entries() {
        let (db, user_id) = setup().await;
        db.upsert_profile(user_id, fields("Developer")).await.unwrap();

        let profile = db
            .add_education(
                user_id,
                NewEducation {
                    school: "MIT".to_string(),
                    degree: "BSc".to_string(),
                    field_of_study: "CS".to_string(),
                    from: NaiveDate::from_ymd_opt(2010, 9, 1).unwrap(),
                    to: NaiveDate::from_ymd_opt(2014, 6, 1),
                    current: false,
                    description: Some("Graduated".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.education.len(), 1);
        assert_eq!(profile.education[0].to, NaiveDate::from_ymd_opt(2014, 6, 1));

        let id = profile.education[0].id.clone();
        let profile = db.remove_education(user_id, &id).await.unwrap();
        assert!(profile.education.is_empty());
    }

    #[tokio::test]
    async fn test_entries_require_a_profile() {
        let (db, user_id) = setup().await;

        let err = db.add_experience(user_id, experience("First")).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));

        let err = db.remove_education(user_id, "x").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_profiles_groups_entries() {
        let (db, jane) = setup().await;
        let john = db
            .insert_user(NewUser {
                name: "John".to_string(),
                email: "john@example.com".to_string(),
                avatar: "avatar".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
            .id;

        db.upsert_profile(jane, fields("Developer")).await.unwrap();
        db.upsert_profile(john, fields("Student")).await.unwrap();
        db.add_experience(jane, experience("Engineer")).await.unwrap();

        let profiles = db.list_profiles().await.unwrap();
        assert_eq!(profiles.len(), 2);

        let jane_profile = profiles.iter().find(|p| p.user.id == jane).unwrap();
        let john_profile = profiles.iter().find(|p| p.user.id == john).unwrap();
        assert_eq!(jane_profile.experience.len(), 1);
        assert!(john_profile.experience.is_empty());
    }

    #[tokio::test]
    async fn test_deleting_user_removes_profile_and_identity() {
        let (db, user_id) = setup().await;
        db.upsert_profile(user_id, fields("Developer")).await.unwrap();
        db.add_experience(user_id, experience("Engineer")).await.unwrap();

        assert!(db.delete_user(user_id).await.unwrap());

        assert!(db.get_user_by_id(user_id).await.unwrap().is_none());
        assert!(db.get_profile_by_user(user_id).await.unwrap().is_none());
        assert!(db.list_profiles().await.unwrap().is_empty());
    }
}
