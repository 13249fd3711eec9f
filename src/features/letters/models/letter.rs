use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Direction of a letter: received by the office or sent from it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "letter_type", rename_all = "lowercase")]
pub enum LetterType {
    Incoming,
    Outgoing,
}

impl std::str::FromStr for LetterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incoming" => Ok(LetterType::Incoming),
            "outgoing" => Ok(LetterType::Outgoing),
            other => Err(format!(
                "Letter type must be incoming or outgoing, got '{}'",
                other
            )),
        }
    }
}

/// Database model for a letter record
#[derive(Debug, Clone, FromRow)]
pub struct Letter {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    pub letter_type: LetterType,
    pub number: String,
    pub letter_date: NaiveDate,
    pub subject: String,
    pub sender_recipient: String,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub original_filename: Option<String>,
    pub category_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A letter row joined with its category name and creator name
#[derive(Debug, Clone, FromRow)]
pub struct LetterWithRelations {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    pub letter_type: LetterType,
    pub number: String,
    pub letter_date: NaiveDate,
    pub subject: String,
    pub sender_recipient: String,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub original_filename: Option<String>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub created_by: Uuid,
    pub creator_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
