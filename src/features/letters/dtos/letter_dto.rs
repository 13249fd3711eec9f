use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::letters::models::{LetterType, LetterWithRelations};
use crate::shared::constants::{ALLOWED_MIME_TYPE, MAX_FILE_SIZE};

/// Treat `?search=` the same as an absent parameter
fn empty_string_as_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(de)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}

/// Parse a typed filter value, treating an empty parameter (`?type=`) as
/// absent. Filter forms submit every control, filled or not.
fn empty_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Filters applied to the letter listing. The applied values are echoed back
/// in the list response so the caller can re-render its filter controls.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
pub struct LetterFilter {
    /// Restrict to incoming or outgoing letters
    #[serde(rename = "type", default, deserialize_with = "empty_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_type: Option<LetterType>,
    /// Restrict to a category
    #[serde(default, deserialize_with = "empty_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    /// Substring match against number, subject, or sender/recipient
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Inclusive lower bound on letter_date
    #[serde(default, deserialize_with = "empty_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on letter_date
    #[serde(default, deserialize_with = "empty_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

/// Category reference embedded in letter responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryRefDto {
    pub id: Uuid,
    pub name: String,
}

/// Creator reference embedded in letter responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatorRefDto {
    pub id: Uuid,
    pub name: String,
}

/// Response DTO for a letter
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LetterResponseDto {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub letter_type: LetterType,
    pub number: String,
    pub letter_date: NaiveDate,
    pub subject: String,
    pub sender_recipient: String,
    pub description: Option<String>,
    /// Whether a PDF attachment is stored for this letter
    pub has_file: bool,
    pub original_filename: Option<String>,
    pub category: Option<CategoryRefDto>,
    pub creator: CreatorRefDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LetterWithRelations> for LetterResponseDto {
    fn from(l: LetterWithRelations) -> Self {
        Self {
            id: l.id,
            letter_type: l.letter_type,
            number: l.number,
            letter_date: l.letter_date,
            subject: l.subject,
            sender_recipient: l.sender_recipient,
            description: l.description,
            has_file: l.file_path.is_some(),
            original_filename: l.original_filename,
            category: match (l.category_id, l.category_name) {
                (Some(id), Some(name)) => Some(CategoryRefDto { id, name }),
                _ => None,
            },
            creator: CreatorRefDto {
                id: l.created_by,
                name: l.creator_name,
            },
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

/// Data payload of the letter listing: rows plus the echoed filters
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LetterListResponseDto {
    pub letters: Vec<LetterResponseDto>,
    pub filters: LetterFilter,
}

/// An uploaded attachment as read from the multipart stream
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub data: Vec<u8>,
    pub original_filename: String,
    pub content_type: String,
}

/// Raw letter fields as read from the multipart form, before validation
#[derive(Debug, Clone, Default)]
pub struct LetterForm {
    pub letter_type: Option<String>,
    pub number: Option<String>,
    pub letter_date: Option<String>,
    pub subject: Option<String>,
    pub sender_recipient: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub file: Option<UploadedFile>,
}

/// Letter fields that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedLetter {
    pub letter_type: LetterType,
    pub number: String,
    pub letter_date: NaiveDate,
    pub subject: String,
    pub sender_recipient: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub file: Option<UploadedFile>,
}

impl LetterForm {
    /// Validate the form fields and the attachment constraints.
    ///
    /// Field checks mirror the archive's contract: type/number/letter_date/
    /// subject/sender_recipient required, strings capped at 255 characters,
    /// attachment must be a PDF of at most 10MB. Uniqueness of `number` is a
    /// database concern and is checked by the service.
    pub fn validate(self) -> Result<ValidatedLetter, Vec<String>> {
        let mut errors = Vec::new();

        let letter_type = match self.letter_type.as_deref() {
            None | Some("") => {
                errors.push("Letter type is required".to_string());
                None
            }
            Some(raw) => match raw.parse::<LetterType>() {
                Ok(t) => Some(t),
                Err(e) => {
                    errors.push(e);
                    None
                }
            },
        };

        let number = match self.number.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("Letter number is required".to_string());
                None
            }
            Some(n) if n.len() > 255 => {
                errors.push("Letter number must not exceed 255 characters".to_string());
                None
            }
            Some(n) => Some(n.to_string()),
        };

        let letter_date = match self.letter_date.as_deref() {
            None | Some("") => {
                errors.push("Letter date is required".to_string());
                None
            }
            Some(raw) => match raw.parse::<NaiveDate>() {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.push("Letter date must be a valid date (YYYY-MM-DD)".to_string());
                    None
                }
            },
        };

        let subject = match self.subject.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("Subject is required".to_string());
                None
            }
            Some(s) if s.len() > 255 => {
                errors.push("Subject must not exceed 255 characters".to_string());
                None
            }
            Some(s) => Some(s.to_string()),
        };

        let sender_recipient = match self.sender_recipient.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("Sender/recipient is required".to_string());
                None
            }
            Some(s) if s.len() > 255 => {
                errors.push("Sender/recipient must not exceed 255 characters".to_string());
                None
            }
            Some(s) => Some(s.to_string()),
        };

        let category_id = match self.category_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<Uuid>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.push("Selected category is invalid".to_string());
                    None
                }
            },
        };

        if let Some(file) = &self.file {
            if file.content_type != ALLOWED_MIME_TYPE {
                errors.push("Attachment must be a PDF file".to_string());
            }
            if file.data.len() > MAX_FILE_SIZE {
                errors.push("Attachment must not exceed 10MB".to_string());
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedLetter {
            letter_type: letter_type.unwrap(),
            number: number.unwrap(),
            letter_date: letter_date.unwrap(),
            subject: subject.unwrap(),
            sender_recipient: sender_recipient.unwrap(),
            description: self.description.filter(|d| !d.trim().is_empty()),
            category_id,
            file: self.file,
        })
    }
}

/// Multipart letter form for OpenAPI documentation.
/// The actual handlers read the multipart stream directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct LetterMultipartDto {
    /// "incoming" or "outgoing"
    #[schema(example = "incoming")]
    pub r#type: String,
    /// Letter number/reference, unique across the archive
    #[schema(example = "005/SK/VIII/2026")]
    pub number: String,
    /// Date of the letter (YYYY-MM-DD)
    #[schema(example = "2026-08-17")]
    pub letter_date: String,
    pub subject: String,
    /// Sender for incoming letters, recipient for outgoing letters
    pub sender_recipient: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    /// PDF attachment, at most 10MB
    #[schema(format = Binary, content_media_type = "application/pdf")]
    pub file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> LetterForm {
        LetterForm {
            letter_type: Some("incoming".to_string()),
            number: Some("005/SK/VIII/2026".to_string()),
            letter_date: Some("2026-08-17".to_string()),
            subject: Some("Undangan Rapat Koordinasi".to_string()),
            sender_recipient: Some("Dinas Pendidikan".to_string()),
            description: None,
            category_id: None,
            file: None,
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let v = valid_form().validate().unwrap();
        assert_eq!(v.letter_type, LetterType::Incoming);
        assert_eq!(v.number, "005/SK/VIII/2026");
        assert_eq!(v.letter_date, NaiveDate::from_ymd_opt(2026, 8, 17).unwrap());
    }

    #[test]
    fn test_missing_required_fields_collects_all_errors() {
        let errors = LetterForm::default().validate().unwrap_err();
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_invalid_type_rejected() {
        let mut form = valid_form();
        form.letter_type = Some("memo".to_string());
        let errors = form.validate().unwrap_err();
        assert!(errors[0].contains("incoming or outgoing"));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let mut form = valid_form();
        form.letter_date = Some("17-08-2026".to_string());
        let errors = form.validate().unwrap_err();
        assert!(errors[0].contains("valid date"));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let mut form = valid_form();
        form.file = Some(UploadedFile {
            data: vec![0u8; MAX_FILE_SIZE + 1],
            original_filename: "big.pdf".to_string(),
            content_type: "application/pdf".to_string(),
        });
        let errors = form.validate().unwrap_err();
        assert!(errors[0].contains("10MB"));
    }

    #[test]
    fn test_non_pdf_file_rejected() {
        let mut form = valid_form();
        form.file = Some(UploadedFile {
            data: b"GIF89a".to_vec(),
            original_filename: "scan.gif".to_string(),
            content_type: "image/gif".to_string(),
        });
        let errors = form.validate().unwrap_err();
        assert!(errors[0].contains("PDF"));
    }

    #[test]
    fn test_blank_filter_values_treated_as_absent() {
        let filter: LetterFilter = serde_json::from_str(
            r#"{"type":"","category_id":"","search":"  ","date_from":"","date_to":""}"#,
        )
        .unwrap();
        assert!(filter.letter_type.is_none());
        assert!(filter.category_id.is_none());
        assert!(filter.search.is_none());
        assert!(filter.date_from.is_none());
        assert!(filter.date_to.is_none());
    }

    #[test]
    fn test_filter_values_parse_from_strings() {
        let filter: LetterFilter =
            serde_json::from_str(r#"{"type":"outgoing","date_from":"2026-01-01"}"#).unwrap();
        assert_eq!(filter.letter_type, Some(LetterType::Outgoing));
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2026, 1, 1));
    }

    #[test]
    fn test_blank_description_becomes_none() {
        let mut form = valid_form();
        form.description = Some("   ".to_string());
        let v = form.validate().unwrap();
        assert!(v.description.is_none());
    }
}
