use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// A chapter participant (prospect, visitor, member, alumni or declined)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    /// Unique identifier
    pub id: Uuid,

    /// Owning tenant (chapter)
    pub tenant_id: String,

    /// Full name in Thai
    pub full_name_th: String,

    /// Full name in English
    pub full_name_en: Option<String>,

    /// Nickname in Thai
    pub nickname_th: Option<String>,

    /// Nickname in English
    pub nickname_en: Option<String>,

    /// Company name
    pub company: Option<String>,

    /// Job title or role
    pub position: Option<String>,

    /// One-line business pitch
    pub tagline: Option<String>,

    /// Free-form admin notes
    pub notes: Option<String>,

    /// Phone number
    pub phone: Option<String>,

    /// Email address
    pub email: Option<String>,

    /// LINE user id
    pub line_id: Option<String>,

    /// Website or social link
    pub website: Option<String>,

    /// Free-text tags. `None` means the participant has no tag list at all.
    pub tags: Option<Vec<String>>,

    /// Lifecycle status
    pub status: ParticipantStatus,

    /// Business category reference
    pub business_type_code: Option<String>,

    /// Registration timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    /// Create a new participant
    pub fn new(
        tenant_id: impl Into<String>,
        full_name_th: impl Into<String>,
        status: ParticipantStatus,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            full_name_th: full_name_th.into(),
            full_name_en: None,
            nickname_th: None,
            nickname_en: None,
            company: None,
            position: None,
            tagline: None,
            notes: None,
            phone: None,
            email: None,
            line_id: None,
            website: None,
            tags: None,
            status,
            business_type_code: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Text fields covered by direct keyword matching
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.full_name_th.as_str()).chain(
            [
                &self.full_name_en,
                &self.nickname_th,
                &self.nickname_en,
                &self.phone,
                &self.company,
                &self.tagline,
                &self.notes,
            ]
            .into_iter()
            .filter_map(|field| field.as_deref()),
        )
    }

    /// Case-insensitive substring match against the searchable fields
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.searchable_fields()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Case-insensitive substring match against the tag list
    pub fn tag_matches(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.tags
            .as_ref()
            .map(|tags| tags.iter().any(|tag| tag.to_lowercase().contains(&needle)))
            .unwrap_or(false)
    }

    /// Whether the participant carries a tag list
    pub fn has_tags(&self) -> bool {
        self.tags.is_some()
    }

    /// Move to a new status. Participants are never deleted; leaving the
    /// chapter is expressed as `Alumni` or `Declined`.
    pub fn update_status(&mut self, new_status: ParticipantStatus) -> crate::error::Result<()> {
        if !self.status.can_transition_to(new_status) {
            return Err(crate::error::AppError::InvalidStateTransition(format!(
                "{} -> {}",
                self.status, new_status
            )));
        }

        self.status = new_status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replace the tag list, dropping blank entries and case-insensitive
    /// duplicates (first spelling wins)
    pub fn set_tags(&mut self, tags: Vec<String>) {
        let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.trim().to_string();
            let lowered = tag.to_lowercase();
            if !tag.is_empty() && !cleaned.iter().any(|c| c.to_lowercase() == lowered) {
                cleaned.push(tag);
            }
        }

        self.tags = Some(cleaned);
        self.updated_at = Utc::now();
    }
}

/// Participant lifecycle status
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ParticipantStatus {
    Prospect,
    Visitor,
    Member,
    Alumni,
    Declined,
}

impl ParticipantStatus {
    /// Statuses shown by default in directory searches
    pub fn visible() -> Vec<ParticipantStatus> {
        vec![ParticipantStatus::Member, ParticipantStatus::Visitor]
    }

    /// Check whether a soft status transition is allowed
    pub fn can_transition_to(self, next: ParticipantStatus) -> bool {
        use ParticipantStatus::*;

        matches!(
            (self, next),
            (Prospect, Visitor)
                | (Prospect, Member)
                | (Prospect, Declined)
                | (Visitor, Prospect)
                | (Visitor, Member)
                | (Visitor, Declined)
                | (Member, Alumni)
                | (Alumni, Member)
                | (Declined, Prospect)
                | (Declined, Visitor)
        )
    }

    /// Parse a comma separated list such as `member,visitor`
    pub fn parse_list(raw: &str) -> Result<Vec<ParticipantStatus>, strum::ParseError> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}
