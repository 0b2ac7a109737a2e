use serde::{Deserialize, Serialize};
use validator::Validate;

/// Business category reference entry with bilingual display names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct BusinessCategory {
    /// Stable category code referenced by `Participant::business_type_code`
    #[validate(length(min = 1, max = 64))]
    pub category_code: String,

    /// Display name in Thai
    #[validate(length(min = 1, max = 255))]
    pub name_th: String,

    /// Display name in English
    #[validate(length(min = 1, max = 255))]
    pub name_en: String,
}

impl BusinessCategory {
    pub fn new(
        category_code: impl Into<String>,
        name_th: impl Into<String>,
        name_en: impl Into<String>,
    ) -> Self {
        Self {
            category_code: category_code.into(),
            name_th: name_th.into(),
            name_en: name_en.into(),
        }
    }

    /// Case-insensitive substring match on either display name
    pub fn matches_name(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.name_th.to_lowercase().contains(&needle)
            || self.name_en.to_lowercase().contains(&needle)
    }
}
