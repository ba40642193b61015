use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ingredient classification. Only `alcoholic` ingredients may carry a
/// non-zero alcohol content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Alcoholic,
    Soda,
    Juice,
    Garnish,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::Alcoholic,
        Classification::Soda,
        Classification::Juice,
        Classification::Garnish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Alcoholic => "alcoholic",
            Classification::Soda => "soda",
            Classification::Juice => "juice",
            Classification::Garnish => "garnish",
        }
    }

    pub fn is_alcoholic(&self) -> bool {
        matches!(self, Classification::Alcoholic)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Classification::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown classification '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub origin: Option<String>,
    pub classification: Classification,
    pub alcohol_content: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new ingredient. Construct through [`NewIngredient::new`]
/// so the classification rule is always applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIngredient {
    pub name: String,
    pub kind: Option<String>,
    pub origin: Option<String>,
    pub classification: Classification,
    pub alcohol_content: f64,
}

impl NewIngredient {
    pub fn new(
        name: impl Into<String>,
        kind: Option<String>,
        origin: Option<String>,
        classification: Classification,
        alcohol_content: Option<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            origin,
            classification,
            alcohol_content: effective_alcohol_content(classification, alcohol_content),
        }
    }

    pub fn into_ingredient(self, id: i64, now: DateTime<Utc>) -> Ingredient {
        Ingredient {
            id,
            name: self.name,
            kind: self.kind,
            origin: self.origin,
            classification: self.classification,
            alcohol_content: self.alcohol_content,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. Outer `None` leaves a field untouched; for nullable
/// fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientChanges {
    pub name: Option<String>,
    pub kind: Option<Option<String>>,
    pub origin: Option<Option<String>>,
    pub classification: Option<Classification>,
    pub alcohol_content: Option<Option<f64>>,
}

impl Ingredient {
    /// Merge `changes` into this ingredient, re-applying the classification rule
    /// against the resulting classification.
    pub fn apply(&mut self, changes: IngredientChanges, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(kind) = changes.kind {
            self.kind = kind;
        }
        if let Some(origin) = changes.origin {
            self.origin = origin;
        }
        if let Some(classification) = changes.classification {
            self.classification = classification;
        }

        self.alcohol_content = if !self.classification.is_alcoholic() {
            0.0
        } else {
            match changes.alcohol_content {
                Some(requested) => requested.unwrap_or(0.0),
                None => self.alcohol_content,
            }
        };
        self.updated_at = now;
    }
}

/// Non-alcoholic classifications always store zero; a missing value defaults to zero.
pub fn effective_alcohol_content(classification: Classification, requested: Option<f64>) -> f64 {
    if classification.is_alcoholic() {
        requested.unwrap_or(0.0)
    } else {
        0.0
    }
}
