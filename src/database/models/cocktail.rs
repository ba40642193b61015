use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ingredient::Ingredient;
use crate::services::alcohol::{calculate_alcohol_content, Pour};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cocktail {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One (ingredient, volume) pairing requested for a cocktail
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub ingredient_id: i64,
    pub measure_ml: f64,
}

impl Measure {
    /// Largest accepted pour, in millilitres
    pub const MAX_ML: f64 = 100_000.0;
}

/// Association row between a cocktail and one of its ingredients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub cocktail_id: i64,
    pub ingredient_id: i64,
    pub measure_ml: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CocktailIngredient {
    #[serde(flatten)]
    pub ingredient: Ingredient,
    pub pivot: Pivot,
}

/// A cocktail with its full association set loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CocktailDetail {
    #[serde(flatten)]
    pub cocktail: Cocktail,
    pub ingredients: Vec<CocktailIngredient>,
}

impl CocktailDetail {
    pub fn id(&self) -> i64 {
        self.cocktail.id
    }

    pub fn name(&self) -> &str {
        &self.cocktail.name
    }

    pub fn pours(&self) -> Vec<Pour> {
        self.ingredients
            .iter()
            .map(|item| Pour {
                alcohol_content: item.ingredient.alcohol_content,
                measure_ml: item.pivot.measure_ml,
            })
            .collect()
    }

    pub fn alcohol_content(&self) -> f64 {
        calculate_alcohol_content(&self.pours())
    }

    pub fn contains_ingredient(&self, ingredient_id: i64) -> bool {
        self.ingredients.iter().any(|item| item.ingredient.id == ingredient_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCocktail {
    pub name: String,
    pub description: Option<String>,
    pub ingredients: Vec<Measure>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CocktailChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    /// `Some` replaces the whole association set
    pub ingredients: Option<Vec<Measure>>,
}

impl Cocktail {
    pub fn apply(&mut self, changes: &CocktailChanges, now: DateTime<Utc>) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        self.updated_at = now;
    }
}

/// Difference between the stored association set and the requested one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    pub detach: Vec<i64>,
    pub attach: Vec<Measure>,
    pub update: Vec<Measure>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.detach.is_empty() && self.attach.is_empty() && self.update.is_empty()
    }

    /// Rows to write after the detach step
    pub fn upserts(&self) -> impl Iterator<Item = &Measure> {
        self.attach.iter().chain(self.update.iter())
    }
}

/// Plan a full replacement of `current` by `desired`. Ingredient ids in
/// `desired` are expected to be unique.
pub fn plan_sync(current: &[Measure], desired: &[Measure]) -> SyncPlan {
    let existing: HashMap<i64, f64> = current.iter().map(|m| (m.ingredient_id, m.measure_ml)).collect();
    let wanted: HashMap<i64, f64> = desired.iter().map(|m| (m.ingredient_id, m.measure_ml)).collect();

    let mut plan = SyncPlan::default();
    for measure in current {
        if !wanted.contains_key(&measure.ingredient_id) {
            plan.detach.push(measure.ingredient_id);
        }
    }
    for measure in desired {
        match existing.get(&measure.ingredient_id) {
            None => plan.attach.push(*measure),
            Some(old) if *old != measure.measure_ml => plan.update.push(*measure),
            Some(_) => {}
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(ingredient_id: i64, measure_ml: f64) -> Measure {
        Measure { ingredient_id, measure_ml }
    }

    #[test]
    fn sync_detaches_missing_and_attaches_new() {
        let plan = plan_sync(&[m(1, 50.0), m(2, 100.0)], &[m(2, 100.0), m(3, 20.0)]);
        assert_eq!(plan.detach, vec![1]);
        assert_eq!(plan.attach, vec![m(3, 20.0)]);
        assert!(plan.update.is_empty());
    }

    #[test]
    fn sync_updates_changed_measures_only() {
        let plan = plan_sync(&[m(1, 50.0), m(2, 100.0)], &[m(1, 60.0), m(2, 100.0)]);
        assert!(plan.detach.is_empty());
        assert!(plan.attach.is_empty());
        assert_eq!(plan.update, vec![m(1, 60.0)]);
        assert_eq!(plan.upserts().count(), 1);
    }

    #[test]
    fn sync_to_empty_detaches_everything() {
        let plan = plan_sync(&[m(1, 50.0), m(2, 100.0)], &[]);
        assert_eq!(plan.detach, vec![1, 2]);
        assert_eq!(plan.upserts().count(), 0);
    }

    #[test]
    fn identical_sets_produce_empty_plan() {
        assert!(plan_sync(&[m(4, 10.0)], &[m(4, 10.0)]).is_empty());
    }
}
