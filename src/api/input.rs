//! Request body parsing and validation.
//!
//! Bodies arrive as untyped JSON so that handlers can authorize before they
//! look at the payload. Each parser walks the object field by field, collects
//! every problem it finds, and reports them together as one 422.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::database::models::{Classification, CocktailChanges, IngredientChanges, Measure, NewCocktail, NewIngredient};
use crate::error::ApiError;

const MAX_STRING: usize = 255;

/// Collects per-field problems while reading a JSON object
struct Fields<'a> {
    body: &'a Map<String, Value>,
    errors: Vec<(String, String)>,
}

impl<'a> Fields<'a> {
    fn new(body: &'a Value) -> Result<Self, ApiError> {
        match body {
            Value::Object(body) => Ok(Self { body, errors: vec![] }),
            _ => Err(ApiError::bad_request("Request body must be a JSON object")),
        }
    }

    fn fail(&mut self, field: impl Into<String>, problem: impl Into<String>) {
        let field = field.into();
        if !self.errors.iter().any(|(f, _)| *f == field) {
            self.errors.push((field, problem.into()));
        }
    }

    fn present(&self, field: &str) -> bool {
        self.body.contains_key(field)
    }

    fn string_value(&mut self, field: &str, value: &Value, max: Option<usize>) -> Option<String> {
        let Some(s) = value.as_str() else {
            self.fail(field, format!("The {} field must be a string.", field));
            return None;
        };
        if let Some(max) = max {
            if s.chars().count() > max {
                self.fail(field, format!("The {} field must not be greater than {} characters.", field, max));
                return None;
            }
        }
        Some(s.to_string())
    }

    /// Present, non-null, non-blank string
    fn required_string(&mut self, field: &str, max: Option<usize>) -> Option<String> {
        match self.body.get(field) {
            None | Some(Value::Null) => {
                self.fail(field, format!("The {} field is required.", field));
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.fail(field, format!("The {} field is required.", field));
                None
            }
            Some(value) => self.string_value(field, value, max),
        }
    }

    /// Validated only when the key is present
    fn sometimes_string(&mut self, field: &str, max: Option<usize>) -> Option<String> {
        if self.present(field) {
            self.required_string(field, max)
        } else {
            None
        }
    }

    /// Outer `None` when absent, inner `None` for an explicit null
    fn nullable_string(&mut self, field: &str, max: Option<usize>) -> Option<Option<String>> {
        match self.body.get(field) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(value) => self.string_value(field, value, max).map(Some),
        }
    }

    fn classification(&mut self, required: bool) -> Option<Classification> {
        const FIELD: &str = "classification";
        match self.body.get(FIELD) {
            None if !required => None,
            None | Some(Value::Null) => {
                self.fail(FIELD, "The classification field is required.");
                None
            }
            Some(value) => match value.as_str().map(str::parse::<Classification>) {
                Some(Ok(classification)) => Some(classification),
                _ => {
                    self.fail(FIELD, "The selected classification is invalid.");
                    None
                }
            },
        }
    }

    fn percentage(&mut self, field: &str) -> Option<Option<f64>> {
        match self.body.get(field) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(value) => match value.as_f64() {
                Some(n) if (0.0..=100.0).contains(&n) => Some(Some(n)),
                Some(_) => {
                    self.fail(field, format!("The {} field must be between 0 and 100.", field));
                    None
                }
                None => {
                    self.fail(field, format!("The {} field must be a number.", field));
                    None
                }
            },
        }
    }

    /// `[{ "id": 1, "measure_ml": 50 }, ...]`; ids must be unique
    fn measures(&mut self, field: &str) -> Option<Vec<Measure>> {
        let Some(value) = self.body.get(field) else {
            return None;
        };
        let Some(items) = value.as_array() else {
            self.fail(field, format!("The {} field must be an array.", field));
            return None;
        };

        let mut measures = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let id_field = format!("{}.{}.id", field, index);
            let ml_field = format!("{}.{}.measure_ml", field, index);

            let id = match item.get("id") {
                None | Some(Value::Null) => {
                    self.fail(&id_field, format!("The {} field is required.", id_field));
                    None
                }
                Some(id) => match id.as_i64() {
                    Some(id) if measures.iter().any(|m: &Measure| m.ingredient_id == id) => {
                        self.fail(&id_field, format!("The {} field has a duplicate value.", id_field));
                        None
                    }
                    Some(id) => Some(id),
                    None => {
                        self.fail(&id_field, format!("The {} field must be an integer.", id_field));
                        None
                    }
                },
            };

            let measure_ml = match item.get("measure_ml") {
                None | Some(Value::Null) => {
                    self.fail(&ml_field, format!("The {} field is required.", ml_field));
                    None
                }
                Some(ml) => match ml.as_f64() {
                    Some(ml) if ml > Measure::MAX_ML => {
                        self.fail(
                            &ml_field,
                            format!("The {} field must not be greater than {}.", ml_field, Measure::MAX_ML),
                        );
                        None
                    }
                    Some(ml) if ml >= 0.0 => Some(ml),
                    Some(_) => {
                        self.fail(&ml_field, format!("The {} field must be at least 0.", ml_field));
                        None
                    }
                    None => {
                        self.fail(&ml_field, format!("The {} field must be a number.", ml_field));
                        None
                    }
                },
            };

            if let (Some(ingredient_id), Some(measure_ml)) = (id, measure_ml) {
                measures.push(Measure { ingredient_id, measure_ml });
            }
        }
        Some(measures)
    }

    fn finish(self) -> Result<(), ApiError> {
        validation_result(self.errors)
    }
}

/// Turn an ordered list of field problems into a 422, or Ok when empty
pub fn validation_result(errors: Vec<(String, String)>) -> Result<(), ApiError> {
    let Some((_, first)) = errors.first() else {
        return Ok(());
    };
    let message = match errors.len() {
        1 => first.clone(),
        2 => format!("{} (and 1 more error)", first),
        n => format!("{} (and {} more errors)", first, n - 1),
    };
    let field_errors: HashMap<String, String> = errors.into_iter().collect();
    Err(ApiError::validation_failed(message, field_errors))
}

pub fn new_ingredient(body: &Value) -> Result<NewIngredient, ApiError> {
    let mut fields = Fields::new(body)?;
    let name = fields.required_string("name", Some(MAX_STRING));
    let kind = fields.nullable_string("type", Some(MAX_STRING));
    let origin = fields.nullable_string("origin", Some(MAX_STRING));
    let classification = fields.classification(true);
    let alcohol_content = fields.percentage("alcohol_content");
    fields.finish()?;

    match (name, classification) {
        (Some(name), Some(classification)) => Ok(NewIngredient::new(
            name,
            kind.flatten(),
            origin.flatten(),
            classification,
            alcohol_content.flatten(),
        )),
        _ => Err(ApiError::bad_request("Incomplete ingredient payload")),
    }
}

pub fn ingredient_changes(body: &Value) -> Result<IngredientChanges, ApiError> {
    let mut fields = Fields::new(body)?;
    let changes = IngredientChanges {
        name: fields.sometimes_string("name", Some(MAX_STRING)),
        kind: fields.nullable_string("type", Some(MAX_STRING)),
        origin: fields.nullable_string("origin", Some(MAX_STRING)),
        classification: fields.classification(false),
        alcohol_content: fields.percentage("alcohol_content"),
    };
    fields.finish()?;
    Ok(changes)
}

pub fn new_cocktail(body: &Value) -> Result<NewCocktail, ApiError> {
    let mut fields = Fields::new(body)?;
    let name = fields.required_string("name", Some(MAX_STRING));
    let description = fields.nullable_string("description", None);
    let ingredients = fields.measures("ingredients");
    fields.finish()?;

    let name = name.ok_or_else(|| ApiError::field("name", "The name field is required."))?;
    Ok(NewCocktail {
        name,
        description: description.flatten(),
        ingredients: ingredients.unwrap_or_default(),
    })
}

pub fn cocktail_changes(body: &Value) -> Result<CocktailChanges, ApiError> {
    let mut fields = Fields::new(body)?;
    let changes = CocktailChanges {
        name: fields.sometimes_string("name", Some(MAX_STRING)),
        description: fields.nullable_string("description", None),
        ingredients: fields.measures("ingredients"),
    };
    fields.finish()?;
    Ok(changes)
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub fn register(body: &Value, min_password_length: usize) -> Result<RegisterInput, ApiError> {
    let mut fields = Fields::new(body)?;
    let name = fields.required_string("name", Some(MAX_STRING));

    let email = fields.required_string("email", Some(MAX_STRING));
    if let Some(email) = &email {
        if !is_valid_email(email) {
            fields.fail("email", "The email field must be a valid email address.");
        }
    }

    let password = fields.required_string("password", None);
    if let Some(password) = &password {
        if password.chars().count() < min_password_length {
            fields.fail(
                "password",
                format!("The password field must be at least {} characters.", min_password_length),
            );
        } else if fields.body.get("password_confirmation").and_then(Value::as_str) != Some(password.as_str()) {
            fields.fail("password", "The password field confirmation does not match.");
        }
    }
    fields.finish()?;

    match (name, email, password) {
        (Some(name), Some(email), Some(password)) => Ok(RegisterInput { name, email, password }),
        _ => Err(ApiError::bad_request("Incomplete registration payload")),
    }
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub fn login(body: &Value) -> Result<LoginInput, ApiError> {
    let mut fields = Fields::new(body)?;
    let email = fields.required_string("email", None);
    let password = fields.required_string("password", None);
    fields.finish()?;

    match (email, password) {
        (Some(email), Some(password)) => Ok(LoginInput { email, password }),
        _ => Err(ApiError::bad_request("Incomplete login payload")),
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_errors(err: ApiError) -> HashMap<String, String> {
        match err {
            ApiError::ValidationFailed { field_errors, .. } => field_errors,
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn ingredient_requires_name_and_classification() {
        let errors = field_errors(new_ingredient(&json!({})).unwrap_err());
        assert_eq!(errors["name"], "The name field is required.");
        assert_eq!(errors["classification"], "The classification field is required.");
    }

    #[test]
    fn non_alcoholic_ingredient_ignores_requested_abv() {
        let ingredient = new_ingredient(&json!({
            "name": "Orange Juice",
            "classification": "juice",
            "alcohol_content": 12.5
        }))
        .unwrap();
        assert_eq!(ingredient.alcohol_content, 0.0);
    }

    #[test]
    fn alcoholic_ingredient_defaults_to_zero() {
        let ingredient = new_ingredient(&json!({
            "name": "Mystery Spirit",
            "classification": "alcoholic",
            "alcohol_content": null
        }))
        .unwrap();
        assert_eq!(ingredient.alcohol_content, 0.0);
    }

    #[test]
    fn rejects_out_of_range_abv_and_unknown_classification() {
        let errors = field_errors(
            new_ingredient(&json!({
                "name": "Vodka",
                "classification": "spirit",
                "alcohol_content": 140
            }))
            .unwrap_err(),
        );
        assert_eq!(errors["classification"], "The selected classification is invalid.");
        assert_eq!(errors["alcohol_content"], "The alcohol_content field must be between 0 and 100.");
    }

    #[test]
    fn name_length_is_bounded() {
        let long = "x".repeat(256);
        let errors = field_errors(new_ingredient(&json!({"name": long, "classification": "soda"})).unwrap_err());
        assert!(errors["name"].contains("255"));
    }

    #[test]
    fn partial_update_distinguishes_absent_from_null() {
        let changes = ingredient_changes(&json!({"alcohol_content": null})).unwrap();
        assert_eq!(changes.alcohol_content, Some(None));
        assert!(changes.name.is_none());

        let changes = ingredient_changes(&json!({"origin": "Mexico"})).unwrap();
        assert_eq!(changes.origin, Some(Some("Mexico".to_string())));
        assert_eq!(changes.alcohol_content, None);
    }

    #[test]
    fn partial_update_rejects_blank_name() {
        let errors = field_errors(ingredient_changes(&json!({"name": "  "})).unwrap_err());
        assert_eq!(errors["name"], "The name field is required.");
    }

    #[test]
    fn cocktail_measures_are_validated_per_item() {
        let errors = field_errors(
            new_cocktail(&json!({
                "name": "Broken",
                "ingredients": [
                    {"id": 1, "measure_ml": 50},
                    {"id": 2},
                    {"id": 3, "measure_ml": -5},
                    {"id": 1, "measure_ml": 10}
                ]
            }))
            .unwrap_err(),
        );
        assert_eq!(errors["ingredients.1.measure_ml"], "The ingredients.1.measure_ml field is required.");
        assert_eq!(errors["ingredients.2.measure_ml"], "The ingredients.2.measure_ml field must be at least 0.");
        assert_eq!(errors["ingredients.3.id"], "The ingredients.3.id field has a duplicate value.");
        assert!(!errors.contains_key("ingredients.0.id"));
    }

    #[test]
    fn oversized_measure_is_rejected() {
        let errors = field_errors(
            cocktail_changes(&json!({
                "ingredients": [{"id": 1, "measure_ml": 1e308}, {"id": 2, "measure_ml": 100000}]
            }))
            .unwrap_err(),
        );
        assert_eq!(
            errors["ingredients.0.measure_ml"],
            "The ingredients.0.measure_ml field must not be greater than 100000."
        );
        assert!(!errors.contains_key("ingredients.1.measure_ml"));
    }

    #[test]
    fn cocktail_changes_keep_absent_ingredients_absent() {
        let changes = cocktail_changes(&json!({"name": "Renamed"})).unwrap();
        assert!(changes.ingredients.is_none());

        let changes = cocktail_changes(&json!({"ingredients": []})).unwrap();
        assert_eq!(changes.ingredients, Some(vec![]));
    }

    #[test]
    fn summary_message_counts_extra_errors() {
        let err = new_ingredient(&json!({"type": 5})).unwrap_err();
        assert_eq!(err.message(), "The name field is required. (and 2 more errors)");
    }

    #[test]
    fn non_object_body_is_a_bad_request() {
        assert_eq!(new_cocktail(&json!([1, 2])).unwrap_err().status_code(), 400);
    }

    #[test]
    fn registration_rules() {
        let errors = field_errors(
            register(
                &json!({
                    "name": "Ana",
                    "email": "not-an-email",
                    "password": "short",
                    "password_confirmation": "short"
                }),
                8,
            )
            .unwrap_err(),
        );
        assert_eq!(errors["email"], "The email field must be a valid email address.");
        assert_eq!(errors["password"], "The password field must be at least 8 characters.");

        let errors = field_errors(
            register(
                &json!({
                    "name": "Ana",
                    "email": "ana@example.com",
                    "password": "password123",
                    "password_confirmation": "password124"
                }),
                8,
            )
            .unwrap_err(),
        );
        assert_eq!(errors["password"], "The password field confirmation does not match.");

        let input = register(
            &json!({
                "name": "Ana",
                "email": "ana@example.com",
                "password": "password123",
                "password_confirmation": "password123"
            }),
            8,
        )
        .unwrap();
        assert_eq!(input.email, "ana@example.com");
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("admin@example.com"));
        assert!(!is_valid_email("admin@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a b@example.com"));
    }
}
