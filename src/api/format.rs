use serde_json::{json, Value};

use crate::auth::Identity;
use crate::database::models::{CocktailDetail, User};
use crate::types::Scope;

/// Public view of a user; the password digest never leaves the store
pub fn user_to_api_value(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "role": user.role,
        "created_at": user.created_at,
        "updated_at": user.updated_at,
    })
}

/// `{ message, user, token }`, plus `scopes` when the caller asks for them
pub fn session_to_api_value(message: &str, user: &User, token: &str, scopes: Option<&[Scope]>) -> Value {
    let mut body = json!({
        "message": message,
        "user": user_to_api_value(user),
        "token": token,
    });
    if let Some(scopes) = scopes {
        body["scopes"] = json!(scopes);
    }
    body
}

/// Current caller, as resolved from its token
pub fn identity_to_api_value(user: &User, identity: &Identity) -> Value {
    let mut body = user_to_api_value(user);
    body["role"] = json!(identity.role);
    body["scopes"] = json!(identity.scopes);
    body
}

pub fn alcohol_to_api_value(cocktail: &CocktailDetail) -> Value {
    json!({
        "cocktail": cocktail.name(),
        "alcohol_content": cocktail.alcohol_content(),
    })
}

pub fn message(text: &str) -> Value {
    json!({ "message": text })
}
