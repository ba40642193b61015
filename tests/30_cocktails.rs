mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{ingredient_ids, TestApp};

#[tokio::test]
async fn create_returns_ingredients_with_pivot() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin().await?;
    let vodka = app.ingredient(&admin, "Vodka", "alcoholic", 40.0).await?;
    let tonic = app.ingredient(&admin, "Tonic Water", "soda", 0.0).await?;

    let (status, body) = app
        .post(
            "/cocktails",
            Some(&admin),
            json!({
                "name": "Vodka Tonic",
                "description": "Highball",
                "ingredients": [
                    {"id": vodka, "measure_ml": 50},
                    {"id": tonic, "measure_ml": 120}
                ]
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Vodka Tonic");
    assert_eq!(body["description"], "Highball");
    assert_eq!(ingredient_ids(&body), vec![vodka, tonic]);

    let vodka_row = body["ingredients"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["id"] == vodka)
        .unwrap();
    assert_eq!(vodka_row["name"], "Vodka");
    assert_eq!(vodka_row["pivot"]["measure_ml"], 50.0);
    assert_eq!(vodka_row["pivot"]["cocktail_id"], body["id"]);

    let (status, listed) = app.get("/cocktails", Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn update_syncs_ingredient_set() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin().await?;
    let gin = app.ingredient(&admin, "Gin", "alcoholic", 40.0).await?;
    let vermouth = app.ingredient(&admin, "Vermouth", "alcoholic", 16.0).await?;
    let campari = app.ingredient(&admin, "Campari", "alcoholic", 25.0).await?;
    let id = app.cocktail(&admin, "Negroni", &[(gin, 30.0), (vermouth, 30.0)]).await?;
    let uri = format!("/cocktails/{}", id);

    // Present list replaces the set: vermouth detached, campari attached, gin re-measured
    let (status, body) = app
        .put(
            &uri,
            Some(&admin),
            json!({"ingredients": [{"id": gin, "measure_ml": 25}, {"id": campari, "measure_ml": 30}]}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ingredient_ids(&body), vec![gin, campari]);

    // Absent list leaves the set alone
    let (_, body) = app.patch(&uri, Some(&admin), json!({"name": "Negroni Sbagliato"})).await?;
    assert_eq!(body["name"], "Negroni Sbagliato");
    assert_eq!(ingredient_ids(&body), vec![gin, campari]);

    // Empty list clears it
    let (_, body) = app.patch(&uri, Some(&admin), json!({"ingredients": []})).await?;
    assert!(ingredient_ids(&body).is_empty());

    // Vermouth itself survived the detach
    let (status, _) = app.get(&format!("/ingredients/{}", vermouth), Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn unknown_or_invalid_ingredients_are_rejected() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin().await?;
    let rum = app.ingredient(&admin, "Rum", "alcoholic", 40.0).await?;

    let (status, body) = app
        .post(
            "/cocktails",
            Some(&admin),
            json!({"name": "Ghost", "ingredients": [{"id": rum, "measure_ml": 50}, {"id": 4242, "measure_ml": 10}]}),
        )
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field_errors"]["ingredients.1.id"], "The selected ingredients.1.id is invalid.");

    let (status, body) = app
        .post(
            "/cocktails",
            Some(&admin),
            json!({"name": "Negative", "ingredients": [{"id": rum, "measure_ml": -1}]}),
        )
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["ingredients.0.measure_ml"].is_string());

    let (status, body) = app.post("/cocktails", Some(&admin), json!({"description": "no name"})).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field_errors"]["name"], "The name field is required.");

    let (_, listed) = app.get("/cocktails", Some(&admin)).await?;
    assert!(listed.as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn deletes_cascade_associations_only() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin().await?;
    let rum = app.ingredient(&admin, "Rum", "alcoholic", 40.0).await?;
    let cola = app.ingredient(&admin, "Cola", "soda", 0.0).await?;
    let lime = app.ingredient(&admin, "Lime Juice", "juice", 0.0).await?;
    let cuba_libre = app.cocktail(&admin, "Cuba Libre", &[(rum, 50.0), (cola, 120.0)]).await?;
    let daiquiri = app.cocktail(&admin, "Daiquiri", &[(rum, 60.0), (lime, 25.0)]).await?;

    // Deleting an ingredient keeps every cocktail that used it
    app.delete(&format!("/ingredients/{}", rum), Some(&admin)).await?;
    let (status, body) = app.get(&format!("/cocktails/{}", cuba_libre), Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ingredient_ids(&body), vec![cola]);
    let (_, body) = app.get(&format!("/cocktails/{}", daiquiri), Some(&admin)).await?;
    assert_eq!(ingredient_ids(&body), vec![lime]);

    // Deleting a cocktail keeps its ingredients
    let (status, body) = app.delete(&format!("/cocktails/{}", cuba_libre), Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cocktail deleted successfully");
    let (status, _) = app.get(&format!("/ingredients/{}", cola), Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.delete(&format!("/cocktails/{}", cuba_libre), Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Cocktail not found");
    Ok(())
}

#[tokio::test]
async fn search_by_ingredient() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin().await?;
    let user = app.user().await?;
    let gin = app.ingredient(&admin, "Gin", "alcoholic", 40.0).await?;
    let tonic = app.ingredient(&admin, "Tonic Water", "soda", 0.0).await?;
    let mint = app.ingredient(&admin, "Mint Leaves", "garnish", 0.0).await?;
    app.cocktail(&admin, "Gin Tonic", &[(gin, 50.0), (tonic, 120.0)]).await?;
    app.cocktail(&admin, "Martini", &[(gin, 60.0)]).await?;

    let (status, body) = app.get(&format!("/search/{}", gin), Some(&user)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = app.get(&format!("/search/{}", tonic), Some(&user)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Gin Tonic");

    let (status, _) = app.get(&format!("/search/{}", mint), Some(&user)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get("/search/9999", Some(&user)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("/search/{}", gin), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn users_read_but_never_write_cocktails() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin().await?;
    let user = app.user().await?;
    let id = app.cocktail(&admin, "Water", &[]).await?;
    let uri = format!("/cocktails/{}", id);

    let (status, _) = app.get(&uri, Some(&user)).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post("/cocktails", Some(&user), json!({"name": "Nope"})).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.put(&uri, Some(&user), json!({"name": "Nope"})).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&uri, Some(&user)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app.get(&uri, Some(&user)).await?;
    assert_eq!(body["name"], "Water");
    Ok(())
}
