mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn screwdriver_is_thirteen_point_three_three() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin().await?;
    let user = app.user().await?;
    let vodka = app.ingredient(&admin, "Vodka", "alcoholic", 40.0).await?;
    let juice = app.ingredient(&admin, "Orange Juice", "juice", 0.0).await?;
    let id = app.cocktail(&admin, "Screwdriver", &[(vodka, 50.0), (juice, 100.0)]).await?;

    let (status, body) = app.get(&format!("/cocktails/{}/alcohol-content", id), Some(&user)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"cocktail": "Screwdriver", "alcohol_content": 13.33}));
    Ok(())
}

#[tokio::test]
async fn degenerate_cocktails_are_zero() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin().await?;
    let soda = app.ingredient(&admin, "Soda Water", "soda", 0.0).await?;
    let gin = app.ingredient(&admin, "Gin", "alcoholic", 40.0).await?;

    let empty = app.cocktail(&admin, "Nothing", &[]).await?;
    let water = app.cocktail(&admin, "Fizz", &[(soda, 200.0)]).await?;
    let dry = app.cocktail(&admin, "Phantom", &[(gin, 0.0)]).await?;

    for id in [empty, water, dry] {
        let (status, body) = app.get(&format!("/cocktails/{}/alcohol-content", id), Some(&admin)).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["alcohol_content"], 0.0, "cocktail {}", id);
    }
    Ok(())
}

#[tokio::test]
async fn result_follows_ingredient_changes() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin().await?;
    let whiskey = app.ingredient(&admin, "Whiskey", "alcoholic", 40.0).await?;
    let syrup = app.ingredient(&admin, "Simple Syrup", "garnish", 0.0).await?;
    let id = app.cocktail(&admin, "Old Fashioned", &[(whiskey, 60.0), (syrup, 10.0)]).await?;
    let uri = format!("/cocktails/{}/alcohol", id);

    // 24 ml of alcohol in 70 ml
    let (_, body) = app.get(&uri, Some(&admin)).await?;
    assert_eq!(body["alcohol_content"], 34.29);

    app.patch(&format!("/ingredients/{}", whiskey), Some(&admin), json!({"alcohol_content": 50}))
        .await?;
    let (_, body) = app.get(&uri, Some(&admin)).await?;
    assert_eq!(body["alcohol_content"], 42.86);
    Ok(())
}

#[tokio::test]
async fn alcohol_content_access() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin().await?;

    let (status, _) = app.get("/cocktails/1/alcohol-content", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = app.get("/cocktails/1/alcohol-content", Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Cocktail not found");
    Ok(())
}

#[tokio::test]
async fn oversized_pours_never_reach_the_calculator() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin().await?;
    let vodka = app.ingredient(&admin, "Vodka", "alcoholic", 40.0).await?;
    let water = app.ingredient(&admin, "Water", "soda", 0.0).await?;

    let (status, body) = app
        .post(
            "/cocktails",
            Some(&admin),
            json!({"name": "Flood", "ingredients": [{"id": vodka, "measure_ml": 1e308}, {"id": water, "measure_ml": 1e308}]}),
        )
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["ingredients.0.measure_ml"].is_string());

    // The largest accepted pours still give a number
    let id = app
        .cocktail(&admin, "Bathtub", &[(vodka, 100_000.0), (water, 100_000.0)])
        .await?;
    let (status, body) = app.get(&format!("/cocktails/{}/alcohol-content", id), Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alcohol_content"], 20.0);
    Ok(())
}
