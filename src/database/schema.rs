/// Idempotent DDL executed by `DatabaseManager::init_schema`, in order.
pub const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role VARCHAR(16) NOT NULL DEFAULT 'user' CHECK (role IN ('admin', 'user')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS access_tokens (
        id UUID PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        scopes TEXT[] NOT NULL,
        revoked BOOLEAN NOT NULL DEFAULT false,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        expires_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ingredients (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        type VARCHAR(255),
        origin VARCHAR(255),
        classification VARCHAR(16) NOT NULL
            CHECK (classification IN ('alcoholic', 'soda', 'juice', 'garnish')),
        alcohol_content DOUBLE PRECISION NOT NULL DEFAULT 0
            CHECK (alcohol_content >= 0 AND alcohol_content <= 100),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CHECK (classification = 'alcoholic' OR alcohol_content = 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cocktails (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cocktail_ingredient (
        cocktail_id BIGINT NOT NULL REFERENCES cocktails (id) ON DELETE CASCADE,
        ingredient_id BIGINT NOT NULL REFERENCES ingredients (id) ON DELETE CASCADE,
        measure_ml DOUBLE PRECISION NOT NULL CHECK (measure_ml >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (cocktail_id, ingredient_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS cocktail_ingredient_ingredient_idx ON cocktail_ingredient (ingredient_id)",
    "CREATE INDEX IF NOT EXISTS access_tokens_user_idx ON access_tokens (user_id)",
];
