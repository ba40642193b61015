// Protected handlers. The actor middleware has already resolved the caller;
// every handler authorizes before it looks up rows or reads the body.
pub mod auth;
pub mod cocktails;
pub mod ingredients;
pub mod search;
