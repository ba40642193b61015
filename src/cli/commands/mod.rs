pub mod abv;
pub mod db;
pub mod server;
pub mod user;
