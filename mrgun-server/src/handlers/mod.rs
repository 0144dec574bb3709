pub mod auth;
pub mod finance;
pub mod game;
pub mod operator;
