mod auth;
mod csrf;
mod format;
mod health;
