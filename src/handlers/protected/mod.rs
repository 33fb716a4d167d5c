// handlers/protected/mod.rs - Handlers behind the bearer-token gate
//
// Todo routes are mounted generically by crud::router; only the
// non-resource endpoints live here.

pub mod auth;
