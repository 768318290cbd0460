//! Clients for external HTTP APIs called on behalf of the signed-in user.

pub mod people;
