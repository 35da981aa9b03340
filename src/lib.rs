//! Shelter Assist — conversational intake bot for an animal shelter.

pub mod config;
pub mod dialogue;
pub mod error;
pub mod phone;
pub mod reminder;
pub mod reports;
pub mod shelters;
pub mod store;
pub mod transport;
pub mod users;
