//! Catalog logic shared by the bot and the admin panel

pub mod admin;
pub mod callback;
pub mod navigator;
pub mod search;
pub mod tree;

pub use callback::CallbackAction;
pub use navigator::{ButtonTarget, Menu, MenuButton, Navigation};
