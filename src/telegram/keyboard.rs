//! Renders catalog menus as inline keyboards.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::catalog::{ButtonTarget, Menu, MenuButton};

fn to_button(button: &MenuButton) -> Option<InlineKeyboardButton> {
    match &button.target {
        ButtonTarget::Callback(action) => Some(InlineKeyboardButton::callback(button.label.clone(), action.to_data())),
        ButtonTarget::Url(raw) => match url::Url::parse(raw) {
            Ok(url) => Some(InlineKeyboardButton::url(button.label.clone(), url)),
            Err(e) => {
                log::warn!("Dropping button '{}' with invalid URL {}: {}", button.label, raw, e);
                None
            }
        },
    }
}

/// One button per row, in menu order.
pub fn to_inline_keyboard(menu: &Menu) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = menu.rows.iter().filter_map(to_button).map(|b| vec![b]).collect();
    InlineKeyboardMarkup::new(rows)
}
