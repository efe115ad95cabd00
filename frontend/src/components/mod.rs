pub mod chat;
pub mod icons;
pub mod layout;
pub mod stat_card;
