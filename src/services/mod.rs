pub mod card_service;
pub mod qr_service;
pub mod token_service;
