mod letter_service;

pub use letter_service::LetterService;
