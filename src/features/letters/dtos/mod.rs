mod letter_dto;

pub use letter_dto::*;
