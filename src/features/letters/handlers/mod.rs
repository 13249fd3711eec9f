mod letter_handler;

pub use letter_handler::*;
