mod letter;

pub use letter::{Letter, LetterType, LetterWithRelations};
