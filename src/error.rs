//! Ошибки декодера/энкодера recfile.
//!
//! Конец потока ошибкой не является: `Reader::next_record` возвращает `Ok(None)`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecError {
    /// Ошибка нижележащего источника/приёмника, пробрасывается как есть.
    #[error("recfile io: {0}")]
    Io(#[from] std::io::Error),

    /// Строка не разбирается как `name ":" value` или имя нарушает грамматику.
    #[error("invalid field format at line {line}: {text:?}")]
    MalformedField { line: u64, text: String },

    /// Пустая строка или конец ввода при открытом `\`-продолжении.
    #[error("left continuation at line {line}")]
    UnterminatedContinuation { line: u64 },

    #[error("line {line} is not valid UTF-8")]
    NotUtf8 { line: u64 },

    /// Энкодер отказывается писать поле, которое нельзя будет прочитать.
    #[error("invalid field name {name:?}")]
    InvalidName { name: String },
}

impl RecError {
    /// Номер физической строки (1-based), если ошибка привязана к входу.
    pub fn line(&self) -> Option<u64> {
        match self {
            RecError::MalformedField { line, .. }
            | RecError::UnterminatedContinuation { line }
            | RecError::NotUtf8 { line } => Some(*line),
            RecError::Io(_) | RecError::InvalidName { .. } => None,
        }
    }
}
