//! reader/state — явная машина состояний разбора одной записи.
//!
//! Состояния:
//! - `Idle`         — поле ещё не начато (начало записи);
//! - `Field`        — поле собрано из строки `name: value`, ждёт `+`-строк или конца;
//! - `Continuation` — открыт хвостовой `\`, следующая строка дописывается без разделителя.
//!
//! Классы строк: пустая, комментарий `#`, дескриптор `%`, многострочная `+`, строка поля.
//! Комментарии и дескрипторы не влияют на состояние ни в каком случае.

use crate::consts::{COMMENT_BYTE, CONTINUATION_BYTE, DESCRIPTOR_BYTE, MULTILINE_BYTE, NAME_SEP};
use crate::error::RecError;
use crate::field::{is_valid_name, Field};

/// Результат подачи одной строки.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Запись продолжается.
    More,
    /// Встречена пустая строка: запись закончена.
    RecordEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Field {
        name: String,
        value: String,
        /// Инлайн-значение было пустым и `+`-строк ещё не было:
        /// первая `+`-строка не получает ведущего `\n`.
        bare: bool,
    },
    Continuation {
        name: String,
        value: String,
    },
}

/// Классификация физической строки (без `\n`/`\r`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    Blank,
    Comment,
    Descriptor,
    /// Текст после `+` (ещё без отброса пробела).
    Multiline(&'a str),
    Field(&'a str),
}

pub fn classify(line: &str) -> LineClass<'_> {
    match line.as_bytes().first() {
        None => LineClass::Blank,
        Some(&COMMENT_BYTE) => LineClass::Comment,
        Some(&DESCRIPTOR_BYTE) => LineClass::Descriptor,
        Some(&MULTILINE_BYTE) => LineClass::Multiline(&line[1..]),
        Some(_) => LineClass::Field(line),
    }
}

/// Разбор `name ":" [" "] value`. Ровно один ведущий пробел значения отбрасывается.
pub fn split_field(text: &str) -> Option<(&str, &str)> {
    let (name, rest) = text.split_once(NAME_SEP)?;
    if !is_valid_name(name) {
        return None;
    }
    Some((name, rest.strip_prefix(' ').unwrap_or(rest)))
}

fn strip_continuation(s: &str) -> Option<&str> {
    if s.as_bytes().last() == Some(&CONTINUATION_BYTE) {
        Some(&s[..s.len() - 1])
    } else {
        None
    }
}

/// Сканер одной записи: состояние + уже готовые поля.
#[derive(Debug)]
pub struct Scanner {
    state: ScanState,
    fields: Vec<Field>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::Idle,
            fields: Vec::with_capacity(1),
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Подать очередную строку. `line_no` — номер строки для диагностики.
    pub fn feed(&mut self, line: &str, line_no: u64) -> Result<Flow, RecError> {
        let class = classify(line);
        if matches!(class, LineClass::Comment | LineClass::Descriptor) {
            return Ok(Flow::More);
        }

        let state = std::mem::replace(&mut self.state, ScanState::Idle);
        match (state, class) {
            // ----- открыт `\` -----
            (ScanState::Continuation { .. }, LineClass::Blank) => {
                Err(RecError::UnterminatedContinuation { line: line_no })
            }
            (ScanState::Continuation { name, mut value }, _) => {
                match strip_continuation(line) {
                    Some(head) => {
                        value.push_str(head);
                        self.state = ScanState::Continuation { name, value };
                    }
                    None => {
                        value.push_str(line);
                        self.state = ScanState::Field {
                            name,
                            value,
                            bare: false,
                        };
                    }
                }
                Ok(Flow::More)
            }

            // ----- `+`-строки -----
            (ScanState::Idle, LineClass::Multiline(_)) => Err(RecError::MalformedField {
                line: line_no,
                text: line.to_string(),
            }),
            (ScanState::Field { name, mut value, bare }, LineClass::Multiline(rest)) => {
                if !bare {
                    value.push('\n');
                }
                value.push_str(rest.strip_prefix(' ').unwrap_or(rest));
                self.state = ScanState::Field {
                    name,
                    value,
                    bare: false,
                };
                Ok(Flow::More)
            }

            // ----- конец записи / новое поле -----
            (state, LineClass::Blank) => {
                self.finalize(state);
                Ok(Flow::RecordEnd)
            }
            (state, LineClass::Field(text)) => {
                self.finalize(state);
                let (name, value) = split_field(text).ok_or_else(|| RecError::MalformedField {
                    line: line_no,
                    text: text.to_string(),
                })?;
                self.state = match strip_continuation(value) {
                    Some(head) => ScanState::Continuation {
                        name: name.to_string(),
                        value: head.to_string(),
                    },
                    None => ScanState::Field {
                        name: name.to_string(),
                        value: value.to_string(),
                        bare: value.is_empty(),
                    },
                };
                Ok(Flow::More)
            }

            (_, LineClass::Comment | LineClass::Descriptor) => Ok(Flow::More),
        }
    }

    /// Конец ввода: закрыть незавершённое поле.
    pub fn finish(&mut self, line_no: u64) -> Result<(), RecError> {
        let state = std::mem::replace(&mut self.state, ScanState::Idle);
        if let ScanState::Continuation { .. } = state {
            return Err(RecError::UnterminatedContinuation { line: line_no });
        }
        self.finalize(state);
        Ok(())
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }

    fn finalize(&mut self, state: ScanState) {
        if let ScanState::Field { name, value, .. } = state {
            self.fields.push(Field { name, value });
        }
    }
}
