//! recfile — чтение и запись текстовых файлов записей GNU recutils.
//!
//! Запись — упорядоченный набор полей `Name: value`, записи разделяются пустыми
//! строками. Поддерживаются продолжения через хвостовой `\`, многострочные
//! значения через строки `+ ...`, комментарии `#` и дескрипторы `%`.

// Базовые модули
pub mod consts;
pub mod error;
pub mod field;
pub mod config;

// Декодер/энкодер (папки с mod.rs)
pub mod reader; // src/reader/{mod,state}.rs
pub mod writer; // src/writer/{mod,fold}.rs

// Адаптер для log (одна запись на событие)
pub mod logger; // src/logger/mod.rs

// Удобные реэкспорты
pub use config::{LoggerConfig, WriterConfig};
pub use error::RecError;
pub use field::{is_valid_name, Field, Record};
pub use logger::{Attr, AttrValue, RecfileLogger};
pub use reader::Reader;
pub use writer::Writer;
