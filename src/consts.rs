//! Структурные байты формата recfile.
//!
//! Всё, что не перечислено здесь, — произвольный текст значения.

/// Строка-комментарий: `# ...`
pub const COMMENT_BYTE: u8 = b'#';

/// Строка-дескриптор (`%rec:`, `%key:` и т.п.) — пропускается при чтении.
pub const DESCRIPTOR_BYTE: u8 = b'%';

/// Маркер многострочного продолжения значения: `+ text`.
pub const MULTILINE_BYTE: u8 = b'+';

/// Хвостовой `\` — продолжение значения на следующей физической строке.
pub const CONTINUATION_BYTE: u8 = b'\\';

/// Разделитель имени и значения в строке поля.
pub const NAME_SEP: char = ':';

/// Префикс дескриптора, задающего тип последующих записей.
pub const REC_DESCRIPTOR: &str = "%rec:";
