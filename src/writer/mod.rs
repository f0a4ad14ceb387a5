//! writer — запись полей и записей recfile в приёмник.
//!
//! Правила кодирования:
//! - значение без `\n`, не оканчивающееся на `\`  -> `Name: value` (`Name:` для пустого),
//!   при заданном fold_width длинная строка режется на `\`-продолжения (fold.rs);
//! - иначе многострочная форма: `Name:` и по строке `+ line` на каждую строку значения
//!   (пустая строка -> голый `+`).
//! Обе формы читаются Reader'ом обратно в то же значение.
//!
//! Вывод только дописывается; частичную запись Writer не откатывает — ошибка приёмника
//! сразу возвращается вызывающему.

pub mod fold;

use std::io::Write;

use crate::config::WriterConfig;
use crate::consts::{CONTINUATION_BYTE, DESCRIPTOR_BYTE, MULTILINE_BYTE, NAME_SEP};
use crate::error::RecError;
use crate::field::{is_valid_name, Field, Record};

pub struct Writer<W: Write> {
    inner: W,
    cfg: WriterConfig,
    // была ли уже начата запись: перед следующей нужен разделитель
    started: bool,
}

impl<W: Write> Writer<W> {
    /// Writer для пустого приёмника: перед первой записью разделителя нет.
    pub fn new(inner: W) -> Self {
        Self::with_config(inner, WriterConfig::default())
    }

    pub fn with_config(inner: W, cfg: WriterConfig) -> Self {
        Self {
            inner,
            cfg,
            started: false,
        }
    }

    /// Writer для приёмника, где уже есть записи: разделитель пишется и перед первой.
    pub fn appending(inner: W) -> Self {
        Self::appending_with_config(inner, WriterConfig::default())
    }

    pub fn appending_with_config(inner: W, cfg: WriterConfig) -> Self {
        Self {
            inner,
            cfg,
            started: true,
        }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.cfg
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn flush(&mut self) -> Result<(), RecError> {
        self.inner.flush()?;
        Ok(())
    }

    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Result<usize, RecError> {
        self.inner.write_all(bytes)?;
        Ok(bytes.len())
    }

    /// Имя должно читаться обратно как поле: строка с `%` в начале — дескриптор,
    /// Reader её пропустит, поэтому такие имена не пишутся.
    fn check_name(name: &str) -> Result<(), RecError> {
        if is_valid_name(name) && name.as_bytes().first() != Some(&DESCRIPTOR_BYTE) {
            Ok(())
        } else {
            Err(RecError::InvalidName {
                name: name.to_string(),
            })
        }
    }

    /// Начать запись: пустая строка перед каждой записью, кроме первой в свежем приёмнике.
    pub fn record_start(&mut self) -> Result<usize, RecError> {
        let n = if self.started { self.put(b"\n")? } else { 0 };
        self.started = true;
        Ok(n)
    }

    pub fn write_fields(&mut self, fields: &[Field]) -> Result<usize, RecError> {
        let mut written = 0;
        for f in fields {
            written += self.write_field(&f.name, &f.value)?;
        }
        Ok(written)
    }

    pub fn write_field(&mut self, name: &str, value: &str) -> Result<usize, RecError> {
        Self::check_name(name)?;
        if value.contains('\n') || value.as_bytes().last() == Some(&CONTINUATION_BYTE) {
            return self.write_multiline_unchecked(name, value.split('\n'));
        }
        if value.is_empty() {
            return self.put(format!("{name}{NAME_SEP}\n").as_bytes());
        }

        let head = format!("{name}{NAME_SEP} ");
        let parts = match self.cfg.fold_width {
            Some(width) if width > 0 && head.len() + value.len() > width => {
                fold::fold_value(value, width.saturating_sub(head.len()), width)
            }
            _ => vec![value],
        };

        let mut out = String::with_capacity(head.len() + value.len() + 2 * parts.len());
        out.push_str(&head);
        let last = parts.len() - 1;
        for (i, p) in parts.iter().enumerate() {
            out.push_str(p);
            if i != last {
                out.push(CONTINUATION_BYTE as char);
            }
            out.push('\n');
        }
        self.put(out.as_bytes())
    }

    /// `Name:` и по строке `+ line` на каждый элемент `lines`.
    /// Строки с `\n` внутри разворачиваются, значение при чтении — `lines.join("\n")`.
    pub fn write_field_multiline<S: AsRef<str>>(
        &mut self,
        name: &str,
        lines: &[S],
    ) -> Result<usize, RecError> {
        Self::check_name(name)?;
        self.write_multiline_unchecked(name, lines.iter().flat_map(|l| l.as_ref().split('\n')))
    }

    fn write_multiline_unchecked<'a, I>(&mut self, name: &str, lines: I) -> Result<usize, RecError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = format!("{name}{NAME_SEP}\n");
        for line in lines {
            out.push(MULTILINE_BYTE as char);
            if !line.is_empty() {
                out.push(' ');
                out.push_str(line);
            }
            out.push('\n');
        }
        self.put(out.as_bytes())
    }

    /// record_start + все поля записи.
    pub fn write_record(&mut self, record: &Record) -> Result<usize, RecError> {
        let mut written = self.record_start()?;
        written += self.write_fields(record.fields())?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(w: Writer<Vec<u8>>) -> String {
        String::from_utf8(w.into_inner()).unwrap()
    }

    #[test]
    fn single_line_fields() {
        let mut w = Writer::new(Vec::new());
        w.record_start().unwrap();
        let n = w
            .write_fields(&[Field::new("A", "1"), Field::new("Empty", "")])
            .unwrap();
        assert_eq!(n, "A: 1\nEmpty:\n".len());
        assert_eq!(text(w), "A: 1\nEmpty:\n");
    }

    #[test]
    fn separator_only_between_records() {
        let mut w = Writer::new(Vec::new());
        assert_eq!(w.record_start().unwrap(), 0);
        w.write_field("A", "1").unwrap();
        assert_eq!(w.record_start().unwrap(), 1);
        w.write_field("A", "2").unwrap();
        assert_eq!(text(w), "A: 1\n\nA: 2\n");
    }

    #[test]
    fn appending_writer_separates_first_record() {
        let mut w = Writer::appending(Vec::new());
        w.record_start().unwrap();
        w.write_field("A", "1").unwrap();
        assert_eq!(text(w), "\nA: 1\n");
    }

    #[test]
    fn multiline_field_form() {
        let mut w = Writer::new(Vec::new());
        w.write_field_multiline("Note", &["line one", "", "line two"]).unwrap();
        assert_eq!(text(w), "Note:\n+ line one\n+\n+ line two\n");
    }

    #[test]
    fn embedded_newline_uses_multiline_form() {
        let mut w = Writer::new(Vec::new());
        w.write_field("Note", "a\nb").unwrap();
        assert_eq!(text(w), "Note:\n+ a\n+ b\n");
    }

    #[test]
    fn trailing_backslash_uses_multiline_form() {
        let mut w = Writer::new(Vec::new());
        w.write_field("Path", "C:\\").unwrap();
        assert_eq!(text(w), "Path:\n+ C:\\\n");
    }

    #[test]
    fn folds_long_values_when_configured() {
        let cfg = WriterConfig::default().with_fold_width(Some(8));
        let mut w = Writer::with_config(Vec::new(), cfg);
        w.write_field("A", "abcdefghij").unwrap();
        assert_eq!(text(w), "A: abcd\\\nefghij\n");
    }

    #[test]
    fn rejects_invalid_names() {
        let mut w = Writer::new(Vec::new());
        let err = w.write_field("1bad", "x").unwrap_err();
        assert!(matches!(err, RecError::InvalidName { .. }));
        let err = w.write_field_multiline("a b", &["x"]).unwrap_err();
        assert!(matches!(err, RecError::InvalidName { .. }));
        assert!(w.get_ref().is_empty());
    }

    #[test]
    fn rejects_descriptor_names() {
        let mut w = Writer::new(Vec::new());
        let err = w.write_field("%Tag", "x").unwrap_err();
        assert!(matches!(err, RecError::InvalidName { ref name } if name == "%Tag"));
        let err = w.write_field_multiline("%rec", &["Task"]).unwrap_err();
        assert!(matches!(err, RecError::InvalidName { .. }));
        assert!(w.get_ref().is_empty());
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "sink closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "sink closed"))
        }
    }

    #[test]
    fn sink_errors_propagate() {
        let mut w = Writer::new(BrokenSink);
        // первая запись в свежий приёмник ничего не пишет
        assert_eq!(w.record_start().unwrap(), 0);
        for err in [
            w.write_field("A", "1").unwrap_err(),
            w.write_field_multiline("Note", &["a", "b"]).unwrap_err(),
            w.write_record(&vec![Field::new("A", "1")].into()).unwrap_err(),
            w.flush().unwrap_err(),
        ] {
            match err {
                RecError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe),
                other => panic!("expected io error, got {other:?}"),
            }
        }
    }
}
