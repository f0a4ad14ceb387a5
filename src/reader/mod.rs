//! reader — последовательное чтение записей recfile.
//!
//! Разделение:
//! - state.rs — машина состояний одной записи (классы строк, `\`-продолжения, `+`-строки).
//! - mod.rs   — `Reader`: построчное чтение источника, пропуск пустых блоков, отображения.
//!
//! Контракт `next_record`:
//!   * Ok(Some(record)) — очередная непустая запись;
//!   * Ok(None)         — поток исчерпан;
//!   * Err(e)           — ошибка формата или I/O; частичная запись не возвращается.
//!
//! Использование:
//!   let mut r = Reader::new(input.as_bytes());
//!   while let Some(rec) = r.next_record()? { /* ... */ }

pub mod state;

use log::{debug, trace};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};

use crate::consts::REC_DESCRIPTOR;
use crate::error::RecError;
use crate::field::Record;

use self::state::{Flow, Scanner};

pub struct Reader<R> {
    inner: R,
    buf: Vec<u8>,
    line_no: u64,
    record_type: Option<String>,
    // итератор «глохнет» после первой ошибки
    failed: bool,
}

impl<R: Read> Reader<BufReader<R>> {
    pub fn from_read(inner: R) -> Self {
        Reader::new(BufReader::new(inner))
    }
}

impl<R: BufRead> Reader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            line_no: 0,
            record_type: None,
            failed: false,
        }
    }

    /// Сколько физических строк прочитано.
    pub fn line_number(&self) -> u64 {
        self.line_no
    }

    /// Тип из последнего встреченного дескриптора `%rec:`.
    /// Сами дескрипторы в записи не попадают.
    pub fn record_type(&self) -> Option<&str> {
        self.record_type.as_deref()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Следующая строка без `\n` (и одного `\r` перед ним). None — EOF.
    fn read_line(&mut self) -> Result<Option<String>, RecError> {
        self.buf.clear();
        let n = self.inner.read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }
        let line = std::str::from_utf8(&self.buf)
            .map_err(|_| RecError::NotUtf8 { line: self.line_no })?;
        Ok(Some(line.to_string()))
    }

    fn note_descriptor(&mut self, line: &str) {
        if let Some(rest) = line.strip_prefix(REC_DESCRIPTOR) {
            let ty = rest.split_whitespace().next().unwrap_or("");
            if !ty.is_empty() {
                trace!("recfile: record type {} at line {}", ty, self.line_no);
                self.record_type = Some(ty.to_string());
            }
        }
    }

    /// Следующая запись. Блоки без полей (только комментарии/дескрипторы/пустые строки)
    /// пропускаются прозрачно.
    pub fn next_record(&mut self) -> Result<Option<Record>, RecError> {
        loop {
            let mut scanner = Scanner::new();
            let mut eof = false;
            loop {
                let line = match self.read_line()? {
                    Some(l) => l,
                    None => {
                        eof = true;
                        break;
                    }
                };
                if line.starts_with(REC_DESCRIPTOR) {
                    self.note_descriptor(&line);
                }
                if scanner.feed(&line, self.line_no)? == Flow::RecordEnd {
                    break;
                }
            }
            if eof {
                scanner.finish(self.line_no)?;
            }

            let fields = scanner.into_fields();
            if !fields.is_empty() {
                return Ok(Some(Record::from(fields)));
            }
            if eof {
                return Ok(None);
            }
            debug!("recfile: skip block without fields before line {}", self.line_no);
        }
    }

    /// То же, что next_record, но с уникальными ключами (последнее значение побеждает).
    pub fn next_map(&mut self) -> Result<Option<HashMap<String, String>>, RecError> {
        Ok(self.next_record()?.map(|r| r.to_map()))
    }

    /// То же, что next_record, но значения сгруппированы по ключу в порядке появления.
    pub fn next_map_multi(&mut self) -> Result<Option<HashMap<String, Vec<String>>>, RecError> {
        Ok(self.next_record()?.map(|r| r.to_multi_map()))
    }
}

impl<R: BufRead> Iterator for Reader<R> {
    type Item = Result<Record, RecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_record() {
            Ok(Some(rec)) => Some(Ok(rec)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
