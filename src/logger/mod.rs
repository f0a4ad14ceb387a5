//! logger — адаптер `log::Log`, пишущий по одной recfile-записи на событие.
//!
//! Раскладка записи:
//!   <level_key>: WARN
//!   <time_key>: 2026-01-02T03:04:05.123456789Z (лишние нули дробной части не пишутся)
//!   <msg_key>: текст сообщения
//!   <group>_<attr>: ...   (связанные атрибуты, затем key/value события)
//!
//! Конкурентность: событие целиком собирается в частный буфер своим Writer'ом,
//! общий приёмник блокируется только на write_all + flush готового буфера.
//! Каждый буфер начинается с разделителя записей, поэтому события не сливаются.

use anyhow::{anyhow, Context, Result};
use chrono::{SecondsFormat, Utc};
use log::kv::{Key, Value, VisitSource};
use log::{Level, Log, Metadata, Record as LogRecord};
use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::config::LoggerConfig;
use crate::writer::Writer;

/// Собственные диагностики крейта в адаптер не попадают (иначе рекурсия).
const OWN_TARGET: &str = "recfile";

/// Разделитель групп в имени атрибута.
const GROUP_SEP: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    /// Многострочное значение: пишется через `+`-строки; пустой список не пишется.
    Lines(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub key: String,
    pub value: AttrValue,
}

impl Attr {
    pub fn text<K: Into<String>, V: ToString>(key: K, value: V) -> Self {
        Self {
            key: key.into(),
            value: AttrValue::Text(value.to_string()),
        }
    }

    pub fn lines<K, I, S>(key: K, lines: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            value: AttrValue::Lines(lines.into_iter().map(Into::into).collect()),
        }
    }
}

type SharedSink = Arc<Mutex<Box<dyn Write + Send>>>;

#[derive(Clone)]
pub struct RecfileLogger {
    sink: SharedSink,
    cfg: Arc<LoggerConfig>,
    attrs: Vec<Attr>,
    group: String,
}

impl RecfileLogger {
    pub fn new<W: Write + Send + 'static>(sink: W, cfg: LoggerConfig) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
            cfg: Arc::new(cfg),
            attrs: Vec::new(),
            group: String::new(),
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.cfg
    }

    /// Новый логгер с тем же приёмником и блокировкой и дополнительными атрибутами.
    pub fn with_attrs<I: IntoIterator<Item = Attr>>(&self, attrs: I) -> Self {
        let mut neu = self.clone();
        neu.attrs.extend(attrs);
        neu
    }

    /// Новый логгер, у которого к префиксу имён добавлено `name_`.
    pub fn with_group(&self, name: &str) -> Self {
        let mut neu = self.clone();
        neu.group.push_str(name);
        neu.group.push_str(GROUP_SEP);
        neu
    }

    /// Установить как глобальный логгер `log`.
    pub fn init(self) -> Result<()> {
        let max = self.cfg.level;
        log::set_boxed_logger(Box::new(self))
            .map_err(|e| anyhow!("install recfile logger: {e}"))?;
        log::set_max_level(max);
        Ok(())
    }

    pub fn level_enabled(&self, level: Level) -> bool {
        level <= self.cfg.level
    }

    fn write_attr(&self, w: &mut Writer<Vec<u8>>, attr: &Attr) -> Result<()> {
        let name = format!("{}{}", self.group, attr.key);
        match &attr.value {
            AttrValue::Lines(lines) if lines.is_empty() => {}
            AttrValue::Lines(lines) => {
                w.write_field_multiline(&name, lines.as_slice())
                    .with_context(|| format!("attr {name}"))?;
            }
            AttrValue::Text(text) => {
                w.write_field(&name, text)
                    .with_context(|| format!("attr {name}"))?;
            }
        }
        Ok(())
    }

    /// Собрать одну запись в частный буфер (без блокировок).
    pub fn render(&self, level: Level, message: &str, attrs: &[Attr]) -> Result<Vec<u8>> {
        let mut w = Writer::appending_with_config(Vec::new(), self.cfg.writer.clone());
        w.record_start()?;
        if !self.cfg.level_key.is_empty() {
            w.write_field(&self.cfg.level_key, level.as_str())?;
        }
        if !self.cfg.time_key.is_empty() {
            let ts = Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true);
            w.write_field(&self.cfg.time_key, &ts)?;
        }
        w.write_field(&self.cfg.msg_key, message)?;
        for attr in self.attrs.iter().chain(attrs) {
            self.write_attr(&mut w, attr)?;
        }
        Ok(w.into_inner())
    }

    /// Записать событие. Ошибки сборки/приёмника возвращаются, в приёмник при
    /// ошибке сборки ничего не пишется.
    pub fn handle(&self, level: Level, message: &str, attrs: &[Attr]) -> Result<()> {
        if !self.level_enabled(level) {
            return Ok(());
        }
        let buf = self.render(level, message, attrs)?;

        let mut sink = self
            .sink
            .lock()
            .map_err(|_| anyhow!("recfile logger: sink mutex poisoned"))?;
        sink.write_all(&buf).context("recfile logger: write event")?;
        sink.flush().context("recfile logger: flush")?;
        Ok(())
    }
}

struct KvCollector(Vec<Attr>);

impl<'kvs> VisitSource<'kvs> for KvCollector {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), log::kv::Error> {
        self.0.push(Attr::text(key.as_str(), value));
        Ok(())
    }
}

fn is_own_target(target: &str) -> bool {
    target == OWN_TARGET
        || target
            .strip_prefix(OWN_TARGET)
            .is_some_and(|rest| rest.starts_with("::"))
}

impl Log for RecfileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.level_enabled(metadata.level()) && !is_own_target(metadata.target())
    }

    fn log(&self, record: &LogRecord) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut kv = KvCollector(Vec::new());
        if record.key_values().visit(&mut kv).is_err() {
            return;
        }
        // Log::log не умеет возвращать ошибку
        let _ = self.handle(record.level(), &record.args().to_string(), &kv.0);
    }

    fn flush(&self) {
        if let Ok(mut sink) = self.sink.lock() {
            let _ = sink.flush();
        }
    }
}
