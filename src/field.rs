//! Модель данных: поле и запись.
//!
//! Запись — упорядоченный список полей, имена могут повторяться
//! (например, несколько `DependsOn:`). Отображения `name -> value` и
//! `name -> [value]` строятся свёрткой поверх списка и первичными не являются.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Одна пара имя/значение. Значение — произвольный текст, может содержать `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

impl Field {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Проверка имени поля: `[%A-Za-z][A-Za-z0-9_]*`.
pub fn is_valid_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(b) if b == b'%' || b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes.all(|b| b == b'_' || b.is_ascii_alphanumeric())
}

/// Запись: поля в порядке появления, дубликаты сохраняются.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Последнее значение поля `name` (как в уникальном отображении).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Все значения поля `name` в порядке записи.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Уникальные ключи: при повторе побеждает последнее значение.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.fields
            .iter()
            .fold(HashMap::with_capacity(self.fields.len()), |mut m, f| {
                m.insert(f.name.clone(), f.value.clone());
                m
            })
    }

    /// Уникальные ключи со списками значений в порядке появления.
    pub fn to_multi_map(&self) -> HashMap<String, Vec<String>> {
        self.fields
            .iter()
            .fold(HashMap::new(), |mut m: HashMap<String, Vec<String>>, f| {
                m.entry(f.name.clone()).or_default().push(f.value.clone());
                m
            })
    }
}

impl From<Vec<Field>> for Record {
    fn from(fields: Vec<Field>) -> Self {
        Self { fields }
    }
}

impl FromIterator<Field> for Record {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
