// models/src/queries.rs

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::properties::IntoFieldValue;

/// One condition on a top-level document field.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Eq(String, Value),
    Ne(String, Value),
    In(String, Vec<Value>),
    NotIn(String, Vec<Value>),
    Lt(String, Value),
    Lte(String, Value),
    Gt(String, Value),
    Gte(String, Value),
}

impl Predicate {
    pub fn field(&self) -> &str {
        match self {
            Predicate::Eq(f, _)
            | Predicate::Ne(f, _)
            | Predicate::In(f, _)
            | Predicate::NotIn(f, _)
            | Predicate::Lt(f, _)
            | Predicate::Lte(f, _)
            | Predicate::Gt(f, _)
            | Predicate::Gte(f, _) => f,
        }
    }

    /// Evaluates the predicate against a document. A missing field never
    /// satisfies `Eq`, `In` or a range predicate, and always satisfies `Ne`
    /// and `NotIn`.
    pub fn matches(&self, document: &Value) -> bool {
        let actual = document.get(self.field()).filter(|v| !v.is_null());
        match (self, actual) {
            (Predicate::Eq(_, expected), Some(actual)) => values_equal(actual, expected),
            (Predicate::Ne(_, expected), Some(actual)) => !values_equal(actual, expected),
            (Predicate::In(_, options), Some(actual)) => options.iter().any(|o| values_equal(actual, o)),
            (Predicate::NotIn(_, options), Some(actual)) => !options.iter().any(|o| values_equal(actual, o)),
            (Predicate::Lt(_, bound), Some(actual)) => compare_values(actual, bound) == Some(Ordering::Less),
            (Predicate::Lte(_, bound), Some(actual)) => {
                matches!(compare_values(actual, bound), Some(Ordering::Less | Ordering::Equal))
            }
            (Predicate::Gt(_, bound), Some(actual)) => compare_values(actual, bound) == Some(Ordering::Greater),
            (Predicate::Gte(_, bound), Some(actual)) => {
                matches!(compare_values(actual, bound), Some(Ordering::Greater | Ordering::Equal))
            }
            (Predicate::Eq(_, expected), None) => expected.is_null(),
            (Predicate::Ne(_, expected), None) => !expected.is_null(),
            (Predicate::NotIn(..), None) => true,
            (_, None) => false,
        }
    }
}

/// A conjunction of predicates. The empty filter matches every document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl IntoFieldValue) -> Self {
        self.predicates.push(Predicate::Eq(field.to_string(), value.into_field_value()));
        self
    }

    pub fn ne(mut self, field: &str, value: impl IntoFieldValue) -> Self {
        self.predicates.push(Predicate::Ne(field.to_string(), value.into_field_value()));
        self
    }

    pub fn in_values<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: IntoFieldValue,
    {
        let values = values.into_iter().map(IntoFieldValue::into_field_value).collect();
        self.predicates.push(Predicate::In(field.to_string(), values));
        self
    }

    pub fn not_in<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: IntoFieldValue,
    {
        let values = values.into_iter().map(IntoFieldValue::into_field_value).collect();
        self.predicates.push(Predicate::NotIn(field.to_string(), values));
        self
    }

    pub fn lt(mut self, field: &str, value: impl IntoFieldValue) -> Self {
        self.predicates.push(Predicate::Lt(field.to_string(), value.into_field_value()));
        self
    }

    pub fn lte(mut self, field: &str, value: impl IntoFieldValue) -> Self {
        self.predicates.push(Predicate::Lte(field.to_string(), value.into_field_value()));
        self
    }

    pub fn gt(mut self, field: &str, value: impl IntoFieldValue) -> Self {
        self.predicates.push(Predicate::Gt(field.to_string(), value.into_field_value()));
        self
    }

    pub fn gte(mut self, field: &str, value: impl IntoFieldValue) -> Self {
        self.predicates.push(Predicate::Gte(field.to_string(), value.into_field_value()));
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.predicates.iter().all(|p| p.matches(document))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordering of a result set by one or more fields, most significant first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sort {
    keys: Vec<(String, SortDirection)>,
}

impl Sort {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ascending(field: &str) -> Self {
        Self::none().then_ascending(field)
    }

    pub fn descending(field: &str) -> Self {
        Self::none().then_descending(field)
    }

    pub fn then_ascending(mut self, field: &str) -> Self {
        self.keys.push((field.to_string(), SortDirection::Ascending));
        self
    }

    pub fn then_descending(mut self, field: &str) -> Self {
        self.keys.push((field.to_string(), SortDirection::Descending));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compares two documents. Missing fields sort before present ones;
    /// incomparable values are treated as equal.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for (field, direction) in &self.keys {
            let ordering = match (a.get(field), b.get(field)) {
                (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ordering = match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Sorts documents in place. The sort is stable.
    pub fn apply(&self, documents: &mut [Value]) {
        if !self.is_empty() {
            documents.sort_by(|a, b| self.compare(a, b));
        }
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Orders two stored values. Strings that both parse as RFC 3339 compare as
/// instants, so `...T10:00:00Z` and `...T10:00:00.000+00:00` are equal.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => match (parse_instant(x), parse_instant(y)) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => Some(x.cmp(y)),
        },
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

pub fn values_equal(a: &Value, b: &Value) -> bool {
    match compare_values(a, b) {
        Some(ordering) => ordering == Ordering::Equal,
        None => a == b,
    }
}
