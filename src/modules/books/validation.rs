//! Field-level request validation.
//!
//! Every rule set is plain data: for each field an ordered list of predicate + message
//! pairs. A field stops at its first failing rule, but every field is checked, so one
//! response reports all offending fields at once.

use bookshelf_db::{BookPatch, NewBook};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Request parameters or body, keyed by field name.
pub type Fields = Map<String, Value>;

pub const MISSING: &str = "Missing";
pub const EMPTY: &str = "Empty";
pub const INTEGERS_ONLY: &str = "Integers Only";
pub const STRINGS_ONLY: &str = "Strings Only";

pub const ISBN: &str = "isbn";
pub const TITLE: &str = "title";
pub const DESCRIPTION: &str = "description";
pub const PUBLISH_YEAR: &str = "publishYear";

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every failed field of a request, in rule-set order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationFailure {
    pub errors: Vec<FieldError>,
}

impl ValidationFailure {
    pub fn single(field: &str, message: &str) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.to_string(),
                message: message.to_string(),
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn merge(&mut self, other: ValidationFailure) {
        self.errors.extend(other.errors);
    }

    fn into_result(self) -> Result<(), ValidationFailure> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// A predicate over the (possibly absent) field value and the message reported when it fails.
#[derive(Clone, Copy)]
pub struct Rule {
    pub message: &'static str,
    pub passes: fn(Option<&Value>) -> bool,
}

/// Rules applied to a single field.
#[derive(Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    /// Optional fields skip every rule when absent.
    pub optional: bool,
    pub rules: &'static [Rule],
}

/// Ordered collection of field rules run against one request.
#[derive(Clone, Copy)]
pub struct RuleSet {
    pub fields: &'static [FieldRules],
}

impl RuleSet {
    pub fn check(&self, input: &Fields) -> Result<(), ValidationFailure> {
        let mut failure = ValidationFailure::default();

        for spec in self.fields {
            let value = input.get(spec.field);
            if value.is_none() && spec.optional {
                continue;
            }
            if let Some(rule) = spec.rules.iter().find(|rule| !(rule.passes)(value)) {
                failure.errors.push(FieldError {
                    field: spec.field.to_string(),
                    message: rule.message.to_string(),
                });
            }
        }

        failure.into_result()
    }
}

const EXISTS: Rule = Rule {
    message: MISSING,
    passes: |value| value.is_some(),
};

const NOT_EMPTY: Rule = Rule {
    message: EMPTY,
    passes: |value| value.is_some_and(|value| !is_blank(value)),
};

const TEXT: Rule = Rule {
    message: STRINGS_ONLY,
    passes: |value| value.is_some_and(|value| text_of(value).is_some()),
};

const INTEGER: Rule = Rule {
    message: INTEGERS_ONLY,
    passes: |value| value.is_some_and(|value| integer_of(value).is_some()),
};

const TEXT_RULES: &[Rule] = &[EXISTS, NOT_EMPTY, TEXT];
const INTEGER_RULES: &[Rule] = &[EXISTS, NOT_EMPTY, INTEGER];

const fn field(field: &'static str, optional: bool, rules: &'static [Rule]) -> FieldRules {
    FieldRules {
        field,
        optional,
        rules,
    }
}

/// Path identifier on get, update and delete.
pub const IDENTIFIER: RuleSet = RuleSet {
    fields: &[field(ISBN, false, TEXT_RULES)],
};

/// Create body: every field required.
pub const BOOK_BODY: RuleSet = RuleSet {
    fields: &[
        field(ISBN, false, TEXT_RULES),
        field(TITLE, false, TEXT_RULES),
        field(DESCRIPTION, false, TEXT_RULES),
        field(PUBLISH_YEAR, false, INTEGER_RULES),
    ],
};

/// Update body: same rules, each field optional.
pub const BOOK_PATCH: RuleSet = RuleSet {
    fields: &[
        field(ISBN, true, TEXT_RULES),
        field(TITLE, true, TEXT_RULES),
        field(DESCRIPTION, true, TEXT_RULES),
        field(PUBLISH_YEAR, true, INTEGER_RULES),
    ],
};

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => false,
    }
}

/// Textual form of a scalar; arrays and objects have none.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Integer held by a JSON number without a fractional part, or by a decimal string.
fn integer_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn text_field(input: &Fields, name: &str) -> Result<Option<String>, ValidationFailure> {
    match input.get(name) {
        None => Ok(None),
        Some(value) => text_of(value)
            .map(Some)
            .ok_or_else(|| ValidationFailure::single(name, STRINGS_ONLY)),
    }
}

fn integer_field(input: &Fields, name: &str) -> Result<Option<i64>, ValidationFailure> {
    match input.get(name) {
        None => Ok(None),
        Some(value) => integer_of(value)
            .map(Some)
            .ok_or_else(|| ValidationFailure::single(name, INTEGERS_ONLY)),
    }
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, ValidationFailure> {
    value.ok_or_else(|| ValidationFailure::single(name, MISSING))
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

/// Validate a path identifier.
pub fn identifier(isbn: &str) -> Result<(), ValidationFailure> {
    let mut input = Fields::new();
    input.insert(ISBN.to_string(), Value::String(isbn.to_string()));
    IDENTIFIER.check(&input)
}

/// Validate a create body and extract the new record.
pub fn create_input(input: &Fields) -> Result<NewBook, ValidationFailure> {
    BOOK_BODY.check(input)?;

    Ok(NewBook {
        isbn: required(text_field(input, ISBN)?, ISBN)?,
        title: trimmed(required(text_field(input, TITLE)?, TITLE)?),
        description: trimmed(required(text_field(input, DESCRIPTION)?, DESCRIPTION)?),
        publish_year: required(integer_field(input, PUBLISH_YEAR)?, PUBLISH_YEAR)?,
    })
}

/// Validate the identifier and update body together and extract the patch.
pub fn update_input(isbn: &str, input: &Fields) -> Result<BookPatch, ValidationFailure> {
    let mut failure = ValidationFailure::default();
    if let Err(err) = identifier(isbn) {
        failure.merge(err);
    }
    if let Err(err) = BOOK_PATCH.check(input) {
        failure.merge(err);
    }
    failure.into_result()?;

    Ok(BookPatch {
        isbn: text_field(input, ISBN)?,
        title: text_field(input, TITLE)?.map(trimmed),
        description: text_field(input, DESCRIPTION)?.map(trimmed),
        publish_year: integer_field(input, PUBLISH_YEAR)?,
    })
}
