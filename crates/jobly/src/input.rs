//! Input boundary: request bodies and query strings into [`FieldMap`]s.
//!
//! Every endpoint declares the fields it accepts as a slice of [`FieldSpec`].
//! Validation collects every problem it finds into a [`ValidationErrors`]
//! instead of stopping at the first, and coerces values into the
//! [`SqlValue`] variant the column expects.
//!
//! # Example
//!
//! ```ignore
//! use jobly::input::{self, JOB_UPDATE};
//!
//! let data = input::validate_body(&body, JOB_UPDATE)?;
//! let job = jobly::job::update(&client, id, &data).await?;
//! ```

use crate::changeset::{ValidationCode, ValidationError, ValidationErrors};
use crate::error::{JoblyError, JoblyResult};
use crate::validate;
use crate::value::{FieldMap, SqlValue};
use serde_json::Value;

/// What a field must look like.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// A string with at least `min_len` characters.
    Text { min_len: usize },
    /// A company handle (see [`validate::is_handle`]).
    Handle,
    /// A whole number in `min..=max`.
    Integer { min: i64, max: i64 },
    /// Any number in `min..=max`.
    Number { min: f64, max: f64 },
    Boolean,
    Email,
    Url,
}

const INT4_MAX: i64 = i32::MAX as i64;

/// One accepted field of a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            nullable: false,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            nullable: false,
        }
    }

    /// Allow an explicit `null`.
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

pub const COMPANY_NEW: &[FieldSpec] = &[
    FieldSpec::required("handle", FieldKind::Handle),
    FieldSpec::required("name", FieldKind::Text { min_len: 1 }),
    FieldSpec::required("description", FieldKind::Text { min_len: 0 }),
    FieldSpec::optional("numEmployees", FieldKind::Integer { min: 0, max: INT4_MAX }).nullable(),
    FieldSpec::optional("logoUrl", FieldKind::Url).nullable(),
];

pub const COMPANY_UPDATE: &[FieldSpec] = &[
    FieldSpec::optional("name", FieldKind::Text { min_len: 1 }),
    FieldSpec::optional("description", FieldKind::Text { min_len: 0 }),
    FieldSpec::optional("numEmployees", FieldKind::Integer { min: 0, max: INT4_MAX }).nullable(),
    FieldSpec::optional("logoUrl", FieldKind::Url).nullable(),
];

pub const COMPANY_FILTER: &[FieldSpec] = &[
    FieldSpec::optional("name", FieldKind::Text { min_len: 1 }),
    FieldSpec::optional("minEmployees", FieldKind::Integer { min: 0, max: INT4_MAX }),
    FieldSpec::optional("maxEmployees", FieldKind::Integer { min: 0, max: INT4_MAX }),
];

pub const JOB_NEW: &[FieldSpec] = &[
    FieldSpec::required("title", FieldKind::Text { min_len: 1 }),
    FieldSpec::optional("salary", FieldKind::Integer { min: 0, max: INT4_MAX }).nullable(),
    FieldSpec::optional("equity", FieldKind::Number { min: 0.0, max: 1.0 }).nullable(),
    FieldSpec::required("companyHandle", FieldKind::Handle),
];

pub const JOB_UPDATE: &[FieldSpec] = &[
    FieldSpec::optional("title", FieldKind::Text { min_len: 1 }),
    FieldSpec::optional("salary", FieldKind::Integer { min: 0, max: INT4_MAX }).nullable(),
    FieldSpec::optional("equity", FieldKind::Number { min: 0.0, max: 1.0 }).nullable(),
];

pub const JOB_FILTER: &[FieldSpec] = &[
    FieldSpec::optional("title", FieldKind::Text { min_len: 1 }),
    FieldSpec::optional("minSalary", FieldKind::Integer { min: 0, max: INT4_MAX }),
    FieldSpec::optional("maxSalary", FieldKind::Integer { min: 0, max: INT4_MAX }),
    FieldSpec::optional("hasEquity", FieldKind::Boolean),
];

pub const USER_UPDATE: &[FieldSpec] = &[
    FieldSpec::optional("firstName", FieldKind::Text { min_len: 1 }),
    FieldSpec::optional("lastName", FieldKind::Text { min_len: 1 }),
    FieldSpec::optional("email", FieldKind::Email),
    FieldSpec::optional("isAdmin", FieldKind::Boolean),
];

fn find_spec<'s>(schema: &'s [FieldSpec], name: &str) -> Option<&'s FieldSpec> {
    schema.iter().find(|spec| spec.name == name)
}

fn error(spec: &FieldSpec, code: ValidationCode, message: impl Into<String>) -> ValidationError {
    ValidationError::new(spec.name, code, message)
}

fn type_error(spec: &FieldSpec, expected: &str) -> ValidationError {
    error(
        spec,
        ValidationCode::Type,
        format!("{} must be {expected}", spec.name),
    )
}

fn expected(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Text { .. } | FieldKind::Handle | FieldKind::Email | FieldKind::Url => {
            "a string"
        }
        FieldKind::Integer { .. } => "an integer",
        FieldKind::Number { .. } => "a number",
        FieldKind::Boolean => "a boolean",
    }
}

/// Checks shared by JSON and query input once the value has the right shape.
fn check_text(spec: &FieldSpec, s: &str) -> Result<SqlValue, ValidationError> {
    match spec.kind {
        FieldKind::Text { min_len } if s.chars().count() < min_len => Err(error(
            spec,
            ValidationCode::Len,
            format!("{} must have at least {min_len} character(s)", spec.name),
        )),
        FieldKind::Handle if !validate::is_handle(s) => Err(error(
            spec,
            ValidationCode::Custom("handle".to_string()),
            format!("{} may only contain lowercase letters, digits, '-' and '_'", spec.name),
        )),
        FieldKind::Email if !validate::is_email(s) => Err(error(
            spec,
            ValidationCode::Email,
            format!("{} must be an email address", spec.name),
        )),
        FieldKind::Url if !validate::is_url(s) => Err(error(
            spec,
            ValidationCode::Url,
            format!("{} must be an absolute URL", spec.name),
        )),
        _ => Ok(SqlValue::Text(s.to_string())),
    }
}

fn check_integer(spec: &FieldSpec, n: i64) -> Result<SqlValue, ValidationError> {
    match spec.kind {
        FieldKind::Integer { min, max } if n < min || n > max => Err(error(
            spec,
            ValidationCode::Range,
            format!("{} must be between {min} and {max}", spec.name),
        )),
        _ => Ok(SqlValue::Int(n)),
    }
}

fn check_number(spec: &FieldSpec, value: SqlValue) -> Result<SqlValue, ValidationError> {
    let x = match value {
        SqlValue::Int(i) => i as f64,
        SqlValue::Float(f) => f,
        _ => return Err(type_error(spec, "a number")),
    };
    match spec.kind {
        FieldKind::Number { min, max } if x < min || x > max => Err(error(
            spec,
            ValidationCode::Range,
            format!("{} must be between {min} and {max}", spec.name),
        )),
        _ => Ok(value),
    }
}

fn check_json(spec: &FieldSpec, value: &Value) -> Result<SqlValue, ValidationError> {
    if value.is_null() {
        return if spec.nullable {
            Ok(SqlValue::Null)
        } else {
            Err(type_error(spec, expected(&spec.kind)))
        };
    }

    match (&spec.kind, value) {
        (
            FieldKind::Text { .. } | FieldKind::Handle | FieldKind::Email | FieldKind::Url,
            Value::String(s),
        ) => check_text(spec, s),
        (FieldKind::Integer { .. }, Value::Number(n)) => match n.as_i64() {
            Some(i) => check_integer(spec, i),
            None => Err(type_error(spec, "an integer")),
        },
        (FieldKind::Number { .. }, Value::Number(n)) => {
            let value = match n.as_i64() {
                Some(i) => SqlValue::Int(i),
                None => n
                    .as_f64()
                    .map(SqlValue::Float)
                    .ok_or_else(|| type_error(spec, "a number"))?,
            };
            check_number(spec, value)
        }
        (FieldKind::Boolean, Value::Bool(b)) => Ok(SqlValue::Bool(*b)),
        (kind, _) => Err(type_error(spec, expected(kind))),
    }
}

fn check_query(spec: &FieldSpec, value: &SqlValue) -> Result<SqlValue, ValidationError> {
    match (&spec.kind, value) {
        (FieldKind::Integer { .. }, SqlValue::Int(i)) => check_integer(spec, *i),
        (FieldKind::Integer { .. }, SqlValue::Text(s)) => match s.trim().parse::<i64>() {
            Ok(i) => check_integer(spec, i),
            Err(_) => Err(type_error(spec, "an integer")),
        },
        (FieldKind::Number { .. }, v) => match v.to_number() {
            Some(n) => check_number(spec, n),
            None => Err(type_error(spec, "a number")),
        },
        (FieldKind::Boolean, SqlValue::Bool(b)) => Ok(SqlValue::Bool(*b)),
        (FieldKind::Boolean, SqlValue::Text(s)) => match s.as_str() {
            "true" => Ok(SqlValue::Bool(true)),
            "false" => Ok(SqlValue::Bool(false)),
            _ => Err(type_error(spec, "true or false")),
        },
        (
            FieldKind::Text { .. } | FieldKind::Handle | FieldKind::Email | FieldKind::Url,
            SqlValue::Text(s),
        ) => check_text(spec, s),
        (kind, _) => Err(type_error(spec, expected(kind))),
    }
}

/// Flag required fields absent from the input. A field that was supplied but
/// failed its own check is not also reported as missing.
fn missing_required(
    schema: &[FieldSpec],
    supplied: impl Fn(&str) -> bool,
    errs: &mut ValidationErrors,
) {
    for spec in schema.iter().filter(|s| s.required) {
        if !supplied(spec.name) {
            errs.push(error(
                spec,
                ValidationCode::Required,
                format!("{} is required", spec.name),
            ));
        }
    }
}

fn additional(name: &str) -> ValidationError {
    ValidationError::new(
        name,
        ValidationCode::Additional,
        format!("{name} is not allowed"),
    )
}

/// Validate a JSON request body against `schema`.
///
/// The body must be an object. Key order is preserved in the returned map.
/// Values must already have the right JSON type; `"salary": "10000"` is a
/// type error, not a number.
pub fn validate_body(body: &Value, schema: &[FieldSpec]) -> JoblyResult<FieldMap> {
    let Some(obj) = body.as_object() else {
        let mut errs = ValidationErrors::default();
        errs.push(ValidationError::new(
            "",
            ValidationCode::Type,
            "request body must be a JSON object",
        ));
        return Err(JoblyError::Invalid(errs));
    };

    let mut errs = ValidationErrors::default();
    let mut out = FieldMap::new();

    for (key, value) in obj {
        match find_spec(schema, key) {
            None => errs.push(additional(key)),
            Some(spec) => match check_json(spec, value) {
                Ok(v) => out.insert(key.as_str(), v),
                Err(e) => errs.push(e),
            },
        }
    }

    missing_required(schema, |name| obj.contains_key(name), &mut errs);
    errs.into_result()?;
    Ok(out)
}

/// Validate query-string filters against `schema`, coercing text values into
/// integers and booleans where the schema says so.
pub fn validate_query(query: &FieldMap, schema: &[FieldSpec]) -> JoblyResult<FieldMap> {
    let mut errs = ValidationErrors::default();
    let mut out = FieldMap::new();

    for (key, value) in query.iter() {
        match find_spec(schema, key) {
            None => errs.push(additional(key)),
            Some(spec) => match check_query(spec, value) {
                Ok(v) => out.insert(key, v),
                Err(e) => errs.push(e),
            },
        }
    }

    missing_required(schema, |name| query.contains_key(name), &mut errs);
    errs.into_result()?;
    Ok(out)
}

/// Parse and validate `GET /companies` query parameters.
///
/// Also rejects `minEmployees` greater than `maxEmployees`.
pub fn parse_company_filter(query_string: &str) -> JoblyResult<FieldMap> {
    let filters = validate_query(&FieldMap::from_query_string(query_string), COMPANY_FILTER)?;

    if let (Some(SqlValue::Int(min)), Some(SqlValue::Int(max))) =
        (filters.get("minEmployees"), filters.get("maxEmployees"))
    {
        if min > max {
            return Err(JoblyError::validation(
                "minEmployees cannot be greater than maxEmployees",
            ));
        }
    }
    Ok(filters)
}

/// Parse and validate `GET /jobs` query parameters.
pub fn parse_job_filter(query_string: &str) -> JoblyResult<FieldMap> {
    validate_query(&FieldMap::from_query_string(query_string), JOB_FILTER)
}
