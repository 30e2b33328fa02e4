//! # Declarative Input Schemas
//!
//! Every tool declares its input contract once, as a table of [`FieldSpec`]
//! rows (name, kind, bounds, required), and this module evaluates all of them
//! uniformly. The alternative - hand-written per-field checks in six nearly
//! identical tools - is exactly the duplication this table replaces.
//!
//! Evaluation never stops at the first problem: [`Schema::check`] walks the
//! whole table and returns every violation, so a caller can fix a request in
//! one round trip.
//!
//! ## Example
//!
//! ```rust
//! use rail_core::schema::{FieldSpec, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::new(
//!     "demo",
//!     vec![
//!         FieldSpec::float("mass_kg").greater_than(0.0),
//!         FieldSpec::choice("mode", &["Rail", "Rail+Road"]),
//!     ],
//! );
//!
//! let violations = schema.check(&json!({ "mass_kg": -1.0, "mode": "Sea" }));
//! assert_eq!(violations.len(), 2);
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{CalcError, CalcResult, FieldViolation};

/// Value shape a field must have.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// JSON number
    Float,
    /// JSON number with no fractional part
    Integer,
    /// JSON string
    Text,
    /// JSON string drawn from a fixed set
    Choice(&'static [&'static str]),
    /// JSON boolean
    Flag,
    /// JSON array of numbers; bounds apply per element
    FloatList,
    /// JSON object of integer keys to numbers; bounds apply per entry value
    NumberMap,
}

/// Inclusive or exclusive numeric bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Inclusive(f64),
    Exclusive(f64),
}

/// One row of a tool's input contract.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub min: Option<Bound>,
    pub max: Option<Bound>,
    pub required: bool,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldSpec {
            name,
            kind,
            min: None,
            max: None,
            required: true,
        }
    }

    /// Required float field
    pub fn float(name: &'static str) -> Self {
        Self::new(name, FieldKind::Float)
    }

    /// Required integer field
    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// Required free-text field
    pub fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Required string field restricted to the given options
    pub fn choice(name: &'static str, options: &'static [&'static str]) -> Self {
        Self::new(name, FieldKind::Choice(options))
    }

    /// Required boolean field
    pub fn flag(name: &'static str) -> Self {
        Self::new(name, FieldKind::Flag)
    }

    /// Required non-empty array of numbers
    pub fn float_list(name: &'static str) -> Self {
        Self::new(name, FieldKind::FloatList)
    }

    /// Required non-empty map of integer keys to numbers
    pub fn number_map(name: &'static str) -> Self {
        Self::new(name, FieldKind::NumberMap)
    }

    /// Exclusive lower bound (value must be strictly greater)
    pub fn greater_than(mut self, min: f64) -> Self {
        self.min = Some(Bound::Exclusive(min));
        self
    }

    /// Inclusive lower bound
    pub fn at_least(mut self, min: f64) -> Self {
        self.min = Some(Bound::Inclusive(min));
        self
    }

    /// Inclusive upper bound
    pub fn at_most(mut self, max: f64) -> Self {
        self.max = Some(Bound::Inclusive(max));
        self
    }

    /// Mark the field optional. Bounds still apply when a value is present;
    /// conditional presence rules live with the typed input, not the table.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn check_value(&self, value: &Value, violations: &mut Vec<FieldViolation>) {
        match self.kind {
            FieldKind::Float => {
                if let Some(x) = finite_number(value) {
                    self.check_bounds(self.name, x, violations);
                } else {
                    violations.push(self.violation(value, "must be a finite number"));
                }
            }
            FieldKind::Integer => match finite_number(value) {
                Some(x) if x.fract() == 0.0 => self.check_bounds(self.name, x, violations),
                Some(_) => violations.push(self.violation(value, "must be an integer")),
                None => violations.push(self.violation(value, "must be an integer")),
            },
            FieldKind::Text => {
                if !value.is_string() {
                    violations.push(self.violation(value, "must be a string"));
                }
            }
            FieldKind::Choice(options) => match value.as_str() {
                Some(s) if options.contains(&s) => {}
                _ => violations.push(self.violation(
                    value,
                    format!("must be one of: {}", options.join(", ")),
                )),
            },
            FieldKind::Flag => {
                if !value.is_boolean() {
                    violations.push(self.violation(value, "must be a boolean"));
                }
            }
            FieldKind::FloatList => match value.as_array() {
                Some(items) => {
                    if self.required && items.is_empty() {
                        violations.push(self.violation(value, "must not be empty"));
                    }
                    for (i, item) in items.iter().enumerate() {
                        let label = format!("{}[{}]", self.name, i);
                        if let Some(x) = finite_number(item) {
                            self.check_bounds(&label, x, violations);
                        } else {
                            violations.push(FieldViolation::new(
                                label,
                                value_string(item),
                                "must be a finite number",
                            ));
                        }
                    }
                }
                None => violations.push(self.violation(value, "must be an array of numbers")),
            },
            FieldKind::NumberMap => match value.as_object() {
                Some(entries) => {
                    if self.required && entries.is_empty() {
                        violations.push(self.violation(value, "must not be empty"));
                    }
                    for (key, item) in entries {
                        let label = format!("{}[{}]", self.name, key);
                        if key.parse::<i64>().is_err() {
                            violations.push(FieldViolation::new(
                                label,
                                value_string(item),
                                "key must be an integer",
                            ));
                            continue;
                        }
                        if let Some(x) = finite_number(item) {
                            self.check_bounds(&label, x, violations);
                        } else {
                            violations.push(FieldViolation::new(
                                label,
                                value_string(item),
                                "must be a finite number",
                            ));
                        }
                    }
                }
                None => violations.push(self.violation(value, "must be an object of numbers")),
            },
        }
    }

    fn check_bounds(&self, label: &str, x: f64, violations: &mut Vec<FieldViolation>) {
        match self.min {
            Some(Bound::Inclusive(min)) if x < min => violations.push(FieldViolation::new(
                label,
                x.to_string(),
                format!("must be at least {}", min),
            )),
            Some(Bound::Exclusive(min)) if x <= min => violations.push(FieldViolation::new(
                label,
                x.to_string(),
                format!("must be greater than {}", min),
            )),
            _ => {}
        }
        match self.max {
            Some(Bound::Inclusive(max)) if x > max => violations.push(FieldViolation::new(
                label,
                x.to_string(),
                format!("must be at most {}", max),
            )),
            Some(Bound::Exclusive(max)) if x >= max => violations.push(FieldViolation::new(
                label,
                x.to_string(),
                format!("must be less than {}", max),
            )),
            _ => {}
        }
    }

    fn violation(&self, value: &Value, constraint: impl Into<String>) -> FieldViolation {
        FieldViolation::new(self.name, value_string(value), constraint)
    }
}

fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|x| x.is_finite())
}

fn value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A tool's complete input contract.
#[derive(Debug, Clone)]
pub struct Schema {
    tool: &'static str,
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(tool: &'static str, fields: Vec<FieldSpec>) -> Self {
        Schema { tool, fields }
    }

    /// Tool identifier this schema belongs to
    pub fn tool(&self) -> &'static str {
        self.tool
    }

    /// The declared contract rows
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Evaluate every row of the table against the raw input, collecting
    /// all violations. An empty result means the table is satisfied.
    pub fn check(&self, raw: &Value) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        let Some(map) = raw.as_object() else {
            violations.push(FieldViolation::new(
                "$",
                value_string(raw),
                "request body must be a JSON object",
            ));
            return violations;
        };
        for spec in &self.fields {
            match map.get(spec.name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        violations.push(FieldViolation::new(
                            spec.name,
                            "",
                            "required field is missing",
                        ));
                    }
                }
                Some(value) => spec.check_value(value, &mut violations),
            }
        }
        violations
    }

    /// Validate the raw input against the table, then decode it into the
    /// typed input record. Fails with a Validation error carrying every
    /// violation found.
    pub fn parse<T: DeserializeOwned>(&self, raw: &Value) -> CalcResult<T> {
        let violations = self.check(raw);
        if !violations.is_empty() {
            return Err(CalcError::Validation { violations });
        }
        serde_json::from_value(raw.clone()).map_err(|e| {
            CalcError::invalid_input("$", value_string(raw), format!("request decode failed: {}", e))
        })
    }

    /// Validate an already-typed record by re-encoding it to JSON and
    /// evaluating the table, together with any cross-field violations the
    /// caller collected. Keeps typed and raw inputs on one validation path.
    pub fn validate_typed<T: Serialize>(
        &self,
        input: &T,
        extra: Vec<FieldViolation>,
    ) -> CalcResult<()> {
        let raw = serde_json::to_value(input).map_err(|e| {
            CalcError::invalid_input("$", "", format!("input encode failed: {}", e))
        })?;
        let mut violations = self.check(&raw);
        violations.extend(extra);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(CalcError::Validation { violations })
        }
    }
}
