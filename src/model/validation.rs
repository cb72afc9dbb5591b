use serde::{Deserialize, Serialize};
use std::fmt;

/// The schema rule a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Required,
    NonEmpty,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub rule: Rule,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, rule: Rule, message: String) -> Self {
        Self {
            field: field.to_string(),
            rule,
            message,
        }
    }
}

/// Every violation found while validating one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationErrors {
    pub entity: &'static str,
    pub violations: Vec<FieldViolation>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation failed", self.entity)?;
        for (i, violation) in self.violations.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{}{}: {}", sep, violation.field, violation.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Collects violations across fields so a record reports all of them at once.
#[derive(Debug)]
pub struct ViolationCollector {
    entity: &'static str,
    violations: Vec<FieldViolation>,
}

impl ViolationCollector {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            violations: Vec::new(),
        }
    }

    pub fn check<T>(&mut self, result: Result<T, FieldViolation>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(violation) => {
                self.violations.push(violation);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn into_errors(self) -> ValidationErrors {
        ValidationErrors {
            entity: self.entity,
            violations: self.violations,
        }
    }
}

pub fn required<T>(field: &str, value: Option<T>) -> Result<T, FieldViolation> {
    value.ok_or_else(|| {
        FieldViolation::new(field, Rule::Required, format!("Path `{}` is required.", field))
    })
}

/// Trim surrounding whitespace and reject what is left if empty.
pub fn non_empty_trimmed(field: &str, value: &str) -> Result<String, FieldViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldViolation::new(
            field,
            Rule::NonEmpty,
            format!("Path `{}` must not be empty.", field),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn required_text(field: &str, value: Option<String>) -> Result<String, FieldViolation> {
    required(field, value).and_then(|v| non_empty_trimmed(field, &v))
}

/// Match `value` exactly against the display form of each allowed variant.
pub fn one_of<T>(field: &str, value: &str, allowed: &[T]) -> Result<T, FieldViolation>
where
    T: Copy + fmt::Display,
{
    allowed
        .iter()
        .copied()
        .find(|candidate| candidate.to_string() == value)
        .ok_or_else(|| {
            let choices: Vec<String> = allowed.iter().map(|c| c.to_string()).collect();
            FieldViolation::new(
                field,
                Rule::Enum,
                format!(
                    "`{}` is not a valid value for path `{}` (expected one of: {}).",
                    value,
                    field,
                    choices.join(", ")
                ),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Flavor {
        Sweet,
        Sour,
    }

    impl fmt::Display for Flavor {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Flavor::Sweet => write!(f, "Sweet"),
                Flavor::Sour => write!(f, "Sour"),
            }
        }
    }

    #[test]
    fn test_required() {
        assert_eq!(required("name", Some(3)).unwrap(), 3);
        let err = required::<String>("name", None).unwrap_err();
        assert_eq!(err.rule, Rule::Required);
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_non_empty_trimmed() {
        assert_eq!(non_empty_trimmed("name", "  Al  ").unwrap(), "Al");
        assert_eq!(non_empty_trimmed("name", "   ").unwrap_err().rule, Rule::NonEmpty);
        assert_eq!(non_empty_trimmed("name", "").unwrap_err().rule, Rule::NonEmpty);
    }

    #[test]
    fn test_one_of() {
        let allowed = [Flavor::Sweet, Flavor::Sour];
        assert_eq!(one_of("flavor", "Sour", &allowed).unwrap(), Flavor::Sour);

        let err = one_of("flavor", "sour", &allowed).unwrap_err();
        assert_eq!(err.rule, Rule::Enum);
        assert!(err.message.contains("Sweet, Sour"));
    }

    #[test]
    fn test_collector_reports_every_field() {
        let mut collector = ViolationCollector::new("Thing");
        let a = collector.check(required_text("a", None));
        let b = collector.check(required_text("b", Some(" x ".to_string())));
        let c = collector.check(required_text("c", Some(" ".to_string())));

        assert_eq!(a, None);
        assert_eq!(b.as_deref(), Some("x"));
        assert_eq!(c, None);
        assert!(!collector.is_empty());

        let errors = collector.into_errors();
        assert_eq!(errors.violations.len(), 2);
        assert_eq!(
            errors.to_string(),
            "Thing validation failed: a: Path `a` is required., c: Path `c` must not be empty."
        );
    }
}
