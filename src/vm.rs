use crate::errors::SchemaError;
use crate::path::{Path, Segment};
use crate::report::ErrorReport;
use crate::rules::MUST_NOT_BE_EMPTY;
use crate::schema::{Schema, Slot, Type};
use crate::value::Value;
use tracing::warn;

pub fn validate(max_depth: usize, schema: &Schema, instance: &Value) -> Result<ErrorReport, SchemaError> {
    let mut vm = Vm {
        max_depth,
        path: Path::root(),
        report: ErrorReport::new(),
    };

    vm.walk(schema, instance)?;
    Ok(vm.report)
}

struct Vm {
    max_depth: usize,
    path: Path,
    report: ErrorReport,
}

impl Vm {
    fn walk(&mut self, schema: &Schema, instance: &Value) -> Result<(), SchemaError> {
        if self.path.len() >= self.max_depth {
            warn!(path = %self.path, max_depth = self.max_depth, "maximum depth exceeded");
            return Err(SchemaError::TooDeep {
                path: self.path.to_string(),
            });
        }

        let map = match instance {
            Value::Map(map) => map,
            _ => {
                self.push_err(Type::Map.mismatch_message(instance));
                return Ok(());
            }
        };

        if schema.strict {
            for key in map.keys() {
                if schema.field(key).is_none() {
                    self.push_token(Segment::Key(key.clone()));
                    self.push_err("is not a known key".to_owned());
                    self.pop_token();
                }
            }
        }

        for field in &schema.fields {
            self.push_token(Segment::Key(field.name.clone()));
            match self.eval(&field.slot, map.get(&field.name))? {
                Some(Value::List(elements)) if field.slot.typ.is_list() => {
                    if let Some(element) = &field.element {
                        for (i, elem) in elements.iter().enumerate() {
                            self.push_token(Segment::Index(i));
                            self.eval(&element.slot, Some(elem))?;
                            self.pop_token();
                        }
                    }
                }
                _ => {}
            }
            self.pop_token();
        }

        Ok(())
    }

    /// Applies a slot's rules to a value at the current path, descending into
    /// the slot's schema when the value is a map of the right type. Returns
    /// the value when its type check passed, for the caller to descend
    /// further.
    fn eval<'v>(&mut self, slot: &Slot, value: Option<&'v Value>) -> Result<Option<&'v Value>, SchemaError> {
        let value = match value {
            Some(value) if !value.is_null() => value,
            _ => {
                if !slot.skips(value) {
                    self.push_err(MUST_NOT_BE_EMPTY.to_owned());
                }
                return Ok(None);
            }
        };

        if slot.skips(Some(value)) {
            return Ok(None);
        }

        for rule in &slot.rules {
            for message in rule.check(value) {
                self.push_err(message);
            }
        }

        if !slot.typ.accepts(value) {
            return Ok(None);
        }

        if let Some(schema) = slot.descent() {
            self.walk(schema, value)?;
        }

        Ok(Some(value))
    }

    fn push_token(&mut self, token: Segment) {
        self.path.push(token);
    }

    fn pop_token(&mut self) {
        self.path.pop();
    }

    fn push_err(&mut self, message: String) {
        self.report.push(&self.path, message);
    }
}
