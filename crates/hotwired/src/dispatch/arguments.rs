//! Calling conventions and argument binding for registered methods.

use hotwire_protocol::Params;
use serde_json::Value;

use super::errors::{ArityError, HandlerError};

/// Calling convention declared by a handler.
///
/// Every variant except [`Arity::None`] carries the declared argument names in
/// positional order. Binding checks the received params against that list
/// before the handler runs, so a mismatch never reaches handler code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Takes no arguments.
    None,
    /// Accepts an ordered sequence only.
    Positional(&'static [&'static str]),
    /// Accepts a keyed mapping only.
    Named(&'static [&'static str]),
    /// Accepts either shape.
    Flexible(&'static [&'static str]),
}

impl Arity {
    /// Declared argument names in positional order.
    #[must_use]
    pub const fn names(&self) -> &'static [&'static str] {
        match self {
            Self::None => &[],
            Self::Positional(names) | Self::Named(names) | Self::Flexible(names) => *names,
        }
    }

    const fn accepts_named(&self) -> bool {
        !matches!(self, Self::Positional(_))
    }

    const fn accepts_positional(&self) -> bool {
        !matches!(self, Self::Named(_))
    }

    /// Binds received params to this calling convention.
    ///
    /// A mapping must carry exactly the declared keys, a sequence exactly the
    /// declared number of values, and absent params are only accepted when
    /// nothing is declared. [`Arity::None`] accepts empty containers too.
    ///
    /// # Errors
    ///
    /// Returns an [`ArityError`] describing the first mismatch found.
    pub fn bind(&self, params: Params) -> Result<Arguments, ArityError> {
        let names = self.names();
        match params {
            Params::None if names.is_empty() => Ok(Arguments::empty()),
            Params::None => Err(ArityError::MissingParams {
                expected: names.len(),
            }),
            Params::Positional(values) => {
                if !self.accepts_positional() {
                    return Err(ArityError::UnsupportedConvention {
                        convention: "positional",
                    });
                }
                if values.len() != names.len() {
                    return Err(ArityError::PositionalCount {
                        expected: names.len(),
                        found: values.len(),
                    });
                }
                Ok(Arguments {
                    binding: Binding::Positional,
                    values: names.iter().copied().zip(values).collect(),
                })
            }
            Params::Named(mut map) => {
                if !self.accepts_named() {
                    return Err(ArityError::UnsupportedConvention {
                        convention: "named",
                    });
                }
                let mut values = Vec::with_capacity(names.len());
                for name in names {
                    match map.remove(*name) {
                        Some(value) => values.push((*name, value)),
                        None => return Err(ArityError::MissingNamed { name: *name }),
                    }
                }
                if let Some(unexpected) = map.keys().next() {
                    return Err(ArityError::UnexpectedNamed {
                        name: unexpected.clone(),
                    });
                }
                Ok(Arguments {
                    binding: Binding::Named,
                    values,
                })
            }
        }
    }
}

/// Shape the arguments were received in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Zero-argument call.
    Empty,
    /// Bound from an ordered sequence.
    Positional,
    /// Bound from a keyed mapping.
    Named,
}

/// Arguments bound to a handler's declared names.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    binding: Binding,
    values: Vec<(&'static str, Value)>,
}

impl Arguments {
    fn empty() -> Self {
        Self {
            binding: Binding::Empty,
            values: Vec::new(),
        }
    }

    /// Shape the arguments were received in.
    #[must_use]
    pub const fn binding(&self) -> Binding {
        self.binding
    }

    /// Number of bound arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for a zero-argument call.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bound values in declared order.
    pub fn values(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }

    /// Raw value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(declared, _)| *declared == name)
            .map(|(_, value)| value)
    }

    /// String argument bound to `name`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::InvalidArgument`] when the argument is missing
    /// or not a JSON string.
    pub fn string(&self, name: &str) -> Result<&str, HandlerError> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(name, "a string"))
    }

    /// Boolean argument bound to `name`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::InvalidArgument`] when the argument is missing
    /// or not a JSON boolean.
    pub fn boolean(&self, name: &str) -> Result<bool, HandlerError> {
        self.get(name)
            .and_then(Value::as_bool)
            .ok_or_else(|| invalid(name, "a boolean"))
    }
}

fn invalid(name: &str, expected: &'static str) -> HandlerError {
    HandlerError::InvalidArgument {
        name: name.to_owned(),
        expected,
    }
}
