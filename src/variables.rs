//! Variable references (`#l<N>`, `@s<N>`, `@p<N>`, `@n<I>:<J>`) and their resolution
//! against a group's `v_arrays`.
//!
//! Tokens are parsed with a PEST grammar into [`VariableRef`]. Resolution is bounds-checked:
//! a token that does not parse, or whose index is out of range, resolves to itself.

use crate::value;
use pest::Parser;
use pest_derive::Parser as PestParser;
use serde_json::Value;

#[derive(PestParser)]
#[grammar = "variables.pest"]
struct ReferenceParser;

/// A parsed variable reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableRef {
    /// `#l<N>`: number of values in array N.
    Length(usize),
    /// `@s<N>`: values of array N, comma separated.
    Series(usize),
    /// `@p<N>`: PAR values of array N. Resolves exactly like [`VariableRef::Series`].
    ParSeries(usize),
    /// `@n<I>:<J>`: value J of array I.
    ScalarAt(usize, usize),
}

impl VariableRef {
    /// Parse a whole token. Returns `None` for anything that is not exactly one reference.
    pub fn parse(token: &str) -> Option<Self> {
        let reference = ReferenceParser::parse(Rule::reference, token).ok()?.next()?;
        let kind = reference.into_inner().next()?;
        let rule = kind.as_rule();
        let mut indices = kind.into_inner().map(|p| p.as_str().parse::<usize>());
        let first = indices.next()?.ok()?;
        match rule {
            Rule::length => Some(VariableRef::Length(first)),
            Rule::series => Some(VariableRef::Series(first)),
            Rule::par_series => Some(VariableRef::ParSeries(first)),
            Rule::scalar_at => {
                let second = indices.next()?.ok()?;
                Some(VariableRef::ScalarAt(first, second))
            }
            _ => None,
        }
    }

    /// Index of the variable array the reference points into.
    pub fn array_index(&self) -> usize {
        match *self {
            VariableRef::Length(n) | VariableRef::Series(n) | VariableRef::ParSeries(n) => n,
            VariableRef::ScalarAt(n, _) => n,
        }
    }
}

/// The variable arrays of one protocol group.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableArrays<'a> {
    arrays: &'a [Value],
}

impl<'a> VariableArrays<'a> {
    pub fn new(arrays: &'a [Value]) -> Self {
        VariableArrays { arrays }
    }

    /// Variable arrays of a group (`v_arrays`); empty when absent or not an array.
    pub fn of_group(group: &'a Value) -> Self {
        group
            .get("v_arrays")
            .and_then(Value::as_array)
            .map(|a| VariableArrays::new(a.as_slice()))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    fn array(&self, index: usize) -> Option<&'a [Value]> {
        self.arrays.get(index)?.as_array().map(Vec::as_slice)
    }

    /// Value of a reference, or `None` when an index is out of range.
    pub fn lookup(&self, reference: VariableRef) -> Option<Value> {
        match reference {
            VariableRef::Length(n) => self.array(n).map(|a| Value::from(a.len())),
            VariableRef::Series(n) | VariableRef::ParSeries(n) => {
                self.array(n).map(|a| Value::String(value::join(a)))
            }
            VariableRef::ScalarAt(i, j) => self.array(i)?.get(j).cloned(),
        }
    }

    /// Resolve a value that may be a reference token; anything unresolvable is returned unchanged.
    pub fn resolve(&self, v: &Value) -> Value {
        let Some(reference) = v.as_str().and_then(VariableRef::parse) else {
            return v.clone();
        };
        match self.lookup(reference) {
            Some(resolved) => resolved,
            None => {
                tracing::trace!(token = %value::display(v), "variable reference out of range");
                v.clone()
            }
        }
    }

    /// [`VariableArrays::resolve`] rendered as annotation text.
    pub fn resolve_display(&self, v: &Value) -> String {
        value::display(&self.resolve(v))
    }
}
