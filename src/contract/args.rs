//! Caller-supplied arguments for a contract call

use crate::domain::abi::{AbiValue, ParamSpec};

/// Arguments for one call, by position or by name
#[derive(Debug, Clone, PartialEq)]
pub enum CallArgs {
    /// Values in the function's declared argument order
    Positional(Vec<AbiValue>),
    /// Values keyed by declared argument name
    Named(Vec<(String, AbiValue)>),
}

impl Default for CallArgs {
    fn default() -> Self {
        CallArgs::Positional(Vec::new())
    }
}

impl CallArgs {
    /// No arguments
    pub fn none() -> Self {
        Self::default()
    }

    pub fn positional(values: impl IntoIterator<Item = AbiValue>) -> Self {
        CallArgs::Positional(values.into_iter().collect())
    }

    pub fn named<K: Into<String>>(values: impl IntoIterator<Item = (K, AbiValue)>) -> Self {
        CallArgs::Named(values.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Number of supplied values
    pub fn len(&self) -> usize {
        match self {
            CallArgs::Positional(values) => values.len(),
            CallArgs::Named(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value for the declared argument at `position` named `name`
    ///
    /// `Null` counts as absent.
    pub fn get(&self, position: usize, name: Option<&str>) -> Option<&AbiValue> {
        let value = match self {
            CallArgs::Positional(values) => values.get(position),
            CallArgs::Named(values) => {
                let name = name?;
                values.iter().find(|(k, _)| k == name).map(|(_, v)| v)
            }
        };
        value.filter(|v| !v.is_null())
    }

    /// Supplied names that match no declared argument
    pub fn unknown_names<'a>(&'a self, declared: &[ParamSpec]) -> Vec<&'a str> {
        let CallArgs::Named(values) = self else {
            return Vec::new();
        };
        values
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| !declared.iter().any(|spec| spec.name.as_deref() == Some(*name)))
            .collect()
    }
}
