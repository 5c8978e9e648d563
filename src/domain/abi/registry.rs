//! ABI registry - immutable model of a contract's functions and custom types

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::error::AbiLoadError;
use super::types::TypeExpr;

/// A function argument or return value
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Parameter name (return values are usually unnamed)
    pub name: Option<String>,
    pub ty: TypeExpr,
}

/// A callable function declared by the ABI
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSpec {
    pub name: String,
    /// Numeric selector sent on the wire instead of the name
    pub method_index: u64,
    pub args: Vec<ParamSpec>,
    pub returns: Vec<ParamSpec>,
}

impl FunctionSpec {
    /// Human readable signature (e.g., "Approval(spenderAddr: string, newAllowance: u64) -> bool")
    pub fn signature(&self) -> String {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| match &arg.name {
                Some(name) => format!("{}: {}", name, arg.ty),
                None => arg.ty.to_string(),
            })
            .collect();
        let returns: Vec<String> = self.returns.iter().map(|r| r.ty.to_string()).collect();

        match returns.len() {
            0 => format!("{}({})", self.name, args.join(", ")),
            1 => format!("{}({}) -> {}", self.name, args.join(", "), returns[0]),
            _ => format!("{}({}) -> ({})", self.name, args.join(", "), returns.join(", ")),
        }
    }
}

/// Kind of a custom type. Only objects can be validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Object,
    Other(String),
}

/// A named field of a custom object type
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: TypeExpr,
}

/// A user-defined composite type
#[derive(Debug, Clone, PartialEq)]
pub struct CustomTypeSpec {
    pub name: String,
    pub kind: TypeKind,
    /// Declaration order is the encoding order
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Deserialize)]
struct RawAbi {
    #[serde(default)]
    functions: Vec<RawFunction>,
    #[serde(default)]
    types: Vec<RawType>,
}

#[derive(Debug, Deserialize)]
struct RawFunction {
    name: Option<String>,
    index: Option<u64>,
    #[serde(default)]
    args: Vec<RawParam>,
    #[serde(rename = "return")]
    returns: Option<Vec<RawParam>>,
}

#[derive(Debug, Deserialize)]
struct RawParam {
    name: Option<String>,
    #[serde(rename = "type")]
    ty: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawType {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    fields: Option<Vec<RawParam>>,
}

/// Registry of a contract's functions and custom types
///
/// Built once from the ABI description and never mutated afterwards, so a
/// single instance can be shared between concurrent calls.
#[derive(Debug, Default, Clone)]
pub struct AbiRegistry {
    /// Functions in declaration order
    functions: Vec<FunctionSpec>,
    /// Function position by name
    by_name: HashMap<String, usize>,
    /// Function position by method index
    by_index: HashMap<u64, usize>,
    /// Custom types by name
    types: HashMap<String, CustomTypeSpec>,
}

impl AbiRegistry {
    /// Build a registry from a parsed ABI JSON document
    pub fn load(abi: &serde_json::Value) -> Result<Self, AbiLoadError> {
        let raw: RawAbi = serde_json::from_value(abi.clone())?;
        Self::from_raw(raw)
    }

    /// Parse ABI JSON text
    pub fn from_json_str(abi: &str) -> Result<Self, AbiLoadError> {
        let raw: RawAbi = serde_json::from_str(abi)?;
        Self::from_raw(raw)
    }

    /// Read and parse an ABI file (e.g., `contract/hello_world/abi.json`)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AbiLoadError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    fn from_raw(raw: RawAbi) -> Result<Self, AbiLoadError> {
        let mut registry = Self::default();

        for (position, raw_type) in raw.types.into_iter().enumerate() {
            let custom = parse_custom_type(position, raw_type)?;
            if registry.types.contains_key(&custom.name) {
                return Err(AbiLoadError::DuplicateType(custom.name));
            }
            registry.types.insert(custom.name.clone(), custom);
        }

        for (position, raw_fn) in raw.functions.into_iter().enumerate() {
            let function = parse_function(position, raw_fn)?;
            registry.insert(function)?;
        }

        registry.check_recursive_types()?;
        for name in registry.unresolved_types() {
            tracing::warn!(ty = name, "ABI references undeclared custom type");
        }

        tracing::debug!(
            functions = registry.functions.len(),
            types = registry.types.len(),
            "loaded ABI"
        );

        Ok(registry)
    }

    fn insert(&mut self, function: FunctionSpec) -> Result<(), AbiLoadError> {
        if self.by_name.contains_key(&function.name) {
            return Err(AbiLoadError::DuplicateFunction(function.name));
        }
        if let Some(&existing) = self.by_index.get(&function.method_index) {
            return Err(AbiLoadError::DuplicateIndex {
                index: function.method_index,
                first: self.functions[existing].name.clone(),
                second: function.name,
            });
        }

        let position = self.functions.len();
        self.by_name.insert(function.name.clone(), position);
        self.by_index.insert(function.method_index, position);
        self.functions.push(function);
        Ok(())
    }

    /// Reject object types that contain themselves through plain fields.
    ///
    /// A cycle through `Array` or `Map` is fine since an empty container
    /// ends it; a cycle through plain fields has no finite value.
    fn check_recursive_types(&self) -> Result<(), AbiLoadError> {
        let mut done = HashSet::new();
        for name in self.types.keys() {
            let mut stack = Vec::new();
            self.visit_direct_fields(name, &mut stack, &mut done)?;
        }
        Ok(())
    }

    fn visit_direct_fields<'a>(
        &'a self,
        name: &'a str,
        stack: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<(), AbiLoadError> {
        if done.contains(name) {
            return Ok(());
        }
        if stack.contains(&name) {
            return Err(AbiLoadError::RecursiveType {
                ty: name.to_string(),
            });
        }
        let Some(custom) = self.types.get(name) else {
            return Ok(());
        };
        if custom.kind != TypeKind::Object {
            return Ok(());
        }

        stack.push(name);
        for field in &custom.fields {
            if let TypeExpr::Custom(next) = &field.ty {
                self.visit_direct_fields(next, stack, done)?;
            }
        }
        stack.pop();
        done.insert(name);
        Ok(())
    }

    /// Resolve a custom type by name
    pub fn resolve_custom_type(&self, name: &str) -> Option<&CustomTypeSpec> {
        self.types.get(name)
    }

    /// Look up a function by name
    pub fn function(&self, name: &str) -> Option<&FunctionSpec> {
        self.by_name.get(name).map(|&pos| &self.functions[pos])
    }

    /// Look up a function by method index
    pub fn function_by_index(&self, index: u64) -> Option<&FunctionSpec> {
        self.by_index.get(&index).map(|&pos| &self.functions[pos])
    }

    /// Get all functions in declaration order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionSpec> {
        self.functions.iter()
    }

    /// Custom type names referenced by functions or fields but never declared
    ///
    /// These load fine; calls that reach them fail with `UnsupportedType`.
    pub fn unresolved_types(&self) -> Vec<&str> {
        let params = self
            .functions
            .iter()
            .flat_map(|function| function.args.iter().chain(&function.returns))
            .map(|param| &param.ty);
        let fields = self
            .types
            .values()
            .flat_map(|custom| custom.fields.iter().map(|field| &field.ty));

        let mut names: Vec<&str> = params
            .chain(fields)
            .flat_map(|ty| ty.custom_names())
            .filter(|name| !self.types.contains_key(*name))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Get the number of declared functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the registry declares no functions
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

fn parse_function(position: usize, raw: RawFunction) -> Result<FunctionSpec, AbiLoadError> {
    let name = raw.name.ok_or_else(|| AbiLoadError::MissingField {
        item: format!("function #{}", position),
        field: "name",
    })?;
    let item = format!("function `{}`", name);

    let method_index = raw.index.ok_or_else(|| AbiLoadError::MissingField {
        item: item.clone(),
        field: "index",
    })?;
    let raw_returns = raw.returns.ok_or_else(|| AbiLoadError::MissingField {
        item: item.clone(),
        field: "return",
    })?;

    let args = raw
        .args
        .into_iter()
        .map(|param| parse_param(&item, param))
        .collect::<Result<Vec<_>, _>>()?;
    ensure_unique(&item, args.iter().filter_map(|arg| arg.name.as_deref()))?;
    let returns = raw_returns
        .into_iter()
        .map(|param| parse_param(&item, param))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FunctionSpec {
        name,
        method_index,
        args,
        returns,
    })
}

fn parse_param(item: &str, raw: RawParam) -> Result<ParamSpec, AbiLoadError> {
    let ty = raw.ty.ok_or_else(|| AbiLoadError::MissingField {
        item: match &raw.name {
            Some(name) => format!("{} param `{}`", item, name),
            None => format!("{} param", item),
        },
        field: "type",
    })?;

    Ok(ParamSpec {
        name: raw.name.filter(|n| !n.trim().is_empty()),
        ty: TypeExpr::parse(&ty)?,
    })
}

fn parse_custom_type(position: usize, raw: RawType) -> Result<CustomTypeSpec, AbiLoadError> {
    let name = raw.name.ok_or_else(|| AbiLoadError::MissingField {
        item: format!("type #{}", position),
        field: "name",
    })?;
    let item = format!("type `{}`", name);

    let kind = match raw.kind.as_deref() {
        Some("object") => TypeKind::Object,
        Some(other) => TypeKind::Other(other.to_string()),
        None => {
            return Err(AbiLoadError::MissingField {
                item,
                field: "type",
            })
        }
    };

    let raw_fields = match raw.fields {
        Some(fields) if !fields.is_empty() => fields,
        _ => return Err(AbiLoadError::MissingFields { ty: name }),
    };

    let fields = raw_fields
        .into_iter()
        .map(|field| {
            let param = parse_param(&item, field)?;
            let name = param.name.ok_or_else(|| AbiLoadError::MissingField {
                item: format!("{} field", item),
                field: "name",
            })?;
            Ok(FieldSpec { name, ty: param.ty })
        })
        .collect::<Result<Vec<_>, AbiLoadError>>()?;
    ensure_unique(&item, fields.iter().map(|field| field.name.as_str()))?;

    Ok(CustomTypeSpec { name, kind, fields })
}

/// Named args and object fields are looked up by name, so names must not repeat
fn ensure_unique<'a>(item: &str, names: impl Iterator<Item = &'a str>) -> Result<(), AbiLoadError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(AbiLoadError::DuplicateField {
                item: item.to_string(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
