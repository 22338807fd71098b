//! Value model for mapped instances
//!
//! Instances take part in mapping through the [`Mapped`] trait: a runtime
//! type tag plus named read and write accessors. Read accessors hand out a
//! borrowed [`View`]; write accessors receive an owned [`Value`].
//!
//! Leaf values are [`Scalar`]s. They are never schema-mapped; the literal
//! codec turns them into literal (or IRI) nodes.

use super::error::{DecodeError, MappingError, MappingResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Leaf value type supporting multiple data types
///
/// Supports:
/// - String
/// - Integer (i64)
/// - Float (f64)
/// - Boolean
/// - Iri (a resource reference, written as a named node)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Iri(String),
}

impl Scalar {
    /// Kind of this scalar
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::String(_) => ScalarKind::String,
            Scalar::Integer(_) => ScalarKind::Integer,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Boolean(_) => ScalarKind::Boolean,
            Scalar::Iri(_) => ScalarKind::Iri,
        }
    }

    /// Get string value if this is a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get integer value if this is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Scalar::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get float value; integers widen
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Scalar::Float(f) => Some(*f),
            Scalar::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get boolean value if this is a boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Scalar::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get IRI if this is a resource reference
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Scalar::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Lexical form, as substituted into path templates
    pub fn lexical(&self) -> String {
        match self {
            Scalar::String(s) | Scalar::Iri(s) => s.clone(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Boolean(b) => b.to_string(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => write!(f, "\"{}\"", s),
            Scalar::Iri(iri) => write!(f, "<{}>", iri),
            other => write!(f, "{}", other.lexical()),
        }
    }
}

// Convenience conversions
impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Integer(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Integer(i as i64)
    }
}

impl From<u32> for Scalar {
    fn from(i: u32) -> Self {
        Scalar::Integer(i as i64)
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

impl From<f32> for Scalar {
    fn from(f: f32) -> Self {
        Scalar::Float(f as f64)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Boolean(b)
    }
}

/// Declared kind of a leaf value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Integer,
    Float,
    Boolean,
    Iri,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::String => "String",
            ScalarKind::Integer => "Integer",
            ScalarKind::Float => "Float",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Iri => "Iri",
        };
        write!(f, "{}", name)
    }
}

/// What a read accessor returns
#[derive(Debug, Clone)]
pub enum View<'a> {
    /// Unset optional member; writes nothing
    Absent,
    Scalar(Scalar),
    Object(&'a dyn Mapped),
    List(Vec<View<'a>>),
}

impl<'a> View<'a> {
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        View::Scalar(value.into())
    }

    pub fn object(value: &'a dyn Mapped) -> Self {
        View::Object(value)
    }

    /// `None` becomes [`View::Absent`]
    pub fn optional(value: Option<impl Into<Scalar>>) -> Self {
        match value {
            Some(v) => View::Scalar(v.into()),
            None => View::Absent,
        }
    }

    /// List of scalars
    pub fn scalars<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        View::List(values.into_iter().map(|v| View::Scalar(v.into())).collect())
    }

    /// List of mapped objects
    pub fn objects<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a T>,
        T: Mapped + 'a,
    {
        View::List(values.into_iter().map(|v| View::Object(v as &dyn Mapped)).collect())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, View::Absent)
    }
}

/// What a write accessor receives
#[derive(Debug)]
pub enum Value {
    Scalar(Scalar),
    Object(Box<dyn Mapped>),
    List(Vec<Value>),
}

impl Value {
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        Value::Scalar(value.into())
    }

    pub fn object(value: impl Mapped) -> Self {
        Value::Object(Box::new(value))
    }

    pub fn list(values: impl IntoIterator<Item = Value>) -> Self {
        Value::List(values.into_iter().collect())
    }

    /// Borrowing view, for reading the value back through an accessor
    pub fn view(&self) -> View<'_> {
        match self {
            Value::Scalar(s) => View::Scalar(s.clone()),
            Value::Object(obj) => View::Object(obj.as_ref()),
            Value::List(items) => View::List(items.iter().map(Value::view).collect()),
        }
    }

    /// Convert into a typed value
    pub fn extract<T: FromValue>(self) -> MappingResult<T> {
        T::from_value(self)
    }

    /// Unwrap a mapped object of a concrete type
    pub fn downcast<T: Mapped>(self) -> MappingResult<T> {
        let target = std::any::type_name::<T>();
        match self {
            Value::Object(obj) => {
                let found = obj.type_name().to_string();
                AsAny::into_any(obj)
                    .downcast::<T>()
                    .map(|boxed| *boxed)
                    .map_err(|_| DecodeError::new(found, target, "object type mismatch").into())
            }
            other => Err(DecodeError::new(other.describe(), target, "expected an object").into()),
        }
    }

    /// Unwrap a list of mapped objects of one concrete type
    pub fn downcast_list<T: Mapped>(self) -> MappingResult<Vec<T>> {
        match self {
            Value::List(items) => items.into_iter().map(Value::downcast).collect(),
            other => Err(DecodeError::new(other.describe(), "List", "expected a list").into()),
        }
    }

    fn describe(&self) -> String {
        match self {
            Value::Scalar(s) => s.to_string(),
            Value::Object(obj) => format!("object of type {}", obj.type_name()),
            Value::List(items) => format!("list of {} values", items.len()),
        }
    }
}

/// Conversion from a decoded [`Value`] into a field type
pub trait FromValue: Sized {
    fn from_value(value: Value) -> MappingResult<Self>;
}

fn expect_scalar(value: Value, target: &str) -> MappingResult<Scalar> {
    match value {
        Value::Scalar(s) => Ok(s),
        other => Err(DecodeError::new(other.describe(), target, "expected a scalar").into()),
    }
}

impl FromValue for Scalar {
    fn from_value(value: Value) -> MappingResult<Self> {
        expect_scalar(value, "Scalar")
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> MappingResult<Self> {
        match expect_scalar(value, "String")? {
            Scalar::String(s) | Scalar::Iri(s) => Ok(s),
            other => Ok(other.lexical()),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> MappingResult<Self> {
        let scalar = expect_scalar(value, "Integer")?;
        scalar
            .as_integer()
            .ok_or_else(|| DecodeError::new(&scalar, "Integer", "not an integer").into())
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> MappingResult<Self> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|e| DecodeError::new(wide, "i32", e.to_string()).into())
    }
}

impl FromValue for u32 {
    fn from_value(value: Value) -> MappingResult<Self> {
        let wide = i64::from_value(value)?;
        u32::try_from(wide).map_err(|e| DecodeError::new(wide, "u32", e.to_string()).into())
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> MappingResult<Self> {
        let scalar = expect_scalar(value, "Float")?;
        scalar
            .as_float()
            .ok_or_else(|| DecodeError::new(&scalar, "Float", "not a number").into())
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> MappingResult<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> MappingResult<Self> {
        let scalar = expect_scalar(value, "Boolean")?;
        scalar
            .as_boolean()
            .ok_or_else(|| DecodeError::new(&scalar, "Boolean", "not a boolean").into())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> MappingResult<Self> {
        T::from_value(value).map(Some)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> MappingResult<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(DecodeError::new(other.describe(), "List", "expected a list").into()),
        }
    }
}

/// Dynamic downcasting support for [`Mapped`] trait objects
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// An instance that can be written to and read from a triple graph
///
/// `type_name` is the runtime type tag used to look up the class mapping.
/// `get` returns `None` only for a member the type doesn't have; an unset
/// optional member is `Some(View::Absent)`.
pub trait Mapped: AsAny + fmt::Debug {
    fn type_name(&self) -> &str;

    fn get(&self, member: &str) -> Option<View<'_>>;

    fn set(&mut self, member: &str, value: Value) -> MappingResult<()>;
}

/// Error for a `get`/`set` on a member the type doesn't expose
pub fn unknown_member(type_name: &str, member: &str) -> MappingError {
    MappingError::UnknownMember {
        type_name: type_name.to_string(),
        member: member.to_string(),
    }
}

/// Instance of a type known only through its schema
///
/// Members are kept in assignment order. Every member name is accepted;
/// members never set read as [`View::Absent`].
#[derive(Debug)]
pub struct DynamicObject {
    type_name: String,
    members: IndexMap<String, Value>,
}

impl DynamicObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            members: IndexMap::new(),
        }
    }

    /// Builder-style member assignment
    pub fn with(mut self, member: impl Into<String>, value: Value) -> Self {
        self.members.insert(member.into(), value);
        self
    }

    pub fn insert(&mut self, member: impl Into<String>, value: Value) -> Option<Value> {
        self.members.insert(member.into(), value)
    }

    pub fn value(&self, member: &str) -> Option<&Value> {
        self.members.get(member)
    }

    /// Scalar member shortcut
    pub fn scalar(&self, member: &str) -> Option<&Scalar> {
        match self.members.get(member) {
            Some(Value::Scalar(s)) => Some(s),
            _ => None,
        }
    }

    pub fn remove(&mut self, member: &str) -> Option<Value> {
        self.members.shift_remove(member)
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Mapped for DynamicObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn get(&self, member: &str) -> Option<View<'_>> {
        Some(self.members.get(member).map_or(View::Absent, Value::view))
    }

    fn set(&mut self, member: &str, value: Value) -> MappingResult<()> {
        self.members.insert(member.to_string(), value);
        Ok(())
    }
}
