//! Field descriptions consumed by the type resolver.
//!
//! A [`FieldDescription`] is what the struct-mapping layer hands to a dialect
//! for every mapped field: the field name, its already-parsed tag settings and
//! the [`ValueShape`] of the underlying Rust value. The value shape carries the
//! reflected [`ScalarKind`] plus two optional capabilities:
//!
//! - a *dialect type hook*: the value declares its own column type for a
//!   given dialect;
//! - a *scanner*: the value is a self-decoding wrapper around a struct whose
//!   first member holds the real scalar.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;

/// Well-known tag setting keys.
pub mod tag {
    /// Explicit column type override.
    pub const TYPE: &str = "TYPE";
    /// Requested text/binary length.
    pub const SIZE: &str = "SIZE";
    /// Not-null modifier fragment.
    pub const NOT_NULL: &str = "NOT NULL";
    /// Unique modifier fragment.
    pub const UNIQUE: &str = "UNIQUE";
    /// Default value fragment.
    pub const DEFAULT: &str = "DEFAULT";
    /// Column comment fragment.
    pub const COMMENT: &str = "COMMENT";
    /// Auto-increment switch.
    pub const AUTO_INCREMENT: &str = "AUTO_INCREMENT";
}

/// Size used for text columns when no `SIZE` tag is present.
pub const DEFAULT_SIZE: i64 = 255;

/// Reflected kind of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    /// Boolean.
    Bool,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// Pointer-sized signed integer.
    Isize,
    /// 64-bit signed integer.
    I64,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// Pointer-sized unsigned integer.
    Usize,
    /// 64-bit unsigned integer.
    U64,
    /// Single precision float.
    F32,
    /// Double precision float.
    F64,
    /// Character data.
    Text,
    /// Timestamp-shaped struct.
    Timestamp,
    /// Byte array or byte slice.
    Bytes,
    /// Any other struct.
    Struct,
    /// Anything the dialects have no mapping for.
    Custom,
}

impl ScalarKind {
    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::Isize => "isize",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::Usize => "usize",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Bytes => "bytes",
            Self::Struct => "struct",
            Self::Custom => "custom",
        }
    }

    /// Returns whether this is an integer narrower than 64 bits.
    ///
    /// Pointer-sized integers count as narrow.
    #[must_use]
    pub const fn is_narrow_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::Isize
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::Usize
        )
    }

    /// Returns whether this is a 64-bit integer.
    #[must_use]
    pub const fn is_wide_integer(self) -> bool {
        matches!(self, Self::I64 | Self::U64)
    }

    /// Returns whether this is a floating point number.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability of a value that declares its own column type.
pub trait DeclaresDialectType: Send + Sync {
    /// Returns the column type to use for `dialect`.
    ///
    /// The result replaces any explicit `TYPE` tag. An empty string lets
    /// the resolver fall back to kind-based inference.
    fn dialect_type(&self, dialect: &dyn Dialect) -> String;
}

struct DialectTypeFn<F>(F);

impl<F> DeclaresDialectType for DialectTypeFn<F>
where
    F: Fn(&dyn Dialect) -> String + Send + Sync,
{
    fn dialect_type(&self, dialect: &dyn Dialect) -> String {
        (self.0)(dialect)
    }
}

/// Shape of the value behind a field.
#[derive(Clone)]
pub struct ValueShape {
    kind: ScalarKind,
    type_name: Cow<'static, str>,
    dialect_type: Option<Arc<dyn DeclaresDialectType>>,
    scans: Option<Box<Self>>,
}

impl ValueShape {
    /// Creates a plain shape with no capabilities.
    pub fn new(kind: ScalarKind, type_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            dialect_type: None,
            scans: None,
        }
    }

    /// Returns the shape of a Rust type.
    #[must_use]
    pub fn of<T: FieldValue + ?Sized>() -> Self {
        T::shape()
    }

    /// Attaches a dialect type hook.
    #[must_use]
    pub fn with_dialect_type(mut self, hook: impl DeclaresDialectType + 'static) -> Self {
        self.dialect_type = Some(Arc::new(hook));
        self
    }

    /// Attaches a dialect type hook given as a closure.
    #[must_use]
    pub fn with_dialect_type_fn<F>(self, hook: F) -> Self
    where
        F: Fn(&dyn Dialect) -> String + Send + Sync + 'static,
    {
        self.with_dialect_type(DialectTypeFn(hook))
    }

    /// Marks this shape as a scanner wrapping `inner` as its first member.
    ///
    /// Only struct-shaped scanners are unwrapped by the resolver.
    #[must_use]
    pub fn scanning(mut self, inner: Self) -> Self {
        self.scans = Some(Box::new(inner));
        self
    }

    /// Returns the reflected kind.
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Returns the name of the value type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Asks the value for its own column type in `dialect`.
    ///
    /// Returns `None` when the value has no dialect type hook.
    #[must_use]
    pub fn declared_dialect_type(&self, dialect: &dyn Dialect) -> Option<String> {
        self.dialect_type
            .as_ref()
            .map(|hook| hook.dialect_type(dialect))
    }

    /// Returns the first member of a struct-shaped scanner.
    #[must_use]
    pub fn scanned_inner(&self) -> Option<&Self> {
        match self.kind {
            ScalarKind::Struct => self.scans.as_deref(),
            _ => None,
        }
    }

    /// Unwraps struct-shaped scanners until a non-scanner value is reached.
    #[must_use]
    pub fn innermost(&self) -> &Self {
        let mut value = self;
        while let Some(inner) = value.scanned_inner() {
            value = inner;
        }
        value
    }
}

impl fmt::Debug for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueShape")
            .field("kind", &self.kind)
            .field("type_name", &self.type_name)
            .field("dialect_type", &self.dialect_type.is_some())
            .field("scans", &self.scans)
            .finish()
    }
}

/// Rust types that can describe their own value shape.
pub trait FieldValue {
    /// Returns the shape of this type.
    fn shape() -> ValueShape;
}

macro_rules! impl_field_value {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn shape() -> ValueShape {
                    ValueShape::new(ScalarKind::$kind, std::any::type_name::<$ty>())
                }
            }
        )+
    };
}

impl_field_value!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    isize => Isize,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    usize => Usize,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => Text,
    str => Text,
    Vec<u8> => Bytes,
    chrono::NaiveDateTime => Timestamp,
);

impl<const N: usize> FieldValue for [u8; N] {
    fn shape() -> ValueShape {
        ValueShape::new(ScalarKind::Bytes, std::any::type_name::<Self>())
    }
}

impl<Tz: chrono::TimeZone> FieldValue for chrono::DateTime<Tz> {
    fn shape() -> ValueShape {
        ValueShape::new(ScalarKind::Timestamp, std::any::type_name::<Self>())
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn shape() -> ValueShape {
        T::shape()
    }
}

impl<T: FieldValue + ?Sized> FieldValue for Box<T> {
    fn shape() -> ValueShape {
        T::shape()
    }
}

/// Already-parsed tag settings of a field.
///
/// Keys are case-insensitive and stored upper-case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct TagSettings(BTreeMap<String, String>);

impl TagSettings {
    /// Creates empty tag settings.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets a tag, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_uppercase(), value.into());
    }

    /// Returns the value of a tag if it is present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.to_uppercase()).map(String::as_str)
    }

    /// Returns whether a tag is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(&key.to_uppercase())
    }

    /// Returns the number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no tags are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for TagSettings {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<TagSettings> for BTreeMap<String, String> {
    fn from(tags: TagSettings) -> Self {
        tags.0
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for TagSettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = Self::new();
        for (key, value) in iter {
            tags.set(key.as_ref(), value);
        }
        tags
    }
}

/// Everything a dialect needs to know about one mapped field.
#[derive(Debug, Clone)]
pub struct FieldDescription {
    /// Field name.
    pub name: String,
    /// Shape of the field's value.
    pub value: ValueShape,
    /// Parsed tag settings.
    pub tags: TagSettings,
    /// Whether this field is the primary key.
    pub primary_key: bool,
}

impl FieldDescription {
    /// Creates a field description with no tags.
    pub fn new(name: impl Into<String>, value: ValueShape) -> Self {
        Self {
            name: name.into(),
            value,
            tags: TagSettings::new(),
            primary_key: false,
        }
    }

    /// Creates a field description for a Rust type.
    pub fn of<T: FieldValue + ?Sized>(name: impl Into<String>) -> Self {
        Self::new(name, T::shape())
    }

    /// Sets an arbitrary tag.
    #[must_use]
    pub fn tag(mut self, key: &str, value: impl Into<String>) -> Self {
        self.tags.set(key, value);
        self
    }

    /// Sets the explicit `TYPE` override.
    #[must_use]
    pub fn type_override(self, sql_type: impl Into<String>) -> Self {
        self.tag(tag::TYPE, sql_type)
    }

    /// Sets the `SIZE` tag.
    #[must_use]
    pub fn size(self, size: i64) -> Self {
        self.tag(tag::SIZE, size.to_string())
    }

    /// Adds the `NOT NULL` modifier.
    #[must_use]
    pub fn not_null(self) -> Self {
        self.tag(tag::NOT_NULL, "NOT NULL")
    }

    /// Adds the `UNIQUE` modifier.
    #[must_use]
    pub fn unique(self) -> Self {
        self.tag(tag::UNIQUE, "UNIQUE")
    }

    /// Sets the default value fragment.
    #[must_use]
    pub fn default_value(self, value: impl Into<String>) -> Self {
        self.tag(tag::DEFAULT, value)
    }

    /// Sets the comment fragment.
    #[must_use]
    pub fn comment(self, value: impl Into<String>) -> Self {
        self.tag(tag::COMMENT, value)
    }

    /// Marks the field as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Returns the explicit `TYPE` override, if any.
    #[must_use]
    pub fn explicit_type(&self) -> Option<&str> {
        self.tags.get(tag::TYPE)
    }

    /// Returns the requested size.
    ///
    /// Absent means [`DEFAULT_SIZE`]; a value that is not an integer means 0.
    #[must_use]
    pub fn requested_size(&self) -> i64 {
        self.tags
            .get(tag::SIZE)
            .map_or(DEFAULT_SIZE, |size| size.parse().unwrap_or(0))
    }

    /// Returns a modifier fragment, or `""` when the tag is absent.
    #[must_use]
    pub fn modifier(&self, key: &str) -> &str {
        self.tags.get(key).unwrap_or_default()
    }
}
