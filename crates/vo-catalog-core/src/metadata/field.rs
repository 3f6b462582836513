//! Per-column metadata.
//!
//! A [`FieldMetadata`] mirrors the attributes of a VOTable `FIELD` element.
//! Its declared [`VoDatatype`] decides the Arrow type of the matching column
//! in a table's schema frame.

use std::{fmt, sync::Arc};

use arrow::datatypes::{DataType, Field, FieldRef};
use serde::{Deserialize, Deserializer, Serialize};

use crate::metadata::units::{self, Unit};

/// Declared VOTable datatype of a column.
///
/// Unrecognized datatypes are kept verbatim in [`VoDatatype::Other`] so they
/// survive a JSON round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VoDatatype {
    /// `char`
    Char,
    /// `unicodeChar`
    UnicodeChar,
    /// `double`
    Double,
    /// `float`
    Float,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `short`
    Short,
    /// `boolean`
    Boolean,
    /// Any other datatype string.
    Other(String),
}

impl VoDatatype {
    /// Classify a datatype string. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "char" => VoDatatype::Char,
            "unicodeChar" => VoDatatype::UnicodeChar,
            "double" => VoDatatype::Double,
            "float" => VoDatatype::Float,
            "int" => VoDatatype::Int,
            "long" => VoDatatype::Long,
            "short" => VoDatatype::Short,
            "boolean" => VoDatatype::Boolean,
            other => VoDatatype::Other(other.to_string()),
        }
    }

    /// The VOTable spelling.
    pub fn as_str(&self) -> &str {
        match self {
            VoDatatype::Char => "char",
            VoDatatype::UnicodeChar => "unicodeChar",
            VoDatatype::Double => "double",
            VoDatatype::Float => "float",
            VoDatatype::Int => "int",
            VoDatatype::Long => "long",
            VoDatatype::Short => "short",
            VoDatatype::Boolean => "boolean",
            VoDatatype::Other(s) => s,
        }
    }

    /// Arrow column type for this datatype. Total: anything unrecognized is
    /// stored as UTF-8 text.
    pub fn column_type(&self) -> DataType {
        match self {
            VoDatatype::Double => DataType::Float64,
            VoDatatype::Float => DataType::Float32,
            VoDatatype::Int => DataType::Int32,
            VoDatatype::Long => DataType::Int64,
            VoDatatype::Short => DataType::Int16,
            VoDatatype::Boolean => DataType::Boolean,
            VoDatatype::Char | VoDatatype::UnicodeChar | VoDatatype::Other(_) => DataType::Utf8,
        }
    }
}

impl Default for VoDatatype {
    fn default() -> Self {
        VoDatatype::Other(String::new())
    }
}

impl From<String> for VoDatatype {
    fn from(value: String) -> Self {
        VoDatatype::parse(&value)
    }
}

impl From<VoDatatype> for String {
    fn from(value: VoDatatype) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for VoDatatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw column descriptor as returned by a remote service.
///
/// Every attribute is optional on the wire; [`FieldMetadata::from_descriptor`]
/// normalizes missing values to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// `name` attribute.
    pub name: Option<String>,
    /// `datatype` attribute.
    pub datatype: Option<String>,
    /// `DESCRIPTION` child text.
    pub description: Option<String>,
    /// `unit` attribute (unparsed).
    pub unit: Option<String>,
    /// `ucd` attribute.
    pub ucd: Option<String>,
    /// `arraysize` attribute.
    pub arraysize: Option<String>,
    /// `xtype` attribute.
    pub xtype: Option<String>,
    /// `ref` attribute.
    pub reference: Option<String>,
}

/// Metadata describing one column of a catalog table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Column name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Declared VOTable datatype.
    #[serde(default, deserialize_with = "datatype_or_empty")]
    pub datatype: VoDatatype,
    /// Free-text description.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Physical unit, absent when the service gave none or it did not parse.
    #[serde(default, deserialize_with = "units::deserialize_lenient")]
    pub unit: Option<Unit>,
    /// Unified Content Descriptor.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ucd: String,
    /// VOTable `arraysize`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub arraysize: String,
    /// VOTable `xtype`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub xtype: String,
    /// VOTable `ref`.
    #[serde(rename = "ref", default, deserialize_with = "null_as_empty")]
    pub reference: String,
}

impl FieldMetadata {
    /// A field with just a name and datatype; other attributes empty.
    pub fn new(name: impl Into<String>, datatype: VoDatatype) -> Self {
        FieldMetadata {
            name: name.into(),
            datatype,
            description: String::new(),
            unit: None,
            ucd: String::new(),
            arraysize: String::new(),
            xtype: String::new(),
            reference: String::new(),
        }
    }

    /// Build from a remote field descriptor.
    pub fn from_descriptor(desc: &FieldDescriptor) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        FieldMetadata {
            name: text(&desc.name),
            datatype: VoDatatype::parse(desc.datatype.as_deref().unwrap_or_default()),
            description: text(&desc.description),
            unit: desc.unit.as_deref().and_then(Unit::parse_lenient),
            ucd: text(&desc.ucd),
            arraysize: text(&desc.arraysize),
            xtype: text(&desc.xtype),
            reference: text(&desc.reference),
        }
    }

    /// Arrow type of this column (see [`VoDatatype::column_type`]).
    pub fn column_type(&self) -> DataType {
        self.datatype.column_type()
    }

    /// Nullable Arrow field for the schema frame.
    pub fn arrow_field(&self) -> FieldRef {
        Arc::new(Field::new(self.name.clone(), self.column_type(), true))
    }

    /// Value of one attribute as text, for predicate matching.
    ///
    /// An absent unit reads as the empty string.
    pub fn attr(&self, attr: FieldAttr) -> &str {
        match attr {
            FieldAttr::Name => &self.name,
            FieldAttr::Datatype => self.datatype.as_str(),
            FieldAttr::Description => &self.description,
            FieldAttr::Unit => self.unit.as_ref().map_or("", Unit::as_str),
            FieldAttr::Ucd => &self.ucd,
            FieldAttr::Arraysize => &self.arraysize,
            FieldAttr::Xtype => &self.xtype,
            FieldAttr::Ref => &self.reference,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the UCD.
    pub fn with_ucd(mut self, ucd: impl Into<String>) -> Self {
        self.ucd = ucd.into();
        self
    }

    /// Set the unit.
    pub fn with_unit(mut self, unit: Option<Unit>) -> Self {
        self.unit = unit;
        self
    }
}

/// The closed set of [`FieldMetadata`] attributes addressable as `field_<attr>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldAttr {
    /// `name`
    Name,
    /// `datatype`
    Datatype,
    /// `description`
    Description,
    /// `unit`
    Unit,
    /// `ucd`
    Ucd,
    /// `arraysize`
    Arraysize,
    /// `xtype`
    Xtype,
    /// `ref`
    Ref,
}

impl FieldAttr {
    /// Every attribute, in declaration order.
    pub const ALL: [FieldAttr; 8] = [
        FieldAttr::Name,
        FieldAttr::Datatype,
        FieldAttr::Description,
        FieldAttr::Unit,
        FieldAttr::Ucd,
        FieldAttr::Arraysize,
        FieldAttr::Xtype,
        FieldAttr::Ref,
    ];

    /// Look up an attribute by its (already case-folded) name.
    pub fn parse(raw: &str) -> Option<Self> {
        FieldAttr::ALL.into_iter().find(|a| a.as_str() == raw)
    }

    /// Attribute name as used in `field_<attr>` keys.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldAttr::Name => "name",
            FieldAttr::Datatype => "datatype",
            FieldAttr::Description => "description",
            FieldAttr::Unit => "unit",
            FieldAttr::Ucd => "ucd",
            FieldAttr::Arraysize => "arraysize",
            FieldAttr::Xtype => "xtype",
            FieldAttr::Ref => "ref",
        }
    }
}

impl fmt::Display for FieldAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serde helper: JSON `null` (written by older tools) reads as "".
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn datatype_or_empty<'de, D>(deserializer: D) -> Result<VoDatatype, D::Error>
where
    D: Deserializer<'de>,
{
    null_as_empty(deserializer).map(VoDatatype::from)
}
