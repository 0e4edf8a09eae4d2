//! Object Definitions
//!
//! An [`ObjectDictionary`] is an ordered collection of [`DictObject`]s, keyed by their 16-bit
//! index. Each object is either a single [`Variable`], or an array/record of variables keyed by
//! sub index.
use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::str::FromStr;

use snafu::Snafu;

/// Access type enum
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AccessType {
    /// Read-only
    #[default]
    Ro,
    /// Write-only
    Wo,
    /// Read-write
    Rw,
    /// Read-write, where only reads may be mapped (i.e. a TPDO source)
    Rwr,
    /// Read-write, where only writes may be mapped (i.e. an RPDO target)
    Rww,
    /// Read-only, and also will never be changed, even internally by the device
    Const,
}

impl AccessType {
    /// Returns true if an object with this access type can be read
    pub fn is_readable(&self) -> bool {
        !matches!(self, AccessType::Wo)
    }

    /// Returns true if an object with this access type can be written
    pub fn is_writable(&self) -> bool {
        matches!(
            self,
            AccessType::Wo | AccessType::Rw | AccessType::Rwr | AccessType::Rww
        )
    }
}

/// Error returned when a string does not name a known access type
#[derive(Debug, Snafu)]
#[snafu(display(
    "Invalid access type: '{value}' (allowed: 'ro', 'wo', 'rw', 'rwr', 'rww', or 'const')"
))]
pub struct InvalidAccessTypeError {
    /// The rejected string
    pub value: String,
}

impl FromStr for AccessType {
    type Err = InvalidAccessTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ro" => Ok(AccessType::Ro),
            "wo" => Ok(AccessType::Wo),
            "rw" => Ok(AccessType::Rw),
            "rwr" => Ok(AccessType::Rwr),
            "rww" => Ok(AccessType::Rww),
            "const" => Ok(AccessType::Const),
            _ => Err(InvalidAccessTypeError {
                value: s.to_string(),
            }),
        }
    }
}

/// A raw value for a default or a limit of a variable
///
/// The representation depends on the data type of the variable: integers for all integer, boolean
/// and time types, floats for REAL32/REAL64, bytes for OCTET_STRING and DOMAIN, and text for
/// VISIBLE_STRING and UNICODE_STRING.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Integer value, wide enough for both INTEGER64 and UNSIGNED64
    Integer(i128),
    /// Floating point value
    Float(f64),
    /// Byte sequence
    Bytes(Vec<u8>),
    /// Character sequence
    Text(String),
}

/// Format a float so that it always reads back as a float, e.g. `1.0` rather than `1`
pub fn format_float(value: f64) -> String {
    let s = value.to_string();
    if value.is_finite() && !s.contains('.') {
        format!("{s}.0")
    } else {
        s
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::Bytes(bytes) => {
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A single entry in the object dictionary
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variable {
    /// Index of the object this variable belongs to
    pub index: u16,
    /// Sub index of the variable
    pub subindex: u8,
    /// Human readable name
    pub name: String,
    /// CANopen data type code
    pub data_type: u16,
    /// Indicates what accesses (i.e. read/write) are allowed on the variable
    pub access_type: AccessType,
    /// Indicates whether the variable may be mapped to PDOs
    pub pdo_mappable: bool,
    /// True if the default value is relative to the node ID
    pub relative: bool,
    /// Lowest allowed value
    pub min: Option<Value>,
    /// Highest allowed value
    pub max: Option<Value>,
    /// Value assigned at startup
    pub default: Option<Value>,
}

impl Variable {
    /// Create a new read-only variable with no limits or default value
    pub fn new(index: u16, subindex: u8, name: impl Into<String>, data_type: u16) -> Self {
        Self {
            index,
            subindex,
            name: name.into(),
            data_type,
            ..Default::default()
        }
    }

    /// Convenience function to set the access type
    pub fn access(mut self, access_type: AccessType) -> Self {
        self.access_type = access_type;
        self
    }

    /// Convenience function to set the default value
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Convenience function to set both limits
    pub fn limits(mut self, min: Value, max: Value) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Convenience function to set the PDO mappable flag
    pub fn pdo_mappable(mut self, value: bool) -> Self {
        self.pdo_mappable = value;
        self
    }
}

/// An object holding multiple variables, keyed by sub index
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Compound {
    /// Object index
    pub index: u16,
    /// Human readable name
    pub name: String,
    /// Member variables, in ascending sub index order
    pub subs: BTreeMap<u8, Variable>,
}

impl Compound {
    /// Create an empty compound object
    pub fn new(index: u16, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            subs: BTreeMap::new(),
        }
    }

    /// Add a member variable, replacing any existing variable at the same sub index
    pub fn insert(&mut self, var: Variable) -> Option<Variable> {
        self.subs.insert(var.subindex, var)
    }
}

/// An object in the dictionary
#[derive(Clone, Debug, PartialEq)]
pub enum DictObject {
    /// A single value, stored at sub index 0
    Variable(Variable),
    /// A set of sub-objects which share a data type
    Array(Compound),
    /// A set of sub-objects with individual data types
    Record(Compound),
}

impl DictObject {
    /// The 16-bit index of the object
    pub fn index(&self) -> u16 {
        match self {
            DictObject::Variable(var) => var.index,
            DictObject::Array(c) | DictObject::Record(c) => c.index,
        }
    }

    /// The name of the object
    pub fn name(&self) -> &str {
        match self {
            DictObject::Variable(var) => &var.name,
            DictObject::Array(c) | DictObject::Record(c) => &c.name,
        }
    }

    /// Iterate over the variables in this object, in ascending sub index order
    ///
    /// Each call returns a new iterator starting from the lowest sub index.
    pub fn variables(&self) -> Variables<'_> {
        let inner = match self {
            DictObject::Variable(var) => VariablesInner::Single(std::iter::once(var)),
            DictObject::Array(c) | DictObject::Record(c) => VariablesInner::Many(c.subs.values()),
        };
        Variables { inner }
    }
}

/// Iterator over the variables contained in a [`DictObject`]
#[derive(Clone, Debug)]
pub struct Variables<'a> {
    inner: VariablesInner<'a>,
}

#[derive(Clone, Debug)]
enum VariablesInner<'a> {
    Single(std::iter::Once<&'a Variable>),
    Many(btree_map::Values<'a, u8, Variable>),
}

impl<'a> Iterator for Variables<'a> {
    type Item = &'a Variable;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            VariablesInner::Single(it) => it.next(),
            VariablesInner::Many(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            VariablesInner::Single(it) => it.size_hint(),
            VariablesInner::Many(it) => it.size_hint(),
        }
    }
}

impl ExactSizeIterator for Variables<'_> {}

/// A complete object dictionary
///
/// Objects are kept in ascending index order, which is also the order in which they are iterated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectDictionary {
    objects: BTreeMap<u16, DictObject>,
}

impl ObjectDictionary {
    /// Create an empty object dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object, returning the previous object stored at the same index, if any
    pub fn insert(&mut self, object: DictObject) -> Option<DictObject> {
        self.objects.insert(object.index(), object)
    }

    /// Get an object by index
    pub fn get(&self, index: u16) -> Option<&DictObject> {
        self.objects.get(&index)
    }

    /// Iterate over all objects in ascending index order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &DictObject> {
        self.objects.values()
    }

    /// The number of objects in the dictionary
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the dictionary holds no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl FromIterator<DictObject> for ObjectDictionary {
    fn from_iter<T: IntoIterator<Item = DictObject>>(iter: T) -> Self {
        let mut od = ObjectDictionary::new();
        for object in iter {
            od.insert(object);
        }
        od
    }
}
