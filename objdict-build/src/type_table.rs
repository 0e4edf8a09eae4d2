//! Mapping from CANopen data type codes to C storage types
//!
//! A [`DataTypeTable`] is built once, from the built-in CANopen types plus any user supplied
//! [`TypeDefinition`]s, and is then only read during code generation.
use std::collections::BTreeMap;
use std::str::FromStr;

use objdict_common::{constants::data_types, utils::ParseEdsNum, Variable};
use snafu::{OptionExt, ResultExt};

use crate::errors::*;

/// The C representation of a data type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    /// The C type used for storage, or `None` if the type has no storage (e.g. DOMAIN)
    pub ctype: Option<String>,
    /// Width of the type in bits
    pub bits: u32,
}

impl TypeInfo {
    /// Create a type with C storage
    pub fn new(ctype: impl Into<String>, bits: u32) -> Self {
        Self {
            ctype: Some(ctype.into()),
            bits,
        }
    }

    /// Create a type without C storage
    pub fn none(bits: u32) -> Self {
        Self { ctype: None, bits }
    }
}

const BUILTIN_TYPES: [(u16, Option<&str>, u32); 25] = [
    (data_types::BOOLEAN, Some("bool"), 1),
    (data_types::INTEGER8, Some("int8_t"), 8),
    (data_types::INTEGER16, Some("int16_t"), 16),
    (data_types::INTEGER32, Some("int32_t"), 32),
    (data_types::UNSIGNED8, Some("uint8_t"), 8),
    (data_types::UNSIGNED16, Some("uint16_t"), 16),
    (data_types::UNSIGNED32, Some("uint32_t"), 32),
    (data_types::REAL32, Some("float"), 32),
    (data_types::VISIBLE_STRING, Some("char"), 8),
    (data_types::OCTET_STRING, Some("uint8_t"), 8),
    (data_types::UNICODE_STRING, Some("uint16_t"), 16),
    (data_types::TIME_OF_DAY, Some("uint64_t"), 48),
    (data_types::TIME_DIFFERENCE, Some("uint64_t"), 48),
    (data_types::DOMAIN, None, 0),
    (data_types::INTEGER24, Some("int32_t"), 24),
    (data_types::REAL64, Some("double"), 64),
    (data_types::INTEGER40, Some("int64_t"), 40),
    (data_types::INTEGER48, Some("int64_t"), 48),
    (data_types::INTEGER56, Some("int64_t"), 56),
    (data_types::INTEGER64, Some("int64_t"), 64),
    (data_types::UNSIGNED24, Some("uint32_t"), 24),
    (data_types::UNSIGNED40, Some("uint64_t"), 40),
    (data_types::UNSIGNED48, Some("uint64_t"), 48),
    (data_types::UNSIGNED56, Some("uint64_t"), 56),
    (data_types::UNSIGNED64, Some("uint64_t"), 64),
];

/// Immutable lookup table from data type code to [`TypeInfo`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataTypeTable {
    types: BTreeMap<u16, TypeInfo>,
}

impl DataTypeTable {
    /// Start building a table, pre-populated with the built-in CANopen types
    pub fn builder() -> DataTypeTableBuilder {
        DataTypeTableBuilder::new()
    }

    /// Lookup a data type code
    pub fn get(&self, code: u16) -> Option<&TypeInfo> {
        self.types.get(&code)
    }

    /// Lookup the data type of a variable
    pub fn resolve(&self, var: &Variable) -> Result<&TypeInfo, UnknownDataTypeError> {
        self.get(var.data_type).ok_or(UnknownDataTypeError {
            index: var.index,
            subindex: var.subindex,
            data_type: var.data_type,
        })
    }

    /// The number of known data types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if the table contains no types
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for DataTypeTable {
    fn default() -> Self {
        DataTypeTableBuilder::new().build()
    }
}

/// Builder for a [`DataTypeTable`]
///
/// Definitions are applied in order, and a later definition of a code replaces any earlier one,
/// including the built-in definition.
#[derive(Clone, Debug)]
pub struct DataTypeTableBuilder {
    types: BTreeMap<u16, TypeInfo>,
}

impl Default for DataTypeTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DataTypeTableBuilder {
    /// Create a builder holding the built-in types
    pub fn new() -> Self {
        let types = BUILTIN_TYPES
            .iter()
            .map(|&(code, ctype, bits)| {
                (
                    code,
                    TypeInfo {
                        ctype: ctype.map(String::from),
                        bits,
                    },
                )
            })
            .collect();
        Self { types }
    }

    /// Add or replace the definition of a data type code
    pub fn define(mut self, code: u16, ctype: Option<String>, bits: u32) -> Self {
        if let Some(old) = self.types.insert(code, TypeInfo { ctype, bits }) {
            log::debug!("Overriding data type 0x{code:04x} (was {old:?})");
        }
        self
    }

    /// Apply a sequence of definitions, in order
    pub fn define_all(self, defs: impl IntoIterator<Item = TypeDefinition>) -> Self {
        defs.into_iter()
            .fold(self, |builder, def| builder.define(def.code, def.ctype, def.bits))
    }

    /// Freeze the table
    pub fn build(self) -> DataTypeTable {
        DataTypeTable { types: self.types }
    }
}

/// A user supplied data type, parsed from `CODE:CTYPE:BITS`
///
/// CODE and BITS accept decimal or `0x`/`0o`/`0b` prefixed integers. An empty CTYPE (e.g.
/// `0x99::0`) declares a type without C storage; `None` is accepted as an alias.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDefinition {
    /// The data type code
    pub code: u16,
    /// The C storage type
    pub ctype: Option<String>,
    /// Width in bits
    pub bits: u32,
}

impl FromStr for TypeDefinition {
    type Err = TypeDefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        let [code, ctype, bits] = fields[..] else {
            return FieldCountSnafu { definition: s }.fail();
        };

        let code = parse_field(code, "code", s)?;
        let bits = parse_field(bits, "bits", s)?;
        let ctype = match ctype.trim() {
            "" | "None" => None,
            other => Some(other.to_string()),
        };

        Ok(TypeDefinition { code, ctype, bits })
    }
}

fn parse_field<T: TryFrom<i128>>(
    field: &str,
    name: &'static str,
    definition: &str,
) -> Result<T, TypeDefinitionError> {
    let value = field.parse_eds_int().context(ParseFieldSnafu {
        field: name,
        definition,
    })?;
    T::try_from(value).ok().context(OutOfRangeSnafu {
        field: name,
        value,
        definition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertables::assert_contains;

    #[test]
    fn test_builtin_types() {
        let expected: [(u16, Option<&str>, u32); 25] = [
            (0x0001, Some("bool"), 1),
            (0x0002, Some("int8_t"), 8),
            (0x0003, Some("int16_t"), 16),
            (0x0004, Some("int32_t"), 32),
            (0x0005, Some("uint8_t"), 8),
            (0x0006, Some("uint16_t"), 16),
            (0x0007, Some("uint32_t"), 32),
            (0x0008, Some("float"), 32),
            (0x0009, Some("char"), 8),
            (0x000a, Some("uint8_t"), 8),
            (0x000b, Some("uint16_t"), 16),
            (0x000c, Some("uint64_t"), 48),
            (0x000d, Some("uint64_t"), 48),
            (0x000f, None, 0),
            (0x0010, Some("int32_t"), 24),
            (0x0011, Some("double"), 64),
            (0x0012, Some("int64_t"), 40),
            (0x0013, Some("int64_t"), 48),
            (0x0014, Some("int64_t"), 56),
            (0x0015, Some("int64_t"), 64),
            (0x0016, Some("uint32_t"), 24),
            (0x0018, Some("uint64_t"), 40),
            (0x0019, Some("uint64_t"), 48),
            (0x001a, Some("uint64_t"), 56),
            (0x001b, Some("uint64_t"), 64),
        ];

        let table = DataTypeTable::default();
        assert_eq!(expected.len(), table.len());
        for (code, ctype, bits) in expected {
            let var = Variable::new(0x2000, 0, "", code);
            let info = table.resolve(&var).unwrap();
            assert_eq!(ctype, info.ctype.as_deref(), "ctype of 0x{code:04x}");
            assert_eq!(bits, info.bits, "bits of 0x{code:04x}");
        }

        for code in [0x0000, 0x000e, 0x0017, 0x0099] {
            assert_eq!(None, table.get(code), "0x{code:04x} should be unknown");
        }
    }

    #[test]
    fn test_define_overrides_builtin() {
        let table = DataTypeTable::builder()
            .define(0x99, Some("my_t".into()), 24)
            .define(data_types::REAL64, Some("long double".into()), 80)
            .build();
        assert_eq!(Some(&TypeInfo::new("my_t", 24)), table.get(0x99));
        assert_eq!(Some(&TypeInfo::new("long double", 80)), table.get(data_types::REAL64));
    }

    #[test]
    fn test_last_definition_wins() {
        let defs = ["0x99:a_t:8", "0x99:b_t:16"].map(|s| s.parse::<TypeDefinition>().unwrap());
        let table = DataTypeTable::builder().define_all(defs).build();
        assert_eq!(Some(&TypeInfo::new("b_t", 16)), table.get(0x99));
    }

    #[test]
    fn test_resolve_unknown() {
        let table = DataTypeTable::default();
        let var = Variable::new(0x2000, 3, "Mystery", 0x99);
        let err = table.resolve(&var).unwrap_err();
        assert_eq!(
            UnknownDataTypeError {
                index: 0x2000,
                subindex: 3,
                data_type: 0x99
            },
            err
        );
        assert_eq!(
            "object 2000h subindex 3: unknown data type 0x0099",
            err.to_string()
        );
    }

    #[test]
    fn test_parse_type_definition() {
        assert_eq!(
            TypeDefinition {
                code: 0x99,
                ctype: Some("my_t".into()),
                bits: 24
            },
            "0x99:my_t:24".parse::<TypeDefinition>().unwrap()
        );
        assert_eq!(
            TypeDefinition {
                code: 0x100,
                ctype: None,
                bits: 0
            },
            "256:None:0".parse::<TypeDefinition>().unwrap()
        );
        assert_eq!(
            TypeDefinition {
                code: 0x99,
                ctype: None,
                bits: 0
            },
            "0x99::0".parse::<TypeDefinition>().unwrap()
        );
        assert_eq!(
            None,
            " 0x99 : : 0 ".parse::<TypeDefinition>().unwrap().ctype
        );

        let err = "0x99:my_t".parse::<TypeDefinition>().unwrap_err();
        assert_contains!(err.to_string().as_str(), "Expected CODE:CTYPE:BITS");

        let err = "zz:my_t:8".parse::<TypeDefinition>().unwrap_err();
        assert_contains!(err.to_string().as_str(), "Invalid code");

        let err = "0x10000:my_t:8".parse::<TypeDefinition>().unwrap_err();
        assert_contains!(err.to_string().as_str(), "out of range");
    }
}
