//! Per-variable facts needed to emit C code
//!
//! An [`Entry`] wraps one [`Variable`] together with the symbol prefix and the data type table,
//! and answers questions like "what C type stores this?" or "what is its initializer?".
use objdict_common::{
    constants::data_types::{self, is_array, is_signed, is_unsigned},
    AccessType, DictObject, Value, Variable,
};

use crate::errors::UnknownDataTypeError;
use crate::type_table::{DataTypeTable, TypeInfo};
use crate::utils::{brace_list, char_literal, float_literal, hex_literal};

/// Adapter presenting a [`Variable`] in terms of its generated C code
#[derive(Clone, Copy, Debug)]
pub struct Entry<'a> {
    var: &'a Variable,
    prefix: &'a str,
    types: &'a DataTypeTable,
}

impl<'a> Entry<'a> {
    /// Create an entry for a variable
    pub fn new(var: &'a Variable, prefix: &'a str, types: &'a DataTypeTable) -> Self {
        Self { var, prefix, types }
    }

    /// The wrapped variable
    pub fn variable(&self) -> &'a Variable {
        self.var
    }

    /// Sub index of the wrapped variable
    pub fn subindex(&self) -> u8 {
        self.var.subindex
    }

    /// CANopen data type code of the wrapped variable
    pub fn data_type(&self) -> u16 {
        self.var.data_type
    }

    fn info(&self) -> Result<&'a TypeInfo, UnknownDataTypeError> {
        self.types.resolve(self.var)
    }

    /// The C storage type, or `None` for types without storage
    pub fn ctype(&self) -> Result<Option<&'a str>, UnknownDataTypeError> {
        Ok(self.info()?.ctype.as_deref())
    }

    /// Width of the data type in bits
    pub fn bits(&self) -> Result<u32, UnknownDataTypeError> {
        Ok(self.info()?.bits)
    }

    /// Returns true if the variable is stored as a C array
    pub fn is_array(&self) -> Result<bool, UnknownDataTypeError> {
        self.info()?;
        Ok(is_array(self.var.data_type))
    }

    /// The array declarator suffix: `"[]"` for array-like types, otherwise empty
    pub fn carray(&self) -> Result<&'static str, UnknownDataTypeError> {
        Ok(if self.is_array()? { "[]" } else { "" })
    }

    /// A C expression for the size of the storage in bytes
    pub fn csize(&self) -> Result<String, UnknownDataTypeError> {
        let Some(ctype) = self.ctype()? else {
            return Ok("0".to_string());
        };
        if self.is_array()? {
            let len = self
                .var
                .default
                .as_ref()
                .and_then(|v| array_elements(self.var.data_type, v))
                .map_or(0, |elements| elements.len());
            Ok(format!("{len} * sizeof({ctype})"))
        } else {
            Ok(format!("sizeof({ctype})"))
        }
    }

    /// The C identifier used for the variable's storage
    pub fn cname(&self) -> String {
        format!("{}_{:04x}sub{}", self.prefix, self.var.index, self.var.subindex)
    }

    /// Initializer literal for the storage, if a default value is set
    pub fn default_literal(&self) -> Option<String> {
        self.var.default.as_ref().map(|v| self.literal(v))
    }

    /// Literal for the lower limit, if set
    pub fn low_limit(&self) -> Option<String> {
        self.var.min.as_ref().map(|v| self.literal(v))
    }

    /// Literal for the upper limit, if set
    pub fn high_limit(&self) -> Option<String> {
        self.var.max.as_ref().map(|v| self.literal(v))
    }

    fn literal(&self, value: &Value) -> String {
        render_literal(self.var.data_type, value)
    }

    /// The attribute flags expression, e.g. `CANOPEN_OD_ATTR_ACCESS_RW | CANOPEN_OD_ATTR_RELATIVE`
    pub fn attr(&self) -> String {
        let access = self.var.access_type;
        let mut flags = vec![match access {
            AccessType::Ro => "CANOPEN_OD_ATTR_ACCESS_RO",
            AccessType::Wo => "CANOPEN_OD_ATTR_ACCESS_WO",
            AccessType::Rw | AccessType::Rwr | AccessType::Rww => "CANOPEN_OD_ATTR_ACCESS_RW",
            AccessType::Const => "CANOPEN_OD_ATTR_ACCESS_CONST",
        }];
        if self.var.pdo_mappable {
            flags.push(match access {
                AccessType::Rwr => "CANOPEN_OD_ATTR_PDO_MAPPABLE_TPDO",
                AccessType::Rww => "CANOPEN_OD_ATTR_PDO_MAPPABLE_RPDO",
                _ => "CANOPEN_OD_ATTR_PDO_MAPPABLE",
            });
        }
        if self.var.relative {
            flags.push("CANOPEN_OD_ATTR_RELATIVE");
        }
        flags.join(" | ")
    }
}

/// Element literals for the array-like types, or `None` if the value does not form an array
fn array_elements(data_type: u16, value: &Value) -> Option<Vec<String>> {
    match (data_type, value) {
        (data_types::OCTET_STRING | data_types::DOMAIN, Value::Bytes(bytes)) => {
            Some(bytes.iter().map(|b| format!("0x{b:02x}U")).collect())
        }
        (data_types::OCTET_STRING, Value::Text(s)) => {
            Some(s.bytes().map(|b| format!("0x{b:02x}U")).collect())
        }
        (data_types::UNICODE_STRING, Value::Text(s)) => {
            Some(s.encode_utf16().map(|u| format!("0x{u:04x}U")).collect())
        }
        (data_types::VISIBLE_STRING, Value::Text(s)) => Some(s.bytes().map(char_literal).collect()),
        _ => None,
    }
}

/// Render a value as a C literal according to the family of its data type
pub fn render_literal(data_type: u16, value: &Value) -> String {
    if let Some(elements) = array_elements(data_type, value) {
        return brace_list(elements);
    }
    match (data_type, value) {
        (data_types::REAL32, Value::Float(x)) => float_literal(*x, true),
        (data_types::REAL32, Value::Integer(i)) => float_literal(*i as f64, true),
        (dt, Value::Integer(i)) if is_unsigned(dt) => hex_literal(*i, true),
        (dt, Value::Integer(i)) if is_signed(dt) => hex_literal(*i, false),
        _ => value.to_string(),
    }
}

/// Iterator over the [`Entry`]s of one object
#[derive(Clone, Debug)]
pub struct ObjectEntries<'a> {
    vars: objdict_common::objects::Variables<'a>,
    prefix: &'a str,
    types: &'a DataTypeTable,
}

impl<'a> Iterator for ObjectEntries<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.vars
            .next()
            .map(|var| Entry::new(var, self.prefix, self.types))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.vars.size_hint()
    }
}

impl ExactSizeIterator for ObjectEntries<'_> {}

/// Iterate the entries of an object in ascending sub index order
///
/// Each call starts a new traversal.
pub fn object_entries<'a>(
    object: &'a DictObject,
    prefix: &'a str,
    types: &'a DataTypeTable,
) -> ObjectEntries<'a> {
    ObjectEntries {
        vars: object.variables(),
        prefix,
        types,
    }
}
