//! Loading of CANopen Electronic Data Sheets
//!
//! An EDS is an INI file describing the object dictionary of a device. This crate reads the object
//! lists (`[MandatoryObjects]`, `[OptionalObjects]` and `[ManufacturerObjects]`) and the sections
//! describing each listed object, and produces an [`ObjectDictionary`].
//!
//! ```ignore
//! let od = objdict_eds::load("device.eds")?;
//! for object in od.iter() {
//!     println!("{:04x}: {}", object.index(), object.name());
//! }
//! ```
#![warn(missing_docs, missing_debug_implementations)]

use configparser::ini::Ini;
use snafu::{ResultExt as _, Snafu};
use std::{collections::HashMap, path::Path};

use objdict_common::{
    constants::{data_types, object_codes},
    objects::InvalidAccessTypeError,
    utils::ParseEdsNum,
    AccessType, Compound, DictObject, ObjectDictionary, Value, Variable,
};

type IniMap = HashMap<String, HashMap<String, Option<String>>>;

/// The sections listing the objects present in an EDS
const OBJECT_LISTS: [&str; 3] = ["MandatoryObjects", "OptionalObjects", "ManufacturerObjects"];

/// Error returned when loading an EDS fails
#[derive(Debug, Snafu)]
pub enum LoadError {
    /// The file is not valid INI, or could not be read
    #[snafu(display("Error reading EDS: {message}"))]
    IniFormatError {
        /// Message reported by the INI parser
        message: String,
    },
    /// The file is valid INI, but the contents do not describe an object dictionary
    #[snafu(display("{message}"))]
    EdsFormatError {
        /// Description of the problem
        message: String,
    },
    /// A field which should hold an integer could not be parsed
    #[snafu(display("{message}: {source}"))]
    ParseIntError {
        /// Description of the field being parsed
        message: String,
        /// The underlying parse error
        source: std::num::ParseIntError,
    },
    /// A field which should hold a float could not be parsed
    #[snafu(display("{message}: {source}"))]
    ParseFloatError {
        /// Description of the field being parsed
        message: String,
        /// The underlying parse error
        source: std::num::ParseFloatError,
    },
    /// A field which should hold hex encoded bytes could not be parsed
    #[snafu(display("{message}: {source}"))]
    ParseHexError {
        /// Description of the field being parsed
        message: String,
        /// The underlying decode error
        source: hex::FromHexError,
    },
    /// An AccessType field holds an unknown value
    #[snafu(display("{message}: {source}"))]
    AccessTypeError {
        /// Description of the field being parsed
        message: String,
        /// The underlying parse error
        source: InvalidAccessTypeError,
    },
    /// The same object is listed more than once
    #[snafu(display("Multiple definitions for object with index 0x{index:x}"))]
    DuplicateObject {
        /// index which was defined multiple times
        index: u16,
    },
}

struct Section<'a> {
    map: &'a HashMap<String, Option<String>>,
    section: String,
}

impl<'a> Section<'a> {
    pub fn from_map(map: &'a IniMap, section: &str) -> Result<Self, LoadError> {
        match Self::from_map_opt(map, section) {
            Some(section) => Ok(section),
            None => EdsFormatSnafu {
                message: format!("Missing required section '{}'", section),
            }
            .fail(),
        }
    }

    pub fn from_map_opt(map: &'a IniMap, section: &str) -> Option<Self> {
        map.get(&section.to_lowercase()).map(|section_map| Self {
            map: section_map,
            section: section.to_string(),
        })
    }

    /// Read an optional field as a string
    ///
    /// Empty fields are treated as missing
    pub fn get_string_opt(&self, field: &str) -> Option<&'a str> {
        self.map
            .get(&field.to_lowercase())
            .and_then(|value| value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn get_string(&self, field: &str) -> Result<&'a str, LoadError> {
        match self.get_string_opt(field) {
            Some(value) => Ok(value),
            None => EdsFormatSnafu {
                message: format!("Missing required field '{}' in '{}'", field, self.section),
            }
            .fail(),
        }
    }

    /// Read an optional field as an integer
    ///
    /// If the field is empty, None is returned. If the field has a non-empty value that is not a
    /// valid integer, it will return a LoadError::ParseIntError.
    pub fn get_int_opt(&self, field: &str) -> Result<Option<i128>, LoadError> {
        self.get_string_opt(field)
            .map(|value| self.parse_int(field, value))
            .transpose()
    }

    pub fn get_int(&self, field: &str) -> Result<i128, LoadError> {
        self.parse_int(field, self.get_string(field)?)
    }

    fn parse_int(&self, field: &str, value: &str) -> Result<i128, LoadError> {
        value.parse_eds_int().context(ParseIntSnafu {
            message: format!("Parsing '{}' in section '{}'", field, self.section),
        })
    }

    /// Read an integer field which must fit into type T
    pub fn get_int_as<T: TryFrom<i128>>(&self, field: &str) -> Result<T, LoadError> {
        let value = self.get_int(field)?;
        T::try_from(value).map_err(|_| {
            EdsFormatSnafu {
                message: format!(
                    "Value {} of '{}' in section '{}' is out of range",
                    value, field, self.section
                ),
            }
            .build()
        })
    }

    pub fn get_bool_opt(&self, field: &str) -> Result<Option<bool>, LoadError> {
        // Boolean is stored as 0 or 1
        Ok(self.get_int_opt(field)?.map(|value| value != 0))
    }
}

/// Remove a `$NODEID` term, together with the `+` joining it to the rest of the expression
///
/// Returns None if the value does not contain a `$NODEID` term.
fn strip_node_id(value: &str) -> Option<String> {
    let upper = value.replace(' ', "").to_uppercase();
    let pos = upper.find("$NODEID")?;
    let mut before = upper[..pos].to_string();
    let mut after = &upper[pos + "$NODEID".len()..];
    if let Some(rest) = after.strip_prefix('+') {
        after = rest;
    } else if before.ends_with('+') {
        before.pop();
    }
    Some(before + after)
}

/// Convert the textual representation of a value according to the variable's data type
///
/// Returns the value, and a flag indicating whether it was expressed relative to the node ID.
fn convert_value(
    raw: &str,
    data_type: u16,
    field: &str,
    section: &str,
) -> Result<(Value, bool), LoadError> {
    let message = || format!("Parsing '{}' in section '{}'", field, section);
    match data_type {
        data_types::OCTET_STRING | data_types::DOMAIN => {
            let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = hex::decode(digits).context(ParseHexSnafu { message: message() })?;
            Ok((Value::Bytes(bytes), false))
        }
        data_types::VISIBLE_STRING | data_types::UNICODE_STRING => {
            Ok((Value::Text(raw.to_string()), false))
        }
        data_types::REAL32 | data_types::REAL64 => {
            let value: f64 = raw
                .trim()
                .parse()
                .context(ParseFloatSnafu { message: message() })?;
            Ok((Value::Float(value), false))
        }
        _ => match strip_node_id(raw) {
            Some(rest) if rest.is_empty() => Ok((Value::Integer(0), true)),
            Some(rest) => {
                let value = rest
                    .parse_eds_int()
                    .context(ParseIntSnafu { message: message() })?;
                Ok((Value::Integer(value), true))
            }
            None => {
                let value = raw
                    .parse_eds_int()
                    .context(ParseIntSnafu { message: message() })?;
                Ok((Value::Integer(value), false))
            }
        },
    }
}

fn get_value(
    section: &Section,
    field: &str,
    data_type: u16,
) -> Result<Option<(Value, bool)>, LoadError> {
    section
        .get_string_opt(field)
        .map(|raw| convert_value(raw, data_type, field, &section.section))
        .transpose()
}

fn get_variable(section: &Section, index: u16, subindex: u8) -> Result<Variable, LoadError> {
    let data_type = section.get_int_as::<u16>("DataType")?;
    let access_type = section
        .get_string("AccessType")?
        .parse::<AccessType>()
        .context(AccessTypeSnafu {
            message: format!("Parsing 'AccessType' in section '{}'", section.section),
        })?;

    let default = get_value(section, "DefaultValue", data_type)?;
    let min = get_value(section, "LowLimit", data_type)?;
    let max = get_value(section, "HighLimit", data_type)?;

    Ok(Variable {
        index,
        subindex,
        name: section
            .get_string_opt("ParameterName")
            .unwrap_or_default()
            .to_string(),
        data_type,
        access_type,
        pdo_mappable: section.get_bool_opt("PDOMapping")?.unwrap_or(false),
        relative: default.as_ref().is_some_and(|(_, relative)| *relative),
        min: min.map(|(value, _)| value),
        max: max.map(|(value, _)| value),
        default: default.map(|(value, _)| value),
    })
}

/// Build the members of an array object defined with `CompactSubObj`
///
/// Sub 0 holds the number of elements; the elements take their description from the object
/// section itself.
fn get_compact_array(
    section: &Section,
    index: u16,
    name: &str,
    count: u8,
) -> Result<Compound, LoadError> {
    let mut array = Compound::new(index, name);
    array.insert(
        Variable::new(index, 0, "NrOfObjects", data_types::UNSIGNED8)
            .access(AccessType::Ro)
            .default_value(Value::Integer(count as i128)),
    );
    for subindex in 1..=count {
        let mut var = get_variable(section, index, subindex)?;
        var.name = format!("{}{}", name, subindex);
        array.insert(var);
    }
    Ok(array)
}

fn read_object(map: &IniMap, index: u16) -> Result<DictObject, LoadError> {
    let obj_section = Section::from_map(map, &format!("{:04x}", index))?;
    let name = obj_section
        .get_string_opt("ParameterName")
        .unwrap_or_default()
        .to_string();
    let object_type = match obj_section.get_string_opt("ObjectType") {
        Some(_) => obj_section.get_int_as::<u8>("ObjectType")?,
        None => object_codes::VAR,
    };

    match object_type {
        object_codes::VAR | object_codes::DOMAIN => {
            // The top level section describes both the object and its only sub-object
            Ok(DictObject::Variable(get_variable(&obj_section, index, 0)?))
        }
        object_codes::ARRAY | object_codes::RECORD | object_codes::DEFSTRUCT => {
            let compact = obj_section.get_int_opt("CompactSubObj")?.unwrap_or(0);
            let compound = if compact != 0 && object_type == object_codes::ARRAY {
                let count = obj_section.get_int_as::<u8>("CompactSubObj")?;
                get_compact_array(&obj_section, index, &name, count)?
            } else {
                let mut compound = Compound::new(index, name);
                for subindex in 0..=u8::MAX {
                    // Not all subs are necessarily defined; e.g. there may be a sub1 and a sub3,
                    // but no sub2
                    let section_name = format!("{:04x}sub{:x}", index, subindex);
                    if let Some(sub_section) = Section::from_map_opt(map, &section_name) {
                        compound.insert(get_variable(&sub_section, index, subindex)?);
                    }
                }
                compound
            };
            if object_type == object_codes::ARRAY {
                Ok(DictObject::Array(compound))
            } else {
                Ok(DictObject::Record(compound))
            }
        }
        _ => EdsFormatSnafu {
            message: format!(
                "Unsupported ObjectType {:#x} on object {:04x}",
                object_type, index
            ),
        }
        .fail(),
    }
}

fn read_object_list(map: &IniMap, name: &str) -> Result<Vec<u16>, LoadError> {
    let Some(top_section) = Section::from_map_opt(map, name) else {
        log::debug!("EDS has no [{name}] section");
        return Ok(Vec::new());
    };
    let num_objects = top_section.get_int_as::<u16>("SupportedObjects")?;
    (1..=num_objects)
        .map(|i| top_section.get_int_as::<u16>(&i.to_string()))
        .collect()
}

/// Build an object dictionary from an already parsed INI map
///
/// Section and key names in the map must be lower case, as produced by [`Ini`].
pub fn from_config_map(map: &IniMap) -> Result<ObjectDictionary, LoadError> {
    let mut od = ObjectDictionary::new();
    for list in OBJECT_LISTS {
        for index in read_object_list(map, list)? {
            let object = read_object(map, index)?;
            log::debug!(
                "Loaded object {:04x} '{}' from [{}]",
                index,
                object.name(),
                list
            );
            if od.insert(object).is_some() {
                return DuplicateObjectSnafu { index }.fail();
            }
        }
    }
    Ok(od)
}

/// Load an object dictionary from the contents of an EDS file
pub fn load_from_str(eds: impl Into<String>) -> Result<ObjectDictionary, LoadError> {
    let mut config = Ini::new();
    let map = config
        .read(eds.into())
        .map_err(|e| IniFormatSnafu { message: e }.build())?;
    from_config_map(&map)
}

/// Load an object dictionary from an EDS file
pub fn load(path: impl AsRef<Path>) -> Result<ObjectDictionary, LoadError> {
    let mut config = Ini::new();
    let map = config
        .load(path.as_ref())
        .map_err(|e| IniFormatSnafu { message: e }.build())?;
    from_config_map(&map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertables::assert_contains;

    #[test]
    fn test_strip_node_id() {
        assert_eq!(Some("0X180".to_string()), strip_node_id("$NODEID+0x180"));
        assert_eq!(Some("0X600".to_string()), strip_node_id("0x600 + $NodeID"));
        assert_eq!(Some("".to_string()), strip_node_id("$NODEID"));
        assert_eq!(None, strip_node_id("0x180"));
    }

    #[test]
    fn test_convert_value() {
        let (value, relative) =
            convert_value("0102", data_types::OCTET_STRING, "f", "s").unwrap();
        assert_eq!(Value::Bytes(vec![1, 2]), value);
        assert!(!relative);

        let (value, _) = convert_value("01 02 ff", data_types::DOMAIN, "f", "s").unwrap();
        assert_eq!(Value::Bytes(vec![1, 2, 0xff]), value);

        let (value, _) = convert_value("3.5", data_types::REAL32, "f", "s").unwrap();
        assert_eq!(Value::Float(3.5), value);

        let (value, _) = convert_value("hi", data_types::VISIBLE_STRING, "f", "s").unwrap();
        assert_eq!(Value::Text("hi".into()), value);

        let (value, relative) =
            convert_value("$NODEID+0x180", data_types::UNSIGNED32, "f", "s").unwrap();
        assert_eq!(Value::Integer(0x180), value);
        assert!(relative);
    }

    #[test]
    fn test_convert_value_errors() {
        let err = convert_value("zz", data_types::UNSIGNED8, "DefaultValue", "2000").unwrap_err();
        assert!(matches!(err, LoadError::ParseIntError { .. }));
        assert_contains!(
            err.to_string().as_str(),
            "Parsing 'DefaultValue' in section '2000'"
        );

        let err =
            convert_value("0x1", data_types::OCTET_STRING, "DefaultValue", "2000").unwrap_err();
        assert!(matches!(err, LoadError::ParseHexError { .. }));
    }
}
