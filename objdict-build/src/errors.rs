//! Error types
use std::path::PathBuf;

use snafu::Snafu;

/// A variable uses a data type which is not present in the data type table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Snafu)]
#[snafu(display(
    "object {index:04x}h subindex {subindex}: unknown data type 0x{data_type:04x}"
))]
pub struct UnknownDataTypeError {
    /// Index of the offending variable
    pub index: u16,
    /// Sub index of the offending variable
    pub subindex: u8,
    /// The unregistered data type code
    pub data_type: u16,
}

/// Error returned while writing generated code
#[derive(Debug, Snafu)]
pub enum GenerateError {
    /// A variable's data type could not be resolved
    #[snafu(context(false), display("{source}"))]
    UnknownDataType {
        /// The variable and data type which failed to resolve
        source: UnknownDataTypeError,
    },
    /// Writing to the output failed
    #[snafu(context(false), display("IO error: {source}"))]
    Io {
        /// The underlying IO error
        source: std::io::Error,
    },
}

/// Error returned when a `CODE:CTYPE:BITS` type definition cannot be parsed
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TypeDefinitionError {
    /// The definition does not have exactly three `:` separated fields
    #[snafu(display("Expected CODE:CTYPE:BITS, got '{definition}'"))]
    FieldCount {
        /// The rejected definition
        definition: String,
    },
    /// CODE or BITS is not an integer
    #[snafu(display("Invalid {field} in '{definition}': {source}"))]
    ParseField {
        /// Name of the field being parsed
        field: &'static str,
        /// The rejected definition
        definition: String,
        /// The underlying parse error
        source: std::num::ParseIntError,
    },
    /// CODE or BITS does not fit its target type
    #[snafu(display("{field} {value} in '{definition}' is out of range"))]
    OutOfRange {
        /// Name of the field being parsed
        field: &'static str,
        /// The parsed value
        value: i128,
        /// The rejected definition
        definition: String,
    },
}

/// Error returned when compiling an EDS file to C sources
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
    /// The EDS could not be read or is invalid
    #[snafu(display("{source}"))]
    EdsLoad {
        /// The underlying load error
        source: objdict_eds::LoadError,
    },
    /// An output file could not be created
    #[snafu(display("Failed to create {}: {source}", path.display()))]
    CreateOutput {
        /// Path of the output file
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },
    /// Generation failed after the outputs were created
    #[snafu(context(false), display("{source}"))]
    Generate {
        /// The underlying generation error
        source: GenerateError,
    },
}
