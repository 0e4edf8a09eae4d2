//! Constants defining standard data types and object codes
//!
//!

/// Data type codes defined by CiA 301
#[allow(missing_docs)]
pub mod data_types {
    pub const BOOLEAN: u16 = 0x0001;
    pub const INTEGER8: u16 = 0x0002;
    pub const INTEGER16: u16 = 0x0003;
    pub const INTEGER32: u16 = 0x0004;
    pub const UNSIGNED8: u16 = 0x0005;
    pub const UNSIGNED16: u16 = 0x0006;
    pub const UNSIGNED32: u16 = 0x0007;
    pub const REAL32: u16 = 0x0008;
    pub const VISIBLE_STRING: u16 = 0x0009;
    pub const OCTET_STRING: u16 = 0x000A;
    pub const UNICODE_STRING: u16 = 0x000B;
    pub const TIME_OF_DAY: u16 = 0x000C;
    pub const TIME_DIFFERENCE: u16 = 0x000D;
    pub const DOMAIN: u16 = 0x000F;
    pub const INTEGER24: u16 = 0x0010;
    pub const REAL64: u16 = 0x0011;
    pub const INTEGER40: u16 = 0x0012;
    pub const INTEGER48: u16 = 0x0013;
    pub const INTEGER56: u16 = 0x0014;
    pub const INTEGER64: u16 = 0x0015;
    pub const UNSIGNED24: u16 = 0x0016;
    pub const UNSIGNED40: u16 = 0x0018;
    pub const UNSIGNED48: u16 = 0x0019;
    pub const UNSIGNED56: u16 = 0x001A;
    pub const UNSIGNED64: u16 = 0x001B;

    /// All signed integer types
    pub const SIGNED_TYPES: [u16; 8] = [
        INTEGER8, INTEGER16, INTEGER24, INTEGER32, INTEGER40, INTEGER48, INTEGER56, INTEGER64,
    ];

    /// All unsigned integer types
    pub const UNSIGNED_TYPES: [u16; 8] = [
        UNSIGNED8, UNSIGNED16, UNSIGNED24, UNSIGNED32, UNSIGNED40, UNSIGNED48, UNSIGNED56,
        UNSIGNED64,
    ];

    /// Floating point types
    pub const FLOAT_TYPES: [u16; 2] = [REAL32, REAL64];

    /// Types which are stored as a sequence of elements rather than a single scalar
    pub const ARRAY_TYPES: [u16; 4] = [VISIBLE_STRING, OCTET_STRING, UNICODE_STRING, DOMAIN];

    /// Returns true for the signed integer types
    pub fn is_signed(data_type: u16) -> bool {
        SIGNED_TYPES.contains(&data_type)
    }

    /// Returns true for the unsigned integer types
    pub fn is_unsigned(data_type: u16) -> bool {
        UNSIGNED_TYPES.contains(&data_type)
    }

    /// Returns true for the string and domain types
    pub fn is_array(data_type: u16) -> bool {
        ARRAY_TYPES.contains(&data_type)
    }
}

/// Object codes as they appear in the `ObjectType` field of an EDS
pub mod object_codes {
    /// A large chunk of data, treated like a VAR
    pub const DOMAIN: u8 = 2;
    /// A single value
    pub const VAR: u8 = 7;
    /// A set of sub-objects all sharing a data type
    pub const ARRAY: u8 = 8;
    /// A record type definition, treated like a RECORD
    pub const DEFSTRUCT: u8 = 6;
    /// A set of sub-objects with individual data types
    pub const RECORD: u8 = 9;
}
