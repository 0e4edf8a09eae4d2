//! Tools for generating a C object dictionary from an EDS
//!
//! The generated code targets the Zephyr CANopen object dictionary API: a header which declares
//! the dictionary, and an implementation file which defines the storage for every variable, one
//! entry table per object, and the object table itself.
//!
//! ## Data types
//!
//! Each variable's CANopen data type is mapped to a C type through a [`DataTypeTable`]. The table
//! holds the standard CANopen types by default, and can be extended (or overridden) with
//! [`TypeDefinition`]s, which is what the `--deftype` option of `gen-canopen-objdict` does.
//!
//! ## Example
//!
//! ```ignore
//! let types = objdict_build::DataTypeTable::default();
//! let options = objdict_build::CodegenOptions {
//!     prefix: "objdict",
//!     command: "build.rs",
//!     types: &types,
//! };
//! objdict_build::compile_eds("device.eds", "objdict.h", "objdict.c", &options)?;
//! ```
//!
//! ## The generated code
//!
//! For an object 0x2000 with two sub-objects, the implementation file contains something like:
//!
//! ```c
//! /* 2000h - Settings */
//! OBJDICT_DMEM static uint8_t objdict_2000sub0 = 0x2U;
//! OBJDICT_BMEM static int32_t objdict_2000sub1;
//! static struct canopen_od_entry objdict_2000_entries[] = {
//! 	CANOPEN_OD_ENTRY(0U, 0x0005U, 8U, &objdict_2000sub0, NULL, NULL, sizeof(uint8_t), CANOPEN_OD_ATTR_ACCESS_RO),
//! 	CANOPEN_OD_ENTRY(1U, 0x0004U, 32U, &objdict_2000sub1, NULL, NULL, sizeof(int32_t), CANOPEN_OD_ATTR_ACCESS_RW),
//! };
//! ```
//!
//! followed by the object table and the `CANOPEN_OD_DEFINE` invocation.
#![warn(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations
)]

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use snafu::ResultExt;

mod codegen;
pub mod entry;
pub mod errors;
pub mod invocation;
pub mod type_table;
pub mod utils;

use crate::errors::*;
pub use codegen::{generate_header, generate_impl, od_to_strings, CodegenOptions};
pub use type_table::{DataTypeTable, DataTypeTableBuilder, TypeDefinition, TypeInfo};

fn create_output(path: &Path) -> Result<BufWriter<File>, CompileError> {
    let file = File::create(path).context(CreateOutputSnafu { path })?;
    Ok(BufWriter::new(file))
}

/// Compile an EDS file into a C header and implementation file
///
/// The EDS is read completely before either output is created. Both outputs are then created
/// (truncating any existing file) before generation starts. On error, whatever was generated so
/// far is left in the output files.
///
/// # Arguments
///
/// * `eds_path` - Path to the EDS file
/// * `header_path` - Path to write the generated header to
/// * `impl_path` - Path to write the generated implementation to
/// * `options` - Symbol prefix, recorded command and data types
pub fn compile_eds(
    eds_path: impl AsRef<Path>,
    header_path: impl AsRef<Path>,
    impl_path: impl AsRef<Path>,
    options: &CodegenOptions<'_>,
) -> Result<(), CompileError> {
    let od = objdict_eds::load(eds_path.as_ref()).context(EdsLoadSnafu)?;
    log::info!(
        "Loaded {} objects from {}",
        od.len(),
        eds_path.as_ref().display()
    );

    let mut header = create_output(header_path.as_ref())?;
    let mut implementation = create_output(impl_path.as_ref())?;

    generate_header(&mut header, options)?;
    header.flush().map_err(GenerateError::from)?;
    generate_impl(&mut implementation, &od, options)?;
    implementation.flush().map_err(GenerateError::from)?;

    Ok(())
}
