use std::io::Write;

use objdict_common::{DictObject, ObjectDictionary};

use crate::entry::{object_entries, Entry};
use crate::errors::GenerateError;
use crate::type_table::DataTypeTable;

/// Settings shared by header and implementation generation
#[derive(Clone, Copy, Debug)]
pub struct CodegenOptions<'a> {
    /// Prefix for every generated C symbol
    pub prefix: &'a str,
    /// Command line recorded in the banner of the generated files
    pub command: &'a str,
    /// Data types available to the object dictionary
    pub types: &'a DataTypeTable,
}

impl CodegenOptions<'_> {
    fn upper_prefix(&self) -> String {
        self.prefix.to_uppercase()
    }
}

fn write_banner(out: &mut impl Write, command: &str) -> Result<(), GenerateError> {
    writeln!(out, "/*")?;
    writeln!(
        out,
        " * This file was automatically generated using the following command:"
    )?;
    writeln!(out, " * {command}")?;
    writeln!(out, " *")?;
    writeln!(out, " */")?;
    writeln!(out)?;
    Ok(())
}

/// Write the C header declaring the object dictionary
pub fn generate_header(
    out: &mut impl Write,
    options: &CodegenOptions<'_>,
) -> Result<(), GenerateError> {
    let prefix = options.prefix;
    let guard = format!("__{}_H__", options.upper_prefix());

    write_banner(out, options.command)?;
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    writeln!(out)?;
    writeln!(out, "#include <zephyr/canbus/canopen/od.h>")?;
    writeln!(out)?;
    writeln!(out, "#ifdef CONFIG_USERSPACE")?;
    writeln!(out, "#include <zephyr/app_memory/app_memdomain.h>")?;
    writeln!(out)?;
    writeln!(out, "extern struct k_mem_partition {prefix}_partition;")?;
    writeln!(out, "#endif /* CONFIG_USERSPACE */")?;
    writeln!(out)?;
    writeln!(out, "CANOPEN_OD_DECLARE({prefix});")?;
    writeln!(out)?;
    writeln!(out, "#endif /* {guard} */")?;
    Ok(())
}

/// Write the C implementation defining storage, entry tables and the object table
///
/// Output is written as it is produced. If an error occurs, everything written up to that point
/// is left in `out`.
pub fn generate_impl(
    out: &mut impl Write,
    od: &ObjectDictionary,
    options: &CodegenOptions<'_>,
) -> Result<(), GenerateError> {
    let prefix = options.prefix;
    let upper = options.upper_prefix();

    write_banner(out, options.command)?;
    writeln!(out, "#include <zephyr/canbus/canopen/od.h>")?;
    writeln!(out, "#include <zephyr/types.h>")?;
    writeln!(out)?;
    writeln!(out, "#ifdef CONFIG_USERSPACE")?;
    writeln!(out, "#include <zephyr/app_memory/app_memdomain.h>")?;
    writeln!(out)?;
    writeln!(out, "K_APPMEM_PARTITION_DEFINE({prefix}_partition);")?;
    writeln!(out, "#define {upper}_DMEM K_APP_DMEM({prefix}_partition)")?;
    writeln!(out, "#define {upper}_BMEM K_APP_BMEM({prefix}_partition)")?;
    writeln!(out, "#else /* CONFIG_USERSPACE */")?;
    writeln!(out, "#define {upper}_DMEM")?;
    writeln!(out, "#define {upper}_BMEM")?;
    writeln!(out, "#endif /* CONFIG_USERSPACE */")?;

    for object in od.iter() {
        write_object(out, object, options)?;
    }

    writeln!(out)?;
    writeln!(out, "static struct canopen_od_object {prefix}_objects[] = {{")?;
    for object in od.iter() {
        writeln!(
            out,
            "\tCANOPEN_OD_OBJECT(0x{index:04x}U, {prefix}_{index:04x}_entries, {count}U),",
            index = object.index(),
            count = object.variables().len(),
        )?;
    }
    writeln!(out, "}};")?;
    writeln!(out)?;
    writeln!(
        out,
        "CANOPEN_OD_DEFINE({prefix}, {}U, {prefix}_objects);",
        od.len()
    )?;
    Ok(())
}

/// Addressing of an entry's storage, as used in its descriptor
struct Storage {
    data: String,
    min: String,
    max: String,
    size: String,
}

impl Storage {
    fn none() -> Self {
        Self {
            data: "NULL".into(),
            min: "NULL".into(),
            max: "NULL".into(),
            size: "0".into(),
        }
    }
}

/// Write the storage definitions for an entry, and return how the descriptor refers to them
fn write_storage(
    out: &mut impl Write,
    entry: &Entry<'_>,
    upper_prefix: &str,
) -> Result<Storage, GenerateError> {
    let Some(ctype) = entry.ctype()? else {
        return Ok(Storage::none());
    };
    let name = entry.cname();
    let is_array = entry.is_array()?;
    let carray = entry.carray()?;
    // Arrays decay to pointers, scalars need their address taken
    let address_of = |symbol: &str| {
        if is_array {
            symbol.to_string()
        } else {
            format!("&{symbol}")
        }
    };

    match entry.default_literal() {
        Some(literal) => writeln!(
            out,
            "{upper_prefix}_DMEM static {ctype} {name}{carray} = {literal};"
        )?,
        None if is_array => writeln!(out, "{upper_prefix}_BMEM static {ctype} {name}[0];")?,
        None => writeln!(out, "{upper_prefix}_BMEM static {ctype} {name};")?,
    }

    let mut limit = |suffix: &str, literal: Option<String>| -> Result<String, GenerateError> {
        Ok(match literal {
            Some(literal) => {
                let symbol = format!("{name}_{suffix}");
                writeln!(out, "static const {ctype} {symbol}{carray} = {literal};")?;
                address_of(&symbol)
            }
            None => "NULL".to_string(),
        })
    };
    let min = limit("min", entry.low_limit())?;
    let max = limit("max", entry.high_limit())?;

    Ok(Storage {
        data: address_of(&name),
        min,
        max,
        size: entry.csize()?,
    })
}

fn write_object(
    out: &mut impl Write,
    object: &DictObject,
    options: &CodegenOptions<'_>,
) -> Result<(), GenerateError> {
    let prefix = options.prefix;
    let upper = options.upper_prefix();
    let index = object.index();
    log::debug!(
        "Generating object {index:04x}h ({}) with {} entries",
        object.name(),
        object.variables().len()
    );

    writeln!(out)?;
    writeln!(out, "/* {index:04x}h - {} */", object.name())?;

    let mut descriptors = Vec::new();
    for entry in object_entries(object, prefix, options.types) {
        let storage = write_storage(out, &entry, &upper)?;
        descriptors.push(format!(
            "\tCANOPEN_OD_ENTRY({}U, 0x{:04x}U, {}U, {}, {}, {}, {}, {}),",
            entry.subindex(),
            entry.data_type(),
            entry.bits()?,
            storage.data,
            storage.min,
            storage.max,
            storage.size,
            entry.attr(),
        ));
    }

    if descriptors.is_empty() {
        // An empty initializer list is not valid before C23
        writeln!(
            out,
            "static struct canopen_od_entry {prefix}_{index:04x}_entries[0];"
        )?;
        return Ok(());
    }
    writeln!(
        out,
        "static struct canopen_od_entry {prefix}_{index:04x}_entries[] = {{"
    )?;
    for descriptor in descriptors {
        writeln!(out, "{descriptor}")?;
    }
    writeln!(out, "}};")?;
    Ok(())
}

/// Generate both files in memory, returning `(header, implementation)`
pub fn od_to_strings(
    od: &ObjectDictionary,
    options: &CodegenOptions<'_>,
) -> Result<(String, String), GenerateError> {
    let mut header = Vec::new();
    let mut implementation = Vec::new();
    generate_header(&mut header, options)?;
    generate_impl(&mut implementation, od, options)?;
    Ok((
        String::from_utf8_lossy(&header).into_owned(),
        String::from_utf8_lossy(&implementation).into_owned(),
    ))
}
