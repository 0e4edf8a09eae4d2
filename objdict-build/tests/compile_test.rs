use std::io::Write;

use assertables::assert_contains;
use objdict_build::{errors::CompileError, CodegenOptions, DataTypeTable};

const EDS: &str = include_str!("minimal.eds");

fn compile(eds: &str, types: &DataTypeTable) -> (Result<(), CompileError>, String, String) {
    let dir = tempfile::tempdir().unwrap();
    let eds_path = dir.path().join("device.eds");
    let header_path = dir.path().join("objdict.h");
    let impl_path = dir.path().join("objdict.c");
    std::fs::File::create(&eds_path)
        .unwrap()
        .write_all(eds.as_bytes())
        .unwrap();

    let options = CodegenOptions {
        prefix: "objdict",
        command: "gen-canopen-objdict -i device.eds",
        types,
    };
    let result = objdict_build::compile_eds(&eds_path, &header_path, &impl_path, &options);
    let header = std::fs::read_to_string(&header_path).unwrap_or_default();
    let implementation = std::fs::read_to_string(&impl_path).unwrap_or_default();
    (result, header, implementation)
}

#[test]
fn compile_test() {
    let (result, header, implementation) = compile(EDS, &DataTypeTable::default());
    result.expect("Failed to compile");

    assert_contains!(header.as_str(), "CANOPEN_OD_DECLARE(objdict);");
    assert_contains!(header.as_str(), " * gen-canopen-objdict -i device.eds\n");

    let expected = "
/* 2000h - Settings */
OBJDICT_DMEM static uint8_t objdict_2000sub0 = 0x2U;
OBJDICT_BMEM static int32_t objdict_2000sub1;
static const int32_t objdict_2000sub1_min = -0xa;
static const int32_t objdict_2000sub1_max = 0xa;
OBJDICT_DMEM static float objdict_2000sub2 = 1.5f;
static struct canopen_od_entry objdict_2000_entries[] = {
\tCANOPEN_OD_ENTRY(0U, 0x0005U, 8U, &objdict_2000sub0, NULL, NULL, sizeof(uint8_t), CANOPEN_OD_ATTR_ACCESS_RO),
\tCANOPEN_OD_ENTRY(1U, 0x0004U, 32U, &objdict_2000sub1, &objdict_2000sub1_min, &objdict_2000sub1_max, sizeof(int32_t), CANOPEN_OD_ATTR_ACCESS_RW | CANOPEN_OD_ATTR_PDO_MAPPABLE_RPDO),
\tCANOPEN_OD_ENTRY(2U, 0x0008U, 32U, &objdict_2000sub2, NULL, NULL, sizeof(float), CANOPEN_OD_ATTR_ACCESS_RW),
};

static struct canopen_od_object objdict_objects[] = {
\tCANOPEN_OD_OBJECT(0x1000U, objdict_1000_entries, 1U),
\tCANOPEN_OD_OBJECT(0x2000U, objdict_2000_entries, 3U),
};

CANOPEN_OD_DEFINE(objdict, 2U, objdict_objects);
";
    assert!(
        implementation.ends_with(expected),
        "unexpected output:\n{implementation}"
    );
    assert_contains!(
        implementation.as_str(),
        "OBJDICT_DMEM static uint32_t objdict_1000sub0 = 0x191U;"
    );

    // Objects are emitted in ascending index order
    let pos_1000 = implementation.find("/* 1000h - Device type */").unwrap();
    let pos_2000 = implementation.find("/* 2000h - Settings */").unwrap();
    assert!(pos_1000 < pos_2000);
}

#[test]
fn compile_unknown_type() {
    let eds = EDS.replace(
        "DataType=0x0008\nAccessType=rw\nDefaultValue=1.5",
        "DataType=0x0099\nAccessType=rw",
    );
    assert_ne!(EDS, eds);

    let (result, header, implementation) = compile(&eds, &DataTypeTable::default());
    let err = result.unwrap_err();
    assert_eq!(
        "object 2000h subindex 2: unknown data type 0x0099",
        err.to_string()
    );
    // Generation is streamed, so the header and the objects before the error are on disk
    assert_contains!(header.as_str(), "#endif /* __OBJDICT_H__ */");
    assert_contains!(implementation.as_str(), "objdict_1000_entries[] = {");
    assert!(!implementation.contains("CANOPEN_OD_DEFINE"));

    let types = DataTypeTable::builder()
        .define(0x99, Some("int16_t".into()), 16)
        .build();
    let (result, _, implementation) = compile(&eds, &types);
    result.expect("Failed to compile with custom type");
    assert_contains!(
        implementation.as_str(),
        "CANOPEN_OD_ENTRY(2U, 0x0099U, 16U, &objdict_2000sub2, NULL, NULL, sizeof(int16_t), CANOPEN_OD_ATTR_ACCESS_RW),"
    );
}

#[test]
fn compile_missing_input() {
    let types = DataTypeTable::default();
    let options = CodegenOptions {
        prefix: "objdict",
        command: "",
        types: &types,
    };
    let dir = tempfile::tempdir().unwrap();
    let err = objdict_build::compile_eds(
        dir.path().join("missing.eds"),
        dir.path().join("objdict.h"),
        dir.path().join("objdict.c"),
        &options,
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::EdsLoad { .. }));
    // Nothing is created when the input cannot be read
    assert!(!dir.path().join("objdict.h").exists());
}

#[test]
fn compile_output_not_creatable() {
    let types = DataTypeTable::default();
    let options = CodegenOptions {
        prefix: "objdict",
        command: "",
        types: &types,
    };
    let dir = tempfile::tempdir().unwrap();
    let eds_path = dir.path().join("device.eds");
    std::fs::write(&eds_path, EDS).unwrap();

    let err = objdict_build::compile_eds(
        &eds_path,
        dir.path().join("missing-dir").join("objdict.h"),
        dir.path().join("objdict.c"),
        &options,
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::CreateOutput { .. }));
    assert_contains!(err.to_string().as_str(), "Failed to create");
    assert_contains!(err.to_string().as_str(), "objdict.h");
}
