use super::*;
use crate::value::{Tag, TaggedValue, TensorValue};
use modelbridge_tensor::ScalarKind;
use std::io::Write;

const PROGRAM: &str = r#"{
  "methods": [
    { "name": "forward", "op": "mul", "preload": true,
      "inputs": [
        { "tag": "tensor", "tensor_info": { "dtype": "float32", "shape": [2] } },
        { "tag": "tensor", "tensor_info": { "dtype": "float32", "shape": [2] } }
      ],
      "outputs": [ { "tag": "tensor", "tensor_info": { "dtype": "float32", "shape": [2] } } ] },
    { "name": "sum", "op": "add" },
    { "name": "echo", "op": "identity" },
    { "name": "consts", "op": "constant", "values": [
        { "tag": "none" },
        { "tag": "int", "value": 3 },
        { "tag": "list_double", "value": [0.5, 1.5] },
        { "tag": "tensor", "value": { "dtype": "int32", "shape": [2], "data": [4, 5] } },
        { "tag": "list_optional_tensor", "value": [null] }
    ] },
    { "name": "broken", "op": "fail", "code": "OperatorMissing", "message": "no kernel" },
    { "name": "unloadable", "op": "identity", "load_error": "MemoryAllocationFailed" }
  ]
}"#;

fn program() -> ReferenceProgram {
    ReferenceProgram::from_json(PROGRAM).unwrap()
}

fn f32_tensor(values: &[f32]) -> TaggedValue {
    let bytes = bytemuck::cast_slice(values).to_vec();
    TaggedValue::Tensor(TensorValue::owned(
        ScalarKind::Float32,
        vec![values.len()],
        bytes,
    ))
}

fn f32_values(value: &TaggedValue) -> Vec<f32> {
    value
        .as_tensor()
        .unwrap()
        .with_bytes(bytemuck::pod_collect_to_vec::<u8, f32>)
}

#[test]
fn test_method_names_and_preload() {
    let program = program();
    assert_eq!(
        program.method_names().unwrap(),
        vec!["forward", "sum", "echo", "consts", "broken", "unloadable"]
    );
    assert!(program.is_method_loaded("forward"));
    assert!(!program.is_method_loaded("sum"));
}

#[test]
fn test_method_meta() {
    let meta = program().method_meta("forward").unwrap();
    assert_eq!(meta.name, "forward");
    assert_eq!(meta.inputs.len(), 2);
    assert_eq!(meta.input_tag(0), Some(Tag::Tensor));
    assert_eq!(
        meta.outputs[0].tensor_info.as_ref().unwrap().dtype,
        ScalarKind::Float32
    );
    assert_eq!(
        program().method_meta("missing").unwrap_err().code,
        ErrorCode::NotFound
    );
}

#[test]
fn test_mul_and_add() {
    let program = program();
    let inputs = [f32_tensor(&[1.0, 2.0]), f32_tensor(&[3.0, 4.0])];

    let out = program.execute("forward", &inputs).unwrap();
    assert_eq!(f32_values(&out[0]), vec![3.0, 8.0]);

    let out = program.execute("sum", &inputs).unwrap();
    assert_eq!(f32_values(&out[0]), vec![4.0, 6.0]);
}

#[test]
fn test_execute_loads_lazily() {
    let program = program();
    assert!(!program.is_method_loaded("echo"));
    let out = program.execute("echo", &[TaggedValue::Int(9)]).unwrap();
    assert!(matches!(out.as_slice(), [TaggedValue::Int(9)]));
    assert!(program.is_method_loaded("echo"));
}

#[test]
fn test_elementwise_validates_inputs() {
    let program = program();
    let err = program.execute("forward", &[f32_tensor(&[1.0])]).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArgument);

    let err = program
        .execute("forward", &[f32_tensor(&[1.0]), f32_tensor(&[1.0, 2.0])])
        .unwrap_err();
    assert!(err.message.unwrap().contains("shape mismatch"));

    let err = program
        .execute("forward", &[f32_tensor(&[1.0]), TaggedValue::Double(2.0)])
        .unwrap_err();
    assert!(err.message.unwrap().contains("double"));
}

#[test]
fn test_constants() {
    let out = program().execute("consts", &[]).unwrap();
    let tags: Vec<_> = out.iter().map(TaggedValue::tag).collect();
    assert_eq!(
        tags,
        vec![
            Tag::None,
            Tag::Int,
            Tag::ListDouble,
            Tag::Tensor,
            Tag::ListOptionalTensor
        ]
    );
    let ints = out[3]
        .as_tensor()
        .unwrap()
        .with_bytes(bytemuck::pod_collect_to_vec::<u8, i32>);
    assert_eq!(ints, vec![4, 5]);
}

#[test]
fn test_failures() {
    let program = program();
    let err = program.execute("broken", &[]).unwrap_err();
    assert_eq!(
        err,
        EngineError::with_message(ErrorCode::OperatorMissing, "no kernel")
    );

    let err = program.load_method("unloadable").unwrap_err();
    assert_eq!(err.code, ErrorCode::MemoryAllocationFailed);
    assert!(!program.is_method_loaded("unloadable"));

    let err = program.execute("unloadable", &[]).unwrap_err();
    assert_eq!(err.code, ErrorCode::MemoryAllocationFailed);
}

#[test]
fn test_invalid_definitions() {
    let err = ReferenceProgram::from_json("{ not json").unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse program definition"));

    let duplicate = r#"{ "methods": [
        { "name": "a", "op": "identity" },
        { "name": "a", "op": "identity" }
    ] }"#;
    let err = ReferenceProgram::from_json(duplicate).unwrap_err();
    assert!(err.to_string().contains("Duplicate method 'a'"));
}

#[test]
fn test_engine_loads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(PROGRAM.as_bytes()).unwrap();

    let program = ReferenceEngine
        .load(file.path(), MlockPolicy::NoMlock)
        .unwrap();
    assert_eq!(program.method_names().unwrap().len(), 6);
}

#[test]
fn test_engine_reports_missing_and_invalid_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.model");
    let err = ReferenceEngine
        .load(&missing, MlockPolicy::default())
        .err()
        .unwrap();
    assert_eq!(err.code, ErrorCode::AccessFailed);
    assert!(err.message.unwrap().contains("missing.model"));

    let invalid = dir.path().join("invalid.json");
    std::fs::write(&invalid, "[]").unwrap();
    let err = ReferenceEngine
        .load(&invalid, MlockPolicy::default())
        .err()
        .unwrap();
    assert_eq!(err.code, ErrorCode::InvalidProgram);
}
