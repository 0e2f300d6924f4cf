//! Parse and validate the field shader with naga, without a GPU.

use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::ShaderStage;

fn parse() -> naga::Module {
    match wgsl::parse_str(netfield::gpu::FIELD_SHADER) {
        Ok(module) => module,
        Err(err) => panic!("{}", err.emit_to_string(netfield::gpu::FIELD_SHADER)),
    }
}

#[test]
fn test_field_shader_validates() {
    let module = parse();
    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    if let Err(err) = validator.validate(&module) {
        panic!("field shader failed validation: {}", err);
    }
}

#[test]
fn test_field_shader_entry_points() {
    let module = parse();
    let find = |name: &str| {
        module
            .entry_points
            .iter()
            .find(|ep| ep.name == name)
            .map(|ep| ep.stage)
    };

    assert_eq!(find("vs_line"), Some(ShaderStage::Vertex));
    assert_eq!(find("fs_line"), Some(ShaderStage::Fragment));
    assert_eq!(find("vs_circle"), Some(ShaderStage::Vertex));
    assert_eq!(find("fs_circle"), Some(ShaderStage::Fragment));
}
