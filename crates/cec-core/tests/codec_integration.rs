//! Integration tests for the cec-core mapping codec.
//!
//! These tests drive both declaration forms through the public API: the
//! compact grammar and structured config files in YAML and TOML.

use cec_core::{
    parse_mappings, ConfigRecord, DeviceType, MappingError, OutputAction, PointerAction,
    TableError,
};

const FULL_YAML: &str = r#"
adapter: ttyACM
name: Keyboard
type: playback
mappings:
  - cecCode: 0
    actions:
      - keyboard: { type: press, code: 28 }
  - cecCode: 113
    actions:
      - keyboard: { type: down, code: 29 }
      - keyboard: { type: press, code: 46 }
      - keyboard: { type: up, code: 29 }
  - cecCode: 114
    actions:
      - mouse: { leftClick: {} }
  - cecCode: 1
    actions:
      - mouse: { moveY: -10 }
"#;

fn load_yaml(text: &str) -> Result<(cec_core::DeviceSettings, cec_core::MappingTable), MappingError> {
    let record: ConfigRecord = serde_yaml::from_str(text).expect("yaml must deserialize");
    record.into_parts()
}

#[test]
fn test_yaml_config_builds_settings_and_table() {
    let (settings, table) = load_yaml(FULL_YAML).expect("config must be valid");

    assert_eq!(settings.adapter, "ttyACM");
    assert_eq!(settings.name, "Keyboard");
    assert_eq!(settings.device_type, DeviceType::Playback);

    let mut codes: Vec<_> = table.codes().collect();
    codes.sort_unstable();
    assert_eq!(codes, vec![0, 1, 113, 114]);

    assert_eq!(
        table.get(113),
        Some(&[OutputAction::down(29), OutputAction::press(46), OutputAction::up(29)][..])
    );
    assert_eq!(table.get(114), Some(&[OutputAction::Pointer(PointerAction::LeftClick)][..]));
    assert_eq!(table.get(1), Some(&[OutputAction::Pointer(PointerAction::MoveY(-10))][..]));
}

#[test]
fn test_yaml_duplicate_code_fails_naming_index_and_code() {
    let yaml = r#"
type: recording
mappings:
  - cecCode: 5
    actions:
      - keyboard: { type: press, code: 30 }
  - cecCode: 5
    actions:
      - keyboard: { type: press, code: 31 }
"#;

    let err = load_yaml(yaml).unwrap_err();

    assert_eq!(err, MappingError::Table(TableError::DuplicateCode { index: 1, code: 5 }));
    let message = err.to_string();
    assert!(message.contains("index 1"), "message must name the index: {message}");
    assert!(message.contains("code 5"), "message must name the code: {message}");
}

#[test]
fn test_yaml_keyboard_and_mouse_in_one_action_fails_naming_position() {
    let yaml = r#"
type: tv
mappings:
  - cecCode: 3
    actions:
      - keyboard: { type: press, code: 30 }
        mouse: { rightClick: {} }
"#;

    let err = load_yaml(yaml).unwrap_err();

    assert_eq!(err, MappingError::AmbiguousAction { index: 0, code: 3, action_index: 0 });
}

#[test]
fn test_yaml_unknown_device_type_fails_to_deserialize() {
    let yaml = "type: reserved\nmappings: []\n";

    let result: Result<ConfigRecord, _> = serde_yaml::from_str(yaml);

    let err = result.unwrap_err().to_string();
    assert!(err.contains("reserved"), "error must mention the bad value: {err}");
}

#[test]
fn test_yaml_missing_device_type_fails_to_deserialize() {
    let result: Result<ConfigRecord, _> = serde_yaml::from_str("mappings: []\n");
    assert!(result.is_err());
}

#[test]
fn test_toml_config_builds_the_same_table_shape() {
    let text = r#"
adapter = "cec0"
type = "audio"

[[mappings]]
cecCode = 68
actions = [{ keyboard = { type = "press", code = 164 } }]

[[mappings]]
cecCode = 69
actions = [{ mouse = { sideClick = {} } }]
"#;

    let record: ConfigRecord = toml::from_str(text).expect("toml must deserialize");
    let (settings, table) = record.into_parts().expect("config must be valid");

    assert_eq!(settings.adapter, "cec0");
    assert_eq!(settings.name, "");
    assert_eq!(settings.device_type, DeviceType::Audio);
    assert_eq!(table.get(68), Some(&[OutputAction::press(164)][..]));
    assert_eq!(table.get(69), Some(&[OutputAction::Pointer(PointerAction::SideClick)][..]));
}

#[test]
fn test_grammar_table_key_set_equals_declared_codes() {
    let declared = ["0=p:28", "1=p:103", "2=p:108", "113=h:29,p:46", "5=p:30,h:31"];

    let table = parse_mappings(declared).expect("mappings must be valid");

    let mut codes: Vec<_> = table.codes().collect();
    codes.sort_unstable();
    assert_eq!(codes, vec![0, 1, 2, 5, 113]);
    assert_eq!(
        table.get(5),
        Some(&[OutputAction::press(30), OutputAction::down(31), OutputAction::up(31)][..])
    );
}

#[test]
fn test_grammar_hold_always_yields_down_then_trailing_up() {
    for input in ["7=h:31", "7=p:1,h:31", "7=h:31,p:1,u:2", "7=d:3,h:31,p:4"] {
        let table = parse_mappings([input]).expect("mapping must be valid");
        let actions = table.get(7).expect("code 7 must be mapped");

        let down = actions.iter().position(|a| *a == OutputAction::down(31));
        let up = actions.iter().position(|a| *a == OutputAction::up(31));
        assert!(down.is_some(), "{input}: hold must emit a key down");
        assert_eq!(up, Some(actions.len() - 1), "{input}: hold must release last");
        assert_eq!(actions.iter().filter(|a| **a == OutputAction::up(31)).count(), 1);
    }
}
