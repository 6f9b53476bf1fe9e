use chainconf::{
    resolve_placeholders, ChainConfig, ConfigError, IniReader, JsonReader, ReaderKind, Tree,
    Value, XmlReader, DEFAULT_GROUP,
};
use chainconf_tests::Fixture;
use pretty_assertions::assert_eq;
use serde_json::json;

fn s(value: &str) -> Option<Value> {
    Some(Value::from(value))
}

#[test]
fn reader_chain_merges_formats_in_one_directory() {
    let fixture = Fixture::layered();
    let mut config = ChainConfig::new();
    config
        .append_path(fixture.root())
        .append_reader(IniReader)
        .append_reader(JsonReader);

    assert_eq!(config.get("a.lvl2.value1").unwrap(), s("1"));
    assert_eq!(config.get("a.lvl2.value2").unwrap(), Some(Value::Bool(false)));
    assert_eq!(config.get("a.lvl2.value3").unwrap(), None);
    assert_eq!(config.get("b.a").unwrap(), None);
}

#[test]
fn reader_order_decides_within_a_directory() {
    let fixture = Fixture::layered();
    let mut config = ChainConfig::new();
    config
        .append_path(fixture.root())
        .append_reader(JsonReader)
        .append_reader(IniReader);

    assert_eq!(config.get("a.lvl2.value1").unwrap(), s("from json"));
}

#[test]
fn every_reader_reads_its_extensions() {
    let fixture = Fixture::layered();
    for kind in ReaderKind::ALL {
        let reader = kind.reader();
        let mut config = ChainConfig::new();
        config
            .append_path(fixture.path("reader"))
            .append_shared_reader(reader.clone());

        for ext in reader.extensions() {
            assert_eq!(
                config.get(&format!("{ext}_reader.section.value")).unwrap(),
                s("working"),
                "extension {ext}"
            );
        }
    }
}

#[test]
fn path_precedence_across_directories() {
    let fixture = Fixture::layered();
    let mut config = ChainConfig::new();
    config
        .append_path(fixture.root())
        .append_path(fixture.path("after"))
        .prepend_path(fixture.path("before"))
        .append_reader(IniReader)
        .append_reader(XmlReader)
        .prepend_reader(JsonReader);

    assert_eq!(config.get("a.lvl2.value1").unwrap(), s("Hello World"));
    assert_eq!(config.get("a.lvl2.value10").unwrap(), s("Bonjour le monde"));
    assert_eq!(config.get("a.lvl2.value2").unwrap(), Some(Value::Bool(false)));
    assert_eq!(config.get("a.lvl2.value3").unwrap(), s("hello"));
    assert_eq!(config.get("b.a").unwrap(), None);
}

#[test]
fn path_outranks_reader_order() {
    let fixture = Fixture::new();
    fixture
        .write("before/a.json", r#"{"x": 1}"#)
        .write("main/a.ini", "x = 2\n");

    for json_first in [true, false] {
        let mut config = ChainConfig::new();
        config
            .append_path(fixture.path("before"))
            .append_path(fixture.path("main"));
        if json_first {
            config.append_reader(JsonReader).append_reader(IniReader);
        } else {
            config.append_reader(IniReader).append_reader(JsonReader);
        }

        assert_eq!(config.get("a.x").unwrap(), Some(Value::Int(1)));
    }
}

#[test]
fn earlier_path_leaf_is_not_replaced_by_later_subtree() {
    let fixture = Fixture::new();
    fixture
        .write("first/a.json", r#"{"b": "first"}"#)
        .write("second/a.json", r#"{"b": {"c": 1}, "d": 2}"#);

    let mut config = ChainConfig::new();
    config
        .append_path(fixture.path("first"))
        .append_path(fixture.path("second"))
        .append_reader(JsonReader);

    assert_eq!(config.get("a.b").unwrap(), s("first"));
    assert_eq!(config.get("a.b.c").unwrap(), None);
    assert_eq!(config.get("a.d").unwrap(), Some(Value::Int(2)));
}

#[test]
fn grouped_paths_follow_group_order() {
    let fixture = Fixture::layered();
    let mut config = ChainConfig::new();
    config
        .append_path(fixture.root())
        .append_path_in(fixture.path("after"), "after")
        .append_path_in(fixture.path("before"), "before")
        .append_reader(IniReader)
        .append_reader(XmlReader)
        .prepend_reader(JsonReader);
    config
        .order_group_path("after", None, Some(DEFAULT_GROUP))
        .unwrap()
        .order_group_path("before", Some(DEFAULT_GROUP), None)
        .unwrap();

    assert_eq!(
        config.paths(),
        [
            fixture.path("before").as_path(),
            fixture.root(),
            fixture.path("after").as_path()
        ]
    );
    assert_eq!(config.get("a.lvl2.value1").unwrap(), s("Hello World"));
    assert_eq!(config.get("a.lvl2.value10").unwrap(), s("Bonjour le monde"));
    assert_eq!(config.get("a.lvl2.value2").unwrap(), Some(Value::Bool(false)));
    assert_eq!(config.get("a.lvl2.value3").unwrap(), s("hello"));
    assert_eq!(config.get("b.a").unwrap(), None);
}

#[test]
fn key_and_value_callbacks_compose() {
    let fixture = Fixture::layered();
    let mut config = ChainConfig::new();
    config.append_path(fixture.root()).append_reader(IniReader);
    config.append_key_callback(|config, key| {
        if !key.contains("{db_type}") {
            return Ok(key.to_string());
        }
        let db_type = config
            .get("a.db.type")?
            .map(|v| v.to_string())
            .unwrap_or_default();
        Ok(key.replace("{db_type}", &db_type))
    });
    config.prepend_key_callback(|_, key| {
        Ok(key
            .strip_prefix("b.")
            .map_or_else(|| key.to_string(), |rest| format!("a.{rest}")))
    });

    assert_eq!(config.get("a.db.type").unwrap(), s("mysql"));
    assert_eq!(config.get("{db_type}.driver").unwrap(), s("pdo"));
    assert_eq!(config.get("b.db.type").unwrap(), s("mysql"));

    config.append_value_callback(|_, value| {
        value.map(|v| Value::from(v.to_string().to_uppercase()))
    });
    assert_eq!(config.get("b.db.type").unwrap(), s("MYSQL"));
}

#[test]
fn placeholder_callback_resolves_against_files() {
    let fixture = Fixture::layered();
    let mut config = ChainConfig::new();
    config
        .append_path(fixture.root())
        .append_reader(IniReader)
        .append_key_callback(resolve_placeholders);

    assert_eq!(config.get("{a.db.type}.driver").unwrap(), s("pdo"));
}

#[test]
fn weird_keys() {
    let fixture = Fixture::layered();
    let mut config = ChainConfig::new();
    config.append_path(fixture.root()).append_reader(IniReader);

    assert_eq!(config.get("a.lvl2.value1.").unwrap(), s("1"));

    let mut lvl2 = Tree::new();
    lvl2.insert("value1".to_string(), Value::from("1"));
    assert_eq!(config.get("a.lvl2.").unwrap(), Some(Value::Node(lvl2)));
    assert_eq!(config.get("a.lvl2.nope").unwrap(), None);

    assert_eq!(config.get("after/a.lvl2.value2").unwrap(), None);
    assert_eq!(config.get("a.dot.section.key.with.dot").unwrap(), s("Key will be cut!"));
    assert_eq!(config.get("a.normal_section.with.a.dot").unwrap(), s("cutted"));

    let mut with_a = Tree::new();
    with_a.insert("dot".to_string(), Value::from("cutted"));
    assert_eq!(
        config.get("a.normal_section.with.a").unwrap(),
        Some(Value::Node(with_a))
    );
}

#[test]
fn current_configuration_includes_loaded_and_persisted_values() {
    let fixture = Fixture::layered();
    let mut data = Tree::new();
    data.insert("Hello".to_string(), Value::from("World"));
    let mut config = ChainConfig::with_data(data);
    config
        .append_path(fixture.path("reader"))
        .append_reader(IniReader);

    assert_eq!(config.get("ini_reader.section.value").unwrap(), s("working"));
    assert_eq!(config.get_or_persist("not.existing", "added!").unwrap(), s("added!"));
    assert_eq!(config.get("Hello").unwrap(), s("World"));

    assert_eq!(
        serde_json::to_value(config.current_configuration()).unwrap(),
        json!({
            "Hello": "World",
            "ini_reader": {"section": {"value": "working"}},
            "not": {"existing": "added!"}
        })
    );
}

#[test]
fn missing_directory_is_not_an_error() {
    let fixture = Fixture::new();
    let mut data = Tree::new();
    data.insert("Hello".to_string(), Value::from("World"));
    let mut config = ChainConfig::with_data(data);
    config.append_path(fixture.path("nope")).append_reader(IniReader);

    assert_eq!(config.get("any.key.will.fail").unwrap(), None);
}

#[test]
fn dist_files_are_fallbacks() {
    let fixture = Fixture::layered();
    let mut config = ChainConfig::new();
    config.append_path(fixture.path("dist")).append_reader(IniReader);

    assert_eq!(config.get("test1.section.key").unwrap(), s("value"));
    assert_eq!(config.get("test2.section.value").unwrap(), s("Yes"));
}

#[test]
fn iteration_yields_flattened_entries() {
    let fixture = Fixture::layered();
    let mut config = ChainConfig::new();
    config.append_path(fixture.root()).append_reader(IniReader);
    config.get("a").unwrap();

    let entries: Vec<(String, Value)> = config.iter().collect();
    assert_eq!(
        entries,
        [
            ("a.lvl2.value1".to_string(), Value::from("1")),
            ("a.db.type".to_string(), Value::from("mysql")),
            ("a.dot.section.key.with.dot".to_string(), Value::from("Key will be cut!")),
            ("a.normal_section.with.a.dot".to_string(), Value::from("cutted")),
        ]
    );
    assert_eq!((&config).into_iter().count(), 4);
}

#[test]
fn count_tracks_loaded_and_persisted_entries() {
    let fixture = Fixture::layered();
    let mut config = ChainConfig::new();
    config.append_path(fixture.root()).append_reader(IniReader);

    assert_eq!(config.len(), 0);
    assert!(config.is_empty());

    config.get("a").unwrap();
    assert_eq!(config.len(), 4);

    config.get_or("b", "c").unwrap();
    assert_eq!(config.len(), 4);

    config.get_or_persist("b", "c").unwrap();
    assert_eq!(config.len(), 5);

    config.get("mysql.driver").unwrap();
    assert_eq!(config.len(), 6);
}

#[test]
fn default_persistence() {
    let mut config = ChainConfig::new();

    assert_eq!(config.get_or("a.b", "X").unwrap(), s("X"));
    assert_eq!(config.get("a.b").unwrap(), None);

    assert_eq!(config.get_with("a.b", Some(Value::from("X")), true).unwrap(), s("X"));
    assert_eq!(config.get("a.b").unwrap(), s("X"));
}

#[test]
fn malformed_file_aborts_the_lookup() {
    let fixture = Fixture::new();
    fixture
        .write("good/app.ini", "name = demo\n")
        .write("bad/app.json", "{\"name\": ");

    let mut config = ChainConfig::new();
    config
        .append_path(fixture.path("bad"))
        .append_path(fixture.path("good"))
        .append_reader(IniReader)
        .append_reader(JsonReader);

    let err = config.get("app.name").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { format: "json", .. }));
}

#[test]
fn yaml_settings_drive_the_chain() {
    let fixture = Fixture::layered();
    fixture.write(
        "chain.yaml",
        &format!(
            "paths:\n\
             \x20 - path: {root}\n\
             \x20 - path: {before}\n\
             \x20   group: before\n\
             group_order:\n\
             \x20 - group: before\n\
             \x20   before: __main__\n\
             readers: [json, ini, xml]\n",
            root = fixture.root().display(),
            before = fixture.path("before").display(),
        ),
    );

    let mut config = chainconf::from_settings_file(fixture.path("chain.yaml")).unwrap();
    assert_eq!(config.get("a.lvl2.value1").unwrap(), s("Hello World"));
    assert_eq!(config.get("a.lvl2.value2").unwrap(), Some(Value::Bool(false)));
}
