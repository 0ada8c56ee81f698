use super::*;

#[test]
fn conversions_follow_length_modifiers() {
    assert_eq!(FieldType::from_conversion("d"), FieldType::Int);
    assert_eq!(FieldType::from_conversion("lld"), FieldType::Int);
    assert_eq!(FieldType::from_conversion("f"), FieldType::Float);
    assert_eq!(FieldType::from_conversion("lf"), FieldType::Double);
    assert_eq!(FieldType::from_conversion("10lf"), FieldType::Double);
    assert_eq!(FieldType::from_conversion("c"), FieldType::Char);
    assert_eq!(FieldType::from_conversion("20s"), FieldType::String);
    assert_eq!(FieldType::from_conversion("[^\\n]"), FieldType::String);
    assert_eq!(FieldType::from_conversion("p"), FieldType::Unknown);
}

#[test]
fn declared_types() {
    assert_eq!(FieldType::from_declared("std::string"), FieldType::String);
    assert_eq!(FieldType::from_declared("long"), FieldType::Int);
    assert_eq!(FieldType::from_declared("bool"), FieldType::Boolean);
    assert_eq!(FieldType::from_declared("Foo"), FieldType::Unknown);
}

#[test]
fn accepts_is_advisory() {
    assert!(FieldType::Int.accepts("-12"));
    assert!(!FieldType::Int.accepts("1.5"));
    assert!(FieldType::Double.accepts("1.5"));
    assert!(FieldType::Char.accepts("x"));
    assert!(!FieldType::Char.accepts("xy"));
    assert!(FieldType::Boolean.accepts("TRUE"));
    assert!(FieldType::String.accepts("anything at all"));
}

#[test]
fn judge0_ids_map_to_languages() {
    assert_eq!(Language::from_judge0_id(50), Some(Language::C));
    assert_eq!(Language::from_judge0_id(54), Some(Language::Cpp));
    assert_eq!(Language::from_judge0_id(62), Some(Language::Java));
    assert_eq!(Language::from_judge0_id(71), Some(Language::Python));
    assert_eq!(Language::from_judge0_id(63), Some(Language::JavaScript));
    assert_eq!(Language::from_judge0_id(73), None);
    for lang in Language::ALL {
        assert_eq!(Language::from_judge0_id(lang.default_judge0_id()), Some(lang));
    }
}

#[test]
fn language_lookup_by_name_and_extension() {
    assert_eq!(Language::from_name("C++"), Some(Language::Cpp));
    assert_eq!(Language::from_name("py"), Some(Language::Python));
    assert_eq!(Language::from_extension(".java"), Some(Language::Java));
    assert_eq!(Language::from_extension("rs"), None);
}

#[test]
fn group_serializes_with_wire_names() {
    let group = InputGroup::new(Language::C, 0, "scanf(\"%d\", &a)", "%d")
        .tokens(vec![Field::new(FieldType::Int)])
        .with_vars(vec!["a".to_string()]);
    let json = serde_json::to_value(&group).unwrap();
    assert_eq!(json["rawCall"], "scanf(\"%d\", &a)");
    assert_eq!(json["separator"], "space");
    assert_eq!(json["fields"][0]["type"], "int");
    assert!(json.get("prompt").is_none());
}

#[test]
fn label_prefers_variable_names() {
    let group = InputGroup::new(Language::Cpp, 0, "cin >> a >> b", "cin>>a>>b")
        .tokens(vec![FieldType::Int.into(), FieldType::Double.into()]);
    assert_eq!(group.label(), "<int> <number>");
    let named = group.with_vars(vec!["a".into(), "b".into()]);
    assert_eq!(named.label(), "a b");
}

#[test]
fn format_literals_skip_conversions() {
    let literals = |spec: &str| InputGroup::new(Language::C, 0, "", spec).format_literals();
    assert_eq!(literals("%d,%d").as_deref(), Some(","));
    assert_eq!(literals("(%d, %lf)").as_deref(), Some("(,)"));
    assert_eq!(literals("%d %*d %[^\n]").as_deref(), None);
    assert_eq!(literals("%d%%").as_deref(), Some("%"));
    assert_eq!(literals("%[]abc]x").as_deref(), Some("x"));
    assert_eq!(literals("cin>>a>>b"), None);
    assert_eq!(literals("nextInt()"), None);
}
