use plugboard_core::{create_args, ExtensionArg, ExtensionArgError, Namespace, NamespaceValue};

#[test]
fn parses_documented_examples() {
    let arg = ExtensionArg::parse("a=1").expect("a=1");
    assert_eq!(arg.path(), ["a".to_string()]);
    assert_eq!(arg.value(), "1");

    let arg = ExtensionArg::parse("a.b.c=x=y").expect("a.b.c=x=y");
    assert_eq!(arg.path(), ["a", "b", "c"].map(String::from));
    assert_eq!(arg.value(), "x=y");

    for raw in ["1a=x", "a..b=x", "novalue"] {
        assert!(matches!(
            ExtensionArg::parse(raw),
            Err(ExtensionArgError::InvalidSyntax(_))
        ));
    }
}

#[test]
fn builds_nested_namespace_from_flat_arguments() {
    let mut root = Namespace::new();
    create_args(
        [
            "bundle.name=quandl",
            "bundle.params.api_key=secret",
            "bundle.params.retries=3",
            "calendar=XNYS",
        ],
        &mut root,
    )
    .expect("build should succeed");

    assert_eq!(root.leaf("calendar"), Some("XNYS"));
    assert_eq!(root.leaf("bundle.name"), Some("quandl"));
    assert_eq!(root.leaf("bundle.params.api_key"), Some("secret"));
    assert_eq!(root.leaf("bundle.params.retries"), Some("3"));
    assert!(matches!(
        root.get_path("bundle.params"),
        Some(NamespaceValue::Namespace(_))
    ));
}

#[test]
fn longer_path_through_leaf_conflicts() {
    let mut root = Namespace::new();
    let err = create_args(["a.b=1", "a=2"], &mut root).expect_err("conflict must fail");
    assert_eq!(err, ExtensionArgError::ConflictingAssignment("a".to_string()));
}

#[test]
fn equal_length_paths_never_conflict() {
    // A conflicting path is always a strict prefix plus `.`, so it is shorter.
    let mut root = Namespace::new();
    create_args(["ab.c=1", "a.bc=2", "abcd=3"], &mut root).expect("no conflict");
    assert_eq!(root.leaf("ab.c"), Some("1"));
    assert_eq!(root.leaf("a.bc"), Some("2"));
    assert_eq!(root.leaf("abcd"), Some("3"));
}

#[test]
fn applying_same_arguments_to_fresh_roots_is_deterministic() {
    let args = vec![
        "x.y.z=1".to_string(),
        "x.w=2".to_string(),
        "v=3".to_string(),
        "x.y.q=".to_string(),
    ];

    let mut first = Namespace::new();
    let mut second = Namespace::new();
    create_args(&args, &mut first).expect("first build");
    create_args(args.iter().rev(), &mut second).expect("second build");
    assert_eq!(first, second);
    assert_eq!(first.leaf("x.y.q"), Some(""));
}

#[test]
fn empty_argument_list_leaves_root_as_is() {
    let mut root = Namespace::new();
    root.set_attr("preset", "value");
    create_args(Vec::<String>::new(), &mut root).expect("empty input");
    assert_eq!(root.len(), 1);
}
