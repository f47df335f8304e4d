use go_bindgen::{
    parse_bindings, parse_types, register_types, BindingSet, Diagnostic, Files, Opts, TypeRegistry,
};
use std::collections::BTreeMap;

fn registry_with_int32(namespace: &str) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    let records = parse_types(
        r#"{
            "Int32": {
                "externalRepr": "Int32",
                "internalRepr": "int32",
                "nativeRepr": "int32_t",
                "conversion": "int32(@)",
                "alignment": 4,
                "skipImport": true
            }
        }"#,
    )
    .unwrap();
    register_types(&mut registry, namespace, records).unwrap();
    registry
}

fn packages(dir: &str, bindings_json: &str) -> BTreeMap<String, BindingSet> {
    let mut packages = BTreeMap::new();
    packages.insert(dir.to_string(), parse_bindings(bindings_json).unwrap());
    packages
}

fn text<'a>(files: &'a Files, name: &str) -> &'a str {
    std::str::from_utf8(files.get(name).unwrap()).unwrap()
}

#[test]
fn add_scenario() {
    let registry = registry_with_int32("example.com/m/calc");
    let packages = packages(
        "calc",
        r#"{
            "Add": {
                "comment": "Add returns the sum computed natively.",
                "call": "native_add",
                "args": ["a", "Int32", "b", "Int32"],
                "ret": "Int32",
                "externallyDeclared": true
            }
        }"#,
    );

    let mut files = Files::default();
    let diags = Opts {
        module: "example.com/m".to_string(),
        ..Opts::default()
    }
    .build()
    .generate(&registry, &packages, &mut files);
    assert!(diags.is_empty());

    let wrapper = text(&files, "calc/bindings.go");
    assert!(wrapper.contains("package calc\n"));
    assert!(wrapper.contains("func bindAdd(a int32, b int32) int32\n"));
    assert!(wrapper.contains("// Add returns the sum computed natively.\n"));
    assert!(wrapper.contains("func Add(a Int32, b Int32) Int32 {\n"));
    assert!(wrapper.contains("  _r := bindAdd(_a, _b)\n"));

    let stub = text(&files, "calc/bindings.s");
    assert!(stub.contains("TEXT ·bindAdd(SB), NOSPLIT, $0\n\tCallImport\n\tRET\n"));

    // With an 8-byte frame header and two 4-byte arguments, the trampoline
    // reads at offsets 8 and 12 and writes the re-aligned result at 16:
    //   align_up(8, 4) = 8, align_up(12, 4) = 12, align_up(16, 4) = 16.
    let c = text(&files, "bindings.c");
    let expected_body = "\
static void _Z_goZ_exampleZ2EcomZ2FmZ2FcalcZ2EbindAddZ_vi(uint32_t sp) {
  sp += 8;
  sp = (sp + (4 - 1)) & -4;
  int32_t _a = *(int32_t*)&Z_mem->data[sp];
  sp += sizeof(int32_t);
  sp = (sp + (4 - 1)) & -4;
  int32_t _b = *(int32_t*)&Z_mem->data[sp];
  sp += sizeof(int32_t);
  int32_t _r = native_add(_a, _b);
  sp = (sp + (4 - 1)) & -4;
  memcpy(&Z_mem->data[sp], &_r, sizeof(int32_t));
}
void (*Z_goZ_exampleZ2EcomZ2FmZ2FcalcZ2EbindAddZ_vi)(uint32_t) = _Z_goZ_exampleZ2EcomZ2FmZ2FcalcZ2EbindAddZ_vi;
";
    assert!(c.contains("extern int32_t native_add(int32_t, int32_t);\n"));
    assert!(c.contains(expected_body), "unexpected trampoline:\n{c}");
}

#[test]
fn odd_argument_list_diagnosed_and_truncated() {
    let registry = registry_with_int32("m/calc");
    let packages = packages(
        "calc",
        r#"{"Inc": {"call": "native_inc", "args": ["a", "Int32", "dangling"]}}"#,
    );

    let mut files = Files::default();
    let diags = Opts {
        module: "m".to_string(),
        ..Opts::default()
    }
    .build()
    .generate(&registry, &packages, &mut files);

    let reported: Vec<_> = diags.into_iter().collect();
    assert_eq!(
        reported,
        vec![Diagnostic::MalformedArgumentList {
            binding: "m/calc.Inc".to_string(),
            trailing: "dangling".to_string(),
        }]
    );

    // The binding still generates from the complete pairs.
    let c = text(&files, "bindings.c");
    assert!(c.contains("int32_t _a = *(int32_t*)&Z_mem->data[sp];\n"));
    assert!(c.contains("native_inc(_a);\n"));
    assert!(!c.contains("dangling"));
}

#[test]
fn same_name_in_two_namespaces_does_not_collide() {
    let mut registry = TypeRegistry::new();
    let records = parse_types(
        r#"{".Fd": {"externalRepr": "Fd", "internalRepr": "int32", "nativeRepr": "int32_t"}}"#,
    )
    .unwrap();
    register_types(&mut registry, "m", records).unwrap();

    let write = r#"{"Write": {"call": "host_write", "args": ["fd", ".Fd"]}}"#;
    let mut packages = BTreeMap::new();
    packages.insert("fs".to_string(), parse_bindings(write).unwrap());
    packages.insert("net".to_string(), parse_bindings(write).unwrap());

    let mut files = Files::default();
    let diags = Opts {
        module: "m".to_string(),
        ..Opts::default()
    }
    .build()
    .generate(&registry, &packages, &mut files);
    assert!(diags.is_empty());

    let c = text(&files, "bindings.c");
    assert!(c.contains("void (*Z_goZ_mZ2FfsZ2EbindWriteZ_vi)(uint32_t)"));
    assert!(c.contains("void (*Z_goZ_mZ2FnetZ2EbindWriteZ_vi)(uint32_t)"));
}

#[test]
fn duplicate_symbol_in_one_namespace_is_flagged() {
    let registry = registry_with_int32("m");
    // "" and "." both name the project root, so these two sets land in the
    // same namespace and their `Write` bindings mangle identically.
    let write = r#"{"Write": {"call": "host_write", "args": ["a", "Int32"]}}"#;
    let mut packages = BTreeMap::new();
    packages.insert("".to_string(), parse_bindings(write).unwrap());
    packages.insert(".".to_string(), parse_bindings(write).unwrap());

    let mut files = Files::default();
    let diags = Opts {
        module: "m".to_string(),
        ..Opts::default()
    }
    .build()
    .generate(&registry, &packages, &mut files);

    let reported: Vec<_> = diags.into_iter().collect();
    assert_eq!(
        reported,
        vec![Diagnostic::DuplicateSymbol {
            symbol: "Z_goZ_mZ2EbindWriteZ_vi".to_string(),
            binding: "m.Write".to_string(),
            previous: "m.Write".to_string(),
        }]
    );

    let c = text(&files, "bindings.c");
    assert_eq!(c.matches("void (*Z_goZ_mZ2EbindWriteZ_vi)(uint32_t)").count(), 1);
}

#[test]
fn local_type_needs_no_import() {
    let mut registry = TypeRegistry::new();
    let records = parse_types(
        r#"{".Handle": {"externalRepr": "Handle", "internalRepr": "uint32", "nativeRepr": "uint32_t"}}"#,
    )
    .unwrap();
    register_types(&mut registry, "m/sys", records).unwrap();

    let packages = packages(
        "dev",
        r#"{"Close": {"call": "host_close", "args": ["h", ".Handle"]}}"#,
    );
    let mut files = Files::default();
    let diags = Opts {
        module: "m".to_string(),
        ..Opts::default()
    }
    .build()
    .generate(&registry, &packages, &mut files);
    assert!(diags.is_empty());

    let wrapper = text(&files, "dev/bindings.go");
    assert!(wrapper.contains("func Close(h Handle) {\n"));
    assert!(!wrapper.contains("import ("));
}

#[test]
fn unresolved_type_reported_not_fatal() {
    let registry = registry_with_int32("m/calc");
    let packages = packages(
        "calc",
        r#"{
            "Add": {"call": "native_add", "args": ["a", "Int32"]},
            "Bad": {"call": "native_bad", "args": ["x", "Mystery"]}
        }"#,
    );
    let mut files = Files::default();
    let diags = Opts {
        module: "m".to_string(),
        ..Opts::default()
    }
    .build()
    .generate(&registry, &packages, &mut files);

    let reported: Vec<_> = diags.into_iter().collect();
    assert_eq!(
        reported,
        vec![Diagnostic::UnresolvedType {
            binding: "m/calc.Bad".to_string(),
            reference: "Mystery".to_string(),
        }]
    );
    // The healthy binding is unaffected.
    let c = text(&files, "bindings.c");
    assert!(c.contains("native_add(_a);\n"));
    assert!(c.contains("// m/calc.Bad -> native_bad\n"));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let run = || {
        let mut registry = TypeRegistry::new();
        register_types(
            &mut registry,
            "m/calc",
            parse_types(
                r#"{"Int32": {"externalRepr": "Int32", "internalRepr": "int32", "nativeRepr": "int32_t", "alignment": 4}}"#,
            )
            .unwrap(),
        )
        .unwrap();
        let packages = packages(
            "calc",
            r#"{
                "Add": {"call": "native_add", "args": ["a", "Int32"], "ret": "Int32"},
                "Sub": {"call": "native_sub", "args": ["a", "Int32"], "ret": "Int32"}
            }"#,
        );
        let mut files = Files::default();
        let diags = Opts {
            module: "m".to_string(),
            ..Opts::default()
        }
        .build()
        .generate(&registry, &packages, &mut files);
        assert!(diags.is_empty());
        files
            .iter()
            .map(|(name, data)| (name.to_string(), data.to_vec()))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn import_order_is_sorted_not_insertion_order() {
    let emit = |imports: &[&str]| {
        let mut registry = TypeRegistry::new();
        let mut records = parse_types(
            r#"{"Image": {"externalRepr": "image.Image", "internalRepr": "int32", "nativeRepr": "int32_t"}}"#,
        )
        .unwrap();
        records.get_mut("Image").unwrap().imports =
            imports.iter().map(|s| s.to_string()).collect();
        register_types(&mut registry, "m/gfx", records).unwrap();
        let packages = packages(
            "app",
            r#"{"Show": {"call": "host_show", "args": ["img", "m/gfx/Image"]}}"#,
        );
        let mut files = Files::default();
        Opts {
            module: "m".to_string(),
            ..Opts::default()
        }
        .build()
        .generate(&registry, &packages, &mut files);
        text(&files, "app/bindings.go").to_string()
    };

    let a = emit(&["zlib/png", "alpha/draw"]);
    let b = emit(&["alpha/draw", "zlib/png"]);
    assert_eq!(a, b);
    assert!(a.contains("import (\n  \"alpha/draw\"\n  \"m/gfx\"\n  \"zlib/png\"\n)\n"));
}

#[test]
fn frame_header_is_a_parameter() {
    let registry = registry_with_int32("m/calc");
    let packages = packages(
        "calc",
        r#"{"Add": {"call": "native_add", "args": ["a", "Int32"]}}"#,
    );
    let mut files = Files::default();
    Opts {
        module: "m".to_string(),
        frame_header: 16,
        ..Opts::default()
    }
    .build()
    .generate(&registry, &packages, &mut files);
    assert!(text(&files, "bindings.c").contains("  sp += 16;\n"));
}

#[test]
fn stub_only_and_build_tags() {
    let registry = registry_with_int32("m/calc");
    let packages = packages(
        "calc",
        r#"{"Add": {"call": "native_add", "args": ["a", "Int32"], "stubOnly": true}}"#,
    );
    let mut files = Files::default();
    let diags = Opts {
        module: "m".to_string(),
        build_tags: Some("goc".to_string()),
        ..Opts::default()
    }
    .build()
    .generate(&registry, &packages, &mut files);
    assert!(diags.is_empty());

    let wrapper = text(&files, "calc/bindings.go");
    assert!(wrapper.contains("//go:build goc\n// +build goc\n"));
    assert!(wrapper.contains("func bindAdd(a int32)\n"));
    assert!(!wrapper.contains("func Add("));
    // The trampoline emits regardless: a hand-written wrapper still calls
    // through the same import slot.
    assert!(text(&files, "bindings.c").contains("native_add(_a);\n"));
}
