//! Integration tests for the generator over a Cargo package

use super::test_utils::{key_for, keys, package, write_file};
use embedfs::config::GeneratorConfig;
use embedfs::generate::{Generator, DATA_FILE, MODULE_FILE};
use embedfs::scan::CargoUnits;
use embedfs::tree::walker::SymlinkPolicy;
use embedfs::{codec, CallSite, ErrorKind, Resolver};
use std::fs;

const LIB: &str = r#"
pub mod pages;

use embedfs::new_dir;

pub fn assets(r: &embedfs::Resolver) -> embedfs::Result<embedfs::Dir> {
    new_dir!(r, "static")
}
"#;

const PAGES: &str = r#"
use embedfs::must_file as page;
use embedfs as emb;

pub fn home(r: &emb::Resolver) -> emb::File {
    page!(r, "templates/home.html")
}

pub mod admin {
    pub fn layout(r: &embedfs::Resolver) -> embedfs::Dir {
        ::embedfs::must_dir!(r, "templates")
    }
}
"#;

fn web_app() -> tempfile::TempDir {
    let pkg = package("web-app", &[("src/lib.rs", LIB), ("src/pages/mod.rs", PAGES)]);
    let root = pkg.path();
    write_file(root, "src/static/app.css", "body { margin: 0 }");
    write_file(root, "src/static/img/logo.svg", "<svg/>");
    write_file(root, "src/pages/templates/home.html", "<main>home</main>");
    write_file(root, "src/pages/templates/admin.html", "<main>admin</main>");
    pkg
}

#[test]
fn test_keys_follow_module_paths() {
    let pkg = web_app();
    let units = CargoUnits::for_manifest_dir(pkg.path()).unwrap();
    let generator = Generator::new(GeneratorConfig::default(), &units);

    let index = generator.generate(&[pkg.path().join("src")]).unwrap();
    assert_eq!(
        keys(&index),
        vec![
            "web_app/lib.rs|static",
            "web_app::pages/mod.rs|templates/home.html",
            "web_app::pages::admin/mod.rs|templates",
        ]
    );
}

#[test]
fn test_generated_keys_match_runtime_call_sites() {
    let pkg = web_app();
    let out = pkg.path().join("src/embedded");
    let units = CargoUnits::discover();
    let generator = Generator::new(GeneratorConfig::default(), &units);
    generator.run(&[pkg.path().join("src")], &out).unwrap();

    let index = codec::read_from_path(&out.join(DATA_FILE)).unwrap();
    let resolver = Resolver::baked(index);

    // What `module_path!()` and `file!()` report inside the package
    let lib = CallSite::new("web_app", "src/lib.rs", None);
    let pages = CallSite::new("web_app::pages", "src/pages/mod.rs", None);
    let admin = CallSite::new("web_app::pages::admin", "src/pages/mod.rs", None);

    let assets = resolver.new_dir(&lib, "static").unwrap();
    assert_eq!(assets.file(&["img", "logo.svg"]).contents().unwrap(), b"<svg/>");

    let home = resolver.new_file(&pages, "templates/home.html").unwrap();
    assert_eq!(home.contents().unwrap(), b"<main>home</main>");

    let layout = resolver.must_dir(&admin, "templates");
    assert_eq!(layout.read::<&str>(&[]).unwrap().len(), 2);

    // Same literal, different module
    assert_eq!(
        resolver.new_dir(&pages, "templates").unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert!(resolver.index().contains_key(&key_for(&admin, "templates")));
}

#[test]
fn test_generated_module_source() {
    let pkg = web_app();
    let out = pkg.path().join("src/embedded");
    let units = CargoUnits::for_manifest_dir(pkg.path()).unwrap();
    let config = GeneratorConfig {
        module_name: Some("assets".to_string()),
        ..GeneratorConfig::default()
    };
    let artifacts = Generator::new(config, &units)
        .run(&[pkg.path().join("src/lib.rs")], &out)
        .unwrap();

    assert_eq!(artifacts.module_name, "assets");
    assert_eq!(artifacts.entries, 1);
    let source = fs::read_to_string(out.join(MODULE_FILE)).unwrap();
    assert!(source.starts_with("// @generated by embedgen"));
    assert!(source.contains("include_bytes!(\"embedded.bin\")"));
    assert!(source.contains("pub fn configured_resolver()"));
}

#[test]
fn test_non_literal_path_aborts_without_output() {
    let pkg = web_app();
    write_file(
        pkg.path(),
        "src/dynamic.rs",
        "pub fn any(r: &embedfs::Resolver, name: &str) { let _ = embedfs::new_file!(r, name); }\n",
    );
    let out = pkg.path().join("src/embedded");
    let units = CargoUnits::for_manifest_dir(pkg.path()).unwrap();

    let err = Generator::new(GeneratorConfig::default(), &units)
        .run(&[pkg.path().join("src")], &out)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::GenerationSyntax);
    assert!(err.to_string().contains("dynamic.rs:1:"));
    assert!(!out.join(DATA_FILE).exists());
    assert!(!out.join(MODULE_FILE).exists());
}

#[test]
fn test_unparsable_source_aborts() {
    let pkg = web_app();
    write_file(pkg.path(), "src/broken.rs", "fn oops( {");
    let units = CargoUnits::for_manifest_dir(pkg.path()).unwrap();

    let err = Generator::new(GeneratorConfig::default(), &units)
        .generate(&[pkg.path().join("src")])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::GenerationSyntax);
}

#[test]
fn test_missing_target_aborts() {
    let pkg = package(
        "gone",
        &[("src/main.rs", "fn main() { let r = embedfs::Resolver::live(); embedfs::must_dir!(r, \"assets\"); }")],
    );
    let units = CargoUnits::for_manifest_dir(pkg.path()).unwrap();
    let err = Generator::new(GeneratorConfig::default(), &units)
        .generate(&[pkg.path().join("src/main.rs")])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[cfg(unix)]
#[test]
fn test_symlink_policy_reaches_packer() {
    let pkg = web_app();
    let root = pkg.path();
    std::os::unix::fs::symlink(root.join("src/static/app.css"), root.join("src/static/alias.css"))
        .unwrap();
    let units = CargoUnits::for_manifest_dir(root).unwrap();
    let key = "web_app/lib.rs|static";

    let followed = Generator::new(GeneratorConfig::default(), &units)
        .generate(&[root.join("src/lib.rs")])
        .unwrap();
    assert!(followed.get(key).unwrap().children().unwrap().contains_key("alias.css"));

    let mut config = GeneratorConfig::default();
    config.walker.symlinks = SymlinkPolicy::Skip;
    let skipped = Generator::new(config, &units)
        .generate(&[root.join("src/lib.rs")])
        .unwrap();
    assert!(!skipped.get(key).unwrap().children().unwrap().contains_key("alias.css"));

    let mut config = GeneratorConfig::default();
    config.walker.symlinks = SymlinkPolicy::Error;
    assert!(Generator::new(config, &units)
        .generate(&[root.join("src/lib.rs")])
        .is_err());
}
