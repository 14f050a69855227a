//! Integration tests for bare and framework environment composition.

use std::path::{Path, PathBuf};

use commonsense_board::{BoardDescriptor, FloatAbi, PackageLocator, PackageMap, PackagesDir};
use commonsense_env::{
    compose, compose_bare, compose_framework, ConfigError, HostContext, ScriptSource, Variant,
};

/// A PlatformIO-like install: packages root, platform package, build dir.
struct Install {
    dir: tempfile::TempDir,
}

impl Install {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        for d in [
            "packages/framework-cmsis/CMSIS/Include",
            "packages/framework-cmsis/CMSIS/Lib/GCC",
            "packages/framework-cmsis-atmel/CMSIS/Device/ATMEL/samd51/source",
            "packages/framework-commonsense/src",
            "packages/framework-commonsense/linker",
            "platform/linker",
            "project",
        ] {
            std::fs::create_dir_all(root.join(d)).expect("create dir");
        }
        std::fs::write(
            root.join("packages/framework-commonsense/linker/commonsense_linker.ld"),
            "ENTRY(Reset_Handler)",
        )
        .expect("write framework script");
        std::fs::write(
            root.join("platform/linker/commonsense_linker.ld"),
            "ENTRY(Reset_Handler)",
        )
        .expect("write platform script");
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn locator(&self) -> PackagesDir {
        PackagesDir::new(self.root().join("packages"))
    }

    fn package(&self, name: &str) -> PathBuf {
        self.root().join("packages").join(name)
    }

    fn host(&self) -> HostContext {
        HostContext::new(self.root().join("platform"), self.root().join(".pio/build"))
            .with_project_dir(self.root().join("project"))
    }
}

/// Locator that knows every package except one.
struct Without<'a> {
    inner: &'a dyn PackageLocator,
    missing: &'static str,
}

impl PackageLocator for Without<'_> {
    fn resolve(&self, logical_name: &str) -> Option<PathBuf> {
        if logical_name == self.missing {
            None
        } else {
            self.inner.resolve(logical_name)
        }
    }
}

fn position(flags: &[String], flag: &str) -> usize {
    flags
        .iter()
        .position(|f| f == flag)
        .unwrap_or_else(|| panic!("{flag} not in {flags:?}"))
}

#[test]
fn composition_is_idempotent() {
    let install = Install::new();
    let board = BoardDescriptor::commonsense_samd51();
    for variant in [Variant::Bare, Variant::Framework] {
        let first = compose(variant, &board, &install.locator(), &install.host()).expect("first");
        let second = compose(variant, &board, &install.locator(), &install.host()).expect("second");
        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }
}

#[test]
fn hardware_flags_take_precedence() {
    let install = Install::new();
    let board = BoardDescriptor::commonsense_samd51();
    let c = compose_framework(&board, &install.locator(), &install.host()).expect("compose");
    let env = &c.environment;

    for flags in [&env.compile_flags, &env.link_flags] {
        let abi = position(flags, "-mfloat-abi=hard");
        let fpu = position(flags, "-mfpu=fpv4-sp-d16");
        let cpu = position(flags, "-mcpu=cortex-m4");
        let optimize = position(flags, "-Os");
        assert!(abi < optimize && fpu < optimize && cpu < optimize);
        assert_eq!(flags.iter().filter(|f| f.starts_with("-mfloat-abi")).count(), 1);
    }
}

#[test]
fn board_override_wins_regardless_of_variant() {
    let install = Install::new();
    let custom = install.root().join("custom.ld");
    std::fs::write(&custom, "").expect("write custom script");
    let mut board = BoardDescriptor::commonsense_samd51();
    board.build.ldscript = custom.display().to_string();

    for variant in [Variant::Bare, Variant::Framework] {
        let c = compose(variant, &board, &install.locator(), &install.host()).expect("compose");
        assert_eq!(c.environment.linker_script.path, custom);
        assert_eq!(c.environment.linker_script.source, ScriptSource::BoardOverride);
    }
}

#[test]
fn relative_override_found_in_project() {
    let install = Install::new();
    std::fs::write(install.root().join("project/app.ld"), "").expect("write script");
    let mut board = BoardDescriptor::commonsense_samd51();
    board.build.ldscript = "app.ld".into();

    let c = compose_bare(&board, &install.locator(), &install.host()).expect("compose");
    let script = &c.environment.linker_script;
    assert_eq!(script.path, Path::new("app.ld"));
    assert_eq!(script.search_dir.as_deref(), Some(install.root().join("project").as_path()));
    assert!(c
        .environment
        .library_paths
        .contains(&install.root().join("project")));
}

#[test]
fn relative_override_in_project_subdirectory() {
    let install = Install::new();
    let ld_dir = install.root().join("project/ld");
    std::fs::create_dir_all(&ld_dir).expect("create ld dir");
    std::fs::write(ld_dir.join("app.ld"), "").expect("write script");
    let mut board = BoardDescriptor::commonsense_samd51();
    board.build.ldscript = "ld/app.ld".into();

    for variant in [Variant::Bare, Variant::Framework] {
        let c = compose(variant, &board, &install.locator(), &install.host()).expect("compose");
        let env = &c.environment;
        let flag = env.linker_script.link_flag();
        let name = flag.strip_prefix("-T").expect("-T switch");
        assert!(
            env.library_paths.iter().any(|dir| dir.join(name).is_file()),
            "{flag} not found on {:?}",
            env.library_paths
        );
        assert!(env.link_args().contains(&flag));
    }
}

#[test]
fn framework_default_script_and_search_path() {
    let install = Install::new();
    let board = BoardDescriptor::commonsense_samd51();
    let c = compose_framework(&board, &install.locator(), &install.host()).expect("compose");
    let linker_dir = install.package("framework-commonsense").join("linker");

    let script = &c.environment.linker_script;
    assert_eq!(script.path, linker_dir.join("commonsense_linker.ld"));
    assert_eq!(script.source, ScriptSource::FrameworkDefault);
    assert!(c.environment.library_paths.contains(&linker_dir));
    assert!(c
        .environment
        .link_args()
        .contains(&"-Tcommonsense_linker.ld".to_string()));
}

#[test]
fn bare_default_script_is_absolute() {
    let install = Install::new();
    let board = BoardDescriptor::commonsense_samd51();
    let c = compose_bare(&board, &install.locator(), &install.host()).expect("compose");

    let script = &c.environment.linker_script;
    assert_eq!(
        script.path,
        install.root().join("platform/linker/commonsense_linker.ld")
    );
    assert!(script.path.is_absolute());
    assert_eq!(script.source, ScriptSource::PlatformDefault);
}

#[test]
fn missing_vendor_headers_is_fatal() {
    let install = Install::new();
    let locator = install.locator();
    let without = Without {
        inner: &locator,
        missing: "vendor-headers",
    };
    let board = BoardDescriptor::commonsense_samd51();

    for variant in [Variant::Bare, Variant::Framework] {
        let err = compose(variant, &board, &without, &install.host()).unwrap_err();
        assert!(matches!(&err, ConfigError::UnresolvedPackage { name } if name == "vendor-headers"));
        assert!(err.to_string().contains("vendor-headers"));
    }
}

#[test]
fn uninstalled_package_dir_is_fatal() {
    let install = Install::new();
    std::fs::remove_dir_all(install.package("framework-cmsis")).expect("remove");
    let board = BoardDescriptor::commonsense_samd51();
    let err = compose_bare(&board, &install.locator(), &install.host()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingPackageDir { .. }));
    assert_eq!(err.subject(), "core-headers");
}

#[test]
fn framework_libraries_precede_generic_libraries() {
    let install = Install::new();
    let board = BoardDescriptor::commonsense_samd51();
    let c = compose_framework(&board, &install.locator(), &install.host()).expect("compose");

    assert_eq!(c.libraries.len(), 2);
    assert_eq!(c.libraries[0].source_dir, install.package("framework-commonsense").join("src"));
    assert_eq!(
        c.libraries[1].output_dir,
        install.root().join(".pio/build/FrameworkCMSISDevice")
    );
    assert_eq!(
        c.environment.libs,
        vec![
            "FrameworkCommonSense",
            "FrameworkCMSISDevice",
            "arm_cortexM4lf_math",
            "m"
        ]
    );

    let bare = compose_bare(&board, &install.locator(), &install.host()).expect("compose");
    assert!(bare.libraries.is_empty());
}

#[test]
fn missing_library_source_is_fatal() {
    let install = Install::new();
    std::fs::remove_dir_all(
        install
            .package("framework-cmsis-atmel")
            .join("CMSIS/Device/ATMEL/samd51/source"),
    )
    .expect("remove");
    let board = BoardDescriptor::commonsense_samd51();
    let err = compose_framework(&board, &install.locator(), &install.host()).unwrap_err();
    assert!(matches!(
        &err,
        ConfigError::MissingLibrarySource { library, .. } if library == "FrameworkCMSISDevice"
    ));
}

#[test]
fn missing_bundled_script_is_fatal() {
    let install = Install::new();
    std::fs::remove_file(install.root().join("platform/linker/commonsense_linker.ld"))
        .expect("remove");
    let board = BoardDescriptor::commonsense_samd51();
    let err = compose_bare(&board, &install.locator(), &install.host()).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingLinkerScript { origin: ScriptSource::PlatformDefault, .. }
    ));
    // The framework variant has its own script and is unaffected.
    assert!(compose_framework(&board, &install.locator(), &install.host()).is_ok());
}

#[test]
fn assembler_flags_mirror_final_compile_flags() {
    let install = Install::new();
    let board = BoardDescriptor::commonsense_samd51();
    for variant in [Variant::Bare, Variant::Framework] {
        let env = compose(variant, &board, &install.locator(), &install.host())
            .expect("compose")
            .environment;
        let mut expected = env.compile_flags.clone();
        expected.push("-x".into());
        expected.push("assembler-with-cpp".into());
        assert_eq!(env.assemble_flags, expected);
        assert!(env.assemble_flags.contains(&"-mcpu=cortex-m4".to_string()));
    }
}

#[test]
fn soft_float_board() {
    let install = Install::new();
    let mut board = BoardDescriptor::commonsense_samd51();
    board.build.float_abi = Some(FloatAbi::Soft);

    let env = compose_bare(&board, &install.locator(), &install.host())
        .expect("compose")
        .environment;
    assert!(env.compile_flags.contains(&"-mfloat-abi=soft".to_string()));
    assert!(!env.compile_flags.iter().any(|f| f.starts_with("-mfpu")));
    assert_eq!(env.libs, vec!["m"]);
}

#[test]
fn include_and_define_layout() {
    let install = Install::new();
    let board = BoardDescriptor::commonsense_samd51();
    let env = compose_framework(&board, &install.locator(), &install.host())
        .expect("compose")
        .environment;
    let atmel = install.package("framework-cmsis-atmel").join("CMSIS/Device/ATMEL");
    assert_eq!(
        env.include_paths,
        vec![
            install.package("framework-cmsis").join("CMSIS/Include"),
            atmel.clone(),
            atmel.join("samd51"),
            install.package("framework-commonsense").join("src"),
        ]
    );
    assert_eq!(env.defines, vec!["F_CPU=120000000L"]);
    assert_eq!(env.c_flags, vec!["-std=gnu11"]);
    assert!(env.cxx_flags.contains(&"-fno-exceptions".to_string()));
}

#[test]
fn explicit_package_map_locator() {
    let install = Install::new();
    let locator = PackageMap::new()
        .with("core-headers", install.package("framework-cmsis"))
        .with("vendor-headers", install.package("framework-cmsis-atmel"));
    let board = BoardDescriptor::commonsense_samd51();
    assert!(compose_bare(&board, &locator, &install.host()).is_ok());
    let err = compose_framework(&board, &locator, &install.host()).unwrap_err();
    assert_eq!(err.subject(), "framework-sources");
}
