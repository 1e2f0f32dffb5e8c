fn main() {
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }

    if std::env::var("CARGO_FEATURE_EDGE_IMPULSE").is_ok() {
        // On target, use the g++ from the Embuild toolchain directory:
        // .embuild/espressif/tools/riscv32-esp-elf/esp-<VER>/riscv32-esp-elf/bin/riscv32-esp-elf-g++
        // On host, let `cc` pick the native C++ compiler.
        let compiler = if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
            Some(find_compiler().unwrap_or_else(|| "riscv32-esp-elf-g++".into()))
        } else {
            None
        };
        build_ei(compiler.as_deref());
    }

    println!("cargo:rerun-if-changed=build.rs");
}

fn find_compiler() -> Option<std::path::PathBuf> {
    use std::path::PathBuf;
    // Check local .embuild first, then global ~/.espressif
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").ok()?);
    let search_dirs = vec![
        manifest_dir.join(".embuild"),
        dirs::home_dir().map(|h| h.join(".espressif")).unwrap_or_default(),
    ];

    for root in search_dirs {
        let tools_dir = root.join("espressif/tools/riscv32-esp-elf");
        let Ok(entries) = std::fs::read_dir(&tools_dir) else {
            continue;
        };
        // Versioned directory, e.g. esp-13.2.0_20240530
        for entry in entries.flatten() {
            let candidate = entry.path().join("riscv32-esp-elf/bin/riscv32-esp-elf-g++");
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }
    None
}

fn build_ei(compiler_path: Option<&std::path::Path>) {
    use std::path::PathBuf;

    // Exported "C++ library" deployment of the fan-vibration impulse.
    let sdk_root = PathBuf::from("fan-vibration_inferencing");
    let shim_dir = PathBuf::from("ei_shim");

    let mut build = cc::Build::new();
    if let Some(compiler) = compiler_path {
        build.compiler(compiler);
    }

    build
        .cpp(true)
        .flag("-std=c++14")
        .flag("-O3")
        .define("EI_CLASSIFIER_ENABLE_DETECTION_3D", "0")
        .define("EI_CLASSIFIER_TFLITE_ENABLE_CMSIS_NN", "0")
        .define("EI_NATIVE_ARCH", "1")
        .include(&sdk_root)
        .include(sdk_root.join("src"))
        .include(sdk_root.join("src/edge-impulse-sdk"))
        .include(sdk_root.join("src/model-parameters"))
        .include(sdk_root.join("src/tflite-model"))
        .file(shim_dir.join("ei_shim.cpp"));

    add_source_files(&mut build, &sdk_root.join("src"));

    build.compile("edge-impulse-sdk");

    println!("cargo:rerun-if-changed=fan-vibration_inferencing");
    println!("cargo:rerun-if-changed=ei_shim");
}

fn add_source_files(build: &mut cc::Build, dir: &std::path::Path) {
    let entries = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", dir.display()));

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            add_source_files(build, &path);
        } else if let Some(ext) = path.extension() {
            if ext == "c" || ext == "cpp" || ext == "cc" {
                build.file(&path);
            }
        }
    }
}
