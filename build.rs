use std::env;
use std::path::{Path, PathBuf};

const WATCHED_VARIABLES: [&str; 4] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"];
const DEFAULT_TRIPLET: &str = "x64-windows";

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // Linux and macOS find FFmpeg through pkg-config inside ffmpeg-sys-next.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    if env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    match vcpkg_install_dir() {
        Some(directory) if directory.exists() => suggest_ffmpeg_dir(&directory),
        Some(directory) => warn(&format!(
            "VCPKG_ROOT is set but {} does not contain an FFmpeg install",
            directory.display()
        )),
        None => warn("FFMPEG_DIR is not set; point it at an FFmpeg install (e.g. from vcpkg) to build on Windows"),
    }
}

fn vcpkg_install_dir() -> Option<PathBuf> {
    let root = env::var_os("VCPKG_ROOT")?;
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| DEFAULT_TRIPLET.to_string());
    Some(PathBuf::from(root).join("installed").join(triplet))
}

fn suggest_ffmpeg_dir(directory: &Path) {
    warn(&format!(
        "found vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to make discovery explicit",
        directory.display()
    ));
    if env::var_os("VCPKGRS_DYNAMIC").is_none() {
        warn("set VCPKGRS_DYNAMIC=1 if the vcpkg FFmpeg build is dynamic");
    }
}

fn warn(message: &str) {
    println!("cargo:warning={message}");
}
