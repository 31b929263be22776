use crate::error::{WirelessError, WirelessResult};
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const PLATFORM_TOOLS_URL: &str = "https://developer.android.com/studio/releases/platform-tools";

/// 决定搜索路径和安装提示的平台
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOs,
            _ => Platform::Linux,
        }
    }

    fn binary_name(self) -> &'static str {
        match self {
            Platform::Windows => "adb.exe",
            _ => "adb",
        }
    }

    /// 常见的安装位置，按优先级排列
    ///
    /// 依赖的环境变量缺失时跳过对应条目。
    pub fn candidates<F>(self, env: F) -> Vec<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        let home = || env("HOME").or_else(|| env("USERPROFILE")).map(PathBuf::from);
        let mut paths = Vec::new();

        match self {
            Platform::Windows => {
                let sdk = r"Android\Sdk\platform-tools\adb.exe";
                let legacy = r"Android\android-sdk\platform-tools\adb.exe";
                if let Some(dir) = env("LOCALAPPDATA") {
                    paths.push(PathBuf::from(dir).join(sdk));
                }
                if let Some(dir) = env("PROGRAMFILES(X86)") {
                    paths.push(PathBuf::from(dir).join(legacy));
                }
                if let Some(dir) = env("PROGRAMFILES") {
                    paths.push(PathBuf::from(dir).join(legacy));
                }
                paths.push(PathBuf::from(r"C:\adb\adb.exe"));
                paths.push(PathBuf::from(r"C:\platform-tools\adb.exe"));
            }
            Platform::MacOs => {
                if let Some(home) = home() {
                    paths.push(home.join("Library/Android/sdk/platform-tools/adb"));
                }
                paths.push(PathBuf::from("/usr/local/bin/adb"));
                paths.push(PathBuf::from("/opt/homebrew/bin/adb"));
            }
            Platform::Linux => {
                if let Some(home) = home() {
                    paths.push(home.join("Android/Sdk/platform-tools/adb"));
                }
                paths.push(PathBuf::from("/usr/local/bin/adb"));
                paths.push(PathBuf::from("/usr/bin/adb"));
                paths.push(PathBuf::from("/opt/android-sdk/platform-tools/adb"));
            }
        }

        paths
    }

    /// 找不到 ADB 时给用户的安装提示
    pub fn install_instructions(self) -> Vec<String> {
        match self {
            Platform::Windows => vec![
                format!("Download SDK Platform-Tools from: {}", PLATFORM_TOOLS_URL),
                "Or install via Chocolatey: choco install adb".to_string(),
            ],
            Platform::MacOs => vec![
                "Install via Homebrew: brew install android-platform-tools".to_string(),
                format!("Or download from: {}", PLATFORM_TOOLS_URL),
            ],
            Platform::Linux => vec![
                "Install via package manager: sudo apt install android-tools-adb".to_string(),
                format!("Or download from: {}", PLATFORM_TOOLS_URL),
            ],
        }
    }
}

/// 在 PATH 和常见安装位置中查找 ADB
pub fn locate_tool() -> WirelessResult<PathBuf> {
    locate_tool_with(Platform::current(), std::env::var_os("PATH"), |key| {
        std::env::var(key).ok()
    })
}

/// 先搜索 `search_path`，再按平台候选列表查找第一个可执行文件
pub fn locate_tool_with<F>(
    platform: Platform,
    search_path: Option<OsString>,
    env: F,
) -> WirelessResult<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let from_path = search_path
        .iter()
        .flat_map(|paths| std::env::split_paths(paths))
        .map(|dir| dir.join(platform.binary_name()));

    for candidate in from_path.chain(platform.candidates(env)) {
        if is_executable(&candidate) {
            debug!("Found adb at {}", candidate.display());
            return Ok(candidate);
        }
    }

    Err(WirelessError::ToolNotFound)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[cfg(unix)]
    fn make_tool(dir: &Path, mode: u32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("adb");
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn finds_tool_on_search_path() {
        let empty = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        let tool = make_tool(bin.path(), 0o755);

        let search = std::env::join_paths([empty.path(), bin.path()]).unwrap();
        let found = locate_tool_with(Platform::Linux, Some(search), no_env).unwrap();
        assert_eq!(found, tool);
    }

    #[cfg(unix)]
    #[test]
    fn skips_non_executable_files() {
        let bin = tempfile::tempdir().unwrap();
        make_tool(bin.path(), 0o644);

        let search = std::env::join_paths([bin.path()]).unwrap();
        let found = locate_tool_with(Platform::MacOs, Some(search), no_env);
        // 系统位置上可能真的装有 adb
        if let Ok(path) = found {
            assert_ne!(path, bin.path().join("adb"));
        }
    }

    #[cfg(unix)]
    #[test]
    fn falls_back_to_sdk_under_home() {
        let home = tempfile::tempdir().unwrap();
        let tools = home.path().join("Android/Sdk/platform-tools");
        fs::create_dir_all(&tools).unwrap();
        let tool = make_tool(&tools, 0o755);

        let home_dir = home.path().to_string_lossy().into_owned();
        let found = locate_tool_with(Platform::Linux, None, |key| {
            (key == "HOME").then(|| home_dir.clone())
        })
        .unwrap();
        assert_eq!(found, tool);
    }

    #[test]
    fn windows_candidates_skip_missing_variables() {
        let candidates = Platform::Windows.candidates(|key| {
            (key == "LOCALAPPDATA").then(|| r"C:\Users\dev\AppData\Local".to_string())
        });
        assert_eq!(candidates.len(), 3);
        assert!(candidates[0].to_string_lossy().ends_with("adb.exe"));
        assert_eq!(candidates[1], PathBuf::from(r"C:\adb\adb.exe"));
    }

    #[test]
    fn instructions_are_platform_specific() {
        assert!(Platform::MacOs.install_instructions()[0].contains("brew"));
        assert!(Platform::Windows.install_instructions()[1].contains("choco"));
        assert!(Platform::Linux.install_instructions()[0].contains("apt"));
    }
}
