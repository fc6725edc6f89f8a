/// Platform key the ffbinaries release archives are published under, for
/// the running target.
pub fn current_platform() -> Option<&'static str> {
    platform_for(std::env::consts::OS, std::env::consts::ARCH)
}

pub fn platform_for(os: &str, arch: &str) -> Option<&'static str> {
    match (os, arch) {
        ("linux", "x86_64") => Some("linux-64"),
        ("linux", "x86") => Some("linux-32"),
        ("linux", "aarch64") => Some("linux-arm-64"),
        ("linux", "arm") => Some("linux-armhf-32"),
        // Only x86_64 builds are published; Apple silicon runs them under Rosetta.
        ("macos", "x86_64" | "aarch64") => Some("osx-64"),
        ("windows", "x86_64") => Some("windows-64"),
        _ => None,
    }
}

/// `<base>/v<version>/<tool>-<version>-<platform>.zip`
pub fn archive_url(base_url: &str, version: &str, tool: &str, platform: &str) -> String {
    format!(
        "{}/v{version}/{tool}-{version}-{platform}.zip",
        base_url.trim_end_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::linux_x64("linux", "x86_64", Some("linux-64"))]
    #[case::linux_arm64("linux", "aarch64", Some("linux-arm-64"))]
    #[case::mac_intel("macos", "x86_64", Some("osx-64"))]
    #[case::mac_arm("macos", "aarch64", Some("osx-64"))]
    #[case::windows("windows", "x86_64", Some("windows-64"))]
    #[case::unsupported("freebsd", "x86_64", None)]
    fn test_platform_for(#[case] os: &str, #[case] arch: &str, #[case] expected: Option<&str>) {
        assert_eq!(platform_for(os, arch), expected);
    }

    #[test]
    fn test_archive_url() {
        assert_eq!(
            archive_url("https://example.com/dl/", "6.1", "ffprobe", "linux-64"),
            "https://example.com/dl/v6.1/ffprobe-6.1-linux-64.zip"
        );
    }
}
