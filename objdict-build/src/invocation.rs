//! Recording of the command line which produced a set of generated files
//!
//! The command is written into the banner of every generated file. Build directories and the
//! Zephyr base path are stripped from it, so that the output does not depend on where the build
//! was run.

/// Placeholder substituted for the Zephyr base directory
pub const ZEPHYR_BASE_VAR: &str = "$ZEPHYR_BASE";

/// Build the command line string to record in generated files
///
/// * Arguments starting with `--bindir` are dropped, along with the value following a bare
///   `--bindir`.
/// * `{bindir}/` is removed from every other argument.
/// * Occurrences of `zephyr_base` are replaced with `$ZEPHYR_BASE`.
///
/// The remaining arguments are joined with single spaces.
pub fn record_command<I, S>(args: I, zephyr_base: Option<&str>, bindir: Option<&str>) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let bindir_prefix = bindir.filter(|d| !d.is_empty()).map(|d| format!("{d}/"));
    let zephyr_base = zephyr_base.filter(|b| !b.is_empty());

    let mut recorded = Vec::new();
    let mut skip_next = false;
    for arg in args {
        let arg = arg.as_ref();
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--bindir") {
            skip_next = arg == "--bindir";
            continue;
        }

        let mut arg = arg.to_string();
        if let Some(prefix) = &bindir_prefix {
            arg = arg.replace(prefix.as_str(), "");
        }
        if let Some(base) = zephyr_base {
            arg = arg.replace(base, ZEPHYR_BASE_VAR);
        }
        recorded.push(arg);
    }
    recorded.join(" ")
}
