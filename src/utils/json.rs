use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Serializes `value` as JSON indented with tabs. Both the storage file and `--json` output use
/// this layout.
pub fn to_tab_indented_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut serializer)?;
    Ok(buffer)
}
