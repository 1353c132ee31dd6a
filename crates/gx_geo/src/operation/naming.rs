// geodex\crates\gx_geo\src\operation\naming.rs
//! 操作命名规则

use crate::crs::Crs;

/// 取逆时交换 "from A to B" 两端的名称前缀
const SWAPPABLE_PREFIXES: &[&str] = &[
    "Ballpark geocentric translation",
    "Ballpark geographic offset",
    "Null geographic offset",
    "Null vertical offset",
    "Null geocentric translation",
    "Ballpark vertical transformation",
    "Transformation",
    "Conversion",
];

/// 名称中含 "ballpark"（不区分大小写）
pub(crate) fn is_ballpark_name(name: &str) -> bool {
    name.to_lowercase().contains("ballpark")
}

/// 在 " to " 处拆分 "A to B"，跳过 "altered to use prime meridian" 中的 " to "
fn split_endpoints(rest: &str) -> Option<(&str, &str)> {
    rest.match_indices(" to ")
        .map(|(idx, _)| idx)
        .find(|&idx| !rest[idx + 4..].starts_with("use prime meridian"))
        .map(|idx| (&rest[..idx], &rest[idx + 4..]))
}

/// 逆操作名称
pub(crate) fn inverse_name(name: &str) -> String {
    for prefix in SWAPPABLE_PREFIXES {
        let rest = name
            .strip_prefix(prefix)
            .and_then(|r| r.strip_prefix(" from "));
        if let Some((a, b)) = rest.and_then(split_endpoints) {
            return format!("{prefix} from {b} to {a}");
        }
    }
    if name.starts_with("axis order change") {
        return name.to_string();
    }
    if let Some(inner) = name
        .strip_prefix("Inverse of '")
        .and_then(|r| r.strip_suffix('\''))
    {
        return inner.to_string();
    }
    if let Some(inner) = name.strip_prefix("Inverse of ") {
        return inner.to_string();
    }
    if name.contains(" + ") {
        format!("Inverse of '{name}'")
    } else {
        format!("Inverse of {name}")
    }
}

fn dimension_tag(crs: &Crs) -> &'static str {
    if crs.is_geocentric() {
        " (geocentric)"
    } else if crs.is_geographic_3d() {
        " (geog3D)"
    } else if crs.is_geographic() {
        " (geog2D)"
    } else {
        ""
    }
}

/// 同一基准内转换的名称
///
/// 两端同名时追加维度标签，例如 `Conversion from WGS 84 (geog2D) to WGS 84 (geocentric)`。
pub(crate) fn conversion_name(source: &Crs, target: &Crs) -> String {
    if source.name() == target.name() {
        format!(
            "Conversion from {}{} to {}{}",
            source.name(),
            dimension_tag(source),
            target.name(),
            dimension_tag(target)
        )
    } else {
        format!("Conversion from {} to {}", source.name(), target.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::wellknown;

    #[test]
    fn test_inverse_name_swaps_endpoints() {
        assert_eq!(
            inverse_name("Transformation from NTF (Paris) to WGS 84"),
            "Transformation from WGS 84 to NTF (Paris)"
        );
        assert_eq!(
            inverse_name("Null geographic offset from A to B"),
            "Null geographic offset from B to A"
        );
    }

    #[test]
    fn test_inverse_name_skips_altered_prime_meridian() {
        assert_eq!(
            inverse_name("Transformation from NTF (Paris) altered to use prime meridian of WGS 84 to WGS 84"),
            "Transformation from WGS 84 to NTF (Paris) altered to use prime meridian of WGS 84"
        );
    }

    #[test]
    fn test_inverse_name_quotes_concatenations() {
        assert_eq!(inverse_name("A + B"), "Inverse of 'A + B'");
        assert_eq!(inverse_name("Inverse of 'A + B'"), "A + B");
        assert_eq!(inverse_name("UTM zone 31N"), "Inverse of UTM zone 31N");
        assert_eq!(inverse_name("axis order change (2D)"), "axis order change (2D)");
    }

    #[test]
    fn test_ballpark_name() {
        assert!(is_ballpark_name("Ballpark geographic offset from A to B"));
        assert!(is_ballpark_name("some BALLPARK thing"));
        assert!(!is_ballpark_name("NTF to RGF93 v1 (1)"));
    }

    #[test]
    fn test_conversion_name_tags() {
        let name = conversion_name(&wellknown::epsg_4326(), &wellknown::epsg_4978());
        assert_eq!(name, "Conversion from WGS 84 (geog2D) to WGS 84 (geocentric)");
        let name = conversion_name(&wellknown::epsg_4807(), &wellknown::epsg_4326());
        assert_eq!(name, "Conversion from NTF (Paris) to WGS 84");
    }
}
