//! Server-side filter construction.
//!
//! Lookup values are sanitized before interpolation; enumeration filters
//! interpolate the watermark verbatim since it is a server-produced
//! timestamp, not caller input.

use warden_config::{GroupAttrMap, UserAttrMap};

/// Escape a caller-supplied value for embedding in a filter.
///
/// The special characters of the filter grammar are replaced with their
/// `\xx` hex escapes.
#[must_use]
pub fn sanitize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'\\' => out.push_str("\\5c"),
            b'*' => out.push_str("\\2a"),
            b'(' => out.push_str("\\28"),
            b')' => out.push_str("\\29"),
            0 => out.push_str("\\00"),
            other => out.push(char::from(other)),
        }
    }
    out
}

/// Filter matching one user by login name.
#[must_use]
pub fn user_by_name(map: &UserAttrMap, value: &str) -> String {
    format!(
        "(&({}={})(objectclass={}))",
        map.name,
        sanitize_value(value),
        map.object_class
    )
}

/// Filter matching one user by numeric uid.
#[must_use]
pub fn user_by_id(map: &UserAttrMap, value: &str) -> String {
    format!(
        "(&({}={})(objectclass={}))",
        map.uid_number,
        sanitize_value(value),
        map.object_class
    )
}

/// Filter matching one group by name.
#[must_use]
pub fn group_by_name(map: &GroupAttrMap, value: &str) -> String {
    format!(
        "(&({}={})(objectclass={}))",
        map.name,
        sanitize_value(value),
        map.object_class
    )
}

/// Filter matching one group by numeric gid.
#[must_use]
pub fn group_by_id(map: &GroupAttrMap, value: &str) -> String {
    format!(
        "(&({}={})(objectclass={}))",
        map.gid_number,
        sanitize_value(value),
        map.object_class
    )
}

/// Enumeration filter for users, scoped past the watermark when one is set.
///
/// The protocol has no strict-greater comparator, so "strictly newer than
/// `W`" is expressed as `≥W ∧ ≠W`; an entry modified exactly at the
/// watermark was already applied by the previous cycle.
#[must_use]
pub fn enum_users(map: &UserAttrMap, watermark: Option<&str>) -> String {
    delta_filter(&map.name, &map.object_class, &map.modstamp, watermark)
}

/// Enumeration filter for groups.
#[must_use]
pub fn enum_groups(map: &GroupAttrMap, watermark: Option<&str>) -> String {
    delta_filter(&map.name, &map.object_class, &map.modstamp, watermark)
}

fn delta_filter(
    name_attr: &str,
    object_class: &str,
    modstamp_attr: &str,
    watermark: Option<&str>,
) -> String {
    match watermark {
        None => format!("(&({name_attr}=*)(objectclass={object_class}))"),
        Some(wm) => format!(
            "(&({name_attr}=*)(objectclass={object_class})({modstamp_attr}>={wm})(!({modstamp_attr}={wm})))"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_by_name_shape() {
        let map = UserAttrMap::default();
        assert_eq!(
            user_by_name(&map, "alice"),
            "(&(uid=alice)(objectclass=posixAccount))"
        );
    }

    #[test]
    fn test_user_by_id_shape() {
        let map = UserAttrMap::default();
        assert_eq!(
            user_by_id(&map, "1000"),
            "(&(uidNumber=1000)(objectclass=posixAccount))"
        );
    }

    #[test]
    fn test_group_filters() {
        let map = GroupAttrMap::default();
        assert_eq!(
            group_by_name(&map, "wheel"),
            "(&(cn=wheel)(objectclass=posixGroup))"
        );
        assert_eq!(
            group_by_id(&map, "10"),
            "(&(gidNumber=10)(objectclass=posixGroup))"
        );
    }

    #[test]
    fn test_sanitize_escapes_filter_grammar() {
        assert_eq!(sanitize_value("a*b"), "a\\2ab");
        assert_eq!(sanitize_value("(cn=x)"), "\\28cn=x\\29");
        assert_eq!(sanitize_value("back\\slash"), "back\\5cslash");
        assert_eq!(sanitize_value("plain"), "plain");
    }

    #[test]
    fn test_enum_users_without_watermark() {
        let map = UserAttrMap::default();
        assert_eq!(
            enum_users(&map, None),
            "(&(uid=*)(objectclass=posixAccount))"
        );
    }

    #[test]
    fn test_enum_users_with_watermark() {
        let map = UserAttrMap::default();
        assert_eq!(
            enum_users(&map, Some("20240101000000Z")),
            "(&(uid=*)(objectclass=posixAccount)(modifyTimestamp>=20240101000000Z)(!(modifyTimestamp=20240101000000Z)))"
        );
    }

    #[test]
    fn test_enum_groups_with_watermark() {
        let map = GroupAttrMap::default();
        assert_eq!(
            enum_groups(&map, Some("20240301120000Z")),
            "(&(cn=*)(objectclass=posixGroup)(modifyTimestamp>=20240301120000Z)(!(modifyTimestamp=20240301120000Z)))"
        );
    }
}
