//! `version path`

use forgeboot_version::VersionProperties;

pub fn paths(props: &VersionProperties, versions: &[String], route: &str) -> Vec<String> {
    props.versioned_paths(versions.iter().map(String::as_str), route)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let versions = vec!["v1".to_string(), "v2".to_string(), "v1".to_string()];
        assert_eq!(
            paths(&VersionProperties::default(), &versions, "/users"),
            vec!["/api/v1/users", "/api/v2/users"]
        );
    }
}
