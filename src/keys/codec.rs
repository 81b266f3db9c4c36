//! Key Codec
//!
//! Encodes addresses as `<root>/<app>/<module>/<version>/<config>/<named>/<parameter>`.

use crate::error::{Result, RigelError};
use crate::keys::{ConfigAddress, NamedConfigAddress};

/// Separator between key segments.
pub const KEY_SEPARATOR: char = '/';

// == Key Codec ==
/// Maps addresses onto store keys under a fixed root prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCodec {
    root: String,
}

impl KeyCodec {
    /// Creates a codec rooted at `root_prefix`. Trailing separators are dropped.
    pub fn new(root_prefix: impl Into<String>) -> Result<Self> {
        let root_prefix = root_prefix.into();
        let root = root_prefix.trim_end_matches(KEY_SEPARATOR);
        if root.is_empty() {
            return Err(RigelError::InvalidAddress(format!(
                "root prefix '{}' is empty",
                root_prefix
            )));
        }
        Ok(Self {
            root: root.to_string(),
        })
    }

    /// Root prefix without a trailing separator.
    pub fn root_prefix(&self) -> &str {
        &self.root
    }

    /// Prefix covering every key this codec can produce.
    pub fn watch_prefix(&self) -> String {
        format!("{}{}", self.root, KEY_SEPARATOR)
    }

    // == Encode Prefix ==
    /// Encodes a named config as the prefix of its parameter keys.
    ///
    /// The result ends with the separator so that sibling named configs
    /// sharing a leading substring (`uat` vs `uat2`) never fall in range.
    pub fn encode_prefix(&self, named: &NamedConfigAddress) -> Result<String> {
        let mut prefix = self.root.clone();
        for (field, value) in named.segments() {
            validate_segment(field, value)?;
            prefix.push(KEY_SEPARATOR);
            prefix.push_str(value);
        }
        prefix.push(KEY_SEPARATOR);
        Ok(prefix)
    }

    // == Encode Key ==
    /// Encodes a full parameter address as a store key.
    pub fn encode_key(&self, address: &ConfigAddress) -> Result<String> {
        validate_segment("parameterName", &address.parameter_name)?;
        let mut key = self.encode_prefix(&address.named)?;
        key.push_str(&address.parameter_name);
        Ok(key)
    }

    /// Extracts the parameter name of `key` relative to a named-config prefix.
    ///
    /// Returns None when the key is outside the prefix or nested deeper
    /// than one segment.
    pub fn parameter_name<'a>(&self, prefix: &str, key: &'a str) -> Option<&'a str> {
        let rest = key.strip_prefix(prefix)?;
        if rest.is_empty() || rest.contains(KEY_SEPARATOR) {
            None
        } else {
            Some(rest)
        }
    }
}

fn validate_segment(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(RigelError::InvalidAddress(format!(
            "{} must not be empty",
            field
        )));
    }
    if value.contains(KEY_SEPARATOR) {
        return Err(RigelError::InvalidAddress(format!(
            "{} '{}' must not contain '{}'",
            field, value, KEY_SEPARATOR
        )));
    }
    Ok(())
}

// == Prefix Range End ==
/// Computes the exclusive upper bound of the key range starting with `prefix`.
///
/// Trailing 0xFF bytes are dropped and the last remaining byte incremented.
/// An all-0xFF (or empty) prefix has no finite bound and yields `[0]`,
/// which the store reads as "to the end of the key space".
pub fn prefix_range_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < 0xFF {
            end.push(last + 1);
            return end;
        }
    }
    vec![0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codec() -> KeyCodec {
        KeyCodec::new("/root").unwrap()
    }

    fn sample() -> ConfigAddress {
        ConfigAddress::new("v1", "AppX", "ModY", "cfg", "uat", "limit")
    }

    #[test]
    fn test_encode_key_layout() {
        let key = codec().encode_key(&sample()).unwrap();
        assert_eq!(key, "/root/AppX/ModY/v1/cfg/uat/limit");
    }

    #[test]
    fn test_encode_prefix_drops_parameter() {
        let prefix = codec().encode_prefix(&sample().named).unwrap();
        assert_eq!(prefix, "/root/AppX/ModY/v1/cfg/uat/");
    }

    #[test]
    fn test_root_trailing_separator_trimmed() {
        let codec = KeyCodec::new("/root//").unwrap();
        assert_eq!(codec.root_prefix(), "/root");
        assert_eq!(codec.watch_prefix(), "/root/");
    }

    #[test]
    fn test_empty_root_rejected() {
        assert!(matches!(
            KeyCodec::new("/"),
            Err(RigelError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_empty_component_rejected() {
        let mut addr = sample();
        addr.named.module_name.clear();
        let err = codec().encode_key(&addr).unwrap_err();
        assert!(matches!(err, RigelError::InvalidAddress(ref m) if m.contains("moduleName")));
    }

    #[test]
    fn test_separator_in_component_rejected() {
        let mut addr = sample();
        addr.parameter_name = "a/b".to_string();
        assert!(matches!(
            codec().encode_key(&addr),
            Err(RigelError::InvalidAddress(_))
        ));

        let mut addr = sample();
        addr.named.version = "1/2".to_string();
        assert!(matches!(
            codec().encode_prefix(&addr.named),
            Err(RigelError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_parameter_name_extraction() {
        let codec = codec();
        let prefix = "/root/AppX/ModY/v1/cfg/uat/";
        assert_eq!(codec.parameter_name(prefix, "/root/AppX/ModY/v1/cfg/uat/limit"), Some("limit"));
        assert_eq!(codec.parameter_name(prefix, "/root/AppX/ModY/v1/cfg/uat/a/b"), None);
        assert_eq!(codec.parameter_name(prefix, "/root/AppX/ModY/v1/cfg/uat2/limit"), None);
        assert_eq!(codec.parameter_name(prefix, prefix), None);
    }

    #[test]
    fn test_prefix_range_end() {
        assert_eq!(prefix_range_end(b"/root/"), b"/root0".to_vec());
        assert_eq!(prefix_range_end(b"a\xff"), b"b".to_vec());
        assert_eq!(prefix_range_end(b"a\xfe"), b"a\xff".to_vec());
        assert_eq!(prefix_range_end(b"\xff\xff"), vec![0]);
        assert_eq!(prefix_range_end(b""), vec![0]);
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_.-]{1,6}"
    }

    fn address() -> impl Strategy<Value = ConfigAddress> {
        (segment(), segment(), segment(), segment(), segment(), segment())
            .prop_map(|(v, a, m, c, n, p)| ConfigAddress::new(v, a, m, c, n, p))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        // Distinct addresses never share a key.
        #[test]
        fn prop_encode_is_injective(a in address(), b in address()) {
            let codec = codec();
            let ka = codec.encode_key(&a).unwrap();
            let kb = codec.encode_key(&b).unwrap();
            prop_assert_eq!(a == b, ka == kb);
        }

        // Every key of a named config sorts inside that named config's range.
        #[test]
        fn prop_key_within_prefix_range(a in address()) {
            let codec = codec();
            let key = codec.encode_key(&a).unwrap();
            let prefix = codec.encode_prefix(&a.named).unwrap();
            let end = prefix_range_end(prefix.as_bytes());
            prop_assert!(key.as_bytes() >= prefix.as_bytes());
            prop_assert!(key.as_bytes() < end.as_slice());
            prop_assert_eq!(codec.parameter_name(&prefix, &key), Some(a.parameter_name.as_str()));
        }
    }
}
