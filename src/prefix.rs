use std::collections::HashMap;
use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use tera::Value;
use thiserror::Error;

/// Name the converter is registered under in the template environment.
pub const PREFIX_LEN_FILTER: &str = "ipv4_prefix_len";

#[derive(Error, Debug, PartialEq)]
#[error("'{0}' is not a valid subnet mask")]
pub struct MaskError(pub String);

/// Convert a dotted-decimal subnet mask to its prefix length, e.g. `255.255.255.0` -> 24.
///
/// The mask is applied to `0.0.0.0` and the resulting network's prefix length returned,
/// so non-contiguous masks are rejected by the address library itself.
pub fn ipv4_prefix_len(mask: &str) -> Result<u8, MaskError> {
    let netmask: Ipv4Addr = mask.parse().map_err(|_| MaskError(mask.to_string()))?;

    Ipv4Net::with_netmask(Ipv4Addr::UNSPECIFIED, netmask)
        .map(|net| net.prefix_len())
        .map_err(|_| MaskError(mask.to_string()))
}

/// Template filter wrapping [`ipv4_prefix_len`].
pub(crate) fn prefix_len_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let mask = value.as_str().ok_or_else(|| {
        tera::Error::msg(format!("{PREFIX_LEN_FILTER} expects a string, got {value}"))
    })?;

    let prefix_len = ipv4_prefix_len(mask).map_err(|err| tera::Error::msg(err.to_string()))?;

    Ok(Value::from(prefix_len))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tera::Value;

    use crate::prefix::{ipv4_prefix_len, prefix_len_filter, MaskError};

    #[test]
    fn converts_contiguous_masks() {
        assert_eq!(ipv4_prefix_len("255.255.255.0"), Ok(24));
        assert_eq!(ipv4_prefix_len("255.255.255.252"), Ok(30));
        assert_eq!(ipv4_prefix_len("255.255.0.0"), Ok(16));
        assert_eq!(ipv4_prefix_len("255.255.255.255"), Ok(32));
        assert_eq!(ipv4_prefix_len("0.0.0.0"), Ok(0));
    }

    #[test]
    fn rejects_non_contiguous_mask() {
        assert_eq!(
            ipv4_prefix_len("10.0.0.5"),
            Err(MaskError("10.0.0.5".to_string()))
        );
        assert!(ipv4_prefix_len("255.0.255.0").is_err());
    }

    #[test]
    fn rejects_unparseable_mask() {
        let err = ipv4_prefix_len("not-a-mask").unwrap_err();
        assert_eq!(err.to_string(), "'not-a-mask' is not a valid subnet mask");
        assert!(ipv4_prefix_len("ffff:ffff::").is_err());
    }

    #[test]
    fn filter_returns_number() {
        let value = prefix_len_filter(&Value::from("255.255.255.252"), &HashMap::new()).unwrap();
        assert_eq!(value, Value::from(30));

        assert!(prefix_len_filter(&Value::from(24), &HashMap::new()).is_err());
        assert!(prefix_len_filter(&Value::from("10.0.0.5"), &HashMap::new()).is_err());
    }
}
