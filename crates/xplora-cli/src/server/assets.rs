// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Client runtime scripts compiled into the binary.

const HMR_JS: &str = include_str!("../client/hmr.js");
const REFRESH_JS: &str = include_str!("../client/refresh.js");

/// Content type of the client scripts.
pub const JAVASCRIPT: &str = "application/javascript";

/// Returns the embedded script for a `/client/<name>` request.
pub fn client_script(name: &str) -> Option<&'static str> {
    match name {
        "hmr.js" => Some(HMR_JS),
        "refresh.js" => Some(REFRESH_JS),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_scripts() {
        assert!(client_script("hmr.js").unwrap().contains("__XPLORA_WS_PORT__"));
        assert!(client_script("refresh.js").is_some());
        assert!(client_script("other.js").is_none());
        assert!(client_script("../hmr.js").is_none());
    }
}
