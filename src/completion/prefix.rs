//! Canonical URL prefixes the typed text is tried behind.

/// A scheme (optionally with "www.") that may precede what the user typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlPrefix {
    /// Lowercase prefix text
    pub prefix: &'static str,
    /// How many components ("scheme", "www.") the prefix stands for
    pub component_count: usize,
}

/// Most specific first; the empty prefix always matches.
const URL_PREFIXES: &[UrlPrefix] = &[
    UrlPrefix {
        prefix: "http://www.",
        component_count: 2,
    },
    UrlPrefix {
        prefix: "https://www.",
        component_count: 2,
    },
    UrlPrefix {
        prefix: "ftp://www.",
        component_count: 2,
    },
    UrlPrefix {
        prefix: "http://",
        component_count: 1,
    },
    UrlPrefix {
        prefix: "https://",
        component_count: 1,
    },
    UrlPrefix {
        prefix: "ftp://",
        component_count: 1,
    },
    UrlPrefix {
        prefix: "",
        component_count: 0,
    },
];

impl UrlPrefix {
    pub fn all() -> &'static [UrlPrefix] {
        URL_PREFIXES
    }

    /// First prefix `p` such that `lower_text` starts with `p + lower_suffix`.
    pub fn best_match(lower_text: &str, lower_suffix: &str) -> Option<&'static UrlPrefix> {
        URL_PREFIXES.iter().find(|p| {
            lower_text
                .strip_prefix(p.prefix)
                .is_some_and(|rest| rest.starts_with(lower_suffix))
        })
    }

    pub fn len(&self) -> usize {
        self.prefix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }
}
