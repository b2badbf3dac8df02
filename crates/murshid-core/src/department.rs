//! Department-similarity heuristic.
//!
//! Decides whether two department/major strings name the same academic
//! field. Deliberately permissive (recall over precision): a false "same
//! major" only shifts a candidate between quota buckets, it never corrupts
//! the final ranking.

/// Synonym clusters: a canonical department name and its common aliases.
/// Clusters are symmetric but not transitive: only direct membership is
/// checked, never chained inference.
const SYNONYM_CLUSTERS: &[(&str, &[&str])] = &[
    ("computer science", &["cs", "computing", "informatics", "it"]),
    ("information technology", &["it", "computer science", "computing"]),
    ("software engineering", &["cs", "computer science", "engineering"]),
    ("electrical engineering", &["ee", "electronics", "electrical"]),
    ("mechanical engineering", &["me", "mechanics"]),
    ("civil engineering", &["ce", "civil"]),
    ("information systems", &["is", "mis", "information technology"]),
];

/// Case-insensitive, whitespace-trimmed test of whether two department
/// strings represent the same academic field.
pub fn same_field(dept_a: &str, dept_b: &str) -> bool {
    let a = dept_a.trim().to_lowercase();
    let b = dept_b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }

    if a.contains(&b) || b.contains(&a) {
        return true;
    }

    for (key, aliases) in SYNONYM_CLUSTERS {
        let a_in_key = a.contains(key);
        let b_in_key = b.contains(key);
        if (a_in_key && aliases.contains(&b.as_str()))
            || (b_in_key && aliases.contains(&a.as_str()))
        {
            return true;
        }
    }

    // Coarse family fallback
    (a.contains("computer") && b.contains("computer"))
        || (a.contains("engineering") && b.contains("engineering"))
}
