use serde::{Deserialize, Serialize};

/// Repository model - the star of the show
///
/// Field names on the wire match GitHub's so a stored bookmark snapshot
/// is byte-for-byte the record the API handed us. `id` is the only thing
/// that decides whether two records are "the same repository"; every
/// other field can drift between a stale snapshot and a fresh search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    #[serde(rename = "html_url")]
    pub url: String,
    #[serde(rename = "stargazers_count", default)]
    pub stars: u32,
    pub language: Option<String>,
    pub owner: Owner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// Quick-fill searches offered when there is nothing on screen yet
pub const POPULAR_SEARCHES: &[(&str, &str)] = &[
    ("react", "React"),
    ("typescript", "TypeScript"),
    ("nextjs", "Next.js"),
    ("vue", "Vue"),
    ("python", "Python"),
    ("nodejs", "Node.js"),
];


#[cfg(test)]
mod tests {
    use super::fixtures::repo;
    use super::*;

    #[test]
    fn test_serializes_with_github_field_names() {
        let json = serde_json::to_value(repo(7, "tokio-rs/tokio", 25000)).unwrap();
        assert_eq!(json["html_url"], "https://github.com/tokio-rs/tokio");
        assert_eq!(json["stargazers_count"], 25000);
        assert_eq!(json["owner"]["login"], "tokio-rs");
    }
}
