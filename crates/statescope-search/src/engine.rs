//! The search operation.

use std::path::Path;
use tracing::warn;

use statescope_vfs::{DirEntry, StateFs};

use crate::error::{SearchError, StateLoadError};
use crate::model::{SearchResult, StateFile};

/// Reserved extension marking a state file.
pub const STATE_EXTENSION: &str = "tfstate";

/// Search one directory of a backend.
///
/// Lists the direct entries of `spath` (empty means the root, `"."`),
/// derives a navigation locator for every subdirectory, and, when the
/// listing contains a state file, parses its outputs and version into the
/// result. `backend` is only used to construct the locators; resolving the
/// name to `fs` already happened in the caller.
///
/// A failed listing aborts with [`SearchError::DirectoryRead`] and no
/// partial result. A state file that cannot be fetched or decoded is
/// logged and degrades to an empty outputs/version instead; a directory
/// with no state file is the same non-error outcome.
pub async fn search(
    fs: &dyn StateFs,
    spath: &str,
    backend: &str,
) -> Result<SearchResult, SearchError> {
    let spath = if spath.is_empty() { "." } else { spath };

    let entries = fs
        .readdir(Path::new(spath))
        .await
        .map_err(|source| SearchError::DirectoryRead {
            path: spath.to_string(),
            source,
        })?;

    let mut result = SearchResult::default();
    for entry in &entries {
        if entry.kind.is_dir() {
            let child = join_logical(spath, &entry.name);
            let target = locator(backend, &child);
            result.subdirs.insert(child, target);
        }
    }

    let Some(name) = find_state_file(&entries) else {
        return Ok(result);
    };

    let state_path = join_logical(spath, name);
    match load_state(fs, &state_path).await {
        Ok(state) => {
            result.terraform_version = state.terraform_version;
            result.outputs = state
                .outputs
                .into_iter()
                .map(|(name, output)| (name, output.value))
                .collect();
        }
        Err(source) => {
            // A corrupt or unreadable state file renders the same as an
            // absent one; the listing is still useful for navigation.
            let err = SearchError::StateParse {
                path: state_path,
                source,
            };
            warn!(error = %err, "state file load failed");
        }
    }

    Ok(result)
}

/// Join a logical slash-separated path with a child name.
fn join_logical(base: &str, name: &str) -> String {
    match base {
        "" | "." => name.to_string(),
        _ => format!("{}/{}", base.trim_end_matches('/'), name),
    }
}

/// Navigation locator targeting a search of `spath` on `backend`.
fn locator(backend: &str, spath: &str) -> String {
    format!(
        "/search?backend={}&spath={}",
        urlencoding::encode(backend),
        urlencoding::encode(spath)
    )
}

/// First non-directory entry with the reserved extension, in listing order.
/// Later candidates are ignored.
fn find_state_file(entries: &[DirEntry]) -> Option<&str> {
    entries
        .iter()
        .filter(|e| !e.kind.is_dir())
        .find(|e| {
            Path::new(&e.name)
                .extension()
                .is_some_and(|ext| ext == STATE_EXTENSION)
        })
        .map(|e| e.name.as_str())
}

async fn load_state(fs: &dyn StateFs, path: &str) -> Result<StateFile, StateLoadError> {
    let bytes = fs.read_all(Path::new(path)).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use statescope_vfs::MemoryBackend;

    const PROD_STATE: &str = r#"{
        "terraform_version": "1.5.0",
        "outputs": {
            "vpc_id": {"value": "vpc-123", "type": "string"}
        }
    }"#;

    #[tokio::test]
    async fn test_subdirs_contain_exactly_direct_subdirectories() {
        let fs = MemoryBackend::new();
        fs.add_dir("network");
        fs.add_dir("compute");
        fs.add_dir("network/subnets");
        fs.add_file("readme.txt", b"not a dir".as_slice());

        let result = search(&fs, ".", "be_1").await.unwrap();

        let children: Vec<_> = result.subdirs.keys().map(String::as_str).collect();
        assert_eq!(children, vec!["compute", "network"]);
    }

    #[tokio::test]
    async fn test_no_state_file_is_a_valid_outcome() {
        let fs = MemoryBackend::new();
        fs.add_dir("network");
        fs.add_file("notes.json", b"{}".as_slice());

        let result = search(&fs, ".", "be_1").await.unwrap();

        assert!(result.outputs.is_empty());
        assert!(result.terraform_version.is_empty());
        assert_eq!(result.subdirs.len(), 1);
    }

    #[tokio::test]
    async fn test_parses_single_state_file() {
        let fs = MemoryBackend::new();
        fs.add_file("prod.tfstate", PROD_STATE);

        let result = search(&fs, ".", "be_1").await.unwrap();

        assert_eq!(result.terraform_version, "1.5.0");
        assert_eq!(result.outputs.len(), 1);
        assert_eq!(result.outputs["vpc_id"], json!("vpc-123"));
    }

    #[tokio::test]
    async fn test_output_values_pass_through_opaquely() {
        let fs = MemoryBackend::new();
        fs.add_file(
            "infra.tfstate",
            r#"{
                "terraform_version": "1.6.2",
                "outputs": {
                    "endpoints": {"value": {"api": ["10.0.0.1", "10.0.0.2"], "ttl": 300}},
                    "enabled": {"value": true}
                }
            }"#,
        );

        let result = search(&fs, ".", "be_1").await.unwrap();

        assert_eq!(
            result.outputs["endpoints"],
            json!({"api": ["10.0.0.1", "10.0.0.2"], "ttl": 300})
        );
        assert_eq!(result.outputs["enabled"], json!(true));
    }

    #[tokio::test]
    async fn test_first_candidate_wins_deterministically() {
        let fs = MemoryBackend::new();
        fs.add_file(
            "aaa.tfstate",
            r#"{"terraform_version": "1.1.0", "outputs": {"which": {"value": "aaa"}}}"#,
        );
        fs.add_file(
            "zzz.tfstate",
            r#"{"terraform_version": "9.9.9", "outputs": {"which": {"value": "zzz"}}}"#,
        );

        // Listing order is stable (name-sorted), so re-running must pick
        // the same file every time.
        for _ in 0..3 {
            let result = search(&fs, ".", "be_1").await.unwrap();
            assert_eq!(result.outputs["which"], json!("aaa"));
            assert_eq!(result.terraform_version, "1.1.0");
        }
    }

    #[tokio::test]
    async fn test_nonexistent_path_aborts_with_no_partial_result() {
        let fs = MemoryBackend::new();
        fs.add_dir("exists");

        let err = search(&fs, "missing", "be_1").await.unwrap_err();
        match err {
            SearchError::DirectoryRead { path, .. } => assert_eq!(path, "missing"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_state_file_degrades_to_empty() {
        let fs = MemoryBackend::new();
        fs.add_dir("network");
        fs.add_file("broken.tfstate", b"{not json".as_slice());

        let result = search(&fs, ".", "be_1").await.unwrap();

        assert!(result.outputs.is_empty());
        assert!(result.terraform_version.is_empty());
        // Navigation is unaffected by the bad file.
        assert_eq!(result.subdirs.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_spath_means_root() {
        let fs = MemoryBackend::new();
        fs.add_dir("network");

        let result = search(&fs, "", "be_1").await.unwrap();
        assert_eq!(
            result.subdirs["network"],
            "/search?backend=be_1&spath=network"
        );
    }

    #[tokio::test]
    async fn test_dotfile_is_not_a_candidate() {
        let fs = MemoryBackend::new();
        fs.add_file(".tfstate", PROD_STATE);

        let result = search(&fs, ".", "be_1").await.unwrap();
        assert!(result.outputs.is_empty());
        assert!(result.terraform_version.is_empty());
    }

    #[tokio::test]
    async fn test_directory_with_state_extension_is_skipped() {
        let fs = MemoryBackend::new();
        fs.add_dir("archive.tfstate");

        let result = search(&fs, ".", "be_1").await.unwrap();
        assert!(result.outputs.is_empty());
        assert_eq!(result.subdirs.len(), 1);
    }

    #[tokio::test]
    async fn test_locator_round_trip() {
        let fs = MemoryBackend::new();
        fs.add_dir("infra/net work"); // space forces encoding
        fs.add_file("infra/net work/app.tfstate", PROD_STATE);

        let root = search(&fs, "infra", "be_1").await.unwrap();
        let target = &root.subdirs["infra/net work"];

        // Feed the locator's spath back in as a request.
        let query = target.split('?').nth(1).unwrap();
        let spath = query
            .split('&')
            .find_map(|kv| kv.strip_prefix("spath="))
            .unwrap();
        let spath = urlencoding::decode(spath).unwrap();

        let again = search(&fs, &spath, "be_1").await.unwrap();
        assert_eq!(again.terraform_version, "1.5.0");
        assert_eq!(again.outputs["vpc_id"], json!("vpc-123"));
    }

    #[tokio::test]
    async fn test_browse_infra_directory_end_to_end() {
        let fs = MemoryBackend::new();
        fs.add_dir("infra/network");
        fs.add_file(
            "infra/prod.tfstate",
            r#"{"outputs":{"vpc_id":{"value":"vpc-123"}},"terraform_version":"1.5.0"}"#,
        );

        let result = search(&fs, "/infra", "aws1").await.unwrap();

        assert_eq!(result.subdirs.len(), 1);
        assert_eq!(
            result.subdirs["/infra/network"],
            "/search?backend=aws1&spath=%2Finfra%2Fnetwork"
        );
        assert_eq!(result.outputs.len(), 1);
        assert_eq!(result.outputs["vpc_id"], json!("vpc-123"));
        assert_eq!(result.terraform_version, "1.5.0");
    }

    #[test]
    fn test_join_logical() {
        assert_eq!(join_logical(".", "network"), "network");
        assert_eq!(join_logical("", "network"), "network");
        assert_eq!(join_logical("/infra", "network"), "/infra/network");
        assert_eq!(join_logical("infra/prod", "db"), "infra/prod/db");
        assert_eq!(join_logical("infra/", "db"), "infra/db");
    }

    #[test]
    fn test_find_state_file_first_match() {
        let entries = vec![
            DirEntry::directory("first.tfstate"),
            DirEntry::file("notes.txt"),
            DirEntry::file("a.tfstate"),
            DirEntry::file("b.tfstate"),
        ];
        assert_eq!(find_state_file(&entries), Some("a.tfstate"));

        let none = vec![DirEntry::file("plan.json"), DirEntry::directory("sub")];
        assert_eq!(find_state_file(&none), None);
    }
}
