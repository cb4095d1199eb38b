use std::{
    fs,
    path::Path,
};

use sha2::{
    Digest,
    Sha256,
};
use thiserror::Error;

use super::ModelArtifact;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to read model file {path}: {source}")]
    Read { path: String, source: std::io::Error },

    #[error("Model file {0} is empty")]
    Empty(String),

    #[error("Model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Failed to decode JSON model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to decode binary model: {0}")]
    Binary(#[from] bincode::error::DecodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Bincode,
}

impl ArtifactFormat {
    /// JSON artifacts start with `{`; everything else is treated as bincode.
    pub fn sniff(bytes: &[u8]) -> Self {
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => ArtifactFormat::Json,
            _ => ArtifactFormat::Bincode,
        }
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn decode_artifact(bytes: &[u8]) -> Result<ModelArtifact, ArtifactError> {
    match ArtifactFormat::sniff(bytes) {
        ArtifactFormat::Json => Ok(serde_json::from_slice(bytes)?),
        ArtifactFormat::Bincode => {
            let (model, _): (ModelArtifact, usize) =
                bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
            Ok(model)
        }
    }
}

/// Reads and decodes the model at `path`, checking its digest first when one is expected.
pub fn load_artifact(
    path: &Path,
    expected_sha256: Option<&str>,
) -> Result<ModelArtifact, ArtifactError> {
    let bytes = fs::read(path)
        .map_err(|source| ArtifactError::Read { path: path.display().to_string(), source })?;

    if bytes.is_empty() {
        return Err(ArtifactError::Empty(path.display().to_string()));
    }

    if let Some(expected) = expected_sha256 {
        let actual = sha256_hex(&bytes);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(ArtifactError::ChecksumMismatch {
                expected: expected.trim().to_string(),
                actual,
            });
        }
    }

    let model = decode_artifact(&bytes)?;
    tracing::debug!(path = %path.display(), kind = model.kind(), bytes = bytes.len(), "Decoded model");
    Ok(model)
}

/// Serializes a model the way an exported artifact is laid out on disk.
#[cfg(test)]
pub(crate) fn encode_artifact(model: &ModelArtifact, format: ArtifactFormat) -> Vec<u8> {
    match format {
        ArtifactFormat::Json => serde_json::to_vec_pretty(model).unwrap(),
        ArtifactFormat::Bincode => {
            bincode::serde::encode_to_vec(model, bincode::config::standard()).unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        encoding::FEATURE_COUNT,
        model::{
            Classifier,
            LogisticRegression,
            RandomForest,
            Tree,
            TreeNode,
        },
    };

    fn forest() -> ModelArtifact {
        ModelArtifact::RandomForest(RandomForest::new(
            FEATURE_COUNT,
            vec![
                Tree::new(
                    FEATURE_COUNT,
                    vec![
                        TreeNode::Split { feature: 9, threshold: 0.5, left: 1, right: 2 },
                        TreeNode::Leaf { class: 1 },
                        TreeNode::Leaf { class: 0 },
                    ],
                ),
                Tree::new(FEATURE_COUNT, vec![TreeNode::Leaf { class: 1 }]),
            ],
        ))
    }

    #[test]
    fn loads_both_formats_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let model = forest();

        for (format, name) in [(ArtifactFormat::Json, "m.json"), (ArtifactFormat::Bincode, "m.bin")] {
            let path = dir.path().join(name);
            fs::write(&path, encode_artifact(&model, format)).unwrap();

            let bytes = fs::read(&path).unwrap();
            assert_eq!(ArtifactFormat::sniff(&bytes), format);

            let loaded = load_artifact(&path, None).unwrap();
            assert_eq!(loaded, model);
            assert_eq!(loaded.predict(&[[0.0; FEATURE_COUNT]]), Ok(vec![1]));
        }
    }

    #[test]
    fn json_threshold_defaults_when_omitted() {
        let json = format!(
            r#"{{"LogisticRegression": {{"coefficients": {:?}, "intercept": 1.5}}}}"#,
            vec![0.0; FEATURE_COUNT]
        );
        let model = decode_artifact(json.as_bytes()).unwrap();
        assert_eq!(
            model,
            ModelArtifact::LogisticRegression(LogisticRegression::new(vec![0.0; FEATURE_COUNT], 1.5))
        );
    }

    #[test]
    fn checksum_is_enforced_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        fs::write(&path, encode_artifact(&forest(), ArtifactFormat::Bincode)).unwrap();

        let digest = sha256_hex(&fs::read(&path).unwrap());
        assert!(load_artifact(&path, Some(&digest.to_uppercase())).is_ok());

        let err = load_artifact(&path, Some("deadbeef")).unwrap_err();
        assert!(matches!(err, ArtifactError::ChecksumMismatch { ref actual, .. } if *actual == digest));
    }

    #[test]
    fn garbage_and_empty_files_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();

        let empty = dir.path().join("empty.bin");
        fs::write(&empty, b"").unwrap();
        assert!(matches!(load_artifact(&empty, None), Err(ArtifactError::Empty(_))));

        let html = dir.path().join("page.bin");
        fs::write(&html, b"<!DOCTYPE html><html>quota exceeded</html>").unwrap();
        assert!(matches!(load_artifact(&html, None), Err(ArtifactError::Binary(_))));

        let bad_json = dir.path().join("bad.json");
        fs::write(&bad_json, b"{\"Perceptron\": {}}").unwrap();
        assert!(matches!(load_artifact(&bad_json, None), Err(ArtifactError::Json(_))));

        let missing = dir.path().join("missing.bin");
        assert!(matches!(load_artifact(&missing, None), Err(ArtifactError::Read { .. })));
    }

    #[test]
    fn sha256_matches_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
