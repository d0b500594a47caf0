use unicode_normalization::UnicodeNormalization;

const NON_BREAKING_SPACE: char = '\u{00A0}';

/// Link text split into the file part and the `#heading` / `#^block` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLinkPath {
    pub path: String,
    pub subpath: String,
}

/// Folds non-breaking spaces, applies NFC and cuts the text before the first `#`.
pub fn normalize(value: &str) -> NormalizedLinkPath {
    let value: String = value.replace(NON_BREAKING_SPACE, " ").nfc().collect();
    let split = value.find('#').unwrap_or(value.len());
    let (path, subpath) = value.split_at(split);
    NormalizedLinkPath {
        path: path.to_string(),
        subpath: subpath.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "Note",
        "Note#Heading",
        "folder/Note#Heading#Nested",
        "#only-heading",
        "Caf\u{0065}\u{0301}\u{00A0}menu#^block",
        "\u{00A0}\u{00A0}",
        "",
    ];

    #[test]
    fn splits_at_first_hash() {
        let link = normalize("folder/Note#Heading#Nested");
        assert_eq!(link.path, "folder/Note");
        assert_eq!(link.subpath, "#Heading#Nested");
    }

    #[test]
    fn folds_nbsp_and_composes() {
        let link = normalize("Caf\u{0065}\u{0301}\u{00A0}menu");
        assert_eq!(link.path, "Caf\u{00E9} menu");
        assert!(link.subpath.is_empty());
    }

    #[test]
    fn path_is_idempotent() {
        for sample in SAMPLES {
            let once = normalize(sample);
            let twice = normalize(&once.path);
            assert_eq!(twice.path, once.path, "sample {:?}", sample);
            assert!(twice.subpath.is_empty());
            assert!(!once.path.contains(NON_BREAKING_SPACE));
        }
    }

    #[test]
    fn path_and_subpath_rebuild_the_normalized_text() {
        for sample in SAMPLES {
            let link = normalize(sample);
            let expected: String = sample.replace(NON_BREAKING_SPACE, " ").nfc().collect();
            assert_eq!(format!("{}{}", link.path, link.subpath), expected);
        }
    }
}
