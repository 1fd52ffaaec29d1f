use std::collections::BTreeMap;
use std::io;
use std::path::Path;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov"];

/// Map each label directory under the dataset root to the relative
/// serving paths of its video files. A missing root yields an empty map.
pub fn scan_dataset(root: &Path) -> io::Result<BTreeMap<String, Vec<String>>> {
    let mut dataset = BTreeMap::new();
    if !root.is_dir() {
        return Ok(dataset);
    }

    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let label = entry.file_name().to_string_lossy().to_string();

        let mut videos = Vec::new();
        for file in std::fs::read_dir(entry.path())? {
            let file = file?;
            if !file.file_type()?.is_file() {
                continue;
            }
            let name = file.file_name().to_string_lossy().to_string();
            if has_video_extension(&name) {
                videos.push(format!("data/{label}/{name}"));
            }
        }
        videos.sort();
        dataset.insert(label, videos);
    }

    Ok(dataset)
}

fn has_video_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scan_lists_only_video_files_per_label() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("hello")).unwrap();
        fs::create_dir(root.path().join("thanks")).unwrap();
        fs::write(root.path().join("hello/clip1.mp4"), b"x").unwrap();
        fs::write(root.path().join("hello/notes.txt"), b"x").unwrap();
        fs::write(root.path().join("thanks/clip2.MOV"), b"x").unwrap();
        fs::write(root.path().join("stray.mp4"), b"x").unwrap();

        let dataset = scan_dataset(root.path()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset["hello"], vec!["data/hello/clip1.mp4"]);
        assert_eq!(dataset["thanks"], vec!["data/thanks/clip2.MOV"]);
    }

    #[test]
    fn missing_root_yields_empty_map() {
        let root = tempfile::tempdir().unwrap();
        let gone = root.path().join("nope");
        assert!(scan_dataset(&gone).unwrap().is_empty());
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert!(has_video_extension("a.MP4"));
        assert!(has_video_extension("b.mov"));
        assert!(!has_video_extension("c.avi"));
        assert!(!has_video_extension("mp4"));
    }
}
