//! Unit tests for completion flag stores.

use camino::Utf8PathBuf;
use mockable::MockEnv;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

fn env_with_vars(mappings: &'static [(&'static str, &'static str)]) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string().returning(move |key| {
        mappings
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| String::from(*v))
    });
    env
}

struct FileFixture {
    _dir: TempDir,
    path: Utf8PathBuf,
}

#[fixture]
fn progress_file() -> FileFixture {
    let dir = TempDir::new().expect("temp dir should be created");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .expect("temp dir should be valid UTF-8");
    FileFixture {
        path: root.join("nested").join("progress.toml"),
        _dir: dir,
    }
}

#[rstest]
fn memory_store_starts_cleared() {
    let store = MemoryProgressStore::new();
    let snapshot = store.snapshot().expect("snapshot should succeed");
    assert_eq!(snapshot.len(), TutorialType::ACTIVE.len());
    assert!(snapshot.values().all(|done| !done));
}

#[rstest]
fn memory_store_marks_and_resets() {
    let store = MemoryProgressStore::new();
    store
        .mark_completed(TutorialType::Crafting)
        .expect("mark should succeed");
    assert!(store.is_completed(TutorialType::Crafting).expect("read"));
    assert!(!store.is_completed(TutorialType::Gathering).expect("read"));

    store.reset().expect("reset should succeed");
    assert!(!store.is_completed(TutorialType::Crafting).expect("read"));
}

#[rstest]
fn none_tutorial_has_no_flag() {
    let store = MemoryProgressStore::new();
    let err = store
        .mark_completed(TutorialType::None)
        .expect_err("none has no flag");
    assert!(matches!(
        err,
        ProgressError::NoFlag {
            tutorial: TutorialType::None
        }
    ));
}

#[rstest]
fn missing_file_reads_as_nothing_completed(progress_file: FileFixture) {
    let store = TomlProgressStore::new(progress_file.path.clone());
    assert!(
        !store
            .is_completed(TutorialType::BuyHint)
            .expect("missing file should read")
    );
}

#[rstest]
fn file_store_persists_across_instances(progress_file: FileFixture) {
    TomlProgressStore::new(progress_file.path.clone())
        .mark_completed(TutorialType::BuyHint)
        .expect("mark should succeed");

    let reopened = TomlProgressStore::new(progress_file.path.clone());
    assert!(reopened.is_completed(TutorialType::BuyHint).expect("read"));
    assert!(!reopened.is_completed(TutorialType::TierSwitch).expect("read"));

    let content =
        std::fs::read_to_string(progress_file.path.as_std_path()).expect("file should exist");
    assert!(content.contains("buy_hint_completed = true"));
}

#[rstest]
fn file_store_reset_keeps_unknown_keys(progress_file: FileFixture) {
    let parent = progress_file.path.parent().expect("path has a parent");
    std::fs::create_dir_all(parent.as_std_path()).expect("parent should be created");
    std::fs::write(
        progress_file.path.as_std_path(),
        "[flags]\ncrafting_completed = true\nlegacy_flag = true\n",
    )
    .expect("seed file should be written");

    let store = TomlProgressStore::new(progress_file.path.clone());
    assert!(store.is_completed(TutorialType::Crafting).expect("read"));
    store.reset().expect("reset should succeed");

    assert!(!store.is_completed(TutorialType::Crafting).expect("read"));
    let content =
        std::fs::read_to_string(progress_file.path.as_std_path()).expect("file should exist");
    assert!(content.contains("legacy_flag = true"));
}

#[rstest]
fn malformed_file_is_a_parse_error(progress_file: FileFixture) {
    let parent = progress_file.path.parent().expect("path has a parent");
    std::fs::create_dir_all(parent.as_std_path()).expect("parent should be created");
    std::fs::write(progress_file.path.as_std_path(), "[flags\n").expect("seed file");

    let err = TomlProgressStore::new(progress_file.path.clone())
        .is_completed(TutorialType::Crafting)
        .expect_err("malformed TOML should fail");
    assert!(matches!(err, ProgressError::Parse { .. }));
}

#[rstest]
#[case::xdg_data_home(
    &[("XDG_DATA_HOME", "/data"), ("HOME", "/home/ada")],
    Some("/data/tutorseq/progress.toml")
)]
#[case::home_fallback(
    &[("HOME", "/home/ada")],
    Some("/home/ada/.local/share/tutorseq/progress.toml")
)]
#[case::empty_xdg_falls_back(
    &[("XDG_DATA_HOME", ""), ("HOME", "/home/ada")],
    Some("/home/ada/.local/share/tutorseq/progress.toml")
)]
#[case::nothing_set(&[], None)]
fn default_path_resolution(
    #[case] vars: &'static [(&'static str, &'static str)],
    #[case] expected: Option<&str>,
) {
    let env = env_with_vars(vars);
    assert_eq!(
        default_progress_path(&env),
        expected.map(Utf8PathBuf::from)
    );
}
