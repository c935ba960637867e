use super::*;

fn temp_file(name: &str) -> TokenFile {
    let dir = std::env::temp_dir().join(format!("hypertrack-token-{}", uuid::Uuid::new_v4()));
    TokenFile::new(dir.join(name))
}

#[tokio::test]
async fn missing_file_loads_as_none() {
    let file = temp_file("session");
    assert_eq!(file.load().await.unwrap(), None);
}

#[tokio::test]
async fn save_then_load_trims_and_clear_removes() {
    let file = temp_file("session");
    file.save("abc123\n").await.unwrap();
    assert_eq!(file.load().await.unwrap().as_deref(), Some("abc123"));

    file.clear().await.unwrap();
    assert_eq!(file.load().await.unwrap(), None);
    file.clear().await.unwrap();
}

#[tokio::test]
async fn blank_file_is_no_session() {
    let file = temp_file("session");
    file.save("  \n").await.unwrap();
    assert_eq!(file.load().await.unwrap(), None);
}

#[cfg(unix)]
#[tokio::test]
async fn saved_token_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let file = temp_file("session");
    file.save("abc123").await.unwrap();
    let mode = tokio::fs::metadata(file.path()).await.unwrap().permissions().mode();
    assert_eq!(mode & 0o077, 0, "mode {mode:o} is readable by others");
    file.clear().await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn save_tightens_an_existing_world_readable_file() {
    use std::os::unix::fs::PermissionsExt;

    let file = temp_file("session");
    tokio::fs::create_dir_all(file.path().parent().unwrap()).await.unwrap();
    tokio::fs::write(file.path(), "old").await.unwrap();
    tokio::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o644)).await.unwrap();

    file.save("new").await.unwrap();

    let mode = tokio::fs::metadata(file.path()).await.unwrap().permissions().mode();
    assert_eq!(mode & 0o077, 0, "mode {mode:o} is readable by others");
    assert_eq!(file.load().await.unwrap().as_deref(), Some("new"));
    file.clear().await.unwrap();
}
