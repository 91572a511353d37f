use std::fs;
use std::path::{Path, PathBuf};

use oxid3::{frame_ids, CommentFrame, Encoding, Options, PictureFrame, PictureType, Tag};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "oxid3-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

/// Fake MPEG payload ending in a recognisable trailer.
fn audio() -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..4096u32 {
        data.push((i % 251) as u8);
    }
    data.extend_from_slice(b"TRAILER");
    data
}

fn write_file(dir: &Path, name: &str, tag: &Tag) -> PathBuf {
    let path = dir.join(name);
    let mut bytes = Vec::new();
    tag.write_to(&mut bytes).expect("tag should serialize");
    bytes.extend_from_slice(&audio());
    fs::write(&path, bytes).expect("fixture should be writable");
    path
}

fn assert_audio_intact(path: &Path, tag_size: u64) {
    let bytes = fs::read(path).expect("file should be readable");
    let audio = audio();
    assert_eq!(bytes.len() as u64, tag_size + audio.len() as u64);
    assert_eq!(&bytes[tag_size as usize..], &audio[..]);
    assert_eq!(&bytes[bytes.len() - 7..], b"TRAILER");
}

fn small_tag() -> Tag {
    let mut tag = Tag::new();
    tag.set_title("Song");
    tag.set_artist("Band");
    tag
}

#[test]
fn test_save_growing_tag_keeps_audio() {
    let dir = unique_temp_dir("grow");
    let path = write_file(&dir, "song.mp3", &small_tag());

    let mut tag = Tag::open(&path, &Options::default()).unwrap();
    let before = tag.original_size();
    tag.add_picture(PictureFrame::new(
        Encoding::UTF_8,
        "image/png",
        PictureType::CoverFront,
        "",
        vec![0x89; 20_000],
    ));
    tag.save().unwrap();

    assert!(tag.original_size() > before);
    assert_eq!(tag.original_size(), tag.size());
    assert_audio_intact(&path, tag.original_size());

    let reread = Tag::open(&path, &Options::default()).unwrap();
    assert_eq!(reread.title(), Some("Song"));
    assert_eq!(reread.pictures().len(), 1);
    assert_eq!(reread.pictures()[0].picture_data.len(), 20_000);
    assert!(!dir.join(".song.mp3.oxid3-tmp").exists());
}

#[test]
fn test_save_shrinking_tag_keeps_audio() {
    let dir = unique_temp_dir("shrink");
    let mut original = small_tag();
    original.add_picture(PictureFrame::new(
        Encoding::ISO_8859_1,
        "image/jpeg",
        PictureType::CoverFront,
        "front",
        vec![0xFF; 8_000],
    ));
    let path = write_file(&dir, "song.mp3", &original);

    let mut tag = Tag::open(&path, &Options::default()).unwrap();
    assert_eq!(tag.delete_frames(frame_ids::PICTURE), 1);
    tag.save().unwrap();

    assert!(tag.original_size() < original.size());
    assert_audio_intact(&path, tag.original_size());
    assert_eq!(Tag::open(&path, &Options::default()).unwrap().artist(), Some("Band"));
}

#[test]
fn test_save_prepends_tag_to_untagged_file() {
    let dir = unique_temp_dir("untagged");
    let path = dir.join("raw.mp3");
    fs::write(&path, audio()).unwrap();

    let mut tag = Tag::open(&path, &Options::default()).unwrap();
    assert_eq!(tag.original_size(), 0);
    assert_eq!(tag.count(), 0);

    tag.set_title("Fresh");
    tag.save().unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..3], b"ID3");
    assert_eq!(bytes[3], 4);
    assert_audio_intact(&path, tag.original_size());
    assert_eq!(Tag::open(&path, &Options::default()).unwrap().title(), Some("Fresh"));
}

#[test]
fn test_empty_tag_strips_file_to_audio() {
    let dir = unique_temp_dir("strip");
    let path = write_file(&dir, "song.mp3", &small_tag());

    let mut tag = Tag::open(&path, &Options::header_only()).unwrap();
    assert!(tag.original_size() > 0);
    tag.delete_all_frames();
    tag.save().unwrap();

    assert_eq!(tag.original_size(), 0);
    assert_eq!(fs::read(&path).unwrap(), audio());
}

#[test]
fn test_header_only_save_replaces_whole_tag() {
    let dir = unique_temp_dir("header-only");
    let path = write_file(&dir, "song.mp3", &small_tag());

    let mut tag = Tag::open(&path, &Options::header_only()).unwrap();
    tag.set_album("Record");
    tag.save().unwrap();

    let reread = Tag::open(&path, &Options::default()).unwrap();
    assert_eq!(reread.album(), Some("Record"));
    assert_eq!(reread.title(), None);
    assert_audio_intact(&path, tag.original_size());
}

#[test]
fn test_padding_is_dropped_on_save() {
    let dir = unique_temp_dir("padding");
    let path = dir.join("padded.mp3");

    let mut bytes = vec![b'I', b'D', b'3', 4, 0, 0, 0, 0, 0, 115];
    bytes.extend_from_slice(b"TIT2\x00\x00\x00\x05\x00\x00\x03Song");
    bytes.extend_from_slice(&[0; 100]);
    bytes.extend_from_slice(&audio());
    fs::write(&path, bytes).unwrap();

    let mut tag = Tag::open(&path, &Options::default()).unwrap();
    assert_eq!(tag.original_size(), 125);
    assert_eq!(tag.title(), Some("Song"));

    tag.save().unwrap();
    assert_eq!(tag.original_size(), 25);
    assert_audio_intact(&path, 25);
}

#[test]
fn test_repeated_saves_track_tag_size() {
    let dir = unique_temp_dir("repeat");
    let path = write_file(&dir, "song.mp3", &small_tag());

    let mut tag = Tag::open(&path, &Options::default()).unwrap();
    tag.set_title("A much longer title than before");
    tag.save().unwrap();
    tag.set_title("S");
    tag.save().unwrap();

    assert_audio_intact(&path, tag.original_size());
    assert_eq!(Tag::open(&path, &Options::default()).unwrap().title(), Some("S"));
}

#[test]
fn test_comment_with_same_key_is_overwritten() {
    let dir = unique_temp_dir("comment");
    let path = write_file(&dir, "song.mp3", &small_tag());

    let mut tag = Tag::open(&path, &Options::default()).unwrap();
    tag.add_comment(CommentFrame::new(Encoding::UTF_8, "eng", "note", "first"));
    tag.add_comment(CommentFrame::new(Encoding::UTF_8, "eng", "note", "second"));
    tag.add_comment(CommentFrame::new(Encoding::UTF_8, "deu", "note", "zweite"));
    tag.save().unwrap();

    let reread = Tag::open(&path, &Options::default()).unwrap();
    let comments = reread.comments();
    assert_eq!(comments.len(), 2);
    let english = comments
        .iter()
        .find(|c| c.language == "eng")
        .expect("english comment should survive");
    assert_eq!(english.text, "second");
}

#[test]
fn test_save_fails_cleanly_on_invalid_frame() {
    let dir = unique_temp_dir("invalid");
    let path = write_file(&dir, "song.mp3", &small_tag());
    let before = fs::read(&path).unwrap();

    let mut tag = Tag::open(&path, &Options::default()).unwrap();
    tag.add_comment(CommentFrame::new(Encoding::UTF_8, "english", "", "bad"));
    assert!(tag.save().is_err());

    assert_eq!(fs::read(&path).unwrap(), before);
    assert!(!dir.join(".song.mp3.oxid3-tmp").exists());
}

#[cfg(unix)]
#[test]
fn test_save_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = unique_temp_dir("perms");
    let path = write_file(&dir, "song.mp3", &small_tag());
    fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

    let mut tag = Tag::open(&path, &Options::default()).unwrap();
    tag.set_genre("Jazz");
    tag.save().unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o640);
}

#[test]
fn test_failed_reopen_keeps_original_file_safe() {
    let dir = unique_temp_dir("reopen");
    let path = write_file(&dir, "a.mp3", &small_tag());

    // a 127 byte frame where only 90 bytes of the area remain
    let broken = dir.join("b.mp3");
    let mut bytes = b"ID3\x04\x00\x00\x00\x00\x00\x64TIT2\x00\x00\x00\x7F\x00\x00".to_vec();
    bytes.extend_from_slice(&[0x03; 90]);
    bytes.extend_from_slice(&audio());
    fs::write(&broken, bytes).unwrap();

    let mut tag = Tag::open(&path, &Options::default()).unwrap();
    let size = tag.original_size();
    assert!(tag.reopen(&broken, &Options::default()).is_err());
    assert_eq!(tag.path(), Some(path.as_path()));
    assert_eq!(tag.original_size(), size);

    tag.set_title("A2");
    tag.save().unwrap();
    assert_audio_intact(&path, tag.original_size());
    assert_eq!(Tag::open(&path, &Options::default()).unwrap().title(), Some("A2"));
}

#[test]
fn test_frame_with_nonstandard_id_survives_save() {
    let dir = unique_temp_dir("raw-id");
    let path = dir.join("odd.mp3");

    let mut bytes = vec![b'I', b'D', b'3', 4, 0, 0, 0, 0, 0, 31];
    bytes.extend_from_slice(b"TIT2\x00\x00\x00\x05\x00\x00\x03Song");
    bytes.extend_from_slice(b"xyz1\x00\x00\x00\x06\x00\x00secret");
    bytes.extend_from_slice(&audio());
    fs::write(&path, bytes).unwrap();

    let mut tag = Tag::open(&path, &Options::default()).unwrap();
    assert_eq!(tag.unknown_frames().len(), 1);
    tag.set_artist("Band");
    tag.save().unwrap();

    let reread = Tag::open(&path, &Options::default()).unwrap();
    let unknown = reread.unknown_frames();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].0.as_bytes(), b"xyz1");
    assert_eq!(unknown[0].1.body(), b"secret");
    assert_eq!(reread.title(), Some("Song"));
    assert_audio_intact(&path, tag.original_size());
}
