// CLI command implementations
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{json, Map, Value};
use tracing::debug;

use oxid3::id3::frames::picture::mime_for_extension;
use oxid3::id3::header::TagHeader;
use oxid3::{
    frame_ids, FieldMappings, Frame, FrameId, Metadata, Options, PictureFrame, PictureType,
    StandardField, Tag,
};

use crate::cli::config::{BatchOperation, Commands, Config};
use crate::cli::output::{OutputFormatter, ProgressBar};

/// Run the parsed command line.
pub fn run(config: &Config) -> Result<()> {
    let formatter = OutputFormatter::new(config.format, config.quiet);

    match &config.command {
        Commands::Read {
            files,
            fields,
            frames,
            output,
        } => command_read(files, fields.as_deref(), *frames, output.as_deref(), &formatter),
        Commands::Write {
            file,
            metadata,
            from_file,
            id3_version,
        } => command_write(
            file,
            metadata.as_deref(),
            from_file.as_deref(),
            *id3_version,
            &formatter,
        ),
        Commands::Copy { source, targets } => command_copy(source, targets, &formatter),
        Commands::Batch {
            directory,
            pattern,
            operation,
            metadata,
        } => command_batch(directory, pattern, *operation, metadata.as_deref(), &formatter),
        Commands::Detect { files } => command_detect(files, &formatter),
        Commands::ExportCover {
            file,
            output,
            index,
        } => command_export_cover(file, output, *index, &formatter),
        Commands::SetCover {
            file,
            image,
            mime_type,
            description,
        } => command_set_cover(
            file,
            image,
            mime_type.as_deref(),
            description.as_deref(),
            &formatter,
        ),
        Commands::RemoveCover { files } => command_remove_cover(files, &formatter),
        Commands::Strip { files } => command_strip(files, &formatter),
        Commands::Info { files, detailed } => command_info(files, *detailed),
    }
}

fn open_tag(path: &str, options: &Options) -> Result<Tag> {
    Tag::open(path, options).with_context(|| format!("failed to read tag from {path}"))
}

fn save_tag(tag: &mut Tag, path: &str) -> Result<()> {
    tag.save()
        .with_context(|| format!("failed to save tag to {path}"))
}

/// Build the JSON document `read` prints for one file.
pub fn read_document(path: &str, include_frames: bool, fields: Option<&[String]>) -> Result<Value> {
    let tag = open_tag(path, &Options::default())?;
    let mut value = serde_json::to_value(Metadata::from_tag(&tag))?;

    if let Some(obj) = value.as_object_mut() {
        if let Some(fields) = fields {
            obj.retain(|key, _| fields.iter().any(|field| field == key));
        }
        obj.insert("file".to_string(), Value::String(path.to_string()));

        if include_frames {
            let frames = tag
                .all_frames()
                .into_iter()
                .map(|(id, frame)| json!({ "id": id, "frame": frame }))
                .collect();
            obj.insert("frames".to_string(), Value::Array(frames));
        }
    }

    Ok(value)
}

/// Read tags from files
fn command_read(
    files: &[String],
    fields: Option<&str>,
    include_frames: bool,
    output: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let fields = Config::parse_fields(fields);

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {path}"))?,
        )),
        None => Box::new(io::stdout()),
    };

    let mut failures = 0;
    for file_path in files {
        match read_document(file_path, include_frames, fields.as_deref()) {
            Ok(value) => formatter.output_value(&value, &mut writer)?,
            Err(e) => {
                formatter.print_error(&format!("{e:#}"));
                failures += 1;
            }
        }
    }
    writer.flush()?;

    if failures == files.len() {
        bail!("no file could be read");
    }
    Ok(())
}

/// Apply a JSON object of field names to values. `null` removes the field.
///
/// Returns the number of fields touched.
pub fn apply_metadata(tag: &mut Tag, metadata: &Map<String, Value>) -> Result<usize> {
    for (key, value) in metadata {
        let field: StandardField = key.parse().map_err(anyhow::Error::msg)?;
        let text = match value {
            Value::Null => {
                let removed = tag.remove_field(field);
                debug!(field = field.as_str(), removed, "removed field");
                continue;
            }
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => bail!("value for {key} must be a string, number or null, got {other}"),
        };
        if !tag.set_field(field, text) {
            bail!("{key} cannot be set from text; use set-cover");
        }
    }
    Ok(metadata.len())
}

fn parse_metadata(json_text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(json_text).context("invalid metadata JSON")? {
        Value::Object(map) => Ok(map),
        _ => bail!("metadata must be a JSON object"),
    }
}

/// Write fields to a file
fn command_write(
    file: &str,
    metadata: Option<&str>,
    from_file: Option<&str>,
    id3_version: Option<u8>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let metadata_json = match (from_file, metadata) {
        (Some(from_path), _) => fs::read_to_string(from_path)
            .with_context(|| format!("failed to read {from_path}"))?,
        (None, Some(metadata)) => metadata.to_string(),
        (None, None) => bail!("either --metadata or --from-file is required"),
    };
    let metadata = parse_metadata(&metadata_json)?;

    let mut tag = open_tag(file, &Options::default())?;
    if let Some(version) = id3_version {
        tag.set_version(version)?;
    }
    let count = apply_metadata(&mut tag, &metadata)?;
    save_tag(&mut tag, file)?;

    formatter.print_success(&format!("Updated {} field(s) in {}", count, file));
    Ok(())
}

/// Copy every frame from `source` into each target, replacing the target's tag
fn command_copy(source: &str, targets: &[String], formatter: &OutputFormatter) -> Result<()> {
    let source_tag = open_tag(source, &Options::default())?;

    for target in targets {
        let result = open_tag(target, &Options::header_only()).and_then(|mut tag| {
            tag.delete_all_frames();
            tag.set_version(source_tag.version())?;
            for (id, frame) in source_tag.all_frames() {
                tag.add_frame(id, frame.clone())?;
            }
            save_tag(&mut tag, target)
        });

        match result {
            Ok(()) => formatter.print_success(&format!("Copied {} frame(s) to {}", source_tag.count(), target)),
            Err(e) => formatter.print_error(&format!("{e:#}")),
        }
    }

    Ok(())
}

/// Batch process directory
fn command_batch(
    directory: &str,
    pattern: &str,
    operation: BatchOperation,
    metadata: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let metadata = match operation {
        BatchOperation::Write => {
            let json_text = metadata.context("--metadata is required for the write operation")?;
            Some(parse_metadata(json_text)?)
        }
        BatchOperation::Read | BatchOperation::Strip => None,
    };

    // Build glob pattern
    let glob_pattern = if pattern.contains('*') || pattern.contains('?') {
        format!("{}/{}", directory, pattern)
    } else {
        format!("{}/**/{}", directory, pattern)
    };

    let mut files = Vec::new();
    for entry in glob::glob(&glob_pattern).context("invalid glob pattern")? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => formatter.print_error(&format!("Error reading path: {}", e)),
        }
    }

    if files.is_empty() {
        formatter.print_info("No files found matching pattern");
        return Ok(());
    }
    formatter.print_info(&format!("Processing {} files ({})...", files.len(), operation));

    let mut progress = ProgressBar::new(files.len(), !formatter.quiet());
    let mut success_count = 0;
    let mut errors = Vec::new();

    for path in &files {
        let path_str = path.to_string_lossy();
        let result = match operation {
            BatchOperation::Read => open_tag(&path_str, &Options::default()).map(|_| ()),
            BatchOperation::Write => open_tag(&path_str, &Options::default()).and_then(|mut tag| {
                if let Some(metadata) = &metadata {
                    apply_metadata(&mut tag, metadata)?;
                }
                save_tag(&mut tag, &path_str)
            }),
            BatchOperation::Strip => strip(&path_str),
        };

        match result {
            Ok(()) => success_count += 1,
            Err(e) => errors.push(format!("{e:#}")),
        }
        progress.increment(&path_str);
    }

    for error in &errors {
        formatter.print_error(error);
    }
    formatter.print_info(&format!(
        "Completed: {} successful, {} errors",
        success_count,
        errors.len()
    ));
    Ok(())
}

/// Report whether each file starts with an ID3v2 tag
fn command_detect(files: &[String], formatter: &OutputFormatter) -> Result<()> {
    for file_path in files {
        let header = File::open(file_path)
            .map_err(oxid3::Id3Error::from)
            .and_then(|file| TagHeader::read(&mut BufReader::new(file)));

        match header {
            Ok(Some(header)) => println!(
                "{}: ID3v2.{}.{} ({} bytes)",
                file_path,
                header.version,
                header.revision,
                header.tag_size()
            ),
            Ok(None) => println!("{}: no ID3v2 tag", file_path),
            Err(e) => formatter.print_error(&format!("{}: {}", file_path, e)),
        }
    }

    Ok(())
}

/// Export cover art
fn command_export_cover(
    file: &str,
    output_dir: &str,
    index: Option<usize>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let tag = open_tag(file, &Options::only([frame_ids::PICTURE.as_str()]))?;

    let picture = match index {
        Some(index) => tag
            .pictures()
            .get(index)
            .copied()
            .with_context(|| format!("{file} has no picture #{index}"))?,
        None => tag
            .front_cover()
            .with_context(|| format!("{file} has no pictures"))?,
    };

    let stem = Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cover".to_string());
    let target = Path::new(output_dir).join(format!("{}_cover.{}", stem, picture.extension()));

    fs::create_dir_all(output_dir).with_context(|| format!("failed to create {output_dir}"))?;
    fs::write(&target, &picture.picture_data)
        .with_context(|| format!("failed to write {}", target.display()))?;

    formatter.print_success(&format!(
        "Exported {} ({}, {} bytes) to {}",
        picture.picture_type.description(),
        picture.mime_type,
        picture.picture_data.len(),
        target.display()
    ));
    Ok(())
}

/// Set cover art
fn command_set_cover(
    file: &str,
    image: &str,
    mime_type: Option<&str>,
    description: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let data = fs::read(image).with_context(|| format!("failed to read image {image}"))?;
    let mime_type = match mime_type {
        Some(mime) => mime.to_string(),
        None => {
            let extension = Path::new(image)
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default();
            mime_for_extension(&extension).to_string()
        }
    };

    let mut tag = open_tag(file, &Options::default())?;
    let size = data.len();
    let encoding = tag.default_encoding();
    tag.add_picture(PictureFrame::new(
        encoding,
        mime_type.as_str(),
        PictureType::CoverFront,
        description.unwrap_or_default(),
        data,
    ));
    save_tag(&mut tag, file)?;

    formatter.print_success(&format!("Set {} cover ({} bytes) on {}", mime_type, size, file));
    Ok(())
}

/// Remove cover art
fn command_remove_cover(files: &[String], formatter: &OutputFormatter) -> Result<()> {
    for file in files {
        let result = open_tag(file, &Options::default()).and_then(|mut tag| {
            let removed = tag.delete_frames(frame_ids::PICTURE);
            save_tag(&mut tag, file)?;
            Ok(removed)
        });

        match result {
            Ok(removed) => formatter.print_success(&format!("Removed {} picture(s) from {}", removed, file)),
            Err(e) => formatter.print_error(&format!("{e:#}")),
        }
    }

    Ok(())
}

fn strip(path: &str) -> Result<()> {
    let mut tag = open_tag(path, &Options::header_only())?;
    tag.delete_all_frames();
    save_tag(&mut tag, path)
}

/// Remove the whole tag from each file
fn command_strip(files: &[String], formatter: &OutputFormatter) -> Result<()> {
    for file in files {
        match strip(file) {
            Ok(()) => formatter.print_success(&format!("Stripped tag from {}", file)),
            Err(e) => formatter.print_error(&format!("{e:#}")),
        }
    }
    Ok(())
}

/// Standard field name for frames that hold one, the frame kind otherwise.
fn frame_label(id: FrameId, frame: &Frame) -> &'static str {
    match FieldMappings::from_frame_id(id) {
        Some(field) => field.as_str(),
        None => frame.kind(),
    }
}

/// Show detailed file information
fn command_info(files: &[String], detailed: bool) -> Result<()> {
    for file_path in files {
        let metadata = fs::metadata(file_path).with_context(|| format!("failed to stat {file_path}"))?;
        let tag = open_tag(file_path, &Options::default())?;

        println!("\n📁 {}", file_path);
        println!("{}", "─".repeat(60));
        println!("Size: {} bytes", metadata.len());
        if let Ok(mtime) = metadata.modified() {
            let date = chrono::DateTime::<chrono::Utc>::from(mtime);
            println!("Modified: {}", date.format("%Y-%m-%d %H:%M:%S UTC"));
        }

        if tag.original_size() == 0 {
            println!("Tag: none");
        } else {
            println!("Tag: ID3v2.{} ({} bytes)", tag.version(), tag.original_size());
        }
        println!("Audio: {} bytes", metadata.len().saturating_sub(tag.original_size()));
        println!("Frames: {}", tag.count());

        if detailed {
            println!("\nFrames:");
            for (id, frame) in tag.all_frames() {
                println!("  {} {:<24} {:>8} bytes", id, frame_label(id, frame), frame.size());
            }
        }
    }

    Ok(())
}
