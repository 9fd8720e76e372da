//! End-to-end runs of analyze → cleanup → rewrite on a scratch project

use asset_sweep::config::ScanOrder;
use asset_sweep::report::{CleanupReport, OptimizedEntry, ReportStore};
use asset_sweep::{analysis, CleanupPipeline, Config, ReferenceRewriter};
use image::{ImageBuffer, Rgb};
use pretty_assertions::assert_eq;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn project() -> (TempDir, Config) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::rooted_at(temp_dir.path());
    config.scan.order = ScanOrder::Lexicographic;
    (temp_dir, config)
}

fn write_jpeg(path: &Path, width: u32, height: u32, shade: u8) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([shade, (x % 256) as u8, (y % 256) as u8])
    });
    img.save(path).unwrap();
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn test_cleanup_moves_duplicates_and_optimizes() {
    let (_temp_dir, config) = project();
    let base = config.paths.base_dir.clone();

    write_jpeg(&base.join("a/hero.jpg"), 64, 48, 10);
    fs::create_dir_all(base.join("b")).unwrap();
    fs::copy(base.join("a/hero.jpg"), base.join("b/hero-copy.jpg")).unwrap();
    write_jpeg(&base.join("c/team.png"), 32, 32, 200);
    fs::create_dir_all(base.join("d")).unwrap();
    fs::write(base.join("d/already.webp"), b"RIFF....WEBP").unwrap();
    fs::write(base.join("d/IMG_0001.heic"), b"heic").unwrap();

    let report = CleanupPipeline::new(config.clone()).run().unwrap();

    // Duplicate moved aside, mirroring its relative path
    assert!(!base.join("b/hero-copy.jpg").exists());
    assert!(base.join("duplicates/b/hero-copy.jpg").exists());
    assert_eq!(report.duplicates_found.len(), 1);
    assert_eq!(
        report.duplicates_found[0].duplicate,
        path_string(&base.join("b/hero-copy.jpg"))
    );
    assert_eq!(
        report.duplicates_found[0].original,
        path_string(&base.join("a/hero.jpg"))
    );

    // Canonical and unique images converted, sources removed
    assert!(base.join("images/a/hero.webp").exists());
    assert!(base.join("images/c/team.webp").exists());
    assert!(!base.join("a/hero.jpg").exists());
    assert!(!base.join("a").exists());
    assert_eq!(report.optimized.len(), 2);
    assert_eq!(report.total_processed, 2);

    // WebP and HEIC sources untouched
    assert!(base.join("d/already.webp").exists());
    assert!(base.join("d/IMG_0001.heic").exists());
    assert!(report.errors.is_empty());

    // Persisted and readable
    let saved: CleanupReport =
        serde_json::from_str(&fs::read_to_string(&config.paths.report_file).unwrap()).unwrap();
    assert_eq!(saved.optimized, report.optimized);
}

#[test]
fn test_second_run_keeps_history_and_writes_nothing_new() {
    let (_temp_dir, config) = project();
    let base = config.paths.base_dir.clone();
    write_jpeg(&base.join("photo.jpg"), 40, 30, 50);

    let first = CleanupPipeline::new(config.clone()).run().unwrap();
    assert_eq!(first.optimized.len(), 1);
    let output = base.join("images/photo.webp");
    let written_at = fs::metadata(&output).unwrap().modified().unwrap();

    let second = CleanupPipeline::new(config.clone()).run().unwrap();
    assert_eq!(second.total_processed, 0);
    assert_eq!(second.optimized, first.optimized);
    assert_eq!(
        fs::metadata(&output).unwrap().modified().unwrap(),
        written_at
    );
}

#[test]
fn test_newer_output_skips_a_kept_source() {
    let (_temp_dir, config) = project();
    let base = config.paths.base_dir.clone();
    let source = base.join("team/photo.jpg");
    write_jpeg(&source, 40, 30, 90);
    let output = base.join("images/team/photo.webp");
    fs::create_dir_all(output.parent().unwrap()).unwrap();
    fs::write(&output, b"out").unwrap();

    let now = SystemTime::now();
    File::options()
        .write(true)
        .open(&source)
        .unwrap()
        .set_modified(now - Duration::from_secs(60))
        .unwrap();
    File::options()
        .write(true)
        .open(&output)
        .unwrap()
        .set_modified(now)
        .unwrap();

    let report = CleanupPipeline::new(config).run().unwrap();

    assert_eq!(report.total_processed, 0);
    assert!(report.optimized.is_empty());
    assert!(source.exists());
    assert_eq!(fs::read(&output).unwrap(), b"out");
}

#[test]
fn test_undecodable_image_is_counted_but_kept() {
    let (_temp_dir, config) = project();
    let base = config.paths.base_dir.clone();
    fs::create_dir_all(&base).unwrap();
    fs::write(base.join("broken.png"), b"not really a png").unwrap();

    let report = CleanupPipeline::new(config).run().unwrap();

    assert!(base.join("broken.png").exists());
    assert!(report.optimized.is_empty());
    assert_eq!(report.total_processed, 1);
}

#[test]
fn test_corrupt_report_does_not_stop_cleanup() {
    let (_temp_dir, config) = project();
    fs::write(&config.paths.report_file, "][").unwrap();
    write_jpeg(&config.paths.base_dir.join("x.jpg"), 8, 8, 1);

    let report = CleanupPipeline::new(config.clone()).run().unwrap();
    assert_eq!(report.optimized.len(), 1);
}

#[test]
fn test_analysis_leaves_tree_alone() {
    let (_temp_dir, config) = project();
    let base = config.paths.base_dir.clone();
    write_jpeg(&base.join("one.jpg"), 8, 8, 1);
    fs::copy(base.join("one.jpg"), base.join("two.jpg")).unwrap();

    let report = analysis::analyze(&config);

    assert_eq!(report.total_images, 2);
    assert_eq!(report.duplicate_groups, 1);
    assert!(base.join("two.jpg").exists());
    assert!(!config.paths.duplicates_dir.exists());
}

fn rewrite_fixture(config: &Config) -> (PathBuf, PathBuf, PathBuf) {
    let src = config.rewrite.source_dirs[0].clone();
    fs::create_dir_all(src.join("components")).unwrap();
    let page = src.join("components/Hero.tsx");
    let untouched = src.join("lib/util.ts");
    fs::create_dir_all(untouched.parent().unwrap()).unwrap();
    fs::write(
        &page,
        r#"export const Hero = () => <img src="/a.jpg" alt="" />;"#,
    )
    .unwrap();
    fs::write(&untouched, "export const x = 1;\n").unwrap();
    let top_level = config.rewrite.project_root.join("README.md");
    fs::write(&top_level, "![hero](/a.jpg)\n").unwrap();
    (page, untouched, top_level)
}

#[test]
fn test_rewrite_from_report() {
    let (_temp_dir, mut config) = project();
    config.rewrite.original_prefix = "public/".to_string();
    config.rewrite.optimized_prefix = "public/images/".to_string();
    let (page, untouched, top_level) = rewrite_fixture(&config);

    let store = ReportStore::new(&config.paths.report_file);
    let mut report = CleanupReport::new();
    report.record_optimized(OptimizedEntry::new(
        Path::new("public/a.jpg"),
        Path::new("public/images/a.webp"),
        100,
        40,
    ));
    store.save(&mut report).unwrap();
    let report_before = fs::read(&config.paths.report_file).unwrap();
    let untouched_before = fs::read(&untouched).unwrap();

    let rewriter =
        ReferenceRewriter::new(&config.rewrite).skipping(&config.paths.report_file);
    let mapping = rewriter.mapping_from_store(&store);
    let summary = rewriter.run(&mapping);

    assert_eq!(
        fs::read_to_string(&page).unwrap(),
        r#"export const Hero = () => <img src="/a.webp" alt="" />;"#
    );
    assert_eq!(fs::read_to_string(&top_level).unwrap(), "![hero](/a.webp)\n");
    assert_eq!(fs::read(&untouched).unwrap(), untouched_before);
    assert_eq!(fs::read(&config.paths.report_file).unwrap(), report_before);
    assert_eq!(summary.files_updated.len(), 2);
    assert!(summary.errors.is_empty());
}

#[test]
fn test_rewrite_with_missing_or_corrupt_report_changes_nothing() {
    let (_temp_dir, config) = project();
    let (page, _, _) = rewrite_fixture(&config);
    let before = fs::read(&page).unwrap();
    let rewriter = ReferenceRewriter::new(&config.rewrite);

    let store = ReportStore::new(&config.paths.report_file);
    let mapping = rewriter.mapping_from_store(&store);
    assert!(mapping.is_empty());
    assert!(rewriter.run(&mapping).files_updated.is_empty());

    fs::write(&config.paths.report_file, "{ broken").unwrap();
    let mapping = rewriter.mapping_from_store(&store);
    assert!(mapping.is_empty());
    assert!(rewriter.run(&mapping).files_updated.is_empty());
    assert_eq!(fs::read(&page).unwrap(), before);
}

#[test]
fn test_cleanup_then_rewrite() {
    let (_temp_dir, config) = project();
    write_jpeg(&config.paths.base_dir.join("a.jpg"), 16, 16, 7);
    let (page, _, _) = rewrite_fixture(&config);

    CleanupPipeline::new(config.clone()).run().unwrap();

    let store = ReportStore::new(&config.paths.report_file);
    let rewriter =
        ReferenceRewriter::new(&config.rewrite).skipping(&config.paths.report_file);
    let mapping = rewriter.mapping_from_store(&store);
    assert_eq!(mapping.get("/a.jpg"), Some("/a.webp"));

    rewriter.run(&mapping);
    assert!(fs::read_to_string(&page).unwrap().contains("/a.webp"));
}

#[test]
fn test_rewrite_leaves_analysis_report_alone() {
    let (_temp_dir, config) = project();
    write_jpeg(&config.paths.base_dir.join("a.jpg"), 16, 16, 7);
    let (page, _, _) = rewrite_fixture(&config);

    analysis::analyze(&config)
        .save(&config.paths.analysis_report_file)
        .unwrap();
    let analysis_before = fs::read(&config.paths.analysis_report_file).unwrap();
    assert!(String::from_utf8_lossy(&analysis_before).contains("/a.jpg"));

    CleanupPipeline::new(config.clone()).run().unwrap();

    let store = ReportStore::new(&config.paths.report_file);
    let rewriter = ReferenceRewriter::for_config(&config);
    let summary = rewriter.run(&rewriter.mapping_from_store(&store));

    assert_eq!(
        fs::read(&config.paths.analysis_report_file).unwrap(),
        analysis_before
    );
    assert!(!summary
        .files_updated
        .contains(&config.paths.analysis_report_file));
    assert!(summary.files_updated.contains(&page));
}
